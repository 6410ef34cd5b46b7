use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, SQRT_2};

use crate::math::{Point3, TOLERANCE};

use super::transform::NodeTransform;

/// Transform chain for a rail of model-space length `length` running from
/// `from` in plan direction `direction` (radians about Z), rising by
/// `rise` over its length.
///
/// Without a rise the chain is a single node. With one, three skew stages
/// sit above the model node; rotating and scaling about the model's Y axis
/// they multiply out to an exact shear `z += x * rise / length`, leaving
/// X and Y untouched.
#[must_use]
pub fn rail_chain(from: Point3, direction: f64, length: f64, rise: f64) -> Vec<NodeTransform> {
    let model = NodeTransform::identity("model").scaled(length, 1.0, 1.0);

    if rise.abs() < TOLERANCE || length < TOLERANCE {
        return vec![model.placed(from, direction)];
    }

    let stages = ShearStages::new(length, rise);
    vec![
        NodeTransform::identity("skew_top")
            .rotated_y(-stages.real_angle)
            .scaled(SQRT_2 / stages.shear_angle.sin(), 1.0, SQRT_2)
            .placed(from, direction),
        NodeTransform::identity("skew_mid")
            .rotated_y(FRAC_PI_4)
            .scaled((stages.shear_angle / 2.0).sin(), 1.0, (stages.shear_angle / 2.0).cos()),
        NodeTransform::identity("skew_bot")
            .rotated_y(-stages.shear_angle / 2.0)
            .scaled(stages.magnitude, 1.0, 1.0 / stages.magnitude),
        model,
    ]
}

/// Angles and magnitude of the three-stage shear decomposition.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ShearStages {
    /// Slope angle of the rail, `atan2(rise, length)`.
    real_angle: f64,
    /// Angle between the sheared X axis and the Z axis.
    shear_angle: f64,
    /// Length of the sheared unit X vector.
    magnitude: f64,
}

impl ShearStages {
    fn new(length: f64, rise: f64) -> Self {
        let real_angle = rise.atan2(length);
        let shear_angle = if real_angle > 0.0 {
            FRAC_PI_2 - real_angle
        } else {
            -FRAC_PI_2 - real_angle
        };
        let slope = rise / length;
        Self {
            real_angle,
            shear_angle,
            magnitude: slope.hypot(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::transform::compose;
    use super::*;
    use crate::math::Vector3;
    use approx::assert_relative_eq;

    fn assert_maps(chain: &[NodeTransform], from: Vector3, to: Vector3) {
        let v = compose(chain).transform_vector(&from);
        assert_relative_eq!(v, to, epsilon = 1e-9);
    }

    #[test]
    fn level_rail_has_no_skew_stages() {
        let chain = rail_chain(Point3::new(1.0, 2.0, 0.5), 0.0, 1.0, 0.0);
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].name, "model");
        assert_relative_eq!(chain[0].scale, Vector3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(chain[0].translation, Vector3::new(1.0, 2.0, 0.5));
    }

    #[test]
    fn unit_rail_shears_z_by_rise() {
        for rise in [0.5, -0.3, 1.25] {
            let chain = rail_chain(Point3::origin(), 0.0, 1.0, rise);
            assert_eq!(chain.len(), 4);
            assert_maps(&chain, Vector3::x(), Vector3::new(1.0, 0.0, rise));
            assert_maps(&chain, Vector3::y(), Vector3::y());
            assert_maps(&chain, Vector3::z(), Vector3::z());
        }
    }

    #[test]
    fn long_rail_reaches_far_end() {
        let chain = rail_chain(Point3::origin(), 0.0, 2.83, -0.7);
        assert_maps(&chain, Vector3::x(), Vector3::new(2.83, 0.0, -0.7));
        assert_maps(&chain, Vector3::z(), Vector3::z());
    }

    #[test]
    fn direction_rotates_the_sheared_rail() {
        let from = Point3::new(3.0, 4.0, 1.0);
        let chain = rail_chain(from, FRAC_PI_2, 1.0, 0.5);
        let end = compose(&chain).transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(end, Point3::new(3.0, 5.0, 1.5), epsilon = 1e-9);
        assert_eq!(
            chain.iter().map(|n| n.name).collect::<Vec<_>>(),
            vec!["skew_top", "skew_mid", "skew_bot", "model"]
        );
    }
}
