use crate::math::{Matrix4, Point3, Rotation, Vector3};

/// One node of a placed model's transform hierarchy.
///
/// The local matrix is translation, then rotation, then non-uniform scale,
/// which is all most scene graphs accept. Shears have to be assembled from
/// several such nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTransform {
    pub name: &'static str,
    pub translation: Vector3,
    pub rotation: Rotation,
    pub scale: Vector3,
}

impl NodeTransform {
    /// An identity transform.
    #[must_use]
    pub fn identity(name: &'static str) -> Self {
        Self {
            name,
            translation: Vector3::zeros(),
            rotation: Rotation::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Sets the rotation to `angle` radians about the local Y axis.
    #[must_use]
    pub fn rotated_y(mut self, angle: f64) -> Self {
        self.rotation = Rotation::from_axis_angle(&Vector3::y_axis(), angle);
        self
    }

    #[must_use]
    pub fn scaled(mut self, x: f64, y: f64, z: f64) -> Self {
        self.scale = Vector3::new(x, y, z);
        self
    }

    /// Moves the node to `position` and turns it `angle` radians about Z,
    /// applied on top of its current rotation.
    #[must_use]
    pub fn placed(mut self, position: Point3, angle: f64) -> Self {
        self.translation = position.coords;
        self.rotation = Rotation::from_axis_angle(&Vector3::z_axis(), angle) * self.rotation;
        self
    }

    /// Local matrix: `T * R * S`.
    #[must_use]
    pub fn matrix(&self) -> Matrix4 {
        Matrix4::new_translation(&self.translation)
            * self.rotation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }
}

/// Composes a parent-to-child chain into a single matrix.
#[must_use]
pub fn compose(chain: &[NodeTransform]) -> Matrix4 {
    chain
        .iter()
        .fold(Matrix4::identity(), |acc, node| acc * node.matrix())
}
