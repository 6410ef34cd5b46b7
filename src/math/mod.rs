/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type. Lot geometry uses plan `x`, plan `y` and elevation `z`.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 4x4 transformation matrix.
pub type Matrix4 = nalgebra::Matrix4<f64>;

/// Unit quaternion rotation.
pub type Rotation = nalgebra::UnitQuaternion<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Tolerance used when deciding whether two unit directions are parallel.
pub const PARALLEL_TOLERANCE: f64 = 1e-6;

/// Z component of the 3D cross product of two plan vectors.
#[must_use]
pub fn cross_2d(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Normalizes a plan vector, returning `None` for zero-length input.
#[must_use]
pub fn normalize_2d(v: Vector2) -> Option<Vector2> {
    let len = v.norm();
    if len < TOLERANCE {
        None
    } else {
        Some(v / len)
    }
}

/// Linear interpolation between `a` and `b`.
#[must_use]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
