//! 4x4 matrix constructors.
//!
//! Thin, named constructors over `cgmath` so the rest of the engine reads in
//! terms of the operations it needs. Matrix multiplication is `a * b`:
//! associative, not commutative, with the right-hand operand applied first
//! to a point.

use cgmath::Rad;

use crate::math::{Matrix4, Vector3};

/// Orthographic projection with OpenGL clip-space conventions.
pub fn orthographic(
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    near: f32,
    far: f32,
) -> Matrix4 {
    cgmath::ortho(left, right, bottom, top, near, far)
}

/// Perspective projection from a vertical field of view in radians.
pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Matrix4 {
    cgmath::perspective(Rad(fov), aspect, near, far)
}

/// Pure translation matrix.
pub fn translation(v: Vector3) -> Matrix4 {
    Matrix4::from_translation(v)
}

/// Combined Euler rotation, composed as `Rx * Ry * Rz`.
pub fn rotation_xyz(rx: f32, ry: f32, rz: f32) -> Matrix4 {
    Matrix4::from_angle_x(Rad(rx)) * Matrix4::from_angle_y(Rad(ry)) * Matrix4::from_angle_z(Rad(rz))
}

/// Per-axis scale matrix.
pub fn scale(v: Vector3) -> Matrix4 {
    Matrix4::from_nonuniform_scale(v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use cgmath::SquareMatrix;

    use super::*;

    fn matrices_close(a: &Matrix4, b: &Matrix4) -> bool {
        let a: &[f32; 16] = a.as_ref();
        let b: &[f32; 16] = b.as_ref();
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn multiplication_is_associative_but_not_commutative() {
        let a = translation(Vector3::new(1.0, 2.0, 3.0));
        let b = rotation_xyz(0.3, 0.7, -0.2);
        let c = scale(Vector3::new(2.0, 0.5, 1.5));

        assert!(matrices_close(&((a * b) * c), &(a * (b * c))));
        assert!(!matrices_close(&(a * b), &(b * a)));
    }

    #[test]
    fn translation_terms_are_column_major() {
        let m = translation(Vector3::new(4.0, 5.0, 6.0));
        let data: &[f32; 16] = m.as_ref();
        assert_eq!(data[12], 4.0);
        assert_eq!(data[13], 5.0);
        assert_eq!(data[14], 6.0);
    }

    #[test]
    fn rotation_of_zero_is_identity() {
        assert!(matrices_close(&rotation_xyz(0.0, 0.0, 0.0), &Matrix4::identity()));
    }

    #[test]
    fn orthographic_maps_extents_to_clip_corners() {
        let m = orthographic(0.0, 800.0, 600.0, 0.0, -1.0, 1.0);
        let corner = m * cgmath::Vector4::new(800.0, 600.0, 0.0, 1.0);
        assert_abs_diff_eq!(corner.x, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(corner.y, -1.0, epsilon = 1e-5);
    }
}
