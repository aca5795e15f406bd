use cgmath::Zero;

use crate::math::{Matrix4, Vector3, matrix};

/// Position, rotation and scale of an entity.
///
/// Rotation is Euler angles in radians. The transformation matrix is always
/// composed as `Translation * RotationXYZ * Scale`; the order is fixed and
/// the rest of the engine depends on it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3,
    pub rotation: Vector3,
    pub scale: Vector3,
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: Vector3::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_position(position: Vector3) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    /// Builds the local transformation matrix for this transform.
    pub fn matrix(&self) -> Matrix4 {
        matrix::translation(self.position)
            * matrix::rotation_xyz(self.rotation.x, self.rotation.y, self.rotation.z)
            * matrix::scale(self.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
