//! Linear algebra foundation.
//!
//! All matrix math is built on `cgmath`: column-major `Matrix4<f32>` with
//! OpenGL-style projection conventions (translation terms in elements 12-14).
//! Construction functions return fresh matrices and never mutate their
//! inputs; matrices are `Copy`, so overwriting a cached matrix is a plain
//! assignment.

pub mod matrix;
pub mod transform;

pub use matrix::{orthographic, perspective, rotation_xyz, scale, translation};
pub use transform::Transform;

pub type Matrix4 = cgmath::Matrix4<f32>;
pub type Vector2 = cgmath::Vector2<f32>;
pub type Vector3 = cgmath::Vector3<f32>;
pub type Vector4 = cgmath::Vector4<f32>;
