//! Frame rendering: viewport, projection and render pass sequencing.

pub mod renderer;
pub mod viewport;

use instant::Duration;

pub use renderer::Renderer;
pub use viewport::{OPENGL_TO_WGPU_MATRIX, ProjectionKind, RendererViewport, ViewportCreateInfo};

use crate::{graphics::material::MaterialRef, math::Matrix4};

/// Per-frame render state handed down through the render pass.
///
/// Created fresh by the renderer every frame and never persisted.
pub struct RenderView {
    pub view_matrix: Matrix4,
    pub projection_matrix: Matrix4,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub shorten_z_near: bool,
    pub flip_projection: bool,
    /// Elapsed time since the previous frame.
    pub delta: Duration,
    /// When set, every draw in the pass uses this material instead of its own.
    pub global_material: Option<MaterialRef>,
}
