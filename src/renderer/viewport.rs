//! The rendering surface's projection configuration.

use crate::math::{Matrix4, matrix};

/// cgmath produces OpenGL clip space (z in -1..1); wgpu consumes z in 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4 = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectionKind {
    Orthographic,
    Perspective,
}

/// Creation parameters for the renderer's viewport.
#[derive(Clone, Debug)]
pub struct ViewportCreateInfo {
    /// Identifier of the hosting surface; used as the window title.
    pub surface_id: Option<String>,
    pub width: u32,
    pub height: u32,
    pub near_clip: f32,
    pub far_clip: f32,
    /// Vertical field of view in radians; used by perspective projection.
    pub fov: f32,
    pub projection: ProjectionKind,
    /// Origin offset of the viewport, in pixels.
    pub x: f32,
    pub y: f32,
}

impl Default for ViewportCreateInfo {
    fn default() -> Self {
        Self {
            surface_id: None,
            width: 800,
            height: 600,
            near_clip: 0.1,
            far_clip: 1000.0,
            fov: 45.0_f32.to_radians(),
            projection: ProjectionKind::Perspective,
            x: 0.0,
            y: 0.0,
        }
    }
}

/// The rendering surface plus its projection state.
pub struct RendererViewport {
    info: ViewportCreateInfo,
    width: u32,
    height: u32,
}

impl RendererViewport {
    pub fn new(info: ViewportCreateInfo) -> Self {
        let width = info.width;
        let height = info.height;
        Self {
            info,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn fov(&self) -> f32 {
        self.info.fov
    }

    /// Recomputes the surface dimensions; the projection follows on the
    /// next [`projection_matrix`](Self::projection_matrix) call.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    /// Projection for the current dimensions, adapted to wgpu clip space.
    pub fn projection_matrix(&self) -> Matrix4 {
        let projection = match self.info.projection {
            ProjectionKind::Perspective => matrix::perspective(
                self.info.fov,
                self.width as f32 / self.height as f32,
                self.info.near_clip,
                self.info.far_clip,
            ),
            ProjectionKind::Orthographic => matrix::orthographic(
                self.info.x,
                self.info.x + self.width as f32,
                self.info.y + self.height as f32,
                self.info.y,
                self.info.near_clip,
                self.info.far_clip,
            ),
        };
        OPENGL_TO_WGPU_MATRIX * projection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector4;

    #[test]
    fn orthographic_projection_maps_pixels_to_clip_space() {
        let viewport = RendererViewport::new(ViewportCreateInfo {
            width: 800,
            height: 600,
            near_clip: -100.0,
            far_clip: 100.0,
            projection: ProjectionKind::Orthographic,
            ..Default::default()
        });

        let projected = viewport.projection_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        // The pixel origin lands in the top-left clip corner.
        assert!((projected.x - -1.0).abs() < 1e-5);
        assert!((projected.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn resize_changes_the_projection() {
        let mut viewport = RendererViewport::new(ViewportCreateInfo::default());
        let before = viewport.projection_matrix();
        viewport.on_resize(400, 600);
        assert_ne!(viewport.projection_matrix(), before);
        assert_eq!(viewport.width(), 400);
    }

    #[test]
    fn projection_kind_selects_the_formula() {
        let perspective = RendererViewport::new(ViewportCreateInfo::default());
        let orthographic = RendererViewport::new(ViewportCreateInfo {
            projection: ProjectionKind::Orthographic,
            ..Default::default()
        });
        assert_ne!(
            perspective.projection_matrix(),
            orthographic.projection_matrix()
        );
    }

    #[test]
    fn minimized_surface_keeps_a_valid_aspect() {
        let mut viewport = RendererViewport::new(ViewportCreateInfo::default());
        viewport.on_resize(0, 0);
        assert_eq!(viewport.width(), 1);
        assert_eq!(viewport.height(), 1);
        let projection = viewport.projection_matrix();
        let data: &[f32; 16] = projection.as_ref();
        assert!(data.iter().all(|v| v.is_finite()));
    }
}
