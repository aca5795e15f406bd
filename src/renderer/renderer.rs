//! Render pass sequencing.
//!
//! The renderer owns exactly one viewport. Each frame, `begin_render`
//! acquires the surface texture, clears color and depth, builds a fresh
//! [`RenderView`], runs the world and gui passes and hands the active pass
//! to the game's own render entry point. `end_render` presents the pending
//! frame; presentation is the explicit wgpu analog of the buffer swap that
//! was implicit in the original target API.

use std::iter;

use cgmath::SquareMatrix;
use instant::Duration;

use crate::{
    context::Context,
    engine::Game,
    math::Matrix4,
    renderer::{RenderView, RendererViewport, ViewportCreateInfo},
};

pub struct Renderer {
    viewport: RendererViewport,
    default_view: Matrix4,
    pending_frame: Option<wgpu::SurfaceTexture>,
}

impl Renderer {
    pub fn new(create_info: ViewportCreateInfo) -> Self {
        Self {
            viewport: RendererViewport::new(create_info),
            default_view: Matrix4::identity(),
            pending_frame: None,
        }
    }

    pub fn viewport(&self) -> &RendererViewport {
        &self.viewport
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.viewport.on_resize(width, height);
    }

    /// Begins the render process for one frame.
    pub fn begin_render(
        &mut self,
        ctx: &Context,
        delta: Duration,
        game: &mut dyn Game,
    ) -> Result<(), wgpu::SurfaceError> {
        let output = ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            let render_view = RenderView {
                view_matrix: self.default_view,
                projection_matrix: self.viewport.projection_matrix(),
                fov: self.viewport.fov(),
                shorten_z_near: false,
                flip_projection: false,
                delta,
                // Additional render passes could specify an override here.
                global_material: None,
            };

            self.render_world();
            self.render_gui();

            game.render(delta, &render_view, ctx, &mut render_pass);
        }

        ctx.queue.submit(iter::once(encoder.finish()));
        self.pending_frame = Some(output);
        Ok(())
    }

    /// Ends the render process, presenting the frame begun by
    /// [`begin_render`](Self::begin_render).
    pub fn end_render(&mut self) {
        if let Some(frame) = self.pending_frame.take() {
            frame.present();
        }
    }

    fn render_world(&self) {
        // Engine-level world passes (shadow, reflection) would run here
        // before the game renders its scene.
    }

    fn render_gui(&self) {
        // The gui system is an external collaborator; its pass is a stub.
    }
}
