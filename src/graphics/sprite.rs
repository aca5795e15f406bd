//! Sprite component: a flat material-tinted quad.
//!
//! The sprite is the drawable leaf of the entity tree. At load time it
//! resolves its material and shader, builds its vertex buffer and creates
//! its per-object uniform binding; at render time it applies the standard
//! uniform set with the owning entity's world matrix and issues the draw.

use std::rc::Rc;

use crate::{
    context::Context,
    gpu::buffer::{BufferTarget, DataType, GpuBuffer},
    graphics::material::MaterialRef,
    math::Matrix4,
    pipelines::basic::{BasicColorShader, StandardBinding},
    renderer::RenderView,
    world::entity::Component,
};

pub struct SpriteComponent {
    name: String,
    material_name: String,
    width: f32,
    height: f32,
    material: Option<MaterialRef>,
    shader: Option<Rc<BasicColorShader>>,
    buffer: Option<GpuBuffer>,
    binding: Option<StandardBinding>,
}

impl SpriteComponent {
    pub fn new(name: &str, material_name: &str, width: f32, height: f32) -> Self {
        Self {
            name: name.to_string(),
            material_name: material_name.to_string(),
            width,
            height,
            material: None,
            shader: None,
            buffer: None,
            binding: None,
        }
    }

    pub fn material_name(&self) -> &str {
        &self.material_name
    }
}

impl Component for SpriteComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&mut self, ctx: &Context) -> anyhow::Result<()> {
        let material = ctx.materials.get_material(&self.material_name)?;
        let shader = ctx.shaders.get(material.borrow().shader())?;

        let mut buffer = GpuBuffer::new(
            3,
            DataType::Float32,
            BufferTarget::Vertex,
            wgpu::PrimitiveTopology::TriangleList,
        )?;
        let location = shader.shader().get_attribute_location("a_position")?;
        buffer.add_attribute_location(location, 3, 0)?;
        buffer.push_data(&quad_vertices(self.width, self.height));
        buffer.upload(&ctx.device);

        self.binding = Some(shader.create_binding(&ctx.device));
        self.buffer = Some(buffer);
        self.material = Some(material);
        self.shader = Some(shader);
        Ok(())
    }

    fn render(
        &self,
        ctx: &Context,
        render_pass: &mut wgpu::RenderPass<'_>,
        render_view: &RenderView,
        world_matrix: &Matrix4,
    ) {
        let (Some(material), Some(shader), Some(buffer), Some(binding)) = (
            &self.material,
            &self.shader,
            &self.buffer,
            &self.binding,
        ) else {
            log::warn!("sprite '{}' rendered before it was loaded", self.name);
            return;
        };

        let material = render_view
            .global_material
            .as_ref()
            .unwrap_or(material)
            .clone();
        shader.apply_standard_uniforms(
            &ctx.queue,
            render_pass,
            binding,
            &material.borrow(),
            *world_matrix,
            render_view.view_matrix,
            render_view.projection_matrix,
        );
        buffer.bind(render_pass);
        buffer.draw(render_pass);
    }

    fn destroy(&mut self) {
        if let Some(buffer) = &mut self.buffer {
            buffer.destroy();
        }
        if let Some(binding) = &self.binding {
            binding.destroy();
        }
        self.buffer = None;
        self.binding = None;
        self.material = None;
        self.shader = None;
    }
}

/// Two counter-clockwise triangles spanning `[0, width] x [0, height]`.
fn quad_vertices(width: f32, height: f32) -> [f32; 18] {
    [
        0.0, 0.0, 0.0, //
        0.0, height, 0.0, //
        width, height, 0.0, //
        width, height, 0.0, //
        width, 0.0, 0.0, //
        0.0, 0.0, 0.0,
    ]
}
