//! The built-in color shader.
//!
//! Renders position-only geometry with a flat material tint. Every draw
//! applies the same fixed uniform set {model, view, projection, tint},
//! packed into one `StandardUniforms` block and written through
//! [`BasicColorShader::apply_standard_uniforms`], which also activates the
//! pipeline. Each drawn object owns a [`StandardBinding`], since queued
//! buffer writes are not interleaved with draws and per-object values need
//! per-object buffers.

use crate::{
    error::EngineError,
    gpu::shader::Shader,
    graphics::{material::Material, texture::Texture},
    math::Matrix4,
};

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct StandardUniforms {
    model: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    tint: [f32; 4],
}

/// Per-object uniform buffer and bind group for the standard uniform set.
pub struct StandardBinding {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl StandardBinding {
    /// Releases the uniform buffer.
    pub fn destroy(&self) {
        self.buffer.destroy();
    }
}

/// A basic shader for flat-colored 2D rendering.
pub struct BasicColorShader {
    shader: Shader,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline: wgpu::RenderPipeline,
}

impl BasicColorShader {
    /// Kind name materials use to reference this shader.
    pub const NAME: &'static str = "basic_color";

    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
    ) -> Result<Self, EngineError> {
        let shader = Shader::new(
            device,
            Self::NAME,
            include_str!("basic_color.vert.wgsl"),
            include_str!("basic_color.frag.wgsl"),
        )?;

        let slot = shader.get_uniform_location("u_standard")?;
        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: slot.binding,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("standard_uniforms_layout"),
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Basic Color Pipeline Layout"),
            bind_group_layouts: &[Some(&bind_group_layout)],
            immediate_size: 0,
        });

        let position_location = shader.get_attribute_location("a_position")?;
        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: (3 * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 0,
                shader_location: position_location,
            }],
        };

        let pipeline = mk_render_pipeline(
            device,
            &pipeline_layout,
            surface_format,
            Some(wgpu::BlendState::ALPHA_BLENDING),
            Some(Texture::DEPTH_FORMAT),
            wgpu::PrimitiveTopology::TriangleList,
            &[vertex_layout],
            shader.vertex_module(),
            shader.fragment_module(),
        );

        Ok(Self {
            shader,
            bind_group_layout,
            pipeline,
        })
    }

    pub fn shader(&self) -> &Shader {
        &self.shader
    }

    /// Creates the per-object uniform buffer and bind group.
    pub fn create_binding(&self, device: &wgpu::Device) -> StandardBinding {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Standard Uniform Buffer"),
            size: std::mem::size_of::<StandardUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("standard_uniforms_bind_group"),
        });
        StandardBinding { buffer, bind_group }
    }

    /// Makes this pipeline the active one on the pass.
    pub fn activate(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_pipeline(&self.pipeline);
    }

    /// Writes the fixed uniform set and activates the pipeline for a draw.
    pub fn apply_standard_uniforms(
        &self,
        queue: &wgpu::Queue,
        render_pass: &mut wgpu::RenderPass<'_>,
        binding: &StandardBinding,
        material: &Material,
        model: Matrix4,
        view: Matrix4,
        projection: Matrix4,
    ) {
        let uniforms = StandardUniforms {
            model: model.into(),
            view: view.into(),
            projection: projection.into(),
            tint: material.tint.to_array(),
        };
        queue.write_buffer(&binding.buffer, 0, bytemuck::cast_slice(&[uniforms]));
        self.activate(render_pass);
        render_pass.set_bind_group(0, &binding.bind_group, &[]);
    }
}

/// Assembles a render pipeline from compiled stages.
pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_format: Option<wgpu::TextureFormat>,
    topology: wgpu::PrimitiveTopology,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    vertex_module: &wgpu::ShaderModule,
    fragment_module: &wgpu::ShaderModule,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some("Render Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: vertex_module,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: fragment_module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: Some(true),
            depth_compare: Some(wgpu::CompareFunction::Less),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
    })
}
