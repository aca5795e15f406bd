//! Vertex and index buffer objects.
//!
//! A [`GpuBuffer`] accumulates raw scalars on the CPU, is uploaded explicitly
//! with a one-shot usage, bound to a render pass and drawn. Vertex buffers
//! carry their attribute bindings so pipeline construction can derive the
//! matching [`wgpu::VertexBufferLayout`].

use wgpu::util::DeviceExt;

use crate::error::EngineError;

/// Scalar data types a buffer can store.
///
/// The byte-size table is fixed: 4-byte float/int/uint, 2-byte short/ushort,
/// 1-byte byte/ubyte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    Float32,
    Sint32,
    Uint32,
    Sint16,
    Uint16,
    Sint8,
    Uint8,
}

impl DataType {
    pub fn byte_size(&self) -> usize {
        match self {
            DataType::Float32 | DataType::Sint32 | DataType::Uint32 => 4,
            DataType::Sint16 | DataType::Uint16 => 2,
            DataType::Sint8 | DataType::Uint8 => 1,
        }
    }

    /// Maps this scalar type and a component count to a vertex format.
    ///
    /// Combinations without a matching vertex format (such as
    /// three-component packed 8/16-bit attributes) are unsupported.
    fn vertex_format(&self, components: u32) -> Result<wgpu::VertexFormat, EngineError> {
        use wgpu::VertexFormat as F;
        let format = match (self, components) {
            (DataType::Float32, 1) => F::Float32,
            (DataType::Float32, 2) => F::Float32x2,
            (DataType::Float32, 3) => F::Float32x3,
            (DataType::Float32, 4) => F::Float32x4,
            (DataType::Sint32, 1) => F::Sint32,
            (DataType::Sint32, 2) => F::Sint32x2,
            (DataType::Sint32, 3) => F::Sint32x3,
            (DataType::Sint32, 4) => F::Sint32x4,
            (DataType::Uint32, 1) => F::Uint32,
            (DataType::Uint32, 2) => F::Uint32x2,
            (DataType::Uint32, 3) => F::Uint32x3,
            (DataType::Uint32, 4) => F::Uint32x4,
            (DataType::Sint16, 2) => F::Sint16x2,
            (DataType::Sint16, 4) => F::Sint16x4,
            (DataType::Uint16, 2) => F::Uint16x2,
            (DataType::Uint16, 4) => F::Uint16x4,
            (DataType::Sint8, 2) => F::Sint8x2,
            (DataType::Sint8, 4) => F::Sint8x4,
            (DataType::Uint8, 2) => F::Uint8x2,
            (DataType::Uint8, 4) => F::Uint8x4,
            _ => {
                return Err(EngineError::UnsupportedType(format!(
                    "{:?} with {} components has no vertex format",
                    self, components
                )));
            }
        };
        Ok(format)
    }

    fn index_format(&self) -> Result<wgpu::IndexFormat, EngineError> {
        match self {
            DataType::Uint16 => Ok(wgpu::IndexFormat::Uint16),
            DataType::Uint32 => Ok(wgpu::IndexFormat::Uint32),
            other => Err(EngineError::UnsupportedType(format!(
                "{:?} cannot be used for index data",
                other
            ))),
        }
    }
}

/// What a buffer binds as during a draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferTarget {
    /// Vertex attribute data, drawn in array mode.
    Vertex,
    /// Index data, drawn in element mode.
    Index,
}

/// One registered vertex attribute binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeInfo {
    /// Shader location the attribute binds to.
    pub location: u32,
    /// Number of scalar components.
    pub size: u32,
    /// Offset of the attribute within one element, in scalars.
    pub offset: u32,
}

/// A vertex or index buffer with CPU backing store.
pub struct GpuBuffer {
    element_size: u32,
    data_type: DataType,
    target: BufferTarget,
    topology: wgpu::PrimitiveTopology,
    data: Vec<u8>,
    attributes: Vec<AttributeInfo>,
    wgpu_attributes: Vec<wgpu::VertexAttribute>,
    handle: Option<wgpu::Buffer>,
}

impl GpuBuffer {
    /// Creates an empty buffer.
    ///
    /// `element_size` is the stride of one element in scalars. Index buffers
    /// reject scalar types the GPU cannot index with.
    pub fn new(
        element_size: u32,
        data_type: DataType,
        target: BufferTarget,
        topology: wgpu::PrimitiveTopology,
    ) -> Result<Self, EngineError> {
        if target == BufferTarget::Index {
            data_type.index_format()?;
        }
        Ok(Self {
            element_size,
            data_type,
            target,
            topology,
            data: Vec::new(),
            attributes: Vec::new(),
            wgpu_attributes: Vec::new(),
            handle: None,
        })
    }

    pub fn element_size(&self) -> u32 {
        self.element_size
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn target(&self) -> BufferTarget {
        self.target
    }

    pub fn topology(&self) -> wgpu::PrimitiveTopology {
        self.topology
    }

    pub fn attributes(&self) -> &[AttributeInfo] {
        &self.attributes
    }

    /// Number of scalars currently in the backing store.
    pub fn count(&self) -> u32 {
        (self.data.len() / self.data_type.byte_size()) as u32
    }

    /// Number of vertices an array-mode draw of this buffer covers.
    pub fn vertex_count(&self) -> u32 {
        self.count() / self.element_size
    }

    /// Registers one vertex attribute binding.
    ///
    /// The binding must fit within the declared element stride.
    pub fn add_attribute_location(
        &mut self,
        location: u32,
        size: u32,
        offset: u32,
    ) -> Result<(), EngineError> {
        if offset + size > self.element_size {
            return Err(EngineError::Configuration(format!(
                "attribute at location {} (offset {} + size {}) exceeds element stride {}",
                location, offset, size, self.element_size
            )));
        }
        let format = self.data_type.vertex_format(size)?;
        self.attributes.push(AttributeInfo {
            location,
            size,
            offset,
        });
        self.wgpu_attributes.push(wgpu::VertexAttribute {
            format,
            offset: (offset as usize * self.data_type.byte_size()) as wgpu::BufferAddress,
            shader_location: location,
        });
        Ok(())
    }

    /// Appends raw scalars to the backing store.
    ///
    /// No element-count alignment is enforced; keeping the store a whole
    /// number of elements is the caller's responsibility.
    pub fn push_data<T: bytemuck::Pod>(&mut self, values: &[T]) {
        self.data.extend_from_slice(bytemuck::cast_slice(values));
    }

    /// Vertex buffer layout derived from the registered attributes.
    pub fn vertex_layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: (self.element_size as usize * self.data_type.byte_size())
                as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.wgpu_attributes,
        }
    }

    /// Transmits the backing store to the GPU with a one-shot usage hint.
    pub fn upload(&mut self, device: &wgpu::Device) {
        let usage = match self.target {
            BufferTarget::Vertex => wgpu::BufferUsages::VERTEX,
            BufferTarget::Index => wgpu::BufferUsages::INDEX,
        };
        self.handle = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("arbor buffer"),
            contents: &self.data,
            usage,
        }));
    }

    /// Attaches this buffer to the active render pass.
    ///
    /// Vertex buffers bind to slot 0; index buffers bind with their type's
    /// index format. Binding state is scoped to the pass, so there is no
    /// unbind: the pass ending detaches everything.
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        let Some(handle) = &self.handle else {
            log::warn!("attempted to bind a buffer that was never uploaded");
            return;
        };
        match self.target {
            BufferTarget::Vertex => render_pass.set_vertex_buffer(0, handle.slice(..)),
            BufferTarget::Index => {
                // Construction validated the format.
                let format = self
                    .data_type
                    .index_format()
                    .unwrap_or(wgpu::IndexFormat::Uint16);
                render_pass.set_index_buffer(handle.slice(..), format);
            }
        }
    }

    /// Issues a draw call for the buffer's contents.
    ///
    /// Array mode draws `count / element_size` vertices starting at 0;
    /// element mode draws `count` indices.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        match self.target {
            BufferTarget::Vertex => render_pass.draw(0..self.vertex_count(), 0..1),
            BufferTarget::Index => render_pass.draw_indexed(0..self.count(), 0, 0..1),
        }
    }

    /// Releases the GPU allocation. The CPU store survives for re-upload.
    pub fn destroy(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.destroy();
        }
    }
}
