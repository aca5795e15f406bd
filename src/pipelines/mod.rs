//! Render pipeline definitions and the shader registry.
//!
//! Shaders form a closed set: each built-in pipeline is constructed once at
//! engine initialization and resolved by kind name when a material asks for
//! it. Construction failures abort engine startup since there is no shader
//! fallback.

pub mod basic;

use std::rc::Rc;

use crate::error::EngineError;

pub use basic::{BasicColorShader, StandardBinding, mk_render_pipeline};

/// The built-in shaders, resolved by kind name.
pub struct ShaderManager {
    basic_color: Rc<BasicColorShader>,
}

impl ShaderManager {
    /// Compiles all built-in shaders for the given surface format.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            basic_color: Rc::new(BasicColorShader::new(device, surface_format)?),
        })
    }

    /// Resolves a shader by the kind name materials reference.
    pub fn get(&self, kind: &str) -> Result<Rc<BasicColorShader>, EngineError> {
        match kind {
            BasicColorShader::NAME => Ok(self.basic_color.clone()),
            other => Err(EngineError::Lookup(format!(
                "no shader registered for kind '{}'",
                other
            ))),
        }
    }
}
