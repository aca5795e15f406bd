//! Materials and the material registry.
//!
//! A material names the shader it renders with and carries the render
//! parameters applied on every draw (tint, optional texture). Materials are
//! shared by reference: many entities may hold the same `MaterialRef`, and a
//! change to a shared material's parameters is visible to every referent on
//! its next draw.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::{error::EngineError, graphics::color::Color};

/// Shared handle to a registered material.
pub type MaterialRef = Rc<RefCell<Material>>;

/// Named bundle of shader kind and render parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    name: String,
    shader: String,
    pub tint: Color,
    pub texture: Option<String>,
}

impl Material {
    pub fn new(name: &str, shader: &str, tint: Color) -> Self {
        Self {
            name: name.to_string(),
            shader: shader.to_string(),
            tint,
            texture: None,
        }
    }

    pub fn with_texture(mut self, texture: &str) -> Self {
        self.texture = Some(texture.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the shader this material renders with.
    pub fn shader(&self) -> &str {
        &self.shader
    }
}

/// Registry of materials, cached and shared by name.
#[derive(Default)]
pub struct MaterialManager {
    materials: HashMap<String, MaterialRef>,
}

impl MaterialManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a material under its own name, replacing any previous entry.
    pub fn register_material(&mut self, material: Material) -> MaterialRef {
        let name = material.name().to_string();
        let shared = Rc::new(RefCell::new(material));
        if self
            .materials
            .insert(name.clone(), shared.clone())
            .is_some()
        {
            log::warn!("material '{}' was re-registered and replaced", name);
        }
        shared
    }

    /// Returns the shared instance registered under `name`.
    pub fn get_material(&self, name: &str) -> Result<MaterialRef, EngineError> {
        self.materials
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::Lookup(format!("no material registered as '{}'", name)))
    }
}
