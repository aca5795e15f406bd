//! Shader programs.
//!
//! A [`Shader`] is built from WGSL vertex and fragment source text. Each
//! stage is parsed and validated through naga before the device modules are
//! created, so malformed source fails with the stage's diagnostic log
//! instead of a deferred device error. At construction the naga IR is
//! introspected once into attribute and uniform name maps; looking up a name
//! the source never declared is a hard error, since it indicates a
//! programming mistake rather than a missing asset.

use std::collections::HashMap;

use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::error::EngineError;

/// Bind slot of a uniform or texture resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceSlot {
    pub group: u32,
    pub binding: u32,
}

/// Attribute and uniform interface of a compiled shader pair.
#[derive(Debug, Default)]
pub struct ShaderReflection {
    attributes: HashMap<String, u32>,
    uniforms: HashMap<String, ResourceSlot>,
}

impl ShaderReflection {
    /// Compiles and validates both stages, then reflects their interface.
    pub fn build(
        name: &str,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, EngineError> {
        let vertex_ir = compile_stage(name, "vertex", vertex_source)?;
        let fragment_ir = compile_stage(name, "fragment", fragment_source)?;
        link_stage(name, &vertex_ir)?;
        link_stage(name, &fragment_ir)?;

        let mut reflection = Self::default();
        reflection.collect_attributes(&vertex_ir);
        reflection.collect_uniforms(&vertex_ir);
        reflection.collect_uniforms(&fragment_ir);
        Ok(reflection)
    }

    pub fn get_attribute_location(&self, name: &str) -> Result<u32, EngineError> {
        self.attributes.get(name).copied().ok_or_else(|| {
            EngineError::Lookup(format!("shader declares no attribute named '{}'", name))
        })
    }

    pub fn get_uniform_location(&self, name: &str) -> Result<ResourceSlot, EngineError> {
        self.uniforms.get(name).copied().ok_or_else(|| {
            EngineError::Lookup(format!("shader declares no uniform named '{}'", name))
        })
    }

    fn collect_attributes(&mut self, module: &naga::Module) {
        for entry in &module.entry_points {
            if entry.stage != naga::ShaderStage::Vertex {
                continue;
            }
            for arg in &entry.function.arguments {
                match &arg.binding {
                    Some(naga::Binding::Location { location, .. }) => {
                        if let Some(name) = &arg.name {
                            self.attributes.insert(name.clone(), *location);
                        }
                    }
                    Some(naga::Binding::BuiltIn(_)) => {}
                    // Struct-typed inputs carry their bindings on the members.
                    None => {
                        if let naga::TypeInner::Struct { members, .. } =
                            &module.types[arg.ty].inner
                        {
                            for member in members {
                                if let (
                                    Some(name),
                                    Some(naga::Binding::Location { location, .. }),
                                ) = (&member.name, &member.binding)
                                {
                                    self.attributes.insert(name.clone(), *location);
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    fn collect_uniforms(&mut self, module: &naga::Module) {
        for (_, var) in module.global_variables.iter() {
            let (Some(name), Some(binding)) = (&var.name, &var.binding) else {
                continue;
            };
            if matches!(
                var.space,
                naga::AddressSpace::Uniform | naga::AddressSpace::Handle
            ) {
                self.uniforms.insert(
                    name.clone(),
                    ResourceSlot {
                        group: binding.group,
                        binding: binding.binding,
                    },
                );
            }
        }
    }
}

/// A compiled vertex + fragment shader pair with its reflected interface.
pub struct Shader {
    name: String,
    reflection: ShaderReflection,
    vertex_module: wgpu::ShaderModule,
    fragment_module: wgpu::ShaderModule,
}

impl Shader {
    /// Compiles, links and reflects the given sources on `device`.
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, EngineError> {
        let reflection = ShaderReflection::build(name, vertex_source, fragment_source)?;

        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{} vertex", name)),
            source: wgpu::ShaderSource::Wgsl(vertex_source.into()),
        });
        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{} fragment", name)),
            source: wgpu::ShaderSource::Wgsl(fragment_source.into()),
        });

        Ok(Self {
            name: name.to_string(),
            reflection,
            vertex_module,
            fragment_module,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertex_module(&self) -> &wgpu::ShaderModule {
        &self.vertex_module
    }

    pub fn fragment_module(&self) -> &wgpu::ShaderModule {
        &self.fragment_module
    }

    pub fn get_attribute_location(&self, name: &str) -> Result<u32, EngineError> {
        self.reflection.get_attribute_location(name)
    }

    pub fn get_uniform_location(&self, name: &str) -> Result<ResourceSlot, EngineError> {
        self.reflection.get_uniform_location(name)
    }
}

fn compile_stage(
    shader: &str,
    stage: &'static str,
    source: &str,
) -> Result<naga::Module, EngineError> {
    naga::front::wgsl::parse_str(source).map_err(|err| EngineError::Compile {
        shader: shader.to_string(),
        stage,
        log: err.emit_to_string(source),
    })
}

fn link_stage(shader: &str, module: &naga::Module) -> Result<(), EngineError> {
    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(module)
        .map(|_| ())
        .map_err(|err| EngineError::Link {
            shader: shader.to_string(),
            log: error_chain(&err.into_inner()),
        })
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut log = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        log.push_str("\n");
        log.push_str(&cause.to_string());
        source = cause.source();
    }
    log
}
