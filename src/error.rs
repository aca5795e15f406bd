//! Engine error taxonomy.
//!
//! Construction-time failures (shader compilation/linking, unsupported buffer
//! types) are unrecoverable and propagate up to abort the initialization of
//! the offending subsystem. Runtime tree lookups miss with `Option` instead;
//! only name lookups that indicate a programming error (shader attributes and
//! uniforms, unregistered materials) surface here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A required field is missing or out of range in configuration data.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A shader stage failed to compile. Carries the stage's diagnostic log.
    #[error("failed to compile {stage} stage of shader '{shader}':\n{log}")]
    Compile {
        shader: String,
        stage: &'static str,
        log: String,
    },

    /// A compiled shader failed module validation (the link-time analog).
    #[error("failed to link shader '{shader}':\n{log}")]
    Link { shader: String, log: String },

    /// A name was requested that the resource never declared.
    #[error("lookup failed: {0}")]
    Lookup(String),

    /// A scalar type has no representation for the requested buffer use.
    #[error("unsupported data type: {0}")]
    UnsupportedType(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
