//! arbor-ngin
//!
//! A lightweight scene-graph rendering engine. This crate exposes a small
//! surface for composing entity hierarchies, constructing GPU resources and
//! driving a deterministic per-frame update and render sequence. The design
//! emphasizes explicit resource lifecycles, shared-by-reference materials
//! and a minimal runtime surface suitable for embedding 2D games.
//!
//! High-level modules
//! - `assets`: extension-dispatched asset loading with bus notification
//! - `context`: central GPU and window context that owns device/queue/managers
//! - `engine`: engine startup, the game trait and the main loop
//! - `error`: the engine error taxonomy
//! - `gpu`: buffer and shader resource objects
//! - `graphics`: materials, colors, sprites, textures and 2D shapes
//! - `math`: matrix constructors and the transform type
//! - `message`: the publish/subscribe message bus
//! - `pipelines`: built-in render pipelines and the shader registry
//! - `renderer`: viewport, projection and per-frame render passes
//! - `world`: entities, behaviors and the scene graph
//!

pub mod assets;
pub mod context;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod graphics;
pub mod math;
pub mod message;
pub mod pipelines;
pub mod renderer;
pub mod world;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::{Deg, Rad};
pub use engine::{Engine, EngineState, Game};
pub use error::EngineError;
pub use instant::Duration;
pub use math::{Matrix4, Transform, Vector2, Vector3, Vector4};
pub use renderer::{ProjectionKind, RenderView, ViewportCreateInfo};
pub use world::{Behavior, Entity, SceneGraph};
