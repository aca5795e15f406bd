//! Entities, behaviors and the scene graph.

pub mod behavior;
pub mod entity;
pub mod scene_graph;

pub use behavior::{Behavior, BehaviorRef, RotationBehavior};
pub use entity::{Component, Entity, EntityData, WeakEntity};
pub use scene_graph::{ROOT_NAME, SceneGraph};
