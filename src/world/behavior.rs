//! Behaviors: attachable units of non-rendering logic.
//!
//! A behavior affects the entity that owns it. It never owns children and
//! lives exactly as long as its owner keeps it attached. Lifecycle calls
//! receive the owner's data directly, which is the borrow-checked form of
//! the owner back-reference during traversal; behaviors that need a handle
//! outside the update cycle store the weak handle given to `set_owner`.

use std::{any::Any, cell::RefCell, rc::Rc};

use instant::Duration;

use crate::{
    math::Vector3,
    world::entity::{Entity, EntityData},
};

pub trait Behavior {
    fn name(&self) -> &str;

    /// Called once when the behavior is attached to its owner.
    ///
    /// Store `owner.downgrade()` if a handle is needed outside the update
    /// cycle; holding the strong handle would keep the owner alive through
    /// its own behavior list.
    fn set_owner(&mut self, _owner: &Entity) {}

    /// Pre-update hook, invoked before the main loop begins.
    fn update_ready(&mut self, _owner: &mut EntityData) {}

    /// Per-frame update with the elapsed time since the previous frame.
    fn update(&mut self, owner: &mut EntityData, delta: Duration);

    /// Applies this behavior directly, outside the update cycle.
    fn apply(&mut self, _owner: &mut EntityData, _user_data: &dyn Any) {}
}

pub type BehaviorRef = Rc<RefCell<dyn Behavior>>;

/// Rotates the owning entity by a constant Euler rate per second.
pub struct RotationBehavior {
    name: String,
    rotation: Vector3,
}

impl RotationBehavior {
    pub fn new(name: &str, rotation: Vector3) -> Self {
        Self {
            name: name.to_string(),
            rotation,
        }
    }
}

impl Behavior for RotationBehavior {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, owner: &mut EntityData, delta: Duration) {
        owner.transform.rotation += self.rotation * delta.as_secs_f32();
    }

    fn apply(&mut self, owner: &mut EntityData, _user_data: &dyn Any) {
        owner.transform.rotation += self.rotation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_scales_with_elapsed_time() {
        let entity = Entity::new("spinner");
        entity.add_behavior(RotationBehavior::new(
            "spin",
            Vector3::new(0.0, 1.0, 0.0),
        ));

        entity.update(Duration::from_millis(500));
        let rotation = entity.transform().rotation;
        assert!((rotation.y - 0.5).abs() < 1e-5);
        assert_eq!(rotation.x, 0.0);
    }

    #[test]
    fn apply_rotates_by_the_full_rate() {
        let entity = Entity::new("spinner");
        entity.add_behavior(RotationBehavior::new(
            "spin",
            Vector3::new(0.0, 0.0, 1.0),
        ));

        assert!(entity.apply_behavior("spin", &()));
        assert!((entity.transform().rotation.z - 1.0).abs() < 1e-6);
    }
}
