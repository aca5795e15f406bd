//! The scene graph: one loaded scene's entity hierarchy.
//!
//! A thin owner of a single synthetic root entity. Everything added to the
//! scene becomes a child of that root, directly or transitively, and every
//! operation delegates to it.

use instant::Duration;

use crate::{context::Context, renderer::RenderView, world::entity::Entity};

/// Reserved name of the synthetic root entity.
///
/// Reserved by convention only: a lookup for this name does find the root.
pub const ROOT_NAME: &str = "__ROOT__";

pub struct SceneGraph {
    root: Entity,
}

impl SceneGraph {
    pub fn new() -> Self {
        let root = Entity::new(ROOT_NAME);
        root.set_scene_root(root.downgrade_data());
        Self { root }
    }

    pub fn root(&self) -> &Entity {
        &self.root
    }

    pub fn is_loaded(&self) -> bool {
        self.root.is_loaded()
    }

    /// Adds an entity to the root of this scene graph and returns its
    /// shared handle.
    pub fn add_object(&self, entity: Entity) -> Entity {
        self.root.add_child(entity)
    }

    /// Recursively searches for an entity by name. First match wins.
    pub fn get_entity_by_name(&self, name: &str) -> Option<Entity> {
        self.root.get_entity_by_name(name)
    }

    pub fn load(&self, ctx: &Context) -> anyhow::Result<()> {
        self.root.load(ctx)
    }

    pub fn update(&self, delta: Duration) {
        self.root.update(delta);
    }

    pub fn render(
        &self,
        render_view: &RenderView,
        ctx: &Context,
        render_pass: &mut wgpu::RenderPass<'_>,
    ) {
        self.root.render(render_view, ctx, render_pass);
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Transform, Vector3};

    #[test]
    fn added_objects_become_children_of_the_root() {
        let scene = SceneGraph::new();
        let entity = scene.add_object(Entity::new("player"));
        assert_eq!(entity.parent().unwrap(), *scene.root());
        assert_eq!(scene.root().child_count(), 1);
    }

    #[test]
    fn lookups_delegate_to_the_root() {
        let scene = SceneGraph::new();
        let parent = scene.add_object(Entity::new("level"));
        let nested = parent.add_child(Entity::new("torch"));

        assert_eq!(scene.get_entity_by_name("torch").unwrap(), nested);
        assert!(scene.get_entity_by_name("missing").is_none());
        // The reserved root name is findable; it is reserved by convention.
        assert_eq!(scene.get_entity_by_name(ROOT_NAME).unwrap(), *scene.root());
    }

    #[test]
    fn update_propagates_world_transforms_through_the_scene() {
        let scene = SceneGraph::new();
        let parent = scene.add_object(Entity::new("anchor"));
        parent.set_transform(Transform::from_position(Vector3::new(10.0, 0.0, 0.0)));
        let child = parent.add_child(Entity::new("satellite"));
        child.set_transform(Transform::from_position(Vector3::new(0.0, 5.0, 0.0)));

        scene.update(Duration::from_millis(16));
        assert_eq!(child.world_position(), Vector3::new(10.0, 5.0, 0.0));
    }

    #[test]
    fn scene_reference_reaches_added_objects() {
        let scene = SceneGraph::new();
        let entity = scene.add_object(Entity::new("prop"));
        assert_eq!(entity.scene_root().unwrap(), *scene.root());
    }
}
