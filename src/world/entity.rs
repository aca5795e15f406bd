//! Entities: the nodes of the scene graph.
//!
//! An entity is a cheaply clonable handle onto shared node data: a child
//! vector owns the subtree, a weak reference points back at the parent, so
//! the tree has no ownership cycles. Name lookups walk depth-first, self
//! before children in insertion order, and return the first match — names
//! are search labels, not enforced keys.
//!
//! Update order per node is fixed: local matrix from the transform, world
//! matrix from the parent, then behaviors, then children, so behaviors and
//! children always observe current-frame transforms. During recursion the
//! parent world matrix is passed down by value; the tree never re-reads a
//! node that is currently being updated.

use std::{
    any::Any,
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

use cgmath::SquareMatrix;
use instant::Duration;

use crate::{
    context::Context,
    math::{Matrix4, Transform, Vector3},
    renderer::RenderView,
    world::behavior::{Behavior, BehaviorRef},
};

/// Drawable capability attached to an entity.
///
/// Components create their GPU resources at load time and issue their draw
/// with the owning entity's world matrix at render time.
pub trait Component {
    fn name(&self) -> &str;

    fn load(&mut self, ctx: &Context) -> anyhow::Result<()>;

    fn render(
        &self,
        ctx: &Context,
        render_pass: &mut wgpu::RenderPass<'_>,
        render_view: &RenderView,
        world_matrix: &Matrix4,
    );

    /// Releases GPU resources. Dropping the component releases them too;
    /// destroy only controls when.
    fn destroy(&mut self) {}
}

/// The mutable state of one scene-graph node.
pub struct EntityData {
    name: String,
    kind: String,
    pub transform: Transform,
    local_matrix: Matrix4,
    world_matrix: Matrix4,
    visible: bool,
    loaded: bool,
    children: Vec<Entity>,
    parent: Weak<RefCell<EntityData>>,
    scene_root: Weak<RefCell<EntityData>>,
    behaviors: Vec<BehaviorRef>,
    components: Vec<Box<dyn Component>>,
}

impl EntityData {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn world_matrix(&self) -> Matrix4 {
        self.world_matrix
    }
}

/// Non-owning handle to an entity, safe to store inside behaviors.
#[derive(Clone, Default)]
pub struct WeakEntity {
    inner: Weak<RefCell<EntityData>>,
}

impl WeakEntity {
    pub fn upgrade(&self) -> Option<Entity> {
        self.inner.upgrade().map(|inner| Entity { inner })
    }
}

/// Owning handle to a scene-graph node. Cloning shares the node.
#[derive(Clone)]
pub struct Entity {
    inner: Rc<RefCell<EntityData>>,
}

impl Entity {
    pub fn new(name: &str) -> Self {
        Self::with_kind(name, "entity")
    }

    pub fn with_kind(name: &str, kind: &str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(EntityData {
                name: name.to_string(),
                kind: kind.to_string(),
                transform: Transform::new(),
                local_matrix: Matrix4::identity(),
                world_matrix: Matrix4::identity(),
                visible: true,
                loaded: false,
                children: Vec::new(),
                parent: Weak::new(),
                scene_root: Weak::new(),
                behaviors: Vec::new(),
                components: Vec::new(),
            })),
        }
    }

    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    pub fn kind(&self) -> String {
        self.inner.borrow().kind.clone()
    }

    pub fn downgrade(&self) -> WeakEntity {
        WeakEntity {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn transform(&self) -> Transform {
        self.inner.borrow().transform
    }

    pub fn set_transform(&self, transform: Transform) {
        self.inner.borrow_mut().transform = transform;
    }

    pub fn is_visible(&self) -> bool {
        self.inner.borrow().visible
    }

    pub fn set_visible(&self, visible: bool) {
        self.inner.borrow_mut().visible = visible;
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.borrow().loaded
    }

    pub fn local_matrix(&self) -> Matrix4 {
        self.inner.borrow().local_matrix
    }

    /// World matrix as of the last update. Only valid after at least one
    /// update call following insertion into the tree.
    pub fn world_matrix(&self) -> Matrix4 {
        self.inner.borrow().world_matrix
    }

    /// World-space position, read from the world matrix translation terms.
    pub fn world_position(&self) -> Vector3 {
        let world = self.inner.borrow().world_matrix;
        Vector3::new(world.w.x, world.w.y, world.w.z)
    }

    pub fn parent(&self) -> Option<Entity> {
        self.inner
            .borrow()
            .parent
            .upgrade()
            .map(|inner| Entity { inner })
    }

    /// Root of the scene graph this entity was added to, if any.
    pub fn scene_root(&self) -> Option<Entity> {
        self.inner
            .borrow()
            .scene_root
            .upgrade()
            .map(|inner| Entity { inner })
    }

    pub(crate) fn set_scene_root(&self, root: Weak<RefCell<EntityData>>) {
        self.inner.borrow_mut().scene_root = root;
    }

    pub(crate) fn downgrade_data(&self) -> Weak<RefCell<EntityData>> {
        Rc::downgrade(&self.inner)
    }

    pub fn child_count(&self) -> usize {
        self.inner.borrow().children.len()
    }

    pub fn children(&self) -> Vec<Entity> {
        self.inner.borrow().children.clone()
    }

    /// Adds `child` to this entity and hands the shared handle back.
    ///
    /// The child's parent reference is pointed at this entity and the
    /// owning scene-graph reference is propagated. A child attached after
    /// this entity was loaded is not retroactively loaded.
    pub fn add_child(&self, child: Entity) -> Entity {
        {
            let mut child_data = child.inner.borrow_mut();
            child_data.parent = Rc::downgrade(&self.inner);
            child_data.scene_root = self.inner.borrow().scene_root.clone();
        }
        self.inner.borrow_mut().children.push(child.clone());
        child
    }

    /// Removes `child` if it is a direct child of this entity; otherwise a
    /// no-op. Never recursive.
    pub fn remove_child(&self, child: &Entity) {
        let mut data = self.inner.borrow_mut();
        let before = data.children.len();
        data.children.retain(|existing| existing != child);
        if data.children.len() != before {
            child.inner.borrow_mut().parent = Weak::new();
        }
    }

    /// Attaches a behavior and points it back at this entity.
    pub fn add_behavior<B: Behavior + 'static>(&self, behavior: B) {
        let shared: BehaviorRef = Rc::new(RefCell::new(behavior));
        shared.borrow_mut().set_owner(self);
        self.inner.borrow_mut().behaviors.push(shared);
    }

    /// Attaches a drawable component.
    pub fn add_component<C: Component + 'static>(&self, component: C) {
        self.inner.borrow_mut().components.push(Box::new(component));
    }

    /// Depth-first search for an entity, self first, children in insertion
    /// order. First match wins; names are not guaranteed unique.
    pub fn get_entity_by_name(&self, name: &str) -> Option<Entity> {
        if self.inner.borrow().name == name {
            return Some(self.clone());
        }
        let children = self.children();
        for child in &children {
            if let Some(found) = child.get_entity_by_name(name) {
                return Some(found);
            }
        }
        None
    }

    /// Depth-first search for a behavior, own behaviors first, then
    /// children in insertion order. First match wins.
    pub fn get_behavior_by_name(&self, name: &str) -> Option<BehaviorRef> {
        for behavior in &self.inner.borrow().behaviors {
            if behavior.borrow().name() == name {
                return Some(behavior.clone());
            }
        }
        let children = self.children();
        for child in &children {
            if let Some(found) = child.get_behavior_by_name(name) {
                return Some(found);
            }
        }
        None
    }

    /// Finds one of this entity's own behaviors by name and applies it with
    /// the given user data. Returns whether a behavior was applied.
    pub fn apply_behavior(&self, name: &str, user_data: &dyn Any) -> bool {
        let behavior = self
            .inner
            .borrow()
            .behaviors
            .iter()
            .find(|behavior| behavior.borrow().name() == name)
            .cloned();
        match behavior {
            Some(behavior) => {
                behavior
                    .borrow_mut()
                    .apply(&mut self.inner.borrow_mut(), user_data);
                true
            }
            None => false,
        }
    }

    /// Loads this entity and all current children, creating component GPU
    /// resources. Loading is one-way; children attached later must be
    /// loaded explicitly.
    pub fn load(&self, ctx: &Context) -> anyhow::Result<()> {
        let children = {
            let mut data = self.inner.borrow_mut();
            data.loaded = true;
            for component in data.components.iter_mut() {
                component.load(ctx)?;
            }
            data.children.clone()
        };
        for child in &children {
            child.load(ctx)?;
        }
        Ok(())
    }

    /// Pre-update hook: behaviors first, then children, depth-first.
    pub fn update_ready(&self) {
        let (behaviors, children) = {
            let data = self.inner.borrow();
            (data.behaviors.clone(), data.children.clone())
        };
        for behavior in &behaviors {
            behavior
                .borrow_mut()
                .update_ready(&mut self.inner.borrow_mut());
        }
        for child in &children {
            child.update_ready();
        }
    }

    /// Per-frame update: matrices, then behaviors, then children.
    pub fn update(&self, delta: Duration) {
        let parent_world = self.parent().map(|parent| parent.world_matrix());
        self.update_with_parent(delta, parent_world);
    }

    fn update_with_parent(&self, delta: Duration, parent_world: Option<Matrix4>) {
        let (world, behaviors, children) = {
            let mut data = self.inner.borrow_mut();
            data.local_matrix = data.transform.matrix();
            data.world_matrix = match parent_world {
                Some(parent) => parent * data.local_matrix,
                None => data.local_matrix,
            };
            (
                data.world_matrix,
                data.behaviors.clone(),
                data.children.clone(),
            )
        };
        for behavior in &behaviors {
            behavior
                .borrow_mut()
                .update(&mut self.inner.borrow_mut(), delta);
        }
        for child in &children {
            child.update_with_parent(delta, Some(world));
        }
    }

    /// Renders this entity and its children.
    ///
    /// An invisible entity renders nothing and does not recurse. A visible
    /// entity draws its own components, then recurses unconditionally.
    pub fn render(
        &self,
        render_view: &RenderView,
        ctx: &Context,
        render_pass: &mut wgpu::RenderPass<'_>,
    ) {
        let data = self.inner.borrow();
        if !data.visible {
            return;
        }
        for component in &data.components {
            component.render(ctx, render_pass, render_view, &data.world_matrix);
        }
        for child in &data.children {
            child.render(render_view, ctx, render_pass);
        }
    }

    /// Releases this entity's own resources: components are destroyed and
    /// behaviors detached. Deliberately does not cascade to children — the
    /// subtree keeps its resources until destroyed or dropped.
    pub fn destroy(&self) {
        let mut data = self.inner.borrow_mut();
        for component in data.components.iter_mut() {
            component.destroy();
        }
        data.components.clear();
        data.behaviors.clear();
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.borrow();
        f.debug_struct("Entity")
            .field("name", &data.name)
            .field("kind", &data.kind)
            .field("children", &data.children.len())
            .field("loaded", &data.loaded)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::matrix;

    #[test]
    fn add_then_remove_child_restores_both_sides() {
        let parent = Entity::new("parent");
        let child = parent.add_child(Entity::new("child"));
        assert_eq!(parent.child_count(), 1);
        assert_eq!(child.parent().unwrap(), parent);

        parent.remove_child(&child);
        assert_eq!(parent.child_count(), 0);
        assert!(child.parent().is_none());
    }

    #[test]
    fn remove_child_of_another_parent_is_a_no_op() {
        let parent = Entity::new("parent");
        let other = Entity::new("other");
        let child = other.add_child(Entity::new("child"));

        parent.remove_child(&child);
        assert_eq!(other.child_count(), 1);
        assert_eq!(child.parent().unwrap(), other);
    }

    #[test]
    fn root_world_matrix_equals_local_matrix() {
        let root = Entity::new("root");
        let mut transform = Transform::new();
        transform.position = Vector3::new(2.0, 4.0, 6.0);
        root.set_transform(transform);

        root.update(Duration::from_millis(16));
        assert_eq!(root.world_matrix(), root.local_matrix());
        assert_eq!(root.world_position(), Vector3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn child_world_matrix_is_parent_world_times_local() {
        let root = Entity::new("root");
        root.set_transform(Transform::from_position(Vector3::new(1.0, 0.0, 0.0)));
        let child = root.add_child(Entity::new("child"));
        child.set_transform(Transform::from_position(Vector3::new(0.0, 2.0, 0.0)));

        root.update(Duration::from_millis(16));
        let expected = root.world_matrix() * child.local_matrix();
        assert_eq!(child.world_matrix(), expected);
        assert_eq!(child.world_position(), Vector3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn grandchild_accumulates_both_ancestors() {
        let root = Entity::new("root");
        root.set_transform(Transform::from_position(Vector3::new(1.0, 0.0, 0.0)));
        let middle = root.add_child(Entity::new("middle"));
        middle.set_transform(Transform::from_position(Vector3::new(0.0, 1.0, 0.0)));
        let leaf = middle.add_child(Entity::new("leaf"));
        leaf.set_transform(Transform::from_position(Vector3::new(0.0, 0.0, 1.0)));

        root.update(Duration::from_millis(16));
        assert_eq!(leaf.world_position(), Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn update_recomputes_local_matrix_from_the_transform() {
        let entity = Entity::new("mover");
        entity.set_transform(Transform::from_position(Vector3::new(5.0, 0.0, 0.0)));
        entity.update(Duration::from_millis(16));
        assert_eq!(
            entity.local_matrix(),
            matrix::translation(Vector3::new(5.0, 0.0, 0.0))
        );

        entity.set_transform(Transform::from_position(Vector3::new(7.0, 0.0, 0.0)));
        entity.update(Duration::from_millis(16));
        assert_eq!(
            entity.local_matrix(),
            matrix::translation(Vector3::new(7.0, 0.0, 0.0))
        );
    }

    #[test]
    fn lookup_finds_deeply_nested_entities_first_match_wins() {
        let root = Entity::new("root");
        let branch_a = root.add_child(Entity::new("branch"));
        let _branch_b = root.add_child(Entity::new("branch"));
        let nested = branch_a.add_child(Entity::new("inner"));
        let leaf = nested.add_child(Entity::new("leaf"));

        assert_eq!(root.get_entity_by_name("leaf").unwrap(), leaf);
        // Both branches share a name; depth-first order returns the first.
        assert_eq!(root.get_entity_by_name("branch").unwrap(), branch_a);
        assert!(root.get_entity_by_name("missing").is_none());
    }

    #[test]
    fn behavior_lookup_prefers_own_behaviors_over_children() {
        use crate::world::behavior::RotationBehavior;

        let root = Entity::new("root");
        let child = root.add_child(Entity::new("child"));
        child.add_behavior(RotationBehavior::new("spin", Vector3::new(0.0, 1.0, 0.0)));

        let found = root.get_behavior_by_name("spin").unwrap();
        assert_eq!(found.borrow().name(), "spin");
        assert!(root.get_behavior_by_name("missing").is_none());
    }

    #[test]
    fn entities_start_unloaded_and_visible() {
        let parent = Entity::new("parent");
        let child = parent.add_child(Entity::new("child"));
        assert!(!parent.is_loaded());
        assert!(!child.is_loaded());
        assert!(parent.is_visible());
    }

    #[test]
    fn destroy_does_not_cascade_to_children() {
        let parent = Entity::new("parent");
        let child = parent.add_child(Entity::new("child"));
        child.add_behavior(crate::world::behavior::RotationBehavior::new(
            "spin",
            Vector3::new(1.0, 0.0, 0.0),
        ));

        parent.destroy();
        assert_eq!(parent.child_count(), 1);
        assert!(child.get_behavior_by_name("spin").is_some());
    }

    #[test]
    fn scene_reference_propagates_to_direct_children() {
        let root = Entity::new("root");
        root.set_scene_root(root.downgrade_data());
        let child = root.add_child(Entity::new("child"));
        assert_eq!(child.scene_root().unwrap(), root);
    }
}
