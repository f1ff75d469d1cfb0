use crate::scene::{NodeId, SceneGraph, Transform};

use super::components::{MeshFilter, MeshRenderer, Name, Visibility};
use super::entity::{Entity, EntityAllocator};

/// Container associating entities with a scene-graph node and optional
/// render components.
///
/// Every entity owns exactly one node in the embedded [`SceneGraph`];
/// hierarchy operations go through [`graph_mut`](Self::graph_mut) (or the
/// [`set_parent`](Self::set_parent) convenience). [`MeshFilter`],
/// [`MeshRenderer`], and [`Name`] are optional; [`Visibility`] defaults to
/// visible.
///
/// Reading through a despawned entity panics; mutating through one is a
/// logged no-op, mirroring the scene graph's handling of stale handles.
#[derive(Debug, Default)]
pub struct World {
    allocator: EntityAllocator,
    graph: SceneGraph,
    nodes: Vec<NodeId>,
    names: Vec<Option<Name>>,
    visibilities: Vec<Visibility>,
    mesh_filters: Vec<Option<MeshFilter>>,
    mesh_renderers: Vec<Option<MeshRenderer>>,
}

impl World {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    // ---- lifecycle ----

    /// Spawn an entity with an identity transform.
    pub fn spawn(&mut self) -> Entity {
        self.spawn_with(Transform::IDENTITY)
    }

    /// Spawn an entity whose scene node starts with the given local
    /// transform.
    pub fn spawn_with(&mut self, local: Transform) -> Entity {
        let node = self.graph.spawn_with(local);
        let (entity, fresh) = self.allocator.allocate();

        if fresh {
            self.nodes.push(node);
            self.names.push(None);
            self.visibilities.push(Visibility::VISIBLE);
            self.mesh_filters.push(None);
            self.mesh_renderers.push(None);
        } else {
            let idx = entity.index() as usize;
            self.nodes[idx] = node;
            self.names[idx] = None;
            self.visibilities[idx] = Visibility::VISIBLE;
            self.mesh_filters[idx] = None;
            self.mesh_renderers[idx] = None;
        }

        entity
    }

    /// Despawn an entity and destroy its scene node.
    ///
    /// Children of the node are released to become roots (their entities
    /// stay alive). Returns `false` if the entity was already dead.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.allocator.is_alive(entity) {
            return false;
        }

        let idx = entity.index() as usize;
        self.graph.despawn(self.nodes[idx]);
        self.names[idx] = None;
        self.mesh_filters[idx] = None;
        self.mesh_renderers[idx] = None;
        self.allocator.deallocate(entity)
    }

    /// Whether the entity is alive.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
    }

    /// Number of alive entities.
    pub fn entity_count(&self) -> u32 {
        self.allocator.count()
    }

    /// Iterate over all alive entities.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.allocator.iter_alive()
    }

    // ---- scene graph access ----

    /// The scene-graph node owned by this entity.
    pub fn node(&self, entity: Entity) -> NodeId {
        assert!(
            self.allocator.is_alive(entity),
            "dead entity handle: {entity}"
        );
        self.nodes[entity.index() as usize]
    }

    /// The transform hierarchy shared by all entities.
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Mutable access to the transform hierarchy.
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    /// Parent `child`'s node under `parent`'s node (or detach with `None`).
    pub fn set_parent(&mut self, child: Entity, parent: Option<Entity>, keep_world: bool) {
        if !self.allocator.is_alive(child) {
            log::warn!("set_parent on dead entity {child}");
            return;
        }
        if let Some(parent) = parent {
            if !self.allocator.is_alive(parent) {
                log::warn!("set_parent of {child} to dead entity {parent}");
                return;
            }
        }
        let child_node = self.nodes[child.index() as usize];
        let parent_node = parent.map(|p| self.nodes[p.index() as usize]);
        self.graph.set_parent(child_node, parent_node, keep_world);
    }

    // ---- components ----

    pub fn name(&self, entity: Entity) -> Option<&Name> {
        self.component(entity, &self.names)
    }

    pub fn set_name(&mut self, entity: Entity, name: impl Into<Name>) {
        if !self.allocator.is_alive(entity) {
            log::warn!("set_name on dead entity {entity}");
            return;
        }
        self.names[entity.index() as usize] = Some(name.into());
    }

    pub fn visibility(&self, entity: Entity) -> Visibility {
        assert!(
            self.allocator.is_alive(entity),
            "dead entity handle: {entity}"
        );
        self.visibilities[entity.index() as usize]
    }

    pub fn set_visibility(&mut self, entity: Entity, visibility: Visibility) {
        if !self.allocator.is_alive(entity) {
            log::warn!("set_visibility on dead entity {entity}");
            return;
        }
        self.visibilities[entity.index() as usize] = visibility;
    }

    pub fn mesh_filter(&self, entity: Entity) -> Option<&MeshFilter> {
        self.component(entity, &self.mesh_filters)
    }

    pub fn mesh_filter_mut(&mut self, entity: Entity) -> Option<&mut MeshFilter> {
        assert!(
            self.allocator.is_alive(entity),
            "dead entity handle: {entity}"
        );
        self.mesh_filters[entity.index() as usize].as_mut()
    }

    pub fn set_mesh_filter(&mut self, entity: Entity, filter: MeshFilter) {
        if !self.allocator.is_alive(entity) {
            log::warn!("set_mesh_filter on dead entity {entity}");
            return;
        }
        self.mesh_filters[entity.index() as usize] = Some(filter);
    }

    pub fn remove_mesh_filter(&mut self, entity: Entity) -> Option<MeshFilter> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        self.mesh_filters[entity.index() as usize].take()
    }

    pub fn mesh_renderer(&self, entity: Entity) -> Option<&MeshRenderer> {
        self.component(entity, &self.mesh_renderers)
    }

    pub fn mesh_renderer_mut(&mut self, entity: Entity) -> Option<&mut MeshRenderer> {
        assert!(
            self.allocator.is_alive(entity),
            "dead entity handle: {entity}"
        );
        self.mesh_renderers[entity.index() as usize].as_mut()
    }

    pub fn set_mesh_renderer(&mut self, entity: Entity, renderer: MeshRenderer) {
        if !self.allocator.is_alive(entity) {
            log::warn!("set_mesh_renderer on dead entity {entity}");
            return;
        }
        self.mesh_renderers[entity.index() as usize] = Some(renderer);
    }

    pub fn remove_mesh_renderer(&mut self, entity: Entity) -> Option<MeshRenderer> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        self.mesh_renderers[entity.index() as usize].take()
    }

    fn component<'a, T>(&self, entity: Entity, storage: &'a [Option<T>]) -> Option<&'a T> {
        assert!(
            self.allocator.is_alive(entity),
            "dead entity handle: {entity}"
        );
        storage[entity.index() as usize].as_ref()
    }
}
