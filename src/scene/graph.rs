//! Hierarchical scene transform graph.
//!
//! [`SceneGraph`] owns every node and hands out generational [`NodeId`]
//! handles; parent/child links are ids, never owning references. Each node
//! stores its local [`Transform`] and a cached world matrix. Every mutation
//! recomputes the world matrices of the node and all of its descendants
//! synchronously, so a read immediately after a write never observes a stale
//! matrix.
//!
//! Change notification is delivered through listeners registered on the graph
//! itself: a transform-changed event for the mutated node and each descendant
//! (pre-order, parents before children, siblings in child-list order), and a
//! parent-changed event fired once per reparent.

use glam::{Mat4, Quat, Vec3};

use crate::math::{look_rotation, quat_from_euler_yxz, quat_to_euler_yxz};

use super::Transform;

/// Coordinate space qualifier for [`SceneGraph::translate`] and the rotate
/// operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Space {
    /// Relative to the node's own current axes.
    #[default]
    Local,
    /// Relative to the global axes.
    World,
}

/// Stable handle to a node in a [`SceneGraph`].
///
/// Ids are slot indices paired with a generation counter. When a node is
/// despawned its slot is recycled with a bumped generation, so handles to
/// the old node go stale instead of silently aliasing the new one.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Slot index of this node.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was created.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl std::fmt::Debug for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node({}@{})", self.index, self.generation)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node({}@{})", self.index, self.generation)
    }
}

/// Event fired after a node's world matrix has been recomputed.
///
/// Fired for the directly mutated node first, then for every descendant in
/// pre-order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformChanged {
    /// The node whose world matrix changed.
    pub node: NodeId,
}

/// Event fired once after a node has been attached to a different parent
/// (or detached to become a root).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentChanged {
    /// The reparented node.
    pub node: NodeId,
    /// Previous parent, if any.
    pub old_parent: Option<NodeId>,
    /// New parent, if any.
    pub new_parent: Option<NodeId>,
}

/// Handle to a listener registered with [`SceneGraph::on_transform_changed`]
/// or [`SceneGraph::on_parent_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type TransformChangedHandler = Box<dyn FnMut(&TransformChanged)>;
type ParentChangedHandler = Box<dyn FnMut(&ParentChanged)>;

struct Node {
    local: Transform,
    /// Cached local-to-world matrix, kept consistent with `local` and the
    /// parent chain by every mutating entry point.
    world: Mat4,
    parent: Option<NodeId>,
    /// Insertion-ordered, duplicate-free.
    children: Vec<NodeId>,
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena of transform nodes forming a forest of parent/child trees.
///
/// All mutation goes through the graph: setters for local and world
/// position/rotation/scale, space-relative operations, and [`set_parent`]
/// (the single writer of both sides of the parent/child relationship).
///
/// Mutating through a stale handle is a logged no-op; reading through one
/// panics, since it is a programmer error in the owning container.
///
/// [`set_parent`]: SceneGraph::set_parent
pub struct SceneGraph {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    count: u32,
    next_listener: u64,
    transform_listeners: Vec<(ListenerId, TransformChangedHandler)>,
    parent_listeners: Vec<(ListenerId, ParentChangedHandler)>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SceneGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneGraph")
            .field("nodes", &self.count)
            .field("transform_listeners", &self.transform_listeners.len())
            .field("parent_listeners", &self.parent_listeners.len())
            .finish()
    }
}

impl SceneGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            count: 0,
            next_listener: 0,
            transform_listeners: Vec::new(),
            parent_listeners: Vec::new(),
        }
    }

    // ---- lifecycle ----

    /// Spawn a root node with the identity transform.
    pub fn spawn(&mut self) -> NodeId {
        self.spawn_with(Transform::IDENTITY)
    }

    /// Spawn a root node with the given local transform.
    ///
    /// The rotation is normalized on the way in, like every rotation write.
    pub fn spawn_with(&mut self, mut local: Transform) -> NodeId {
        local.rotation = local.rotation.normalize();
        let world = local.matrix();
        let node = Node {
            local,
            world,
            parent: None,
            children: Vec::new(),
        };

        self.count += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    /// Remove a node from the graph.
    ///
    /// The node is detached from its parent and its children are released to
    /// become root nodes: their local transforms are left untouched, their
    /// world matrices are recomputed, and transform-changed plus
    /// parent-changed events fire for each released subtree.
    ///
    /// Returns `false` if the handle was already stale.
    pub fn despawn(&mut self, node: NodeId) -> bool {
        if !self.contains(node) {
            return false;
        }

        let data = self.slots[node.index as usize]
            .node
            .take()
            .expect("alive node slot must hold data");
        let slot = &mut self.slots[node.index as usize];
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(node.index);
        self.count -= 1;

        if let Some(parent) = data.parent {
            if self.contains(parent) {
                self.node_mut(parent).children.retain(|&c| c != node);
            }
        }

        for child in data.children {
            self.node_mut(child).parent = None;
            self.propagate(child);
            self.emit_parent_changed(ParentChanged {
                node: child,
                old_parent: Some(node),
                new_parent: None,
            });
        }

        true
    }

    /// Whether the handle refers to a live node.
    pub fn contains(&self, node: NodeId) -> bool {
        self.slots
            .get(node.index as usize)
            .is_some_and(|slot| slot.generation == node.generation && slot.node.is_some())
    }

    /// Number of live nodes.
    pub fn len(&self) -> u32 {
        self.count
    }

    /// Whether the graph holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterate over all live node handles.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.node.is_some())
            .map(|(index, slot)| NodeId {
                index: index as u32,
                generation: slot.generation,
            })
    }

    // ---- hierarchy ----

    /// The node's parent, or `None` for roots.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    /// The node's children, in insertion order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.node(node).children
    }

    /// Walk the parent chain and return the topmost ancestor (the node
    /// itself if it is a root).
    pub fn root(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(parent) = self.node(current).parent {
            current = parent;
        }
        current
    }

    /// Attach `node` to `new_parent` (or detach it with `None`).
    ///
    /// A no-op when `new_parent` is already the current parent, when either
    /// handle is stale, or when the reparent would make a node its own
    /// ancestor (cycles are rejected and logged).
    ///
    /// With `keep_world` the node's world position/rotation/scale are
    /// captured first and re-applied through the world-space setters
    /// afterwards, so its visual pose is unchanged. Without it the local
    /// values are kept and the node snaps into the new parent's space; the
    /// world matrix is still recomputed and transform-changed events still
    /// fire for the subtree.
    ///
    /// Fires a parent-changed event carrying the old and new parent.
    pub fn set_parent(&mut self, node: NodeId, new_parent: Option<NodeId>, keep_world: bool) {
        if !self.contains(node) {
            log::warn!("set_parent on stale handle {node}");
            return;
        }
        if let Some(parent) = new_parent {
            if !self.contains(parent) {
                log::warn!("set_parent of {node} to stale handle {parent}");
                return;
            }
        }

        let old_parent = self.node(node).parent;
        if old_parent == new_parent {
            return;
        }

        if let Some(parent) = new_parent {
            if parent == node || self.has_ancestor(parent, node) {
                log::warn!("rejecting reparent of {node} under {parent}: would create a cycle");
                return;
            }
        }

        let world_position = self.position(node);
        let world_rotation = self.rotation(node);
        let world_scale = self.scale(node);

        if let Some(parent) = old_parent {
            self.node_mut(parent).children.retain(|&c| c != node);
        }
        self.node_mut(node).parent = new_parent;
        if let Some(parent) = new_parent {
            let children = &mut self.node_mut(parent).children;
            if !children.contains(&node) {
                children.push(node);
            }
        }

        if keep_world {
            self.set_position(node, world_position);
            self.set_rotation(node, world_rotation);
            self.set_scale(node, world_scale);
        } else {
            self.propagate(node);
        }

        self.emit_parent_changed(ParentChanged {
            node,
            old_parent,
            new_parent,
        });
    }

    /// Attach `child` under `parent`, preserving the child's world pose.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.set_parent(child, Some(parent), true);
    }

    /// Detach `child` from `parent`.
    ///
    /// A no-op if `child` is not currently parented to `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.contains(child) && self.node(child).parent == Some(parent) {
            self.set_parent(child, None, true);
        }
    }

    /// Whether `ancestor` appears on `node`'s parent chain.
    fn has_ancestor(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.node(node).parent;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.node(parent).parent;
        }
        false
    }

    // ---- local accessors ----

    /// The node's local transform.
    pub fn local_transform(&self, node: NodeId) -> Transform {
        self.node(node).local
    }

    /// Replace the whole local transform at once.
    pub fn set_local_transform(&mut self, node: NodeId, transform: Transform) {
        if !self.contains(node) {
            log::warn!("set_local_transform on stale handle {node}");
            return;
        }
        let current = &mut self.node_mut(node).local;
        if *current == transform {
            return;
        }
        *current = transform;
        current.rotation = current.rotation.normalize();
        self.propagate(node);
    }

    /// Local position relative to the parent (world position for roots).
    pub fn local_position(&self, node: NodeId) -> Vec3 {
        self.node(node).local.position
    }

    /// Set the local position. No-op when the value is unchanged; otherwise
    /// recomputes the subtree's world matrices and fires transform-changed.
    pub fn set_local_position(&mut self, node: NodeId, position: Vec3) {
        if !self.contains(node) {
            log::warn!("set_local_position on stale handle {node}");
            return;
        }
        let n = self.node_mut(node);
        if n.local.position == position {
            return;
        }
        n.local.position = position;
        self.propagate(node);
    }

    /// Local rotation relative to the parent.
    pub fn local_rotation(&self, node: NodeId) -> Quat {
        self.node(node).local.rotation
    }

    /// Set the local rotation. The value is normalized before being stored.
    pub fn set_local_rotation(&mut self, node: NodeId, rotation: Quat) {
        if !self.contains(node) {
            log::warn!("set_local_rotation on stale handle {node}");
            return;
        }
        let n = self.node_mut(node);
        if n.local.rotation == rotation {
            return;
        }
        n.local.rotation = rotation.normalize();
        self.propagate(node);
    }

    /// Local rotation as Y-X-Z Euler angles (radians; `x` = pitch, `y` = yaw,
    /// `z` = roll, pitch clamped to ±90° at the gimbal-lock boundary).
    pub fn local_euler_angles(&self, node: NodeId) -> Vec3 {
        quat_to_euler_yxz(self.node(node).local.rotation)
    }

    /// Set the local rotation from Y-X-Z Euler angles (radians).
    pub fn set_local_euler_angles(&mut self, node: NodeId, euler: Vec3) {
        self.set_local_rotation(node, quat_from_euler_yxz(euler));
    }

    /// Local per-axis scale.
    pub fn local_scale(&self, node: NodeId) -> Vec3 {
        self.node(node).local.scale
    }

    /// Set the local scale.
    pub fn set_local_scale(&mut self, node: NodeId, scale: Vec3) {
        if !self.contains(node) {
            log::warn!("set_local_scale on stale handle {node}");
            return;
        }
        let n = self.node_mut(node);
        if n.local.scale == scale {
            return;
        }
        n.local.scale = scale;
        self.propagate(node);
    }

    // ---- world accessors ----

    /// World position, read from the cached world matrix.
    pub fn position(&self, node: NodeId) -> Vec3 {
        self.node(node).world.w_axis.truncate()
    }

    /// Set the world position by converting into the parent's space.
    pub fn set_position(&mut self, node: NodeId, position: Vec3) {
        if !self.contains(node) {
            log::warn!("set_position on stale handle {node}");
            return;
        }
        let local = match self.node(node).parent {
            Some(parent) => self.world_to_local_point(parent, position),
            None => position,
        };
        self.set_local_position(node, local);
    }

    /// World rotation, extracted from the cached world matrix.
    ///
    /// The extraction decomposes the matrix and cannot recover shear
    /// introduced by non-uniform scale in rotated ancestors.
    pub fn rotation(&self, node: NodeId) -> Quat {
        let (_, rotation, _) = self.node(node).world.to_scale_rotation_translation();
        rotation
    }

    /// Set the world rotation by composing with the inverse of the parent's
    /// world rotation.
    pub fn set_rotation(&mut self, node: NodeId, rotation: Quat) {
        if !self.contains(node) {
            log::warn!("set_rotation on stale handle {node}");
            return;
        }
        let local = match self.node(node).parent {
            Some(parent) => self.rotation(parent).inverse() * rotation,
            None => rotation,
        };
        self.set_local_rotation(node, local);
    }

    /// World rotation as Y-X-Z Euler angles (radians).
    pub fn euler_angles(&self, node: NodeId) -> Vec3 {
        quat_to_euler_yxz(self.rotation(node))
    }

    /// Set the world rotation from Y-X-Z Euler angles (radians).
    pub fn set_euler_angles(&mut self, node: NodeId, euler: Vec3) {
        self.set_rotation(node, quat_from_euler_yxz(euler));
    }

    /// World scale, extracted from the cached world matrix.
    ///
    /// Scale is recovered as the lengths of the matrix basis columns, so the
    /// sign of negative scale is lost and shear (rotation combined with
    /// non-uniform ancestor scale) is only approximated.
    pub fn scale(&self, node: NodeId) -> Vec3 {
        let (scale, _, _) = self.node(node).world.to_scale_rotation_translation();
        scale
    }

    /// Set the world scale by dividing out the parent's world scale
    /// componentwise. If any parent scale component is zero the value is
    /// applied as the local scale unchanged.
    pub fn set_scale(&mut self, node: NodeId, scale: Vec3) {
        if !self.contains(node) {
            log::warn!("set_scale on stale handle {node}");
            return;
        }
        let local = match self.node(node).parent {
            Some(parent) => {
                let parent_scale = self.scale(parent);
                if parent_scale.x != 0.0 && parent_scale.y != 0.0 && parent_scale.z != 0.0 {
                    scale / parent_scale
                } else {
                    scale
                }
            }
            None => scale,
        };
        self.set_local_scale(node, local);
    }

    // ---- matrices ----

    /// The cached local-to-world matrix.
    pub fn local_to_world_matrix(&self, node: NodeId) -> Mat4 {
        self.node(node).world
    }

    /// The world-to-local matrix, computed by inverting the cached world
    /// matrix on demand.
    ///
    /// A degenerate world matrix (zero scale on some axis) has no inverse;
    /// the returned values are then unusable. Callers must avoid zero scale
    /// when converting between spaces.
    pub fn world_to_local_matrix(&self, node: NodeId) -> Mat4 {
        let world = self.node(node).world;
        if world.determinant() == 0.0 {
            log::warn!("inverting degenerate world matrix of {node}");
        }
        world.inverse()
    }

    // ---- directions ----

    /// World-space forward direction: +Z rotated by the node's local rotation.
    ///
    /// Directions use the local rotation only, so rotated ancestors do not
    /// affect them.
    pub fn forward(&self, node: NodeId) -> Vec3 {
        self.node(node).local.forward()
    }

    /// World-space backward direction (-Z, local rotation only).
    pub fn backward(&self, node: NodeId) -> Vec3 {
        self.node(node).local.backward()
    }

    /// World-space right direction (+X, local rotation only).
    pub fn right(&self, node: NodeId) -> Vec3 {
        self.node(node).local.right()
    }

    /// World-space left direction (-X, local rotation only).
    pub fn left(&self, node: NodeId) -> Vec3 {
        self.node(node).local.left()
    }

    /// World-space up direction (+Y, local rotation only).
    pub fn up(&self, node: NodeId) -> Vec3 {
        self.node(node).local.up()
    }

    /// World-space down direction (-Y, local rotation only).
    pub fn down(&self, node: NodeId) -> Vec3 {
        self.node(node).local.down()
    }

    // ---- point / vector / direction conversions ----

    /// Transform a point from the node's local space to world space
    /// (full affine transform including translation).
    pub fn local_to_world_point(&self, node: NodeId, point: Vec3) -> Vec3 {
        self.node(node).world.transform_point3(point)
    }

    /// Transform a point from world space to the node's local space.
    pub fn world_to_local_point(&self, node: NodeId, point: Vec3) -> Vec3 {
        self.world_to_local_matrix(node).transform_point3(point)
    }

    /// Transform a displacement vector from local to world space (linear
    /// part only: rotated and scaled, not translated).
    pub fn local_to_world_vector(&self, node: NodeId, vector: Vec3) -> Vec3 {
        self.node(node).world.transform_vector3(vector)
    }

    /// Transform a displacement vector from world to local space.
    pub fn world_to_local_vector(&self, node: NodeId, vector: Vec3) -> Vec3 {
        self.world_to_local_matrix(node).transform_vector3(vector)
    }

    /// Rotate a unit direction from local to world space (local rotation
    /// only; translation and scale are ignored).
    pub fn local_to_world_direction(&self, node: NodeId, direction: Vec3) -> Vec3 {
        self.node(node).local.rotation * direction
    }

    /// Rotate a unit direction from world to local space.
    pub fn world_to_local_direction(&self, node: NodeId, direction: Vec3) -> Vec3 {
        self.node(node).local.rotation.inverse() * direction
    }

    // ---- space-relative operations ----

    /// Move the node by `offset`.
    ///
    /// In [`Space::Local`] the offset is rotated by the node's own rotation
    /// first, so it moves along the node's current axes. In [`Space::World`]
    /// the offset is added to the world position directly.
    pub fn translate(&mut self, node: NodeId, offset: Vec3, space: Space) {
        if !self.contains(node) {
            log::warn!("translate on stale handle {node}");
            return;
        }
        match space {
            Space::Local => {
                let rotated = self.local_to_world_direction(node, offset);
                let position = self.local_position(node) + rotated;
                self.set_local_position(node, position);
            }
            Space::World => {
                let position = self.position(node) + offset;
                self.set_position(node, position);
            }
        }
    }

    /// Rotate the node by Euler angles (radians, Y-X-Z order).
    ///
    /// [`Space::Local`] post-multiplies onto the local rotation;
    /// [`Space::World`] pre-multiplies onto the world rotation.
    pub fn rotate_euler(&mut self, node: NodeId, euler: Vec3, space: Space) {
        self.rotate_by(node, quat_from_euler_yxz(euler), space);
    }

    /// Rotate the node by `angle` radians around `axis` (a unit vector).
    pub fn rotate_axis(&mut self, node: NodeId, axis: Vec3, angle: f32, space: Space) {
        self.rotate_by(node, Quat::from_axis_angle(axis, angle), space);
    }

    fn rotate_by(&mut self, node: NodeId, delta: Quat, space: Space) {
        if !self.contains(node) {
            log::warn!("rotate on stale handle {node}");
            return;
        }
        match space {
            Space::Local => {
                let rotation = self.local_rotation(node) * delta;
                self.set_local_rotation(node, rotation);
            }
            Space::World => {
                let rotation = delta * self.rotation(node);
                self.set_rotation(node, rotation);
            }
        }
    }

    /// Multiply the local scale componentwise by `factor`.
    ///
    /// Scale is never rotated or converted between spaces.
    pub fn apply_scale(&mut self, node: NodeId, factor: Vec3) {
        if !self.contains(node) {
            log::warn!("apply_scale on stale handle {node}");
            return;
        }
        let scale = self.local_scale(node) * factor;
        self.set_local_scale(node, scale);
    }

    /// Multiply the local scale uniformly by `factor`.
    pub fn apply_uniform_scale(&mut self, node: NodeId, factor: f32) {
        self.apply_scale(node, Vec3::splat(factor));
    }

    /// Orient the node so its forward axis points from its world position
    /// toward `target`.
    ///
    /// When the requested forward direction is parallel to `world_up`
    /// (|dot| > 0.9999), the up reference falls back to +X to avoid a
    /// degenerate basis. A target coinciding with the node's position is a
    /// no-op.
    pub fn look_at(&mut self, node: NodeId, target: Vec3, world_up: Vec3) {
        if !self.contains(node) {
            log::warn!("look_at on stale handle {node}");
            return;
        }
        let forward = target - self.position(node);
        if forward.length_squared() < 1e-12 {
            return;
        }
        let rotation = look_rotation(forward, world_up);
        self.set_rotation(node, rotation);
    }

    // ---- change notification ----

    /// Register a listener for transform-changed events.
    ///
    /// Listeners run synchronously inside the mutating call, after the world
    /// matrices have been updated, once per affected node in cascade order.
    pub fn on_transform_changed(
        &mut self,
        handler: impl FnMut(&TransformChanged) + 'static,
    ) -> ListenerId {
        let id = self.next_listener_id();
        self.transform_listeners.push((id, Box::new(handler)));
        id
    }

    /// Register a listener for parent-changed events.
    pub fn on_parent_changed(
        &mut self,
        handler: impl FnMut(&ParentChanged) + 'static,
    ) -> ListenerId {
        let id = self.next_listener_id();
        self.parent_listeners.push((id, Box::new(handler)));
        id
    }

    /// Remove a previously registered listener. Returns `false` if the id
    /// was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.transform_listeners.len() + self.parent_listeners.len();
        self.transform_listeners.retain(|(lid, _)| *lid != id);
        self.parent_listeners.retain(|(lid, _)| *lid != id);
        before != self.transform_listeners.len() + self.parent_listeners.len()
    }

    fn next_listener_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        id
    }

    // ---- internals ----

    fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node(&self, id: NodeId) -> &Node {
        self.get(id)
            .unwrap_or_else(|| panic!("stale node handle: {id}"))
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .unwrap_or_else(|| panic!("stale node handle: {id}"))
    }

    /// Recompute world matrices for `node` and all descendants, then fire
    /// transform-changed for each in the same pre-order.
    fn propagate(&mut self, node: NodeId) {
        let order = self.refresh_world_matrices(node);
        self.emit_transform_changed(&order);
    }

    /// Recompute the cached world matrix of `node` and every descendant.
    ///
    /// Returns the visit order: the node first, then descendants pre-order
    /// with siblings in child-list order. Parents are always refreshed
    /// before their children, so each recomputation reads a current parent
    /// matrix.
    fn refresh_world_matrices(&mut self, node: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            order.push(id);
            let parent_world = match self.node(id).parent {
                Some(parent) => self.node(parent).world,
                None => Mat4::IDENTITY,
            };
            let n = self.node_mut(id);
            n.world = parent_world * n.local.matrix();
            for &child in n.children.iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    fn emit_transform_changed(&mut self, order: &[NodeId]) {
        if self.transform_listeners.is_empty() {
            return;
        }
        // Listeners are taken out for the duration of the dispatch; they
        // receive event data only and cannot touch the graph.
        let mut listeners = std::mem::take(&mut self.transform_listeners);
        for &node in order {
            let event = TransformChanged { node };
            for (_, handler) in listeners.iter_mut() {
                handler(&event);
            }
        }
        self.transform_listeners = listeners;
    }

    fn emit_parent_changed(&mut self, event: ParentChanged) {
        if self.parent_listeners.is_empty() {
            return;
        }
        let mut listeners = std::mem::take(&mut self.parent_listeners);
        for (_, handler) in listeners.iter_mut() {
            handler(&event);
        }
        self.parent_listeners = listeners;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::f32::consts::{FRAC_PI_2, PI};
    use std::rc::Rc;

    fn assert_vec3_eq(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-4, "expected {b:?}, got {a:?}");
    }

    #[test]
    fn spawn_is_identity() {
        let mut graph = SceneGraph::new();
        let node = graph.spawn();
        assert_eq!(graph.local_transform(node), Transform::IDENTITY);
        assert_eq!(graph.local_to_world_matrix(node), Mat4::IDENTITY);
        assert_eq!(graph.parent(node), None);
        assert!(graph.children(node).is_empty());
    }

    #[test]
    fn spawn_with_normalizes_rotation() {
        let mut graph = SceneGraph::new();
        let node = graph.spawn_with(Transform::from_rotation(Quat::from_xyzw(0.0, 2.0, 0.0, 0.0)));
        assert!((graph.local_rotation(node).length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn rotation_normalized_after_set() {
        let mut graph = SceneGraph::new();
        let node = graph.spawn();
        graph.set_local_rotation(node, Quat::from_xyzw(0.5, 0.5, 0.5, 2.0));
        assert!((graph.local_rotation(node).length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn world_matrix_updates_synchronously() {
        let mut graph = SceneGraph::new();
        let node = graph.spawn();
        graph.set_local_position(node, Vec3::new(1.0, 2.0, 3.0));
        assert_vec3_eq(graph.position(node), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn parent_change_cascades_to_grandchild() {
        let mut graph = SceneGraph::new();
        let root = graph.spawn();
        let a = graph.spawn_with(Transform::from_xyz(1.0, 0.0, 0.0));
        let b = graph.spawn_with(Transform::from_xyz(0.0, 1.0, 0.0));
        graph.set_parent(a, Some(root), false);
        graph.set_parent(b, Some(a), false);

        graph.set_local_position(root, Vec3::new(10.0, 0.0, 0.0));

        assert_vec3_eq(graph.position(a), Vec3::new(11.0, 0.0, 0.0));
        assert_vec3_eq(graph.position(b), Vec3::new(11.0, 1.0, 0.0));
    }

    #[test]
    fn world_position_setter_converts_to_parent_space() {
        let mut graph = SceneGraph::new();
        let parent = graph.spawn_with(Transform::from_xyz(5.0, 0.0, 0.0));
        let child = graph.spawn();
        graph.set_parent(child, Some(parent), false);

        graph.set_position(child, Vec3::new(7.0, 0.0, 0.0));

        assert_vec3_eq(graph.local_position(child), Vec3::new(2.0, 0.0, 0.0));
        assert_vec3_eq(graph.position(child), Vec3::new(7.0, 0.0, 0.0));
    }

    #[test]
    fn world_rotation_setter_composes_with_parent_inverse() {
        let mut graph = SceneGraph::new();
        let parent =
            graph.spawn_with(Transform::from_rotation(Quat::from_rotation_y(FRAC_PI_2)));
        let child = graph.spawn();
        graph.set_parent(child, Some(parent), false);

        let target = Quat::from_rotation_y(PI);
        graph.set_rotation(child, target);

        let expected_local = Quat::from_rotation_y(FRAC_PI_2);
        assert!(graph.local_rotation(child).dot(expected_local).abs() > 1.0 - 1e-5);
        assert!(graph.rotation(child).dot(target).abs() > 1.0 - 1e-5);
    }

    #[test]
    fn reparent_keeps_world_pose() {
        let mut graph = SceneGraph::new();
        let parent = graph.spawn_with(
            Transform::from_position_euler(Vec3::new(3.0, 1.0, -2.0), Vec3::new(0.2, 0.8, 0.0))
                .with_scale(Vec3::splat(2.0)),
        );
        let node = graph.spawn_with(Transform::from_xyz(1.0, 2.0, 3.0));

        let position = graph.position(node);
        let rotation = graph.rotation(node);
        let scale = graph.scale(node);

        graph.set_parent(node, Some(parent), true);

        assert_vec3_eq(graph.position(node), position);
        assert!(graph.rotation(node).dot(rotation).abs() > 1.0 - 1e-4);
        assert_vec3_eq(graph.scale(node), scale);
    }

    #[test]
    fn reparent_without_keep_world_snaps() {
        let mut graph = SceneGraph::new();
        let parent = graph.spawn_with(Transform::from_xyz(10.0, 0.0, 0.0));
        let node = graph.spawn_with(Transform::from_xyz(1.0, 0.0, 0.0));

        graph.set_parent(node, Some(parent), false);

        // Local pose unchanged, world pose shifted into the parent's space
        assert_vec3_eq(graph.local_position(node), Vec3::new(1.0, 0.0, 0.0));
        assert_vec3_eq(graph.position(node), Vec3::new(11.0, 0.0, 0.0));
    }

    #[test]
    fn add_then_remove_child_restores_root_state() {
        let mut graph = SceneGraph::new();
        let parent = graph.spawn_with(Transform::from_xyz(4.0, 0.0, 0.0));
        let child = graph.spawn_with(Transform::from_xyz(1.0, 1.0, 1.0));

        graph.add_child(parent, child);
        assert_eq!(graph.parent(child), Some(parent));
        assert_eq!(graph.children(parent), &[child]);

        graph.remove_child(parent, child);
        assert_eq!(graph.parent(child), None);
        assert!(graph.children(parent).is_empty());
        assert_vec3_eq(graph.local_position(child), Vec3::new(1.0, 1.0, 1.0));
        assert_vec3_eq(graph.position(child), Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn remove_child_of_other_parent_is_noop() {
        let mut graph = SceneGraph::new();
        let a = graph.spawn();
        let b = graph.spawn();
        let child = graph.spawn();
        graph.set_parent(child, Some(a), true);

        graph.remove_child(b, child);

        assert_eq!(graph.parent(child), Some(a));
    }

    #[test]
    fn set_same_parent_is_noop() {
        let mut graph = SceneGraph::new();
        let parent = graph.spawn();
        let child = graph.spawn();
        graph.set_parent(child, Some(parent), true);

        let events = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&events);
        graph.on_parent_changed(move |_| *counter.borrow_mut() += 1);

        graph.set_parent(child, Some(parent), true);
        assert_eq!(*events.borrow(), 0);
        assert_eq!(graph.children(parent), &[child]);
    }

    #[test]
    fn cycle_is_rejected() {
        let mut graph = SceneGraph::new();
        let a = graph.spawn();
        let b = graph.spawn();
        let c = graph.spawn();
        graph.set_parent(b, Some(a), true);
        graph.set_parent(c, Some(b), true);

        // Parenting an ancestor under its descendant must be refused
        graph.set_parent(a, Some(c), true);
        assert_eq!(graph.parent(a), None);

        // Self-parenting likewise
        graph.set_parent(a, Some(a), true);
        assert_eq!(graph.parent(a), None);
    }

    #[test]
    fn root_walks_parent_chain() {
        let mut graph = SceneGraph::new();
        let a = graph.spawn();
        let b = graph.spawn();
        let c = graph.spawn();
        graph.set_parent(b, Some(a), true);
        graph.set_parent(c, Some(b), true);

        assert_eq!(graph.root(c), a);
        assert_eq!(graph.root(a), a);
    }

    #[test]
    fn despawn_releases_children_as_roots() {
        let mut graph = SceneGraph::new();
        let parent = graph.spawn_with(Transform::from_xyz(10.0, 0.0, 0.0));
        let child = graph.spawn_with(Transform::from_xyz(1.0, 0.0, 0.0));
        graph.set_parent(child, Some(parent), false);
        assert_vec3_eq(graph.position(child), Vec3::new(11.0, 0.0, 0.0));

        assert!(graph.despawn(parent));
        assert!(!graph.contains(parent));
        assert_eq!(graph.parent(child), None);
        // Local transform kept; world matrix now equals the local matrix
        assert_vec3_eq(graph.position(child), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn despawn_detaches_from_parent() {
        let mut graph = SceneGraph::new();
        let parent = graph.spawn();
        let child = graph.spawn();
        graph.set_parent(child, Some(parent), true);

        assert!(graph.despawn(child));
        assert!(graph.children(parent).is_empty());
        assert!(!graph.despawn(child));
    }

    #[test]
    fn recycled_slot_invalidates_old_handle() {
        let mut graph = SceneGraph::new();
        let old = graph.spawn();
        graph.despawn(old);
        let new = graph.spawn();

        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);
        assert!(!graph.contains(old));
        assert!(graph.contains(new));
    }

    #[test]
    fn translate_local_moves_along_own_axes() {
        let mut graph = SceneGraph::new();
        let node =
            graph.spawn_with(Transform::from_rotation(Quat::from_rotation_y(FRAC_PI_2)));
        graph.translate(node, Vec3::Z, Space::Local);
        // Node's +Z points along world +X after the yaw
        assert_vec3_eq(graph.position(node), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn translate_world_ignores_rotation() {
        let mut graph = SceneGraph::new();
        let node =
            graph.spawn_with(Transform::from_rotation(Quat::from_rotation_y(FRAC_PI_2)));
        graph.translate(node, Vec3::Z, Space::World);
        assert_vec3_eq(graph.position(node), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn local_rotate_composes_by_post_multiply() {
        let mut graph = SceneGraph::new();
        let node = graph.spawn();
        graph.rotate_axis(node, Vec3::Y, FRAC_PI_2, Space::Local);
        graph.rotate_axis(node, Vec3::Y, FRAC_PI_2, Space::Local);

        let expected = Quat::from_rotation_y(PI);
        assert!(graph.local_rotation(node).dot(expected).abs() > 1.0 - 1e-5);
    }

    #[test]
    fn look_at_points_forward_at_target() {
        let mut graph = SceneGraph::new();
        let node = graph.spawn();
        graph.look_at(node, Vec3::new(0.0, 0.0, -1.0), Vec3::Y);
        assert_vec3_eq(graph.forward(node), Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn look_at_own_position_is_noop() {
        let mut graph = SceneGraph::new();
        let node = graph.spawn();
        graph.look_at(node, Vec3::ZERO, Vec3::Y);
        assert_eq!(graph.local_rotation(node), Quat::IDENTITY);
    }

    #[test]
    fn point_roundtrip_through_parent_chain() {
        let mut graph = SceneGraph::new();
        let parent = graph.spawn_with(
            Transform::from_position_euler(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.4, 1.1, -0.2))
                .with_scale(Vec3::new(2.0, 3.0, 0.5)),
        );
        let node = graph.spawn_with(Transform::from_xyz(0.5, -1.0, 2.0));
        graph.set_parent(node, Some(parent), false);

        let p = Vec3::new(0.3, -0.7, 1.9);
        let roundtrip = graph.world_to_local_point(node, graph.local_to_world_point(node, p));
        assert_vec3_eq(roundtrip, p);
    }

    #[test]
    fn vector_transform_scales_but_does_not_translate() {
        let mut graph = SceneGraph::new();
        let node = graph
            .spawn_with(Transform::from_xyz(100.0, 0.0, 0.0).with_scale(Vec3::splat(2.0)));
        let v = graph.local_to_world_vector(node, Vec3::X);
        assert_vec3_eq(v, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn direction_transform_ignores_scale() {
        let mut graph = SceneGraph::new();
        let node = graph.spawn_with(
            Transform::from_rotation(Quat::from_rotation_y(FRAC_PI_2))
                .with_scale(Vec3::splat(5.0)),
        );
        let d = graph.local_to_world_direction(node, Vec3::Z);
        assert_vec3_eq(d, Vec3::X);
    }

    #[test]
    fn directions_use_local_rotation_only() {
        let mut graph = SceneGraph::new();
        let parent =
            graph.spawn_with(Transform::from_rotation(Quat::from_rotation_y(FRAC_PI_2)));
        let child = graph.spawn();
        graph.set_parent(child, Some(parent), false);

        // The parent's rotation does not leak into the child's directions
        assert_vec3_eq(graph.forward(child), Vec3::Z);
    }

    #[test]
    fn transform_events_fire_in_preorder() {
        let mut graph = SceneGraph::new();
        let root = graph.spawn();
        let first = graph.spawn();
        let second = graph.spawn();
        let grandchild = graph.spawn();
        graph.set_parent(first, Some(root), true);
        graph.set_parent(second, Some(root), true);
        graph.set_parent(grandchild, Some(first), true);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        graph.on_transform_changed(move |event| sink.borrow_mut().push(event.node));

        graph.set_local_position(root, Vec3::X);

        assert_eq!(*seen.borrow(), vec![root, first, grandchild, second]);
    }

    #[test]
    fn parent_changed_carries_old_parent() {
        let mut graph = SceneGraph::new();
        let a = graph.spawn();
        let b = graph.spawn();
        let child = graph.spawn();
        graph.set_parent(child, Some(a), true);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        graph.on_parent_changed(move |event| {
            sink.borrow_mut()
                .push((event.node, event.old_parent, event.new_parent));
        });

        graph.set_parent(child, Some(b), true);
        assert_eq!(*seen.borrow(), vec![(child, Some(a), Some(b))]);
    }

    #[test]
    fn detached_node_receives_no_more_events() {
        let mut graph = SceneGraph::new();
        let parent = graph.spawn();
        let child = graph.spawn();
        graph.set_parent(child, Some(parent), true);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        graph.on_transform_changed(move |event| sink.borrow_mut().push(event.node));

        graph.set_local_position(parent, Vec3::X);
        assert!(seen.borrow().contains(&child));

        seen.borrow_mut().clear();
        graph.set_parent(child, None, true);
        seen.borrow_mut().clear();

        graph.set_local_position(parent, Vec3::new(2.0, 0.0, 0.0));
        assert!(!seen.borrow().contains(&child));
    }

    #[test]
    fn removed_listener_stops_firing() {
        let mut graph = SceneGraph::new();
        let node = graph.spawn();

        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        let listener = graph.on_transform_changed(move |_| *sink.borrow_mut() += 1);

        graph.set_local_position(node, Vec3::X);
        assert_eq!(*seen.borrow(), 1);

        assert!(graph.remove_listener(listener));
        graph.set_local_position(node, Vec3::Y);
        assert_eq!(*seen.borrow(), 1);
        assert!(!graph.remove_listener(listener));
    }

    #[test]
    fn unchanged_value_fires_no_event() {
        let mut graph = SceneGraph::new();
        let node = graph.spawn_with(Transform::from_xyz(1.0, 0.0, 0.0));

        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        graph.on_transform_changed(move |_| *sink.borrow_mut() += 1);

        graph.set_local_position(node, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(*seen.borrow(), 0);
    }

    #[test]
    fn mutating_stale_handle_is_noop() {
        let mut graph = SceneGraph::new();
        let node = graph.spawn();
        graph.despawn(node);
        // Must not panic
        graph.set_local_position(node, Vec3::X);
        graph.translate(node, Vec3::X, Space::World);
        graph.set_parent(node, None, true);
    }
}
