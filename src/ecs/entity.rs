use std::hash::{Hash, Hasher};

/// Identifier of an entity in a [`World`](super::World).
///
/// An entity is a slot index paired with the generation of the slot at spawn
/// time. Despawning bumps the slot's generation, so handles to the old
/// entity stop resolving instead of aliasing whatever reuses the slot.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index of this entity.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when this entity was spawned.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({}@{})", self.index, self.generation)
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({}@{})", self.index, self.generation)
    }
}

/// Allocates and recycles entity slots.
///
/// Despawned slots go onto a LIFO free list and are reused with a bumped
/// generation.
#[derive(Debug, Default)]
pub(crate) struct EntityAllocator {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free_list: Vec<u32>,
    count: u32,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an entity, reusing a recycled slot if one is available.
    /// Returns the entity and whether the slot is brand new (storage needs
    /// to grow).
    pub fn allocate(&mut self) -> (Entity, bool) {
        self.count += 1;

        if let Some(index) = self.free_list.pop() {
            let idx = index as usize;
            self.alive[idx] = true;
            (Entity::new(index, self.generations[idx]), false)
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.alive.push(true);
            (Entity::new(index, 0), true)
        }
    }

    /// Deallocate an entity. Returns `false` if it was already dead or the
    /// generation does not match.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        let idx = entity.index() as usize;
        if !self.is_alive(entity) {
            return false;
        }

        self.alive[idx] = false;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free_list.push(entity.index());
        self.count -= 1;
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        let idx = entity.index() as usize;
        idx < self.alive.len() && self.alive[idx] && self.generations[idx] == entity.generation()
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Iterate over all currently alive entities.
    pub fn iter_alive(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(idx, _)| Entity::new(idx as u32, self.generations[idx]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_sequential() {
        let mut alloc = EntityAllocator::new();
        let (e0, _) = alloc.allocate();
        let (e1, _) = alloc.allocate();
        assert_eq!(e0.index(), 0);
        assert_eq!(e1.index(), 1);
        assert!(alloc.is_alive(e0));
        assert!(alloc.is_alive(e1));
    }

    #[test]
    fn deallocate_kills_entity() {
        let mut alloc = EntityAllocator::new();
        let (entity, _) = alloc.allocate();
        assert!(alloc.deallocate(entity));
        assert!(!alloc.is_alive(entity));
        assert!(!alloc.deallocate(entity));
    }

    #[test]
    fn recycled_slot_gets_new_generation() {
        let mut alloc = EntityAllocator::new();
        let (old, _) = alloc.allocate();
        alloc.deallocate(old);
        let (new, fresh) = alloc.allocate();

        assert!(!fresh);
        assert_eq!(old.index(), new.index());
        assert_ne!(old.generation(), new.generation());
        assert!(!alloc.is_alive(old));
        assert!(alloc.is_alive(new));
    }

    #[test]
    fn count_tracks_alive() {
        let mut alloc = EntityAllocator::new();
        let (e0, _) = alloc.allocate();
        let _ = alloc.allocate();
        assert_eq!(alloc.count(), 2);
        alloc.deallocate(e0);
        assert_eq!(alloc.count(), 1);
    }

    #[test]
    fn iter_alive_skips_dead() {
        let mut alloc = EntityAllocator::new();
        let entities: Vec<_> = (0..4).map(|_| alloc.allocate().0).collect();
        alloc.deallocate(entities[1]);

        let alive: Vec<_> = alloc.iter_alive().collect();
        assert_eq!(alive.len(), 3);
        assert!(!alive.contains(&entities[1]));
    }

    #[test]
    fn debug_format() {
        let entity = Entity::new(7, 2);
        assert_eq!(format!("{entity:?}"), "Entity(7@2)");
    }
}
