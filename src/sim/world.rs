//! Live-entity registry
//!
//! Owns every entity for its whole lifetime. Iteration is in ascending id
//! order so a run is reproducible from its seed and inputs.

use std::collections::BTreeMap;

use super::entity::{Entity, EntityId, EntityKind};
use super::lifecycle::{RemovalReason, Teardown, on_removed};
use super::timer::TimerKind;
use crate::is_offscreen;

/// A timer that elapsed this tick, tagged with its (live) owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub entity: EntityId,
    pub kind: TimerKind,
}

#[derive(Debug, Default)]
pub struct World {
    entities: BTreeMap<EntityId, Entity>,
    next_id: u64,
}

impl World {
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Allocate a fresh id. Ids are never reused.
    pub(crate) fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Register a fully built entity
    pub(crate) fn insert(&mut self, entity: Entity) -> EntityId {
        let id = entity.id;
        debug_assert!(!self.entities.contains_key(&id), "entity id {id} reused");
        self.entities.insert(id, entity);
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Present and not flagged for teardown
    pub fn is_live(&self, id: EntityId) -> bool {
        self.entities.get(&id).is_some_and(|e| !e.is_destroyed())
    }

    /// Flag an entity for teardown. Returns true only on the first call.
    pub fn mark_destroyed(&mut self, id: EntityId) -> bool {
        self.entities
            .get_mut(&id)
            .is_some_and(|entity| entity.mark_destroyed())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Live entities matching `pred`
    pub fn count_live(&self, pred: impl Fn(EntityKind) -> bool) -> usize {
        self.entities
            .values()
            .filter(|e| !e.is_destroyed() && pred(e.kind))
            .count()
    }

    /// Remove an entity and run its teardown. `None` if it was already gone.
    pub fn remove(&mut self, id: EntityId, reason: RemovalReason) -> Option<Teardown> {
        let mut entity = self.entities.remove(&id)?;
        Some(on_removed(&mut entity, reason))
    }

    /// Move every entity by its velocity
    pub fn integrate(&mut self, dt: f32) {
        for entity in self.entities.values_mut() {
            entity.movement.integrate(dt);
        }
    }

    /// Advance the timers of every live entity.
    ///
    /// Entities flagged for teardown are skipped, so nothing fires against
    /// an entity that is on its way out.
    pub fn advance_timers(&mut self) -> Vec<TimerFired> {
        let mut fired = Vec::new();
        for entity in self.entities.values_mut() {
            if entity.is_destroyed() {
                continue;
            }
            let id = entity.id;
            fired.extend(
                entity
                    .advance_timers()
                    .into_iter()
                    .map(|kind| TimerFired { entity: id, kind }),
            );
        }
        fired
    }

    /// Tear down every entity flagged as destroyed
    pub fn reap_destroyed(&mut self) -> Vec<Teardown> {
        let doomed: Vec<EntityId> = self
            .entities
            .values()
            .filter(|e| e.is_destroyed())
            .map(|e| e.id)
            .collect();
        doomed
            .into_iter()
            .filter_map(|id| self.remove(id, RemovalReason::Destroyed))
            .collect()
    }

    /// Tear down every entity that left the arena
    pub fn despawn_offscreen(&mut self) -> Vec<Teardown> {
        let gone: Vec<EntityId> = self
            .entities
            .values()
            .filter(|e| e.kind != EntityKind::Player && is_offscreen(e.pos()))
            .map(|e| e.id)
            .collect();
        gone.into_iter()
            .filter_map(|id| self.remove(id, RemovalReason::OffScreen))
            .collect()
    }

    /// Tear down everything (session end)
    pub fn clear(&mut self) -> Vec<Teardown> {
        let ids: Vec<EntityId> = self.entities.keys().copied().collect();
        ids.into_iter()
            .filter_map(|id| self.remove(id, RemovalReason::SessionEnd))
            .collect()
    }
}
