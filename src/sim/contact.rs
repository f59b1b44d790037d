//! Contact event sources
//!
//! The resolver consumes `(a, b)` contact pairs and never computes geometry
//! itself. [`OverlapDetector`] is a simple circle-overlap backend that
//! reports each pair once per overlap onset; [`ScriptedContacts`] replays
//! fixed batches for tests and tools.

use std::collections::{BTreeSet, VecDeque};

use super::entity::EntityId;
use super::world::World;

/// One contact event between two entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Contact {
    pub a: EntityId,
    pub b: EntityId,
}

impl Contact {
    pub fn new(a: EntityId, b: EntityId) -> Self {
        Self { a, b }
    }
}

/// Anything that produces the contacts for the current tick
pub trait ContactSource {
    fn contacts(&mut self, world: &World) -> Vec<Contact>;
}

/// Circle-overlap contact backend.
///
/// A pair is reported on the first tick it overlaps and not again until it
/// has separated. Output is ordered by `(a, b)` id.
#[derive(Debug, Default)]
pub struct OverlapDetector {
    touching: BTreeSet<(EntityId, EntityId)>,
}

impl OverlapDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs currently known to overlap
    pub fn touching(&self) -> usize {
        self.touching.len()
    }
}

impl ContactSource for OverlapDetector {
    fn contacts(&mut self, world: &World) -> Vec<Contact> {
        let live: Vec<_> = world.iter().filter(|e| !e.is_destroyed()).collect();
        let mut now = BTreeSet::new();
        for (i, a) in live.iter().enumerate() {
            for b in &live[i + 1..] {
                let reach = a.radius + b.radius;
                if a.pos().distance_squared(b.pos()) <= reach * reach {
                    now.insert((a.id, b.id));
                }
            }
        }
        let onsets = now
            .difference(&self.touching)
            .map(|&(a, b)| Contact::new(a, b))
            .collect();
        self.touching = now;
        onsets
    }
}

/// Replays queued contact batches, one batch per call
#[derive(Debug, Default)]
pub struct ScriptedContacts {
    batches: VecDeque<Vec<Contact>>,
}

impl ScriptedContacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, batch: Vec<Contact>) {
        self.batches.push_back(batch);
    }
}

impl ContactSource for ScriptedContacts {
    fn contacts(&mut self, _world: &World) -> Vec<Contact> {
        self.batches.pop_front().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceCache;
    use crate::resources::tests::CountingLoader;
    use crate::sim::factory::EntityFactory;
    use glam::Vec2;
    use std::sync::Arc;

    fn factory() -> EntityFactory {
        EntityFactory::new(Arc::new(ResourceCache::new(Arc::new(CountingLoader::default()))))
    }

    #[test]
    fn test_overlap_reported_once_per_onset() {
        let factory = factory();
        let mut world = World::new();
        let coin = factory
            .spawn_coin(&mut world, Vec2::new(100.0, 100.0), Vec2::ZERO)
            .unwrap();
        let player = factory.spawn_player(&mut world, Vec2::new(105.0, 100.0)).unwrap();
        let mut detector = OverlapDetector::new();

        assert_eq!(detector.contacts(&world), vec![Contact::new(coin, player)]);
        assert!(detector.contacts(&world).is_empty());

        // Separate, then touch again
        world.get_mut(player).unwrap().movement.pos = Vec2::new(300.0, 300.0);
        assert!(detector.contacts(&world).is_empty());
        assert_eq!(detector.touching(), 0);
        world.get_mut(player).unwrap().movement.pos = Vec2::new(100.0, 100.0);
        assert_eq!(detector.contacts(&world).len(), 1);
    }

    #[test]
    fn test_flagged_entities_are_not_reported() {
        let factory = factory();
        let mut world = World::new();
        let coin = factory.spawn_coin(&mut world, Vec2::ZERO, Vec2::ZERO).unwrap();
        factory.spawn_player(&mut world, Vec2::ZERO).unwrap();
        world.mark_destroyed(coin);

        assert!(OverlapDetector::new().contacts(&world).is_empty());
    }

    #[test]
    fn test_scripted_batches_replay_in_order() {
        let world = World::new();
        let mut script = ScriptedContacts::new();
        let pair = Contact::new(EntityId(1), EntityId(2));
        script.push(vec![pair, pair]);
        script.push(vec![]);

        assert_eq!(script.contacts(&world), vec![pair, pair]);
        assert!(script.contacts(&world).is_empty());
        assert!(script.contacts(&world).is_empty());
    }
}
