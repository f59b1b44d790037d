//! Entity teardown
//!
//! [`on_removed`] is the single teardown hook. The world calls it exactly
//! once per entity, after taking the entity out of the live registry and
//! before its storage is dropped.

use super::entity::{Entity, EntityId, EntityKind};

/// Why an entity left the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    /// Destroyed or consumed by a collision handler
    Destroyed,
    /// Left the arena
    OffScreen,
    /// Session ended with the entity still alive
    SessionEnd,
}

/// Record of a completed teardown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Teardown {
    pub id: EntityId,
    pub kind: EntityKind,
    pub reason: RemovalReason,
    /// Timers that were still scheduled and got canceled
    pub timers_canceled: usize,
}

/// Cancel every timer owned by `entity`'s components.
///
/// Cancellation is unconditional: a fired one-shot and a pending repeating
/// timer are treated the same.
pub fn on_removed(entity: &mut Entity, reason: RemovalReason) -> Teardown {
    let timers_canceled = entity.cancel_timers();
    entity.mark_destroyed();
    log::trace!(
        "Teardown {} {:?} ({:?}), {} timer(s) canceled",
        entity.id,
        entity.kind,
        reason,
        timers_canceled
    );
    Teardown {
        id: entity.id,
        kind: entity.kind,
        reason,
        timers_canceled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::components::{Movement, Shield, Weapon};
    use crate::sim::entity::EnemyVariant;

    #[test]
    fn test_on_removed_cancels_all_component_timers() {
        let mut entity = Entity::new(
            EntityId(7),
            EntityKind::Enemy(EnemyVariant::Fighter),
            crate::resources::tests::handle(0),
            Movement::default(),
            10.0,
        );
        let mut shield = Shield::new();
        shield.activate(100);
        entity.shield = Some(shield);
        entity.weapon = Some(Weapon::automatic(30, 1, 100.0));
        assert_eq!(entity.scheduled_timers(), 2);

        let teardown = on_removed(&mut entity, RemovalReason::Destroyed);

        assert_eq!(teardown.timers_canceled, 2);
        assert_eq!(entity.scheduled_timers(), 0);
        assert!(entity.is_destroyed());
        for _ in 0..500 {
            assert!(entity.advance_timers().is_empty());
        }
    }
}
