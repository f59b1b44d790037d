//! Entities and their type tags
//!
//! An entity is a typed record with a stable id and the components its
//! type requires. Variant stat tables live here so spawners and the
//! factory read from one place.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::components::{Health, Movement, Shield, Weapon};
use super::spawn::SpawnPolicy;
use super::timer::TimerKind;
use crate::resources::ImageHandle;

/// Stable entity identity, never reused within a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Regular enemy ships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyVariant {
    /// Fast, fragile, never shoots
    Scout,
    /// Standard gunship
    Fighter,
    /// Slow and tough, heavy shots
    Bomber,
}

impl EnemyVariant {
    pub const ALL: [EnemyVariant; 3] = [
        EnemyVariant::Scout,
        EnemyVariant::Fighter,
        EnemyVariant::Bomber,
    ];

    pub fn sprite_key(self) -> &'static str {
        match self {
            EnemyVariant::Scout => "enemy/scout.png",
            EnemyVariant::Fighter => "enemy/fighter.png",
            EnemyVariant::Bomber => "enemy/bomber.png",
        }
    }

    pub fn base_health(self) -> u32 {
        match self {
            EnemyVariant::Scout => 1,
            EnemyVariant::Fighter => 2,
            EnemyVariant::Bomber => 4,
        }
    }

    /// Downward speed in pixels/s
    pub fn speed(self) -> f32 {
        match self {
            EnemyVariant::Scout => 170.0,
            EnemyVariant::Fighter => 110.0,
            EnemyVariant::Bomber => 70.0,
        }
    }

    pub fn points(self) -> u64 {
        match self {
            EnemyVariant::Scout => 10,
            EnemyVariant::Fighter => 25,
            EnemyVariant::Bomber => 50,
        }
    }

    pub fn radius(self) -> f32 {
        match self {
            EnemyVariant::Scout => 12.0,
            EnemyVariant::Fighter => 16.0,
            EnemyVariant::Bomber => 22.0,
        }
    }

    /// Weapon stats `(period_ticks, damage)`, `None` for unarmed ships
    pub fn weapon(self) -> Option<(u32, u32)> {
        match self {
            EnemyVariant::Scout => None,
            EnemyVariant::Fighter => Some((90, 1)),
            EnemyVariant::Bomber => Some((150, 2)),
        }
    }
}

/// Boss ships. Each drops a coin burst sized by its own policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossVariant {
    /// Coin drop `min(2 × level, 15)`
    Destroyer,
    /// Coin drop `min(1 × level, 10)`
    Carrier,
}

impl BossVariant {
    pub fn sprite_key(self) -> &'static str {
        match self {
            BossVariant::Destroyer => "boss/destroyer.png",
            BossVariant::Carrier => "boss/carrier.png",
        }
    }

    /// Localization key for the display name
    pub fn name_key(self) -> &'static str {
        match self {
            BossVariant::Destroyer => "boss.destroyer",
            BossVariant::Carrier => "boss.carrier",
        }
    }

    pub fn coin_policy(self) -> SpawnPolicy {
        match self {
            BossVariant::Destroyer => SpawnPolicy::new(2, 15),
            BossVariant::Carrier => SpawnPolicy::new(1, 10),
        }
    }

    /// Health at a given level
    pub fn health_at(self, level: u32) -> u32 {
        let (base, per_level): (u32, u32) = match self {
            BossVariant::Destroyer => (40, 6),
            BossVariant::Carrier => (60, 4),
        };
        per_level.saturating_mul(level).saturating_add(base)
    }

    pub fn points(self) -> u64 {
        match self {
            BossVariant::Destroyer => 1_000,
            BossVariant::Carrier => 1_500,
        }
    }

    pub fn radius(self) -> f32 {
        match self {
            BossVariant::Destroyer => 48.0,
            BossVariant::Carrier => 56.0,
        }
    }

    /// Horizontal patrol speed in pixels/s
    pub fn patrol_speed(self) -> f32 {
        match self {
            BossVariant::Destroyer => 90.0,
            BossVariant::Carrier => 60.0,
        }
    }

    /// Weapon stats `(period_ticks, damage)`
    pub fn weapon(self) -> (u32, u32) {
        match self {
            BossVariant::Destroyer => (40, 1),
            BossVariant::Carrier => (70, 2),
        }
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileOwner {
    Player,
    Enemy,
}

impl ProjectileOwner {
    pub fn sprite_key(self) -> &'static str {
        match self {
            ProjectileOwner::Player => "projectile/player_laser.png",
            ProjectileOwner::Enemy => "projectile/enemy_laser.png",
        }
    }
}

/// Closed set of entity types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Enemy(EnemyVariant),
    Boss(BossVariant),
    Projectile(ProjectileOwner),
    Coin,
}

impl EntityKind {
    pub fn sprite_key(self) -> &'static str {
        match self {
            EntityKind::Player => "player/ship.png",
            EntityKind::Enemy(variant) => variant.sprite_key(),
            EntityKind::Boss(variant) => variant.sprite_key(),
            EntityKind::Projectile(owner) => owner.sprite_key(),
            EntityKind::Coin => "pickup/coin.png",
        }
    }

    pub fn is_hostile_ship(self) -> bool {
        matches!(self, EntityKind::Enemy(_) | EntityKind::Boss(_))
    }
}

/// A live game object
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Cached sprite handle passed through to the view layer
    pub view: ImageHandle,
    pub movement: Movement,
    /// Collision radius
    pub radius: f32,
    pub health: Option<Health>,
    pub shield: Option<Shield>,
    pub weapon: Option<Weapon>,
    /// Damage dealt on contact (projectiles)
    pub contact_damage: u32,
    destroyed: bool,
}

impl Entity {
    pub(crate) fn new(
        id: EntityId,
        kind: EntityKind,
        view: ImageHandle,
        movement: Movement,
        radius: f32,
    ) -> Self {
        Self {
            id,
            kind,
            view,
            movement,
            radius,
            health: None,
            shield: None,
            weapon: None,
            contact_damage: 0,
            destroyed: false,
        }
    }

    pub fn pos(&self) -> Vec2 {
        self.movement.pos
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Flag for teardown at the end of the tick; returns false if already flagged
    pub(crate) fn mark_destroyed(&mut self) -> bool {
        !std::mem::replace(&mut self.destroyed, true)
    }

    pub fn shield_active(&self) -> bool {
        self.shield.as_ref().is_some_and(Shield::is_active)
    }

    /// Advance every owned timer one tick, returning what fired
    pub(crate) fn advance_timers(&mut self) -> Vec<TimerKind> {
        let mut fired = Vec::new();
        if let Some(shield) = &mut self.shield {
            fired.extend(shield.timers_mut().advance());
        }
        if let Some(weapon) = &mut self.weapon {
            fired.extend(weapon.timers_mut().advance());
        }
        fired
    }

    /// Cancel every timer held by any component; returns how many were live
    pub(crate) fn cancel_timers(&mut self) -> usize {
        let mut canceled = 0;
        if let Some(shield) = &mut self.shield {
            canceled += shield.timers_mut().cancel_all();
        }
        if let Some(weapon) = &mut self.weapon {
            canceled += weapon.timers_mut().cancel_all();
        }
        canceled
    }

    /// Number of timers currently scheduled across components
    pub fn scheduled_timers(&self) -> usize {
        let shield = self.shield.as_ref().map_or(0, |s| s.timers().len());
        let weapon = self.weapon.as_ref().map_or(0, |w| w.timers().len());
        shield + weapon
    }
}
