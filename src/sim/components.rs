//! Components attached to entities
//!
//! Each component belongs to exactly one entity. Components that need
//! timers own a [`TimerSet`]; the only way to reach those timers is
//! through the owning entity.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::timer::{TimerKind, TimerSet};

/// Hit points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Health {
    pub fn new(max: u32) -> Self {
        let max = max.max(1);
        Self { current: max, max }
    }

    /// Apply damage and return the remaining hit points
    pub fn damage(&mut self, amount: u32) -> u32 {
        self.current = self.current.saturating_sub(amount);
        self.current
    }

    pub fn is_depleted(&self) -> bool {
        self.current == 0
    }
}

/// Position and velocity
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Movement {
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Movement {
    pub fn new(pos: Vec2, vel: Vec2) -> Self {
        Self { pos, vel }
    }

    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }
}

/// Damage-absorbing shield. Active exactly while its expiry timer runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shield {
    timers: TimerSet,
}

impl Shield {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the shield for `ticks`, restarting the window if already up
    pub fn activate(&mut self, ticks: u32) {
        self.timers.schedule_once(TimerKind::ShieldExpiry, ticks);
    }

    pub fn is_active(&self) -> bool {
        self.timers.is_scheduled(TimerKind::ShieldExpiry)
    }

    pub fn remaining_ticks(&self) -> u32 {
        self.timers.remaining(TimerKind::ShieldExpiry).unwrap_or(0)
    }

    pub fn timers(&self) -> &TimerSet {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut TimerSet {
        &mut self.timers
    }
}

/// How a weapon decides to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireMode {
    /// Fires when asked, then waits out its cooldown
    Triggered,
    /// Fires every time its repeating timer elapses
    Automatic,
}

/// Projectile launcher
#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    pub mode: FireMode,
    pub period_ticks: u32,
    pub damage: u32,
    pub shot_speed: f32,
    timers: TimerSet,
}

impl Weapon {
    /// Weapon fired on demand (player)
    pub fn triggered(period_ticks: u32, damage: u32, shot_speed: f32) -> Self {
        Self {
            mode: FireMode::Triggered,
            period_ticks,
            damage,
            shot_speed,
            timers: TimerSet::new(),
        }
    }

    /// Weapon that fires on its own cadence (enemies, bosses)
    pub fn automatic(period_ticks: u32, damage: u32, shot_speed: f32) -> Self {
        let mut timers = TimerSet::new();
        timers.schedule_repeating(TimerKind::WeaponCooldown, period_ticks);
        Self {
            mode: FireMode::Automatic,
            period_ticks,
            damage,
            shot_speed,
            timers,
        }
    }

    /// Ready to fire on demand (no cooldown pending)
    pub fn is_ready(&self) -> bool {
        self.mode == FireMode::Triggered && !self.timers.is_scheduled(TimerKind::WeaponCooldown)
    }

    /// Start the cooldown after a triggered shot
    pub fn start_cooldown(&mut self) {
        self.timers
            .schedule_once(TimerKind::WeaponCooldown, self.period_ticks);
    }

    pub fn timers(&self) -> &TimerSet {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut TimerSet {
        &mut self.timers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_saturates() {
        let mut health = Health::new(3);
        assert_eq!(health.damage(2), 1);
        assert_eq!(health.damage(5), 0);
        assert!(health.is_depleted());
    }

    #[test]
    fn test_shield_window() {
        let mut shield = Shield::new();
        assert!(!shield.is_active());
        shield.activate(2);
        assert!(shield.is_active());
        shield.timers_mut().advance();
        assert!(shield.is_active());
        shield.timers_mut().advance();
        assert!(!shield.is_active());
    }

    #[test]
    fn test_triggered_weapon_cooldown() {
        let mut weapon = Weapon::triggered(2, 1, 100.0);
        assert!(weapon.is_ready());
        weapon.start_cooldown();
        assert!(!weapon.is_ready());
        weapon.timers_mut().advance();
        weapon.timers_mut().advance();
        assert!(weapon.is_ready());
    }

    #[test]
    fn test_automatic_weapon_is_never_ready_on_demand() {
        let weapon = Weapon::automatic(30, 1, 100.0);
        assert!(!weapon.is_ready());
    }
}
