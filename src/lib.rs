//! Star Volley - runtime core of a vertical arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, collisions, ticking)
//! - `resources`: Load-once image cache shared by every spawned entity
//! - `progression`: Process-wide level/score/achievement managers
//! - `audio`, `language`: Fire-and-forget sound and localized strings
//! - `persistence`: Save/load of settings and high scores
//! - `session`: Session boundaries (load at start, commit at end)

pub mod audio;
pub mod highscores;
pub mod language;
pub mod persistence;
pub mod progression;
pub mod resources;
pub mod session;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use progression::Progression;
pub use resources::{ImageHandle, ResourceCache, ResourceLoadError};
pub use settings::{Difficulty, Settings};

use std::sync::{Mutex, MutexGuard, PoisonError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;

    /// Arena dimensions (origin top-left, y grows down-screen)
    pub const ARENA_WIDTH: f32 = 480.0;
    pub const ARENA_HEIGHT: f32 = 720.0;
    /// Distance outside the arena before an entity is despawned
    pub const OFFSCREEN_MARGIN: f32 = 64.0;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 260.0;
    pub const PLAYER_RADIUS: f32 = 14.0;
    pub const PLAYER_MAX_HEALTH: u32 = 5;
    pub const PLAYER_FIRE_COOLDOWN_TICKS: u32 = 12;
    pub const PLAYER_SHOT_SPEED: f32 = 520.0;
    pub const PLAYER_SHOT_DAMAGE: u32 = 1;
    /// Shield window (3 seconds at 60 Hz)
    pub const SHIELD_DURATION_TICKS: u32 = 3 * 60;

    /// Projectiles
    pub const PROJECTILE_RADIUS: f32 = 4.0;
    pub const ENEMY_SHOT_SPEED: f32 = 240.0;

    /// Coins
    pub const COIN_RADIUS: f32 = 8.0;
    pub const COIN_FALL_SPEED: f32 = 90.0;
    pub const COIN_POINTS: u64 = 5;

    /// Damage dealt to the player when ramming a hostile ship
    pub const RAM_DAMAGE: u32 = 1;

    /// Progression
    pub const KILLS_PER_LEVEL: u32 = 10;
    pub const BOSS_LEVEL_INTERVAL: u32 = 5;

    /// Hard cap on simultaneously live regular enemies
    pub const MAX_LIVE_ENEMIES: usize = 24;
}

/// Lock a mutex, recovering the guard if a previous holder panicked
#[inline]
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clamp a position to the arena rectangle
#[inline]
pub fn clamp_to_arena(pos: Vec2) -> Vec2 {
    Vec2::new(
        pos.x.clamp(0.0, consts::ARENA_WIDTH),
        pos.y.clamp(0.0, consts::ARENA_HEIGHT),
    )
}

/// Whether a position lies outside the arena plus the despawn margin
#[inline]
pub fn is_offscreen(pos: Vec2) -> bool {
    use consts::*;
    pos.x < -OFFSCREEN_MARGIN
        || pos.x > ARENA_WIDTH + OFFSCREEN_MARGIN
        || pos.y < -OFFSCREEN_MARGIN
        || pos.y > ARENA_HEIGHT + OFFSCREEN_MARGIN
}
