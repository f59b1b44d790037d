//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod components;
pub mod contact;
pub mod entity;
pub mod factory;
pub mod lifecycle;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod timer;
pub mod world;

pub use collision::{CollisionClass, CollisionResolver, CollisionRule, ResolveStats, rule_for};
pub use components::{FireMode, Health, Movement, Shield, Weapon};
pub use contact::{Contact, ContactSource, OverlapDetector, ScriptedContacts};
pub use entity::{BossVariant, EnemyVariant, Entity, EntityId, EntityKind, ProjectileOwner};
pub use factory::{EntityFactory, SpawnError};
pub use lifecycle::{RemovalReason, Teardown, on_removed};
pub use spawn::{BossSchedule, DifficultyParams, SpawnPolicy, SpawnReport, WaveSpawner, coin_burst};
pub use state::{GameEvent, GamePhase, GameState, Sprite};
pub use tick::{TickInput, tick};
pub use timer::{TimerKind, TimerSet};
pub use world::{TimerFired, World};
