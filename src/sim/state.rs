//! Game state and per-run simulation types
//!
//! Everything one run needs to advance deterministically lives here. Shared
//! progression (level, score, achievements) is owned by the
//! [`Progression`](crate::progression::Progression) registry and passed into
//! each tick.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::CollisionResolver;
use super::entity::{BossVariant, EnemyVariant, EntityId};
use super::factory::{EntityFactory, SpawnError};
use super::lifecycle::Teardown;
use super::spawn::{BossSchedule, DifficultyParams, SpawnReport, WaveSpawner};
use super::world::World;
use crate::consts::*;
use crate::progression::AchievementId;
use crate::resources::ImageHandle;
use crate::settings::Difficulty;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Regular waves
    Playing,
    /// A boss is in the arena; waves are held back
    BossFight,
    /// Game is paused
    Paused,
    /// Run ended
    GameOver,
}

/// Something the view layer may want to react to
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    EnemyDestroyed {
        id: EntityId,
        variant: EnemyVariant,
        points: u64,
    },
    BossSpawned {
        id: EntityId,
        variant: BossVariant,
        message: String,
    },
    BossDefeated {
        id: EntityId,
        variant: BossVariant,
        coins: usize,
        message: String,
    },
    CoinCollected {
        total: u64,
    },
    PlayerHit {
        remaining: u32,
    },
    ShieldAbsorbed,
    PlayerDestroyed,
    LevelUp {
        level: u32,
        message: String,
    },
    AchievementUnlocked {
        id: AchievementId,
        message: String,
    },
    /// A spawn was skipped; the tick carried on
    SpawnFailed {
        reason: String,
    },
    GameOver {
        score: u64,
        level: u32,
    },
}

/// What the view layer needs to draw one entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub id: EntityId,
    pub view: ImageHandle,
    pub pos: Vec2,
}

/// Complete state of one run
#[derive(Debug)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub phase: GamePhase,
    /// Phase to return to when unpaused
    pub(crate) resume_phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub world: World,
    pub factory: EntityFactory,
    pub player: EntityId,
    /// Boss currently in the arena
    pub boss: Option<EntityId>,
    pub difficulty: DifficultyParams,
    pub(crate) waves: WaveSpawner,
    pub(crate) boss_schedule: BossSchedule,
    pub(crate) resolver: CollisionResolver,
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    /// Create a run with the player in place
    pub fn new(
        seed: u64,
        factory: EntityFactory,
        difficulty: Difficulty,
    ) -> Result<Self, SpawnError> {
        let mut world = World::new();
        let player = factory.spawn_player(&mut world, Self::player_start())?;
        log::info!("New run: seed {seed}, difficulty {}", difficulty.as_str());
        Ok(Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Playing,
            resume_phase: GamePhase::Playing,
            time_ticks: 0,
            world,
            factory,
            player,
            boss: None,
            difficulty: DifficultyParams::from(difficulty),
            waves: WaveSpawner::new(),
            boss_schedule: BossSchedule::new(),
            resolver: CollisionResolver::new(),
            events: Vec::new(),
        })
    }

    pub fn player_start() -> Vec2 {
        Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT - 80.0)
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Take every event raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Level at which the next boss appears; `None` past the last one
    pub fn next_boss_level(&self) -> Option<u32> {
        self.boss_schedule.next_level()
    }

    pub fn resolver(&self) -> &CollisionResolver {
        &self.resolver
    }

    /// Live entities in draw order
    pub fn sprites(&self) -> Vec<Sprite> {
        self.world
            .iter()
            .filter(|e| !e.is_destroyed())
            .map(|e| Sprite {
                id: e.id,
                view: e.view,
                pos: e.pos(),
            })
            .collect()
    }

    /// Turn spawn failures into events
    pub(crate) fn absorb(&mut self, report: SpawnReport) {
        for err in report.failed {
            self.events.push(GameEvent::SpawnFailed {
                reason: err.to_string(),
            });
        }
    }

    /// Tear down every entity and stop the run
    pub fn end_session(&mut self) -> Vec<Teardown> {
        self.phase = GamePhase::GameOver;
        self.boss = None;
        let teardowns = self.world.clear();
        log::debug!("Session ended, {} entities torn down", teardowns.len());
        teardowns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceCache;
    use crate::resources::tests::CountingLoader;
    use crate::sim::lifecycle::RemovalReason;
    use std::sync::Arc;

    fn factory(loader: CountingLoader) -> EntityFactory {
        EntityFactory::new(Arc::new(ResourceCache::new(Arc::new(loader))))
    }

    #[test]
    fn test_new_run_has_player() {
        let state =
            GameState::new(7, factory(CountingLoader::default()), Difficulty::Normal).unwrap();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.world.len(), 1);
        assert!(state.world.is_live(state.player));
        assert_eq!(state.sprites().len(), 1);
    }

    #[test]
    fn test_missing_player_sprite_fails_run() {
        let loader = CountingLoader::missing(&["player/ship.png"]);
        let result = GameState::new(7, factory(loader), Difficulty::Easy);
        assert!(matches!(result, Err(SpawnError::Resource(_))));
    }

    #[test]
    fn test_end_session_tears_down_everything() {
        let mut state =
            GameState::new(7, factory(CountingLoader::default()), Difficulty::Hard).unwrap();
        let teardowns = state.end_session();
        assert_eq!(teardowns.len(), 1);
        assert_eq!(teardowns[0].reason, RemovalReason::SessionEnd);
        assert!(state.world.is_empty());
        assert!(state.is_over());
    }
}
