//! Spawn policies and spawners
//!
//! Policies decide how many; spawners decide when, then hand off to the
//! [`EntityFactory`]. Every count is clamped by a hard cap that holds for
//! any level.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{BossVariant, EnemyVariant, EntityId, EntityKind};
use super::factory::{EntityFactory, SpawnError};
use super::world::World;
use crate::consts::*;
use crate::settings::Difficulty;

/// `count(level) = min(per_level × level, cap)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPolicy {
    pub per_level: u32,
    pub cap: u32,
}

impl SpawnPolicy {
    pub const fn new(per_level: u32, cap: u32) -> Self {
        Self { per_level, cap }
    }

    /// Monotonically non-decreasing in `level`, constant once the cap is hit
    pub fn count(&self, level: u32) -> u32 {
        self.per_level.saturating_mul(level).min(self.cap)
    }
}

/// Difficulty-derived scaling applied by spawners and the factory
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyParams {
    /// Multiplier on spawn and fire intervals (lower = busier)
    pub interval_scale: f32,
    /// Multiplier on hostile health
    pub health_scale: f32,
}

impl Default for DifficultyParams {
    fn default() -> Self {
        Self::from(Difficulty::Normal)
    }
}

impl From<Difficulty> for DifficultyParams {
    fn from(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                interval_scale: 1.3,
                health_scale: 0.75,
            },
            Difficulty::Normal => Self {
                interval_scale: 1.0,
                health_scale: 1.0,
            },
            Difficulty::Hard => Self {
                interval_scale: 0.75,
                health_scale: 1.5,
            },
        }
    }
}

impl DifficultyParams {
    pub fn scale_period(&self, ticks: u32) -> u32 {
        ((ticks as f32 * self.interval_scale).round() as u32).max(1)
    }

    pub fn scale_health(&self, hp: u32) -> u32 {
        ((hp as f32 * self.health_scale).round() as u32).max(1)
    }
}

/// Outcome of a spawner run. Failures are per-entity and never abort the rest.
#[derive(Debug, Default)]
pub struct SpawnReport {
    pub spawned: Vec<EntityId>,
    pub failed: Vec<SpawnError>,
}

impl SpawnReport {
    pub(crate) fn record(&mut self, result: Result<EntityId, SpawnError>) {
        match result {
            Ok(id) => self.spawned.push(id),
            Err(err) => {
                log::warn!("Spawn skipped: {err}");
                self.failed.push(err);
            }
        }
    }
}

/// Delay before the first wave
const FIRST_WAVE_DELAY_TICKS: u32 = 60;
const BASE_WAVE_INTERVAL_TICKS: u32 = 150;
const MIN_WAVE_INTERVAL_TICKS: u32 = 45;
const WAVE_INTERVAL_STEP_TICKS: u32 = 8;
const SPAWN_MARGIN: f32 = 32.0;

/// Steady-state enemy spawner: a wave every interval, sized by level
#[derive(Debug, Clone)]
pub struct WaveSpawner {
    countdown: u32,
    wave_policy: SpawnPolicy,
}

impl Default for WaveSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveSpawner {
    pub fn new() -> Self {
        Self {
            countdown: FIRST_WAVE_DELAY_TICKS,
            wave_policy: SpawnPolicy::new(1, 6),
        }
    }

    /// Ticks between waves; shrinks with level down to a floor
    pub fn interval_ticks(level: u32, params: &DifficultyParams) -> u32 {
        let base = BASE_WAVE_INTERVAL_TICKS
            .saturating_sub(level.saturating_mul(WAVE_INTERVAL_STEP_TICKS))
            .max(MIN_WAVE_INTERVAL_TICKS);
        params.scale_period(base)
    }

    /// Enemies per wave (at least one)
    pub fn wave_size(&self, level: u32) -> u32 {
        self.wave_policy.count(level).max(1)
    }

    /// Pick a variant; tougher ships unlock as the level rises
    pub fn pick_variant(rng: &mut impl Rng, level: u32) -> EnemyVariant {
        let roll = rng.random_range(0..100u32);
        match level {
            0..=2 => {
                if roll < 70 {
                    EnemyVariant::Scout
                } else {
                    EnemyVariant::Fighter
                }
            }
            _ => match roll {
                0..45 => EnemyVariant::Scout,
                45..80 => EnemyVariant::Fighter,
                _ => EnemyVariant::Bomber,
            },
        }
    }

    /// Count down and spawn a wave when due
    pub fn update(
        &mut self,
        world: &mut World,
        factory: &EntityFactory,
        rng: &mut impl Rng,
        level: u32,
        params: &DifficultyParams,
    ) -> SpawnReport {
        let mut report = SpawnReport::default();
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown > 0 {
            return report;
        }
        self.countdown = Self::interval_ticks(level, params);

        let live = world.count_live(|k| matches!(k, EntityKind::Enemy(_)));
        let room = MAX_LIVE_ENEMIES.saturating_sub(live) as u32;
        let count = self.wave_size(level).min(room);

        for _ in 0..count {
            let variant = Self::pick_variant(rng, level);
            let x = rng.random_range(SPAWN_MARGIN..ARENA_WIDTH - SPAWN_MARGIN);
            let pos = Vec2::new(x, -variant.radius());
            report.record(factory.spawn_enemy(world, variant, pos, level, params));
        }
        report
    }
}

/// Decides when a boss is due: one per `BOSS_LEVEL_INTERVAL` levels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BossSchedule {
    /// `None` once no boss level fits in a `u32`
    next_level: Option<u32>,
}

impl Default for BossSchedule {
    fn default() -> Self {
        Self::new()
    }
}

impl BossSchedule {
    pub fn new() -> Self {
        Self {
            next_level: Some(BOSS_LEVEL_INTERVAL),
        }
    }

    /// Variant alternates every boss level, Destroyer first
    pub fn variant_for(level: u32) -> BossVariant {
        if (level / BOSS_LEVEL_INTERVAL) % 2 == 1 {
            BossVariant::Destroyer
        } else {
            BossVariant::Carrier
        }
    }

    /// The boss to spawn now, if the level has reached the next boss level
    pub fn due(&self, level: u32) -> Option<BossVariant> {
        let next = self.next_level?;
        (level >= next).then(|| Self::variant_for(next))
    }

    /// Move past the boss level that was just served
    pub fn advance_past(&mut self, level: u32) {
        self.next_level = (level / BOSS_LEVEL_INTERVAL + 1).checked_mul(BOSS_LEVEL_INTERVAL);
    }

    pub fn next_level(&self) -> Option<u32> {
        self.next_level
    }
}

/// Spawn point for a boss entering the arena
pub fn boss_entry_point() -> Vec2 {
    Vec2::new(ARENA_WIDTH / 2.0, 120.0)
}

/// Event-triggered spawner: a defeated boss bursts into coins.
///
/// The boss must still be registered (it may be flagged for teardown); a
/// boss that has already been removed yields [`SpawnError::OwnerGone`] and
/// nothing is spawned.
pub fn coin_burst(
    world: &mut World,
    factory: &EntityFactory,
    boss: EntityId,
    level: u32,
    rng: &mut impl Rng,
) -> Result<SpawnReport, SpawnError> {
    let Some(entity) = world.get(boss) else {
        return Err(SpawnError::OwnerGone(boss));
    };
    let EntityKind::Boss(variant) = entity.kind else {
        return Err(SpawnError::OwnerGone(boss));
    };
    let origin = entity.pos();
    let count = variant.coin_policy().count(level);

    let mut report = SpawnReport::default();
    for i in 0..count {
        let angle = TAU * i as f32 / count as f32;
        let dir = Vec2::new(angle.cos(), angle.sin());
        let spread = rng.random_range(8.0..40.0f32);
        let vel = dir * 60.0 + Vec2::new(0.0, COIN_FALL_SPEED);
        report.record(factory.spawn_coin(world, origin + dir * spread, vel));
    }
    log::info!(
        "{:?} {} dropped {} coin(s) at level {}",
        variant,
        boss,
        report.spawned.len(),
        level
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceCache;
    use crate::resources::tests::CountingLoader;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::sync::Arc;

    fn factory() -> EntityFactory {
        EntityFactory::new(Arc::new(ResourceCache::new(Arc::new(CountingLoader::default()))))
    }

    #[test]
    fn test_boss_coin_caps() {
        let a = BossVariant::Destroyer.coin_policy();
        let b = BossVariant::Carrier.coin_policy();
        assert_eq!(a.count(0), 0);
        assert_eq!(a.count(5), 10);
        assert_eq!(a.count(7), 14);
        assert_eq!(a.count(8), 15);
        assert_eq!(a.count(50), 15);
        assert_eq!(b.count(9), 9);
        assert_eq!(b.count(10), 10);
        assert_eq!(b.count(u32::MAX), 10);
    }

    proptest! {
        #[test]
        fn prop_destroyer_coins_capped(level in any::<u32>()) {
            let count = BossVariant::Destroyer.coin_policy().count(level);
            prop_assert_eq!(count as u64, (2 * level as u64).min(15));
            if level >= 8 {
                prop_assert_eq!(count, 15);
            }
        }

        #[test]
        fn prop_carrier_coins_capped(level in any::<u32>()) {
            let count = BossVariant::Carrier.coin_policy().count(level);
            prop_assert_eq!(count, level.min(10));
            if level >= 10 {
                prop_assert_eq!(count, 10);
            }
        }

        #[test]
        fn prop_policy_monotonic(
            per_level in 0u32..1000,
            cap in 0u32..1000,
            level in 0u32..u32::MAX,
        ) {
            let policy = SpawnPolicy::new(per_level, cap);
            prop_assert!(policy.count(level) <= policy.count(level + 1));
            prop_assert!(policy.count(level) <= cap);
        }

        #[test]
        fn prop_wave_interval_has_floor(level in any::<u32>()) {
            let params = DifficultyParams::default();
            prop_assert!(WaveSpawner::interval_ticks(level, &params) >= MIN_WAVE_INTERVAL_TICKS);
        }
    }

    #[test]
    fn test_boss_schedule() {
        let mut schedule = BossSchedule::new();
        assert_eq!(schedule.due(4), None);
        assert_eq!(schedule.due(5), Some(BossVariant::Destroyer));
        schedule.advance_past(5);
        assert_eq!(schedule.due(9), None);
        assert_eq!(schedule.due(10), Some(BossVariant::Carrier));
        // Jumping several levels at once still serves one boss
        schedule.advance_past(23);
        assert_eq!(schedule.next_level(), Some(25));
    }

    #[test]
    fn test_boss_schedule_ends_at_max_level() {
        let mut schedule = BossSchedule::new();
        assert!(schedule.due(u32::MAX).is_some());
        schedule.advance_past(u32::MAX);
        assert_eq!(schedule.next_level(), None);
        assert_eq!(schedule.due(u32::MAX), None);

        let mut schedule = BossSchedule::new();
        // u32::MAX is itself a boss level
        schedule.advance_past(u32::MAX - BOSS_LEVEL_INTERVAL);
        assert_eq!(schedule.next_level(), Some(u32::MAX));
        assert!(schedule.due(u32::MAX).is_some());
    }

    #[test]
    fn test_wave_respects_live_cap() {
        let factory = factory();
        let mut world = World::new();
        let mut rng = Pcg32::seed_from_u64(1);
        let params = DifficultyParams::default();
        let mut spawner = WaveSpawner::new();

        for _ in 0..20_000 {
            spawner.update(&mut world, &factory, &mut rng, 40, &params);
        }
        let live = world.count_live(|k| matches!(k, EntityKind::Enemy(_)));
        assert_eq!(live, MAX_LIVE_ENEMIES);
    }

    #[test]
    fn test_first_wave_waits_for_delay() {
        let factory = factory();
        let mut world = World::new();
        let mut rng = Pcg32::seed_from_u64(1);
        let params = DifficultyParams::default();
        let mut spawner = WaveSpawner::new();

        for _ in 0..FIRST_WAVE_DELAY_TICKS - 1 {
            assert!(spawner.update(&mut world, &factory, &mut rng, 3, &params).spawned.is_empty());
        }
        let report = spawner.update(&mut world, &factory, &mut rng, 3, &params);
        assert_eq!(report.spawned.len(), 3);
    }

    #[test]
    fn test_coin_burst_requires_registered_boss() {
        let factory = factory();
        let mut world = World::new();
        let mut rng = Pcg32::seed_from_u64(7);
        let params = DifficultyParams::default();
        let boss = factory
            .spawn_boss(&mut world, BossVariant::Destroyer, boss_entry_point(), 5, &params)
            .unwrap();

        world.remove(boss, crate::sim::lifecycle::RemovalReason::OffScreen);
        let err = coin_burst(&mut world, &factory, boss, 5, &mut rng).unwrap_err();
        assert!(matches!(err, SpawnError::OwnerGone(id) if id == boss));
        assert_eq!(world.count_live(|k| k == EntityKind::Coin), 0);
    }

    #[test]
    fn test_coin_burst_from_flagged_boss() {
        let factory = factory();
        let mut world = World::new();
        let mut rng = Pcg32::seed_from_u64(7);
        let params = DifficultyParams::default();
        let boss = factory
            .spawn_boss(&mut world, BossVariant::Carrier, boss_entry_point(), 50, &params)
            .unwrap();
        world.mark_destroyed(boss);

        let report = coin_burst(&mut world, &factory, boss, 50, &mut rng).unwrap();
        assert_eq!(report.spawned.len(), 10);
        assert_eq!(world.count_live(|k| k == EntityKind::Coin), 10);
    }

    #[test]
    fn test_difficulty_scaling() {
        let easy = DifficultyParams::from(Difficulty::Easy);
        let hard = DifficultyParams::from(Difficulty::Hard);
        assert!(easy.scale_period(100) > hard.scale_period(100));
        assert!(easy.scale_health(4) < hard.scale_health(4));
        assert_eq!(hard.scale_period(0), 1);
    }
}
