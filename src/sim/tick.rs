//! Fixed timestep simulation tick
//!
//! One call advances the run by one step, in a fixed order: input, movement,
//! timers, spawning, contacts, teardown, phase changes.

use glam::Vec2;

use super::collision::ResolveContext;
use super::components::FireMode;
use super::contact::ContactSource;
use super::entity::{EntityKind, ProjectileOwner};
use super::spawn::{SpawnReport, boss_entry_point};
use super::state::{GameEvent, GamePhase, GameState};
use super::timer::TimerKind;
use super::world::TimerFired;
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::progression::Progression;
use crate::clamp_to_arena;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Steering direction; longer than 1 is clamped
    pub move_dir: Vec2,
    /// Fire the player's weapon if it is off cooldown
    pub fire: bool,
    /// Raise the shield
    pub shield: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(
    state: &mut GameState,
    progression: &Progression,
    input: &TickInput,
    contacts: &mut dyn ContactSource,
    dt: f32,
) {
    if input.pause {
        match state.phase {
            GamePhase::Playing | GamePhase::BossFight => {
                state.resume_phase = state.phase;
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = state.resume_phase,
            GamePhase::GameOver => {}
        }
    }
    if matches!(state.phase, GamePhase::Paused | GamePhase::GameOver) {
        return;
    }
    state.time_ticks += 1;

    apply_player_input(state, progression, input);

    // Movement
    state.world.integrate(dt);
    keep_in_bounds(state);

    // Timers
    let fired = state.world.advance_timers();
    fire_weapons(state, progression, &fired);

    // Spawning
    let level = progression.level().current();
    match state.phase {
        GamePhase::Playing => {
            if !try_spawn_boss(state, progression, level) {
                let report = state.waves.update(
                    &mut state.world,
                    &state.factory,
                    &mut state.rng,
                    level,
                    &state.difficulty,
                );
                state.absorb(report);
            }
        }
        GamePhase::BossFight | GamePhase::Paused | GamePhase::GameOver => {}
    }

    // Contacts
    let batch = contacts.contacts(&state.world);
    let mut ctx = ResolveContext {
        world: &mut state.world,
        factory: &state.factory,
        rng: &mut state.rng,
        progression,
        events: &mut state.events,
    };
    state.resolver.resolve(&mut ctx, &batch);

    // Teardown
    state.world.reap_destroyed();
    state.world.despawn_offscreen();

    // Phase changes
    if let Some(boss) = state.boss
        && !state.world.is_live(boss)
    {
        log::debug!("Boss {boss} gone, back to waves");
        state.boss = None;
        state.phase = GamePhase::Playing;
    }
    if !state.world.is_live(state.player) {
        game_over(state, progression);
    }
}

fn apply_player_input(state: &mut GameState, progression: &Progression, input: &TickInput) {
    let Some(player) = state.world.get_mut(state.player) else {
        return;
    };
    player.movement.vel = input.move_dir.clamp_length_max(1.0) * PLAYER_SPEED;

    if input.shield
        && let Some(shield) = player.shield.as_mut()
        && !shield.is_active()
    {
        shield.activate(SHIELD_DURATION_TICKS);
        progression.audio().play(SoundEffect::ShieldUp);
    }

    let shot = match player.weapon.as_mut() {
        Some(weapon) if input.fire && weapon.is_ready() => {
            weapon.start_cooldown();
            Some((weapon.damage, weapon.shot_speed))
        }
        _ => None,
    };
    let Some((damage, speed)) = shot else {
        return;
    };
    let muzzle = player.pos() - Vec2::new(0.0, player.radius);
    let result = state.factory.spawn_projectile(
        &mut state.world,
        ProjectileOwner::Player,
        muzzle,
        Vec2::new(0.0, -speed),
        damage,
    );
    if result.is_ok() {
        progression.audio().play(SoundEffect::PlayerShot);
    }
    let mut report = SpawnReport::default();
    report.record(result);
    state.absorb(report);
}

/// Player stays inside the arena; bosses bounce between the side walls
fn keep_in_bounds(state: &mut GameState) {
    for entity in state.world.iter_mut() {
        match entity.kind {
            EntityKind::Player => entity.movement.pos = clamp_to_arena(entity.movement.pos),
            EntityKind::Boss(_) => {
                let (lo, hi) = (entity.radius, ARENA_WIDTH - entity.radius);
                let m = &mut entity.movement;
                if (m.pos.x < lo && m.vel.x < 0.0) || (m.pos.x > hi && m.vel.x > 0.0) {
                    m.vel.x = -m.vel.x;
                }
                m.pos.x = m.pos.x.clamp(lo, hi);
            }
            _ => {}
        }
    }
}

/// Automatic weapons shoot when their cooldown timer fires
fn fire_weapons(state: &mut GameState, progression: &Progression, fired: &[TimerFired]) {
    let target = state.world.get(state.player).map(|p| p.pos());
    let mut report = SpawnReport::default();
    for timer in fired {
        if timer.kind != TimerKind::WeaponCooldown {
            continue;
        }
        let Some(shooter) = state.world.get(timer.entity) else {
            continue;
        };
        let Some(weapon) = shooter.weapon.as_ref().filter(|w| w.mode == FireMode::Automatic) else {
            continue;
        };
        // Bosses aim at the player; regular ships fire straight down
        let dir = match (shooter.kind, target) {
            (EntityKind::Boss(_), Some(target)) => (target - shooter.pos()).normalize_or(Vec2::Y),
            _ => Vec2::Y,
        };
        let muzzle = shooter.pos() + dir * shooter.radius;
        let (vel, damage) = (dir * weapon.shot_speed, weapon.damage);
        let result = state.factory.spawn_projectile(
            &mut state.world,
            ProjectileOwner::Enemy,
            muzzle,
            vel,
            damage,
        );
        if result.is_ok() {
            progression.audio().play(SoundEffect::EnemyShot);
        }
        report.record(result);
    }
    state.absorb(report);
}

/// Spawn the scheduled boss if one is due; returns true if the boss fight began
fn try_spawn_boss(state: &mut GameState, progression: &Progression, level: u32) -> bool {
    let Some(variant) = state.boss_schedule.due(level) else {
        return false;
    };
    state.boss_schedule.advance_past(level);
    let spawned = state.factory.spawn_boss(
        &mut state.world,
        variant,
        boss_entry_point(),
        level,
        &state.difficulty,
    );
    match spawned {
        Ok(id) => {
            let language = progression.language();
            let name = language.text(variant.name_key());
            let message = language.format("progress.boss_incoming", &[("boss", &name)]);
            log::info!("{variant:?} {id} enters at level {level}");
            progression.audio().play(SoundEffect::BossWarning);
            state.events.push(GameEvent::BossSpawned { id, variant, message });
            state.boss = Some(id);
            state.phase = GamePhase::BossFight;
            true
        }
        Err(err) => {
            // The boss level is skipped rather than retried every tick
            log::warn!("Boss spawn skipped: {err}");
            state.events.push(GameEvent::SpawnFailed {
                reason: err.to_string(),
            });
            false
        }
    }
}

fn game_over(state: &mut GameState, progression: &Progression) {
    let score = progression.score().score();
    let level = progression.level().current();
    log::info!("Game over at tick {}: score {score}, level {level}", state.time_ticks);
    progression.audio().play(SoundEffect::GameOver);
    state.phase = GamePhase::GameOver;
    state.boss = None;
    state.events.push(GameEvent::GameOver { score, level });
}
