//! Collision resolution
//!
//! Contacts arrive as unordered `(a, b)` pairs from a [`ContactSource`].
//! Each entity maps to a [`CollisionClass`]; the ordered class pair picks
//! exactly one [`CollisionRule`] from a closed table whose default is
//! [`CollisionRule::Ignore`]. Contacts are handled in arrival order, and a
//! contact touching an entity already flagged for teardown in this pass is
//! skipped, so a kill is never rewarded twice.
//!
//! [`ContactSource`]: super::contact::ContactSource

use rand_pcg::Pcg32;

use super::contact::Contact;
use super::entity::{EntityId, EntityKind, ProjectileOwner};
use super::factory::EntityFactory;
use super::spawn::coin_burst;
use super::state::GameEvent;
use super::world::World;
use crate::audio::SoundEffect;
use crate::consts::{COIN_POINTS, RAM_DAMAGE};
use crate::progression::{AchievementEvent, AchievementId, Progression};

/// Collision-relevant classification of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CollisionClass {
    Player,
    Enemy,
    Boss,
    PlayerProjectile,
    EnemyProjectile,
    Coin,
}

impl From<EntityKind> for CollisionClass {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Player => CollisionClass::Player,
            EntityKind::Enemy(_) => CollisionClass::Enemy,
            EntityKind::Boss(_) => CollisionClass::Boss,
            EntityKind::Projectile(ProjectileOwner::Player) => CollisionClass::PlayerProjectile,
            EntityKind::Projectile(ProjectileOwner::Enemy) => CollisionClass::EnemyProjectile,
            EntityKind::Coin => CollisionClass::Coin,
        }
    }
}

/// Handler selected for a class pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionRule {
    /// Player shot against an enemy or boss
    ProjectileHitsHostile,
    /// Enemy shot against the player
    ProjectileHitsPlayer,
    PlayerCollectsCoin,
    /// Player body against an enemy or boss
    PlayerRamsHostile,
    Ignore,
}

/// Rule for an unordered class pair
pub fn rule_for(a: CollisionClass, b: CollisionClass) -> CollisionRule {
    use CollisionClass as C;
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    match (lo, hi) {
        (C::Player, C::Enemy | C::Boss) => CollisionRule::PlayerRamsHostile,
        (C::Player, C::EnemyProjectile) => CollisionRule::ProjectileHitsPlayer,
        (C::Player, C::Coin) => CollisionRule::PlayerCollectsCoin,
        (C::Enemy | C::Boss, C::PlayerProjectile) => CollisionRule::ProjectileHitsHostile,
        _ => CollisionRule::Ignore,
    }
}

/// Everything a handler may touch during one resolution pass
pub struct ResolveContext<'a> {
    pub world: &'a mut World,
    pub factory: &'a EntityFactory,
    pub rng: &'a mut Pcg32,
    pub progression: &'a Progression,
    pub events: &'a mut Vec<GameEvent>,
}

/// Running counters, mostly for diagnostics and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub dispatched: u64,
    pub ignored: u64,
    /// Contacts dropped because an entity was gone or already flagged
    pub skipped_stale: u64,
}

#[derive(Debug, Default)]
pub struct CollisionResolver {
    stats: ResolveStats,
}

impl CollisionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> ResolveStats {
        self.stats
    }

    /// Dispatch every contact, in order
    pub fn resolve(&mut self, ctx: &mut ResolveContext<'_>, contacts: &[Contact]) {
        for contact in contacts {
            self.dispatch(ctx, *contact);
        }
    }

    fn dispatch(&mut self, ctx: &mut ResolveContext<'_>, contact: Contact) {
        let (Some(a), Some(b)) = (ctx.world.get(contact.a), ctx.world.get(contact.b)) else {
            self.stats.skipped_stale += 1;
            return;
        };
        if a.is_destroyed() || b.is_destroyed() || a.id == b.id {
            self.stats.skipped_stale += 1;
            return;
        }

        let (class_a, class_b) = (CollisionClass::from(a.kind), CollisionClass::from(b.kind));
        // Orient so `first` has the lower class
        let (first, second) = if class_a <= class_b {
            (contact.a, contact.b)
        } else {
            (contact.b, contact.a)
        };

        let rule = rule_for(class_a, class_b);
        log::trace!("Contact {} x {} -> {:?}", first, second, rule);
        match rule {
            CollisionRule::Ignore => {
                self.stats.ignored += 1;
                return;
            }
            CollisionRule::ProjectileHitsHostile => projectile_hits_hostile(ctx, first, second),
            CollisionRule::ProjectileHitsPlayer => projectile_hits_player(ctx, first, second),
            CollisionRule::PlayerCollectsCoin => player_collects_coin(ctx, first, second),
            CollisionRule::PlayerRamsHostile => player_rams_hostile(ctx, first, second),
        }
        self.stats.dispatched += 1;
    }
}

fn projectile_hits_hostile(ctx: &mut ResolveContext<'_>, hostile: EntityId, projectile: EntityId) {
    let damage = ctx.world.get(projectile).map_or(0, |p| p.contact_damage);
    ctx.world.mark_destroyed(projectile);

    let remaining = ctx
        .world
        .get_mut(hostile)
        .and_then(|e| e.health.as_mut())
        .map(|health| health.damage(damage));
    match remaining {
        Some(0) => destroy_hostile(ctx, hostile),
        Some(_) => ctx.progression.audio().play(SoundEffect::EnemyHit),
        None => {}
    }
}

fn projectile_hits_player(ctx: &mut ResolveContext<'_>, player: EntityId, projectile: EntityId) {
    let damage = ctx.world.get(projectile).map_or(0, |p| p.contact_damage);
    ctx.world.mark_destroyed(projectile);
    damage_player(ctx, player, damage);
}

fn player_collects_coin(ctx: &mut ResolveContext<'_>, _player: EntityId, coin: EntityId) {
    if !ctx.world.mark_destroyed(coin) {
        return;
    }
    let score = ctx.progression.score();
    let total = score.add_coins(1);
    score.add_points(COIN_POINTS);
    ctx.progression.audio().play(SoundEffect::CoinPickup);
    ctx.events.push(GameEvent::CoinCollected { total });

    let unlocked = ctx
        .progression
        .achievements()
        .record_event(AchievementEvent::CoinCollected);
    announce(ctx, unlocked);
}

fn player_rams_hostile(ctx: &mut ResolveContext<'_>, player: EntityId, hostile: EntityId) {
    // Regular ships break apart on impact; bosses shrug it off
    if matches!(ctx.world.get(hostile).map(|e| e.kind), Some(EntityKind::Enemy(_))) {
        destroy_hostile(ctx, hostile);
    }
    damage_player(ctx, player, RAM_DAMAGE);
}

/// Shield-gated damage: an active shield absorbs the hit entirely
fn damage_player(ctx: &mut ResolveContext<'_>, player: EntityId, damage: u32) {
    let Some(entity) = ctx.world.get_mut(player) else {
        return;
    };
    if entity.shield_active() {
        ctx.progression.audio().play(SoundEffect::ShieldAbsorb);
        ctx.events.push(GameEvent::ShieldAbsorbed);
        return;
    }
    let Some(remaining) = entity.health.as_mut().map(|h| h.damage(damage)) else {
        return;
    };
    ctx.progression.audio().play(SoundEffect::PlayerHit);
    ctx.events.push(GameEvent::PlayerHit { remaining });
    if remaining == 0 && ctx.world.mark_destroyed(player) {
        log::info!("Player {player} destroyed");
        ctx.events.push(GameEvent::PlayerDestroyed);
    }
}

/// Flag a hostile ship and apply every kill reward exactly once
fn destroy_hostile(ctx: &mut ResolveContext<'_>, id: EntityId) {
    if !ctx.world.mark_destroyed(id) {
        return;
    }
    let Some(kind) = ctx.world.get(id).map(|e| e.kind) else {
        return;
    };
    let progression = ctx.progression;
    let level = progression.level().current();
    let mut unlocked = Vec::new();

    match kind {
        EntityKind::Enemy(variant) => {
            let points = variant.points();
            progression.score().add_points(points);
            progression.audio().play(SoundEffect::EnemyExplode);
            ctx.events.push(GameEvent::EnemyDestroyed { id, variant, points });
            unlocked.extend(
                progression
                    .achievements()
                    .record_event(AchievementEvent::EnemyDestroyed),
            );
        }
        EntityKind::Boss(variant) => {
            progression.score().add_points(variant.points());
            progression.audio().play(SoundEffect::BossExplode);
            // The boss is flagged but still registered, so the burst can read it
            let coins = match coin_burst(ctx.world, ctx.factory, id, level, &mut *ctx.rng) {
                Ok(report) => {
                    for err in &report.failed {
                        ctx.events.push(GameEvent::SpawnFailed {
                            reason: err.to_string(),
                        });
                    }
                    report.spawned.len()
                }
                Err(err) => {
                    log::warn!("Coin burst skipped: {err}");
                    ctx.events.push(GameEvent::SpawnFailed {
                        reason: err.to_string(),
                    });
                    0
                }
            };
            let language = progression.language();
            let name = language.text(variant.name_key());
            let message = language.format("progress.boss_defeated", &[("boss", &name)]);
            log::info!("{variant:?} {id} defeated at level {level}, {coins} coin(s)");
            ctx.events.push(GameEvent::BossDefeated {
                id,
                variant,
                coins,
                message,
            });
            unlocked.extend(
                progression
                    .achievements()
                    .record_event(AchievementEvent::BossDefeated(variant)),
            );
        }
        _ => return,
    }

    if let Some(new_level) = progression.level().record_kill() {
        progression.audio().play(SoundEffect::LevelUp);
        let message = progression
            .language()
            .format("progress.level_up", &[("level", &new_level.to_string())]);
        ctx.events.push(GameEvent::LevelUp {
            level: new_level,
            message,
        });
        unlocked.extend(
            progression
                .achievements()
                .record_event(AchievementEvent::LevelReached(new_level)),
        );
    }
    announce(ctx, unlocked);
}

fn announce(ctx: &mut ResolveContext<'_>, unlocked: Vec<AchievementId>) {
    if unlocked.is_empty() {
        return;
    }
    let language = ctx.progression.language();
    for id in unlocked {
        let name = language.text(id.name_key());
        let message = language.format("achievement.unlocked", &[("name", &name)]);
        ctx.progression.audio().play(SoundEffect::Achievement);
        ctx.events.push(GameEvent::AchievementUnlocked { id, message });
    }
}
