//! Entity construction
//!
//! One constructor per entity type. Each resolves its sprite through the
//! shared [`ResourceCache`] before touching the world, so a failed load
//! leaves nothing registered.

use std::sync::Arc;

use glam::Vec2;
use thiserror::Error;

use super::components::{Health, Movement, Shield, Weapon};
use super::entity::{BossVariant, EnemyVariant, Entity, EntityId, EntityKind, ProjectileOwner};
use super::spawn::DifficultyParams;
use super::world::World;
use crate::consts::*;
use crate::resources::{ResourceCache, ResourceLoadError};

#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("sprite unavailable: {0}")]
    Resource(#[from] ResourceLoadError),
    #[error("spawn owner {0} is no longer in the world")]
    OwnerGone(EntityId),
}

/// Builds fully wired entities and registers them in a [`World`]
#[derive(Debug, Clone)]
pub struct EntityFactory {
    cache: Arc<ResourceCache>,
}

impl EntityFactory {
    pub fn new(cache: Arc<ResourceCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<ResourceCache> {
        &self.cache
    }

    /// Look up the sprite and reserve an id; nothing is registered yet
    fn prepare(
        &self,
        world: &mut World,
        kind: EntityKind,
        pos: Vec2,
        vel: Vec2,
        radius: f32,
    ) -> Result<Entity, SpawnError> {
        let view = self.cache.get(kind.sprite_key())?;
        let id = world.allocate_id();
        Ok(Entity::new(id, kind, view, Movement::new(pos, vel), radius))
    }

    pub fn spawn_player(&self, world: &mut World, pos: Vec2) -> Result<EntityId, SpawnError> {
        let mut entity = self.prepare(world, EntityKind::Player, pos, Vec2::ZERO, PLAYER_RADIUS)?;
        entity.health = Some(Health::new(PLAYER_MAX_HEALTH));
        entity.shield = Some(Shield::new());
        entity.weapon = Some(Weapon::triggered(
            PLAYER_FIRE_COOLDOWN_TICKS,
            PLAYER_SHOT_DAMAGE,
            PLAYER_SHOT_SPEED,
        ));
        Ok(world.insert(entity))
    }

    pub fn spawn_enemy(
        &self,
        world: &mut World,
        variant: EnemyVariant,
        pos: Vec2,
        level: u32,
        difficulty: &DifficultyParams,
    ) -> Result<EntityId, SpawnError> {
        let vel = Vec2::new(0.0, variant.speed());
        let kind = EntityKind::Enemy(variant);
        let mut entity = self.prepare(world, kind, pos, vel, variant.radius())?;
        let health = variant.base_health() + level / 4;
        entity.health = Some(Health::new(difficulty.scale_health(health)));
        if let Some((period, damage)) = variant.weapon() {
            entity.weapon = Some(Weapon::automatic(
                difficulty.scale_period(period),
                damage,
                ENEMY_SHOT_SPEED,
            ));
        }
        Ok(world.insert(entity))
    }

    pub fn spawn_boss(
        &self,
        world: &mut World,
        variant: BossVariant,
        pos: Vec2,
        level: u32,
        difficulty: &DifficultyParams,
    ) -> Result<EntityId, SpawnError> {
        let vel = Vec2::new(variant.patrol_speed(), 0.0);
        let kind = EntityKind::Boss(variant);
        let mut entity = self.prepare(world, kind, pos, vel, variant.radius())?;
        entity.health = Some(Health::new(difficulty.scale_health(variant.health_at(level))));
        let (period, damage) = variant.weapon();
        entity.weapon = Some(Weapon::automatic(
            difficulty.scale_period(period),
            damage,
            ENEMY_SHOT_SPEED,
        ));
        Ok(world.insert(entity))
    }

    pub fn spawn_projectile(
        &self,
        world: &mut World,
        owner: ProjectileOwner,
        pos: Vec2,
        vel: Vec2,
        damage: u32,
    ) -> Result<EntityId, SpawnError> {
        let kind = EntityKind::Projectile(owner);
        let mut entity = self.prepare(world, kind, pos, vel, PROJECTILE_RADIUS)?;
        entity.contact_damage = damage;
        Ok(world.insert(entity))
    }

    pub fn spawn_coin(
        &self,
        world: &mut World,
        pos: Vec2,
        vel: Vec2,
    ) -> Result<EntityId, SpawnError> {
        let entity = self.prepare(world, EntityKind::Coin, pos, vel, COIN_RADIUS)?;
        Ok(world.insert(entity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::tests::CountingLoader;
    use std::sync::atomic::Ordering;

    fn factory_with(loader: Arc<CountingLoader>) -> EntityFactory {
        EntityFactory::new(Arc::new(ResourceCache::new(loader)))
    }

    #[test]
    fn test_spawns_share_cached_sprite() {
        let loader = Arc::new(CountingLoader::default());
        let factory = factory_with(Arc::clone(&loader));
        let mut world = World::new();
        let params = DifficultyParams::default();

        let a = factory
            .spawn_enemy(&mut world, EnemyVariant::Scout, Vec2::ZERO, 1, &params)
            .unwrap();
        let b = factory
            .spawn_enemy(&mut world, EnemyVariant::Scout, Vec2::ZERO, 1, &params)
            .unwrap();

        assert_eq!(world.get(a).unwrap().view, world.get(b).unwrap().view);
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_player_is_fully_wired() {
        let factory = factory_with(Arc::new(CountingLoader::default()));
        let mut world = World::new();
        let id = factory.spawn_player(&mut world, Vec2::new(10.0, 20.0)).unwrap();

        let player = world.get(id).unwrap();
        assert_eq!(player.kind, EntityKind::Player);
        assert_eq!(player.health.unwrap().current, PLAYER_MAX_HEALTH);
        assert!(player.shield.is_some());
        assert!(player.weapon.as_ref().unwrap().is_ready());
    }

    #[test]
    fn test_failed_sprite_registers_nothing() {
        let loader = Arc::new(CountingLoader::missing(&["boss/carrier.png"]));
        let factory = factory_with(loader);
        let mut world = World::new();

        let err = factory
            .spawn_boss(
                &mut world,
                BossVariant::Carrier,
                Vec2::ZERO,
                3,
                &DifficultyParams::default(),
            )
            .unwrap_err();
        assert!(matches!(err, SpawnError::Resource(_)));
        assert!(world.is_empty());
    }

    #[test]
    fn test_enemy_health_scales_with_level() {
        let factory = factory_with(Arc::new(CountingLoader::default()));
        let mut world = World::new();
        let params = DifficultyParams::default();
        let low = factory
            .spawn_enemy(&mut world, EnemyVariant::Fighter, Vec2::ZERO, 1, &params)
            .unwrap();
        let high = factory
            .spawn_enemy(&mut world, EnemyVariant::Fighter, Vec2::ZERO, 20, &params)
            .unwrap();
        let hp = |id| world.get(id).unwrap().health.unwrap().max;
        assert!(hp(high) > hp(low));
    }
}
