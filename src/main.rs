//! Star Volley headless runner
//!
//! Plays a run on autopilot with no window or audio device attached, then
//! records the result. Useful for soak-testing the simulation and for
//! reproducing a seed.
//!
//! Usage: `star-volley [save_dir] [frames] [seed] [asset_dir]`
//! (`RUST_LOG=debug` for more detail)

use std::error::Error;
use std::sync::Arc;

use glam::Vec2;

use star_volley::consts::*;
use star_volley::highscores::now_millis;
use star_volley::persistence::{JsonFileStore, Store};
use star_volley::progression::Progression;
use star_volley::resources::{FsImageLoader, PlaceholderLoader, ResourceCache};
use star_volley::session::Session;
use star_volley::sim::{
    EntityFactory, EntityKind, GameEvent, GameState, OverlapDetector, ProjectileOwner, TickInput,
    tick,
};

/// Headless game instance
struct Game {
    state: GameState,
    contacts: OverlapDetector,
    accumulator: f32,
    input: TickInput,
}

impl Game {
    /// Run simulation ticks for one frame of `dt` seconds
    fn update(&mut self, progression: &Progression, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.input = autopilot(&self.state);
            tick(&mut self.state, progression, &self.input, &mut self.contacts, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        for event in self.state.drain_events() {
            match event {
                GameEvent::LevelUp { message, .. }
                | GameEvent::BossSpawned { message, .. }
                | GameEvent::BossDefeated { message, .. }
                | GameEvent::AchievementUnlocked { message, .. } => log::info!("{message}"),
                GameEvent::SpawnFailed { reason } => log::warn!("{reason}"),
                other => log::trace!("{other:?}"),
            }
        }
    }
}

/// Track the nearest hostile ship, keep firing, shield when shots get close
fn autopilot(state: &GameState) -> TickInput {
    let Some(player) = state.world.get(state.player) else {
        return TickInput::default();
    };
    let pos = player.pos();

    let target = state
        .world
        .iter()
        .filter(|e| e.kind.is_hostile_ship())
        .min_by(|a, b| {
            let da = (a.pos().x - pos.x).abs();
            let db = (b.pos().x - pos.x).abs();
            da.total_cmp(&db)
        })
        .map(|e| e.pos().x);
    let threat = state.world.iter().any(|e| {
        e.kind == EntityKind::Projectile(ProjectileOwner::Enemy) && e.pos().distance(pos) < 60.0
    });

    let steer = target.map_or(0.0, |x| ((x - pos.x) / 40.0).clamp(-1.0, 1.0));
    TickInput {
        move_dir: Vec2::new(steer, 0.0),
        fire: target.is_some(),
        shield: threat,
        pause: false,
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let save_dir = args.next().unwrap_or_else(|| "saves".to_string());
    let frames: u64 = match args.next() {
        Some(arg) => arg.parse()?,
        None => 60 * 60 * 3,
    };
    let seed: u64 = match args.next() {
        Some(arg) => arg.parse()?,
        None => now_millis() as u64,
    };
    let asset_dir = args.next();

    let store: Arc<dyn Store> = Arc::new(JsonFileStore::new(&save_dir));
    let settings = Session::load_settings(store.as_ref()).unwrap_or_else(|err| {
        log::warn!("Settings unreadable, using defaults: {err}");
        Default::default()
    });
    let progression = Progression::install(settings.clone());
    let session = Session::begin(Arc::clone(&store), progression)?;

    let cache = match asset_dir {
        Some(dir) => ResourceCache::new(FsImageLoader::new(dir)),
        None => ResourceCache::new(PlaceholderLoader),
    };
    let factory = EntityFactory::new(Arc::new(cache));
    let mut game = Game {
        state: GameState::new(seed, factory, settings.difficulty)?,
        contacts: OverlapDetector::new(),
        accumulator: 0.0,
        input: TickInput::default(),
    };

    for frame in 0..frames {
        // Uneven frame pacing exercises the substep loop
        let dt = if frame % 5 == 4 { 2.0 * SIM_DT } else { SIM_DT };
        game.update(progression, dt);
        if game.state.is_over() {
            break;
        }
    }

    let ticks = game.state.time_ticks;
    let summary = session.finish(progression, &mut game.state)?;
    println!(
        "seed {seed}: {ticks} ticks, score {}, coins {}, level {}, best {}",
        summary.score, summary.coins, summary.level, summary.high_score
    );
    if let Some(rank) = summary.rank {
        println!("New high score! Rank #{rank}");
    }
    let unlocked = progression.achievements().unlocked();
    if !unlocked.is_empty() {
        println!("Achievements: {unlocked:?}");
    }
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Star Volley (headless) starting...");

    if let Err(err) = run() {
        log::error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
