//! Single-owner registry for the progression managers
//!
//! Each manager sits in an [`InitOnce`] cell, so however many call sites race
//! to "create it if absent", exactly one instance is ever built and every
//! caller gets that instance. A process-wide registry is available through
//! [`Progression::global`]; tests and embedders can also own a local one
//! and pass it explicitly.

use std::sync::{Arc, OnceLock};

use super::achievements::AchievementManager;
use super::level::LevelManager;
use super::score::ScoreManager;
use crate::audio::AudioManager;
use crate::language::LanguageManager;
use crate::settings::Settings;

/// Construct-once shared cell
#[derive(Debug)]
pub struct InitOnce<T> {
    cell: OnceLock<Arc<T>>,
}

impl<T> Default for InitOnce<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InitOnce<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// The instance, building it with `init` if nobody has yet.
    ///
    /// Concurrent callers block until the single winning `init` finishes.
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> Arc<T> {
        Arc::clone(self.cell.get_or_init(|| Arc::new(init())))
    }

    pub fn get(&self) -> Option<Arc<T>> {
        self.cell.get().cloned()
    }
}

/// Process-wide progression state
#[derive(Debug)]
pub struct Progression {
    settings: Settings,
    level: InitOnce<LevelManager>,
    score: InitOnce<ScoreManager>,
    achievements: InitOnce<AchievementManager>,
    audio: InitOnce<AudioManager>,
    language: InitOnce<LanguageManager>,
}

static GLOBAL: OnceLock<Progression> = OnceLock::new();

impl Progression {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            level: InitOnce::new(),
            score: InitOnce::new(),
            achievements: InitOnce::new(),
            audio: InitOnce::new(),
            language: InitOnce::new(),
        }
    }

    /// Install the process-wide registry. If one is already installed it is
    /// returned unchanged and `settings` is ignored.
    pub fn install(settings: Settings) -> &'static Progression {
        let mut fresh = false;
        let progression = GLOBAL.get_or_init(|| {
            fresh = true;
            Progression::new(settings)
        });
        if !fresh {
            log::debug!("Progression already installed; returning existing registry");
        }
        progression
    }

    /// The process-wide registry, installed with default settings if needed
    pub fn global() -> &'static Progression {
        GLOBAL.get_or_init(|| Progression::new(Settings::default()))
    }

    /// Settings the managers were configured from
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn level(&self) -> Arc<LevelManager> {
        self.level.get_or_init(LevelManager::default)
    }

    pub fn score(&self) -> Arc<ScoreManager> {
        self.score.get_or_init(ScoreManager::new)
    }

    pub fn achievements(&self) -> Arc<AchievementManager> {
        self.achievements.get_or_init(AchievementManager::new)
    }

    pub fn audio(&self) -> Arc<AudioManager> {
        self.audio.get_or_init(|| AudioManager::new(&self.settings))
    }

    pub fn language(&self) -> Arc<LanguageManager> {
        self.language
            .get_or_init(|| LanguageManager::new(self.settings.language))
    }

    /// Reset per-run state. Achievements and the leaderboard persist.
    pub fn reset_run(&self) {
        self.level().reset();
        self.score().reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_racing_initializers_build_once() {
        let cell: Arc<InitOnce<AchievementManager>> = Arc::new(InitOnce::new());
        let constructed = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(2));

        // App bootstrap and session bootstrap both try to create the manager
        let paths: Vec<_> = (0..2)
            .map(|_| {
                let cell = Arc::clone(&cell);
                let constructed = Arc::clone(&constructed);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cell.get_or_init(|| {
                        constructed.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(20));
                        AchievementManager::new()
                    })
                })
            })
            .collect();
        let instances: Vec<_> = paths.into_iter().map(|p| p.join().unwrap()).collect();

        assert!(Arc::ptr_eq(&instances[0], &instances[1]));
        assert_eq!(constructed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_accessors_return_same_instance() {
        let progression = Arc::new(Progression::new(Settings::default()));
        let from_thread = {
            let progression = Arc::clone(&progression);
            thread::spawn(move || progression.achievements()).join().unwrap()
        };
        assert!(Arc::ptr_eq(&progression.achievements(), &from_thread));
        assert!(Arc::ptr_eq(&progression.score(), &progression.score()));
    }

    #[test]
    fn test_global_is_single_instance() {
        let a = thread::spawn(|| Progression::global() as *const Progression as usize);
        let b = thread::spawn(|| {
            Progression::install(Settings::default()) as *const Progression as usize
        });
        assert_eq!(a.join().unwrap(), b.join().unwrap());
        assert!(Arc::ptr_eq(
            &Progression::global().achievements(),
            &Progression::global().achievements()
        ));
    }

    #[test]
    fn test_reset_run_keeps_achievements() {
        let progression = Progression::new(Settings::default());
        progression.score().add_points(10);
        progression.level().advance();
        progression
            .achievements()
            .record_event(super::super::AchievementEvent::EnemyDestroyed);

        progression.reset_run();
        assert_eq!(progression.score().score(), 0);
        assert_eq!(progression.level().current(), 1);
        assert_eq!(progression.achievements().unlocked().len(), 1);
    }
}
