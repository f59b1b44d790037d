//! Session boundaries
//!
//! Persistence is touched only here: the leaderboard is loaded when a
//! session begins and the finished run is committed and saved when it ends.
//! Nothing in the per-tick path reads or writes the store.

use std::sync::Arc;

use crate::persistence::{PersistenceError, Store};
use crate::progression::Progression;
use crate::settings::Settings;
use crate::sim::GameState;

/// Final numbers for a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub score: u64,
    pub coins: u64,
    pub level: u32,
    /// Leaderboard rank (1-based) if the run placed
    pub rank: Option<usize>,
    pub high_score: u64,
}

/// A play session bound to a store
pub struct Session {
    store: Arc<dyn Store>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    /// Settings to build the progression registry from
    pub fn load_settings(store: &dyn Store) -> Result<Settings, PersistenceError> {
        store.load_settings()
    }

    /// Start a session: clear run state and install the saved leaderboard
    pub fn begin(
        store: Arc<dyn Store>,
        progression: &Progression,
    ) -> Result<Self, PersistenceError> {
        let board = store.load_high_scores()?;
        log::info!("Session start, {} high score(s) on file", board.entries.len());
        progression.reset_run();
        progression.score().set_high_scores(board);
        Ok(Self { store })
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), PersistenceError> {
        self.store.save_settings(settings)
    }

    /// End the run: tear down the world, record the result and save the board
    pub fn finish(
        self,
        progression: &Progression,
        state: &mut GameState,
    ) -> Result<RunSummary, PersistenceError> {
        state.end_session();
        let score = progression.score();
        let level = progression.level().current();
        let rank = score.commit_run(level);
        let snapshot = score.snapshot();
        self.store.save_high_scores(&score.high_scores())?;

        let summary = RunSummary {
            score: snapshot.score,
            coins: snapshot.coins,
            level,
            rank,
            high_score: snapshot.high_score,
        };
        log::info!("Session end: {summary:?}");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{JsonFileStore, MemoryStore};
    use crate::resources::ResourceCache;
    use crate::resources::tests::CountingLoader;
    use crate::settings::Difficulty;
    use crate::sim::EntityFactory;

    fn new_state() -> GameState {
        let cache = Arc::new(ResourceCache::new(Arc::new(CountingLoader::default())));
        GameState::new(1, EntityFactory::new(cache), Difficulty::Normal).unwrap()
    }

    #[test]
    fn test_run_is_committed_and_reloaded() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());

        let progression = Progression::new(Settings::default());
        let session = Session::begin(Arc::clone(&store), &progression).unwrap();
        let mut state = new_state();
        progression.score().add_points(750);
        progression.score().add_coins(3);
        let summary = session.finish(&progression, &mut state).unwrap();

        assert_eq!(summary.rank, Some(1));
        assert_eq!(summary.coins, 3);
        assert!(state.world.is_empty());

        // A later session sees the saved board and starts from zero
        let progression = Progression::new(Settings::default());
        Session::begin(Arc::clone(&store), &progression).unwrap();
        let snapshot = progression.score().snapshot();
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.high_score, 750);
    }

    #[test]
    fn test_file_backed_session() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn Store> = Arc::new(JsonFileStore::new(dir.path()));

        let settings = Session::load_settings(store.as_ref()).unwrap();
        assert_eq!(settings, Settings::default());

        let progression = Progression::new(settings);
        let session = Session::begin(Arc::clone(&store), &progression).unwrap();
        session
            .save_settings(&Settings::with_difficulty(Difficulty::Hard))
            .unwrap();
        progression.score().add_points(10);
        session.finish(&progression, &mut new_state()).unwrap();

        assert_eq!(store.load_settings().unwrap().difficulty, Difficulty::Hard);
        assert_eq!(store.load_high_scores().unwrap().top_score(), Some(10));
    }
}
