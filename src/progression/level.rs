//! Level progression

use std::sync::Mutex;

use crate::consts::KILLS_PER_LEVEL;
use crate::lock;

#[derive(Debug, Clone, Copy)]
struct LevelState {
    level: u32,
    kills_this_level: u32,
}

/// Current level; advances every `kills_per_level` kills
#[derive(Debug)]
pub struct LevelManager {
    state: Mutex<LevelState>,
    kills_per_level: u32,
}

impl Default for LevelManager {
    fn default() -> Self {
        Self::new(KILLS_PER_LEVEL)
    }
}

impl LevelManager {
    pub const STARTING_LEVEL: u32 = 1;

    pub fn new(kills_per_level: u32) -> Self {
        Self {
            state: Mutex::new(LevelState {
                level: Self::STARTING_LEVEL,
                kills_this_level: 0,
            }),
            kills_per_level: kills_per_level.max(1),
        }
    }

    pub fn current(&self) -> u32 {
        lock(&self.state).level
    }

    /// Go up one level and return it
    pub fn advance(&self) -> u32 {
        Self::level_up(&mut lock(&self.state))
    }

    fn level_up(state: &mut LevelState) -> u32 {
        state.level = state.level.saturating_add(1);
        state.kills_this_level = 0;
        log::info!("Level up: {}", state.level);
        state.level
    }

    /// Count a kill; returns the new level if it triggered a level up
    pub fn record_kill(&self) -> Option<u32> {
        let mut state = lock(&self.state);
        state.kills_this_level += 1;
        (state.kills_this_level >= self.kills_per_level).then(|| Self::level_up(&mut state))
    }

    /// Kills still needed for the next level
    pub fn kills_remaining(&self) -> u32 {
        self.kills_per_level - lock(&self.state).kills_this_level
    }

    /// Jump to a level (new sessions, debug starts)
    pub fn set_level(&self, level: u32) {
        let mut state = lock(&self.state);
        state.level = level;
        state.kills_this_level = 0;
    }

    pub fn reset(&self) {
        self.set_level(Self::STARTING_LEVEL);
    }
}
