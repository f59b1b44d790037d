//! Achievement tracking
//!
//! Each achievement has a progress counter and a target. Recording an event
//! bumps every matching counter; an achievement unlocks the first time its
//! counter reaches the target and never again.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::lock;
use crate::sim::entity::BossVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AchievementId {
    FirstBlood,
    Sharpshooter,
    BossHunter,
    CoinCollector,
    Veteran,
}

impl AchievementId {
    pub const ALL: [AchievementId; 5] = [
        AchievementId::FirstBlood,
        AchievementId::Sharpshooter,
        AchievementId::BossHunter,
        AchievementId::CoinCollector,
        AchievementId::Veteran,
    ];

    /// Localization key for the display name
    pub fn name_key(self) -> &'static str {
        match self {
            AchievementId::FirstBlood => "achievement.first_blood",
            AchievementId::Sharpshooter => "achievement.sharpshooter",
            AchievementId::BossHunter => "achievement.boss_hunter",
            AchievementId::CoinCollector => "achievement.coin_collector",
            AchievementId::Veteran => "achievement.veteran",
        }
    }

    pub fn target(self) -> u32 {
        match self {
            AchievementId::FirstBlood => 1,
            AchievementId::Sharpshooter => 50,
            AchievementId::BossHunter => 3,
            AchievementId::CoinCollector => 100,
            AchievementId::Veteran => 10,
        }
    }
}

/// Gameplay facts that feed achievements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AchievementEvent {
    EnemyDestroyed,
    BossDefeated(BossVariant),
    CoinCollected,
    LevelReached(u32),
}

/// How an event moves an achievement's counter
enum Progress {
    Increment,
    AtLeast(u32),
}

fn progress_for(id: AchievementId, event: AchievementEvent) -> Option<Progress> {
    use AchievementEvent as E;
    use AchievementId as A;
    match (id, event) {
        (A::FirstBlood | A::Sharpshooter, E::EnemyDestroyed | E::BossDefeated(_)) => {
            Some(Progress::Increment)
        }
        (A::BossHunter, E::BossDefeated(_)) => Some(Progress::Increment),
        (A::CoinCollector, E::CoinCollected) => Some(Progress::Increment),
        (A::Veteran, E::LevelReached(level)) => Some(Progress::AtLeast(level)),
        _ => None,
    }
}

/// Serializable view of achievement state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementSnapshot {
    pub progress: BTreeMap<AchievementId, u32>,
    pub unlocked: BTreeSet<AchievementId>,
}

#[derive(Debug, Default)]
pub struct AchievementManager {
    state: Mutex<AchievementSnapshot>,
}

impl AchievementManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore previously saved state
    pub fn from_snapshot(snapshot: AchievementSnapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
        }
    }

    /// Record an event; returns achievements unlocked by it
    pub fn record_event(&self, event: AchievementEvent) -> Vec<AchievementId> {
        let mut guard = lock(&self.state);
        let state = &mut *guard;
        let mut newly = Vec::new();
        for id in AchievementId::ALL {
            let Some(step) = progress_for(id, event) else {
                continue;
            };
            let counter = state.progress.entry(id).or_insert(0);
            *counter = match step {
                Progress::Increment => counter.saturating_add(1),
                Progress::AtLeast(value) => (*counter).max(value),
            };
            if *counter >= id.target() && state.unlocked.insert(id) {
                log::info!("Achievement unlocked: {id:?}");
                newly.push(id);
            }
        }
        newly
    }

    pub fn progress(&self, id: AchievementId) -> u32 {
        lock(&self.state).progress.get(&id).copied().unwrap_or(0)
    }

    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        lock(&self.state).unlocked.contains(&id)
    }

    pub fn unlocked(&self) -> Vec<AchievementId> {
        lock(&self.state).unlocked.iter().copied().collect()
    }

    pub fn snapshot(&self) -> AchievementSnapshot {
        lock(&self.state).clone()
    }
}
