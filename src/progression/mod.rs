//! Process-wide progression managers
//!
//! Level, score, achievement, audio and language managers are shared by
//! every subsystem through a single [`Progression`] registry.

pub mod achievements;
pub mod level;
pub mod registry;
pub mod score;

pub use achievements::{AchievementEvent, AchievementId, AchievementManager, AchievementSnapshot};
pub use level::LevelManager;
pub use registry::{InitOnce, Progression};
pub use score::{ScoreManager, ScoreSnapshot};
