//! Sound effect dispatch
//!
//! The core only names sounds; an [`AudioSink`] supplied by the host plays
//! them. Playback is fire-and-forget: sink failures are logged and dropped
//! so they never reach gameplay.

use std::sync::Mutex;

use thiserror::Error;

use crate::lock;
use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio device unavailable")]
    Unavailable,
    #[error("failed to play '{key}': {reason}")]
    Playback { key: &'static str, reason: String },
}

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Player fires
    PlayerShot,
    /// Enemy fires
    EnemyShot,
    /// Hostile ship hit but not destroyed
    EnemyHit,
    /// Regular enemy destroyed
    EnemyExplode,
    /// Boss enters the arena
    BossWarning,
    /// Boss destroyed
    BossExplode,
    /// Player takes damage
    PlayerHit,
    /// Hit absorbed by the shield
    ShieldAbsorb,
    /// Shield raised
    ShieldUp,
    /// Coin collected
    CoinPickup,
    /// Level up
    LevelUp,
    /// Achievement unlocked
    Achievement,
    /// Game over
    GameOver,
}

impl SoundEffect {
    /// Asset key handed to the sink
    pub fn key(self) -> &'static str {
        match self {
            SoundEffect::PlayerShot => "sfx/player_shot.wav",
            SoundEffect::EnemyShot => "sfx/enemy_shot.wav",
            SoundEffect::EnemyHit => "sfx/enemy_hit.wav",
            SoundEffect::EnemyExplode => "sfx/enemy_explode.wav",
            SoundEffect::BossWarning => "sfx/boss_warning.wav",
            SoundEffect::BossExplode => "sfx/boss_explode.wav",
            SoundEffect::PlayerHit => "sfx/player_hit.wav",
            SoundEffect::ShieldAbsorb => "sfx/shield_absorb.wav",
            SoundEffect::ShieldUp => "sfx/shield_up.wav",
            SoundEffect::CoinPickup => "sfx/coin.wav",
            SoundEffect::LevelUp => "sfx/level_up.wav",
            SoundEffect::Achievement => "sfx/achievement.wav",
            SoundEffect::GameOver => "sfx/game_over.wav",
        }
    }
}

/// Audio collaborator
pub trait AudioSink: Send {
    fn play(&mut self, key: &'static str, volume: f32) -> Result<(), AudioError>;
}

/// Sink that discards everything (headless runs, tests)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&mut self, _key: &'static str, _volume: f32) -> Result<(), AudioError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct Mix {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

/// Audio manager for the game
pub struct AudioManager {
    mix: Mutex<Mix>,
    sink: Mutex<Box<dyn AudioSink>>,
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("mix", &*lock(&self.mix))
            .finish_non_exhaustive()
    }
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        Self {
            mix: Mutex::new(Mix {
                master_volume: settings.master_volume.clamp(0.0, 1.0),
                sfx_volume: settings.sfx_volume.clamp(0.0, 1.0),
                muted: settings.muted,
            }),
            sink: Mutex::new(Box::new(NullSink)),
        }
    }

    /// Route playback to a host sink
    pub fn attach_sink(&self, sink: impl AudioSink + 'static) {
        *lock(&self.sink) = Box::new(sink);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&self, vol: f32) {
        lock(&self.mix).master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&self, vol: f32) {
        lock(&self.mix).sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&self, muted: bool) {
        lock(&self.mix).muted = muted;
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        let mix = *lock(&self.mix);
        if mix.muted {
            0.0
        } else {
            mix.master_volume * mix.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        if let Err(err) = lock(&self.sink).play(effect.key(), vol) {
            log::warn!("Audio: {err}");
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Arc;

    /// Sink that records what it was asked to play
    #[derive(Clone, Default)]
    pub(crate) struct RecordingSink {
        pub(crate) played: Arc<Mutex<Vec<&'static str>>>,
        pub(crate) fail: bool,
    }

    impl AudioSink for RecordingSink {
        fn play(&mut self, key: &'static str, _volume: f32) -> Result<(), AudioError> {
            lock(&self.played).push(key);
            if self.fail {
                return Err(AudioError::Unavailable);
            }
            Ok(())
        }
    }

    #[test]
    fn test_play_reaches_sink() {
        let audio = AudioManager::default();
        let sink = RecordingSink::default();
        audio.attach_sink(sink.clone());
        audio.play(SoundEffect::CoinPickup);
        assert_eq!(*lock(&sink.played), vec!["sfx/coin.wav"]);
    }

    #[test]
    fn test_muted_skips_sink() {
        let audio = AudioManager::default();
        let sink = RecordingSink::default();
        audio.attach_sink(sink.clone());
        audio.set_muted(true);
        audio.play(SoundEffect::GameOver);
        assert!(lock(&sink.played).is_empty());
    }

    #[test]
    fn test_sink_failure_is_swallowed() {
        let audio = AudioManager::default();
        let sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        audio.attach_sink(sink.clone());
        audio.play(SoundEffect::PlayerHit);
        audio.play(SoundEffect::PlayerHit);
        assert_eq!(lock(&sink.played).len(), 2);
    }
}
