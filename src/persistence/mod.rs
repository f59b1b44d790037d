//! Save/load of settings and high scores
//!
//! Features:
//! - Versioned JSON envelope
//! - Atomic replace (write tmp, then rename over the save)
//! - Missing files load as defaults
//!
//! Only called at session boundaries, never mid-tick.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::highscores::HighScores;
use crate::lock;
use crate::settings::Settings;

/// Current envelope format version
pub const FORMAT_VERSION: u32 = 1;

const HIGH_SCORES_FILE: &str = "highscores.json";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed save data in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path} has format version {found}, expected at most {FORMAT_VERSION}")]
    UnsupportedVersion { path: PathBuf, found: u32 },
}

/// Persistence collaborator
pub trait Store: Send + Sync {
    fn load_high_scores(&self) -> Result<HighScores, PersistenceError>;
    fn save_high_scores(&self, scores: &HighScores) -> Result<(), PersistenceError>;
    fn load_settings(&self) -> Result<Settings, PersistenceError>;
    fn save_settings(&self, settings: &Settings) -> Result<(), PersistenceError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    payload: T,
}

fn encode<T: Serialize>(path: &Path, payload: &T) -> Result<String, PersistenceError> {
    serde_json::to_string_pretty(&Envelope {
        version: FORMAT_VERSION,
        payload,
    })
    .map_err(|source| PersistenceError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn decode<T: DeserializeOwned>(path: &Path, json: &str) -> Result<T, PersistenceError> {
    let envelope: Envelope<T> =
        serde_json::from_str(json).map_err(|source| PersistenceError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    if envelope.version > FORMAT_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: envelope.version,
        });
    }
    Ok(envelope.payload)
}

/// JSON files in a save directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T, PersistenceError> {
        let path = self.dir.join(name);
        match std::fs::read_to_string(&path) {
            Ok(json) => {
                let value = decode(&path, &json)?;
                log::info!("Loaded {}", path.display());
                Ok(value)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No {} yet, using defaults", path.display());
                Ok(T::default())
            }
            Err(source) => Err(PersistenceError::Io { path, source }),
        }
    }

    fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<(), PersistenceError> {
        let path = self.dir.join(name);
        std::fs::create_dir_all(&self.dir).map_err(|source| PersistenceError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let json = encode(&path, value)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|source| PersistenceError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| PersistenceError::Io {
            path: path.clone(),
            source,
        })?;
        log::info!("Saved {}", path.display());
        Ok(())
    }
}

impl Store for JsonFileStore {
    fn load_high_scores(&self) -> Result<HighScores, PersistenceError> {
        self.load(HIGH_SCORES_FILE)
    }

    fn save_high_scores(&self, scores: &HighScores) -> Result<(), PersistenceError> {
        self.save(HIGH_SCORES_FILE, scores)
    }

    fn load_settings(&self) -> Result<Settings, PersistenceError> {
        self.load::<Settings>(SETTINGS_FILE).map(Settings::sanitized)
    }

    fn save_settings(&self, settings: &Settings) -> Result<(), PersistenceError> {
        self.save(SETTINGS_FILE, settings)
    }
}

/// In-memory store holding the same envelopes a file store would write
#[derive(Debug, Default)]
pub struct MemoryStore {
    high_scores: Mutex<Option<String>>,
    settings: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn load<T: DeserializeOwned + Default>(
        slot: &Mutex<Option<String>>,
        name: &str,
    ) -> Result<T, PersistenceError> {
        match lock(slot).as_deref() {
            Some(json) => decode(Path::new(name), json),
            None => Ok(T::default()),
        }
    }

    fn save<T: Serialize>(
        slot: &Mutex<Option<String>>,
        name: &str,
        value: &T,
    ) -> Result<(), PersistenceError> {
        let json = encode(Path::new(name), value)?;
        *lock(slot) = Some(json);
        Ok(())
    }
}

impl Store for MemoryStore {
    fn load_high_scores(&self) -> Result<HighScores, PersistenceError> {
        Self::load(&self.high_scores, HIGH_SCORES_FILE)
    }

    fn save_high_scores(&self, scores: &HighScores) -> Result<(), PersistenceError> {
        Self::save(&self.high_scores, HIGH_SCORES_FILE, scores)
    }

    fn load_settings(&self) -> Result<Settings, PersistenceError> {
        Self::load::<Settings>(&self.settings, SETTINGS_FILE).map(Settings::sanitized)
    }

    fn save_settings(&self, settings: &Settings) -> Result<(), PersistenceError> {
        Self::save(&self.settings, SETTINGS_FILE, settings)
    }
}
