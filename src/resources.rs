//! Resource cache for immutable visual assets
//!
//! Every image is loaded at most once per logical key for the lifetime of
//! the cache. Entities hold a copyable [`ImageHandle`] instead of the pixel
//! data; the view layer resolves handles back to [`ImageData`] when drawing.
//!
//! Concurrency: the key map lock is only held long enough to find (or
//! create) the per-key slot. The slot lock is held across the load, so a
//! second caller asking for the same unseen key waits for the first load
//! and then reads its result instead of loading again.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

use thiserror::Error;

use crate::lock;

/// Failure to produce an image for a key. The cache keeps no entry for the
/// key afterward, so a later request retries the load.
#[derive(Debug, Error)]
pub enum ResourceLoadError {
    #[error("image '{key}' not found")]
    Missing { key: String },
    #[error("image '{key}' could not be decoded: {source}")]
    Decode {
        key: String,
        #[source]
        source: image::ImageError,
    },
}

impl ResourceLoadError {
    /// Key of the asset that failed to load
    pub fn key(&self) -> &str {
        match self {
            ResourceLoadError::Missing { key } | ResourceLoadError::Decode { key, .. } => key,
        }
    }
}

/// Decoded RGBA8 image. Opaque to the simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl ImageData {
    /// Single-colour image, handy for placeholders and tests
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = (width * height) as usize;
        Self {
            width,
            height,
            rgba: rgba.repeat(pixels),
        }
    }
}

/// Lightweight handle to a cached image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageHandle(u32);

impl ImageHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Source of image bytes. Called at most once per key by [`ResourceCache`].
pub trait ImageLoader: Send + Sync {
    fn load(&self, key: &str) -> Result<ImageData, ResourceLoadError>;
}

/// Loads PNG files relative to an asset root directory
#[derive(Debug, Clone)]
pub struct FsImageLoader {
    root: PathBuf,
}

impl FsImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageLoader for FsImageLoader {
    fn load(&self, key: &str) -> Result<ImageData, ResourceLoadError> {
        let path = self.root.join(key);
        if !path.is_file() {
            return Err(ResourceLoadError::Missing { key: key.to_string() });
        }
        let decoded = image::open(&path).map_err(|source| ResourceLoadError::Decode {
            key: key.to_string(),
            source,
        })?;
        let rgba = decoded.to_rgba8();
        Ok(ImageData {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        })
    }
}

/// Loader that serves a generated placeholder for every key.
///
/// Used by the headless binary, which has no asset directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderLoader;

impl ImageLoader for PlaceholderLoader {
    fn load(&self, key: &str) -> Result<ImageData, ResourceLoadError> {
        // Derive a stable tint from the key so distinct sprites stay distinguishable
        let hash = key
            .bytes()
            .fold(0x811c_9dc5_u32, |h, b| (h ^ b as u32).wrapping_mul(0x0100_0193));
        let [r, g, b, _] = hash.to_le_bytes();
        Ok(ImageData::solid(16, 16, [r, g, b, 255]))
    }
}

/// Keyed, load-once image store
pub struct ResourceCache {
    loader: Box<dyn ImageLoader>,
    /// Per-key slot; `None` until a load succeeds
    slots: Mutex<HashMap<String, Arc<Mutex<Option<ImageHandle>>>>>,
    /// Loaded images, indexed by handle
    images: RwLock<Vec<Arc<ImageData>>>,
}

impl std::fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache")
            .field("loaded", &self.len())
            .finish_non_exhaustive()
    }
}

impl ResourceCache {
    pub fn new(loader: impl ImageLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            slots: Mutex::new(HashMap::new()),
            images: RwLock::new(Vec::new()),
        }
    }

    /// Get the handle for `key`, loading it on first use
    pub fn get(&self, key: &str) -> Result<ImageHandle, ResourceLoadError> {
        let slot = {
            let mut slots = lock(&self.slots);
            Arc::clone(slots.entry(key.to_string()).or_default())
        };

        let mut loaded = lock(&slot);
        if let Some(handle) = *loaded {
            return Ok(handle);
        }

        let data = match self.loader.load(key) {
            Ok(data) => data,
            Err(err) => {
                log::warn!("Resource load failed: {err}");
                return Err(err);
            }
        };

        let handle = {
            let mut images = self.images.write().unwrap_or_else(|e| e.into_inner());
            images.push(Arc::new(data));
            ImageHandle((images.len() - 1) as u32)
        };
        *loaded = Some(handle);
        log::debug!("Loaded image '{key}' as {handle:?}");

        Ok(handle)
    }

    /// Resolve a handle to its shared image data
    pub fn resolve(&self, handle: ImageHandle) -> Option<Arc<ImageData>> {
        let images = self.images.read().unwrap_or_else(|e| e.into_inner());
        images.get(handle.index()).cloned()
    }

    /// Whether `key` has a successfully loaded entry
    pub fn contains(&self, key: &str) -> bool {
        let slot = lock(&self.slots).get(key).cloned();
        slot.is_some_and(|slot| lock(&slot).is_some())
    }

    /// Number of loaded images
    pub fn len(&self) -> usize {
        self.images.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
