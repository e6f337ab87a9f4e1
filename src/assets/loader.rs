use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::Context;

use crate::{
    assets::decode::{PreparedImage, decode_image},
    foundation::error::{InsigniaError, InsigniaResult},
};

/// Source of raw image bytes by URL.
pub trait ImageFetcher: Send + Sync {
    /// Fetch the encoded bytes behind `url`.
    fn fetch(&self, url: &str) -> InsigniaResult<Vec<u8>>;
}

/// Reads URLs as paths relative to a filesystem root.
#[derive(Clone, Debug)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    /// Fetcher rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageFetcher for FsFetcher {
    fn fetch(&self, url: &str) -> InsigniaResult<Vec<u8>> {
        let path = self.root.join(Path::new(url));
        std::fs::read(&path)
            .with_context(|| format!("read image bytes from '{}'", path.display()))
            .map_err(InsigniaError::from)
    }
}

/// Loads and memoizes decoded images by URL.
///
/// Candidates are tried strictly in order and the first success wins. Exhausting every candidate
/// yields `None`, which callers treat as "skip this layer". Successful decodes stay cached for the
/// loader's lifetime; the cache is append-only and bounded by the asset catalog.
pub struct ImageLoader {
    fetcher: Box<dyn ImageFetcher>,
    cache: Mutex<HashMap<String, Arc<PreparedImage>>>,
    decode_counts: Mutex<HashMap<String, u32>>,
}

impl std::fmt::Debug for ImageLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageLoader")
            .field("cached", &self.cached_len())
            .finish()
    }
}

impl ImageLoader {
    /// Loader backed by `fetcher`.
    pub fn new(fetcher: impl ImageFetcher + 'static) -> Self {
        Self {
            fetcher: Box::new(fetcher),
            cache: Mutex::new(HashMap::new()),
            decode_counts: Mutex::new(HashMap::new()),
        }
    }

    /// Loader reading from a filesystem root.
    pub fn from_dir(root: impl Into<PathBuf>) -> Self {
        Self::new(FsFetcher::new(root))
    }

    /// Load the first candidate that fetches and decodes.
    pub fn load<S: AsRef<str>>(&self, candidates: &[S]) -> Option<Arc<PreparedImage>> {
        for url in candidates {
            let url = url.as_ref();
            match self.load_one(url) {
                Ok(img) => return Some(img),
                Err(err) => tracing::debug!(url, error = %err, "image candidate failed"),
            }
        }
        if let Some(first) = candidates.first() {
            tracing::warn!(
                url = first.as_ref(),
                candidates = candidates.len(),
                "no image candidate could be loaded"
            );
        }
        None
    }

    /// Load a single URL, consulting the cache first.
    pub fn load_one(&self, url: &str) -> InsigniaResult<Arc<PreparedImage>> {
        if let Some(img) = self.lock_cache()?.get(url) {
            return Ok(img.clone());
        }

        let bytes = self.fetcher.fetch(url)?;
        let img = Arc::new(decode_image(&bytes)?);

        *self
            .decode_counts
            .lock()
            .map_err(|_| InsigniaError::asset("image decode counter poisoned"))?
            .entry(url.to_string())
            .or_insert(0) += 1;

        // A concurrent load of the same URL may have landed first; keep that one.
        let mut cache = self.lock_cache()?;
        Ok(cache.entry(url.to_string()).or_insert(img).clone())
    }

    /// Number of times `url` was fetched and decoded.
    pub fn decode_count(&self, url: &str) -> u32 {
        self.decode_counts
            .lock()
            .map(|c| c.get(url).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Number of cached images.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn lock_cache(
        &self,
    ) -> InsigniaResult<std::sync::MutexGuard<'_, HashMap<String, Arc<PreparedImage>>>> {
        self.cache
            .lock()
            .map_err(|_| InsigniaError::asset("image cache poisoned"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
