//! Process-wide buffer cache keyed by URL.
//!
//! Populated lazily on a miss and never evicted, so reinitializing an
//! engine (or creating a second one) does not decode the same file twice.

use std::cell::RefCell;

use rustc_hash::FxHashMap;

use super::backend::{AudioBackend, AudioBuffer};
use crate::core::error::Result;

thread_local! {
    static BUFFERS: RefCell<FxHashMap<String, AudioBuffer>> = RefCell::new(FxHashMap::default());
}

/// Accessors for the shared buffer cache.
pub struct BufferCache;

impl BufferCache {
    /// The cached buffer for `url`, loading it through `backend` on a miss.
    pub fn get_or_load(url: &str, backend: &dyn AudioBackend) -> Result<AudioBuffer> {
        if let Some(buffer) = Self::get(url) {
            return Ok(buffer);
        }
        let buffer = backend.load_buffer(url)?;
        BUFFERS.with(|buffers| buffers.borrow_mut().insert(url.to_string(), buffer.clone()));
        Ok(buffer)
    }

    #[must_use]
    pub fn get(url: &str) -> Option<AudioBuffer> {
        BUFFERS.with(|buffers| buffers.borrow().get(url).cloned())
    }

    #[must_use]
    pub fn contains(url: &str) -> bool {
        BUFFERS.with(|buffers| buffers.borrow().contains_key(url))
    }

    #[must_use]
    pub fn len() -> usize {
        BUFFERS.with(|buffers| buffers.borrow().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::backend::RecordingAudioBackend;

    #[test]
    fn test_miss_loads_once() {
        let backend = RecordingAudioBackend::new().with_buffer("sfx/click.mp3", 0.25);

        let first = BufferCache::get_or_load("sfx/click.mp3", &backend).unwrap();
        let second = BufferCache::get_or_load("sfx/click.mp3", &backend).unwrap();

        assert_eq!(first, second);
        assert_eq!(backend.loads(), vec!["sfx/click.mp3"]);
        assert!(BufferCache::contains("sfx/click.mp3"));
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let backend = RecordingAudioBackend::new();

        assert!(BufferCache::get_or_load("sfx/missing.mp3", &backend).is_err());
        assert!(!BufferCache::contains("sfx/missing.mp3"));
    }
}
