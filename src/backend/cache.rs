use std::collections::HashMap;

use super::{GraphicsBackend, ImageHandle};

/// What the cache remembers about an image name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEntry {
    /// Loaded and owned by the backend.
    Loaded(ImageHandle),
    /// The backend failed to load it; not retried until evicted.
    Missing,
}

/// Name-keyed image cache. Loads lazily through the backend and remembers
/// failures so a missing file is reported once rather than every frame.
#[derive(Debug, Default)]
pub struct ImageCache {
    entries: HashMap<String, CacheEntry>,
}

impl ImageCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for `name`, loading it on first use.
    pub fn get_or_load<B: GraphicsBackend + ?Sized>(
        &mut self,
        gfx: &mut B,
        name: &str,
    ) -> Option<ImageHandle> {
        match self.entries.get(name) {
            Some(CacheEntry::Loaded(h)) => return Some(*h),
            Some(CacheEntry::Missing) => return None,
            None => {}
        }
        let entry = match gfx.load_image(name) {
            Ok(h) => {
                log::debug!("loaded image {name} as {h:?}");
                CacheEntry::Loaded(h)
            }
            Err(e) => {
                log::warn!("image {name} unavailable: {e}");
                CacheEntry::Missing
            }
        };
        self.entries.insert(name.to_owned(), entry);
        match entry {
            CacheEntry::Loaded(h) => Some(h),
            CacheEntry::Missing => None,
        }
    }

    /// Registers an image the caller created directly on the backend.
    pub fn insert(&mut self, name: &str, handle: ImageHandle) -> Option<CacheEntry> {
        self.entries.insert(name.to_owned(), CacheEntry::Loaded(handle))
    }

    /// Current entry for `name`, if any.
    pub fn entry(&self, name: &str) -> Option<CacheEntry> {
        self.entries.get(name).copied()
    }

    /// Forgets `name`, freeing its image if it was loaded.
    pub fn evict<B: GraphicsBackend + ?Sized>(&mut self, gfx: &mut B, name: &str) {
        if let Some(CacheEntry::Loaded(h)) = self.entries.remove(name) {
            gfx.free_image(h);
        }
    }

    /// Frees every loaded image and forgets every failure.
    pub fn clear<B: GraphicsBackend + ?Sized>(&mut self, gfx: &mut B) {
        for (_, entry) in self.entries.drain() {
            match entry {
                CacheEntry::Loaded(h) => gfx.free_image(h),
                CacheEntry::Missing => {}
            }
        }
    }

    /// Number of remembered names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
