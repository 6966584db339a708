//! # Image Previews
//!
//! Local preview references for the selected images. They are never sent over
//! the network. Each reference is a [`PreviewHandle`] that releases its slot in
//! the [`PreviewRegistry`] when dropped, so a preview lives exactly as long as
//! the selection it shows: replacing the selection or dropping the view frees it.

use log::debug;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::common::messages::{ImageFile, UploadRequest};

/// What a preview points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewEntry {
    pub name: String,
    pub content_type: String,
    pub size: usize,
}

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: AtomicU64,
    entries: Mutex<HashMap<u64, PreviewEntry>>,
}

/// Owner of all live preview references.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    inner: Arc<RegistryInner>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire a preview reference for `file`.
    pub fn create(&self, file: &ImageFile) -> PreviewHandle {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.entries().insert(
            id,
            PreviewEntry {
                name: file.name.clone(),
                content_type: file.content_type.clone(),
                size: file.size(),
            },
        );
        debug!("Preview {} acquired for {}", id, file.name);
        PreviewHandle {
            id,
            registry: self.clone(),
        }
    }

    /// Acquire previews for both sides of a request.
    pub fn create_pair(&self, request: &UploadRequest) -> PreviewPair {
        PreviewPair {
            front: self.create(&request.front),
            back: self.create(&request.back),
        }
    }

    /// Number of references currently held.
    pub fn live(&self) -> usize {
        self.entries().len()
    }

    pub fn get(&self, id: u64) -> Option<PreviewEntry> {
        self.entries().get(&id).cloned()
    }

    fn release(&self, id: u64) {
        if self.entries().remove(&id).is_some() {
            debug!("Preview {} released", id);
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<u64, PreviewEntry>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.inner
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A live preview reference. Dropping it releases the reference.
#[derive(Debug)]
pub struct PreviewHandle {
    id: u64,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Browser-style object URL naming this preview.
    pub fn url(&self) -> String {
        format!("blob:preview/{}", self.id)
    }

    pub fn entry(&self) -> Option<PreviewEntry> {
        self.registry.get(self.id)
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}

#[derive(Debug)]
pub struct PreviewPair {
    pub front: PreviewHandle,
    pub back: PreviewHandle,
}

/// The preview currently on display. Setting a new pair releases the old one.
#[derive(Debug, Default)]
pub struct PreviewSlot {
    current: Option<PreviewPair>,
}

impl PreviewSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, pair: PreviewPair) -> &PreviewPair {
        self.current.insert(pair)
    }

    pub fn current(&self) -> Option<&PreviewPair> {
        self.current.as_ref()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> UploadRequest {
        UploadRequest {
            front: ImageFile::new("front.jpg", "image/jpeg", vec![1, 2, 3]),
            back: ImageFile::new("back.png", "image/png", vec![4, 5]),
        }
    }

    #[test]
    fn test_handle_releases_on_drop() {
        let registry = PreviewRegistry::new();
        let handle = registry.create(&request().front);
        assert_eq!(registry.live(), 1);
        assert_eq!(handle.entry().unwrap().size, 3);
        assert!(handle.url().starts_with("blob:preview/"));

        drop(handle);
        assert_eq!(registry.live(), 0);
    }

    #[test]
    fn test_replacing_selection_releases_previous_pair() {
        let registry = PreviewRegistry::new();
        let mut slot = PreviewSlot::new();

        let first_id = slot.replace(registry.create_pair(&request())).front.id();
        assert_eq!(registry.live(), 2);

        slot.replace(registry.create_pair(&request()));
        assert_eq!(registry.live(), 2);
        assert!(registry.get(first_id).is_none());

        slot.clear();
        assert_eq!(registry.live(), 0);
    }

    #[test]
    fn test_dropping_slot_releases_everything() {
        let registry = PreviewRegistry::new();
        {
            let mut slot = PreviewSlot::new();
            slot.replace(registry.create_pair(&request()));
            assert_eq!(registry.live(), 2);
        }
        assert_eq!(registry.live(), 0);
    }
}
