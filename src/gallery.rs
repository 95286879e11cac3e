use std::sync::Arc;

use slab::Slab;

use crate::llm::media::SourceImage;

/// History keeps the most recent unique uploads; oldest entries are evicted
/// beyond this.
pub const RECENT_UPLOAD_LIMIT: usize = 6;

/// Displayable reference to an image buffer. Handles are linear: acquired
/// from a `PreviewArena` and handed back to it exactly once, when the owning
/// entry is evicted or superseded.
#[derive(Debug)]
pub struct PreviewHandle {
    key: usize,
}

/// Arena of display buffers indexed by handle. Its live count is the
/// resource-lifecycle invariant of the whole crate: one slot per gallery
/// entry plus one for the active selection.
#[derive(Debug, Default)]
pub struct PreviewArena {
    slots: Slab<Arc<SourceImage>>,
}

impl PreviewArena {
    pub fn new() -> Self {
        PreviewArena::default()
    }

    pub fn acquire(&mut self, image: Arc<SourceImage>) -> PreviewHandle {
        PreviewHandle {
            key: self.slots.insert(image),
        }
    }

    pub fn release(&mut self, handle: PreviewHandle) {
        self.slots.try_remove(handle.key);
    }

    pub fn bytes(&self, handle: &PreviewHandle) -> Option<&[u8]> {
        self.slots.get(handle.key).map(|image| image.bytes.as_slice())
    }

    pub fn live_count(&self) -> usize {
        self.slots.len()
    }
}

#[derive(Debug)]
pub struct RecentUpload {
    pub id: u64,
    pub image: Arc<SourceImage>,
    pub preview: PreviewHandle,
}

/// Bounded history of recently used source images, newest first. Re-selecting
/// an entry does not reorder it.
#[derive(Debug, Default)]
pub struct UploadGallery {
    entries: Vec<RecentUpload>,
    next_id: u64,
}

impl UploadGallery {
    pub fn new() -> Self {
        UploadGallery::default()
    }

    /// Records a newly selected image unless an entry with the same
    /// (name, size) already exists. Returns the new entry's id, or None for
    /// duplicates. Evicted entries release their previews.
    pub fn record(&mut self, image: Arc<SourceImage>, previews: &mut PreviewArena) -> Option<u64> {
        let duplicate = self
            .entries
            .iter()
            .any(|entry| entry.image.name == image.name && entry.image.size() == image.size());
        if duplicate {
            return None;
        }

        self.next_id += 1;
        let id = self.next_id;
        let preview = previews.acquire(Arc::clone(&image));
        self.entries.insert(0, RecentUpload { id, image, preview });

        while self.entries.len() > RECENT_UPLOAD_LIMIT {
            if let Some(evicted) = self.entries.pop() {
                previews.release(evicted.preview);
            }
        }
        Some(id)
    }

    pub fn get(&self, id: u64) -> Option<Arc<SourceImage>> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| Arc::clone(&entry.image))
    }

    /// Evicts an entry and releases its preview. Unknown ids are a no-op.
    pub fn remove(&mut self, id: u64, previews: &mut PreviewArena) -> bool {
        match self.entries.iter().position(|entry| entry.id == id) {
            Some(index) => {
                let entry = self.entries.remove(index);
                previews.release(entry.preview);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecentUpload> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
