//! Bounded, most-recent-first history of completed assets.

use crate::types::GeneratedAsset;
use std::collections::VecDeque;
use std::sync::Mutex;

pub const DEFAULT_HISTORY_CAPACITY: usize = 12;

/// Most-recent-first bounded collection of completed generations.
///
/// Insertions are serialized, so submissions completing concurrently cannot
/// interleave the append-then-trim sequence. Entries leave the collection
/// only by eviction; at most one entry is inserted per completed submission
/// and failures insert nothing.
#[derive(Debug)]
pub struct AssetHistory {
    capacity: usize,
    entries: Mutex<VecDeque<GeneratedAsset>>,
}

impl Default for AssetHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl AssetHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(VecDeque::new()),
        }
    }

    /// Insert a completed asset at the front, evicting the oldest entry once
    /// over capacity.
    pub fn insert(&self, asset: GeneratedAsset) {
        let mut entries = self.entries.lock().expect("history mutex poisoned");
        entries.push_front(asset);
        entries.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("history mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the current entries, most recent first.
    pub fn snapshot(&self) -> Vec<GeneratedAsset> {
        self.entries
            .lock()
            .expect("history mutex poisoned")
            .iter()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GenerationSettings, GeneratedAsset};
    use chrono::Utc;

    fn asset(n: usize) -> GeneratedAsset {
        GeneratedAsset {
            id: format!("asset-{n}"),
            url: format!("https://x/{n}.png"),
            prompt: "a banana".to_string(),
            created_at: Utc::now(),
            settings: GenerationSettings::default(),
        }
    }

    #[test]
    fn holds_at_most_capacity_entries_most_recent_first() {
        let history = AssetHistory::default();
        for n in 0..15 {
            history.insert(asset(n));
        }
        let entries = history.snapshot();
        assert_eq!(entries.len(), DEFAULT_HISTORY_CAPACITY);
        assert_eq!(entries[0].id, "asset-14");
        assert_eq!(entries.last().unwrap().id, "asset-3");
    }

    #[test]
    fn below_capacity_keeps_everything() {
        let history = AssetHistory::default();
        for n in 0..5 {
            history.insert(asset(n));
        }
        assert_eq!(history.len(), 5);
        assert_eq!(history.snapshot()[0].id, "asset-4");
    }

    #[test]
    fn concurrent_insertions_preserve_capacity() {
        use std::sync::Arc;

        let history = Arc::new(AssetHistory::with_capacity(12));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let history = Arc::clone(&history);
                std::thread::spawn(move || {
                    for n in 0..10 {
                        history.insert(asset(t * 10 + n));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(history.len(), 12);
    }
}
