//! Key Registry Module
//!
//! Tracks which keys a remote backend instance has written.

use std::collections::{HashSet, VecDeque};

use parking_lot::Mutex;

#[derive(Debug, Default)]
struct Tracked {
    order: VecDeque<String>,
    index: HashSet<String>,
}

impl Tracked {
    fn insert(&mut self, key: &str) {
        if self.index.insert(key.to_string()) {
            self.order.push_back(key.to_string());
        }
    }
}

// == Key Registry ==
/// Ordered, duplicate-free record of written keys.
///
/// Keys are kept in first-write order. The registry is a local belief about
/// ownership, not a view of the store: keys may have expired remotely
/// without being removed here.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    keys: Mutex<Tracked>,
}

impl KeyRegistry {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Record ==
    /// Records a key. Recording a known key is a no-op.
    pub fn record(&self, key: &str) {
        self.keys.lock().insert(key);
    }

    /// Records several keys under a single lock acquisition.
    pub fn record_all<'a, I>(&self, new_keys: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut keys = self.keys.lock();
        for key in new_keys {
            keys.insert(key);
        }
    }

    // == Remove ==
    /// Forgets the given keys. Unknown keys are ignored.
    pub fn remove_all(&self, removed: &[String]) {
        let mut keys = self.keys.lock();
        let before = keys.index.len();
        for key in removed {
            keys.index.remove(key);
        }
        if keys.index.len() != before {
            let Tracked { order, index } = &mut *keys;
            order.retain(|k| index.contains(k));
        }
    }

    /// Empties the registry.
    pub fn clear(&self) {
        let mut keys = self.keys.lock();
        keys.order.clear();
        keys.index.clear();
    }

    // == Contains ==
    pub fn contains(&self, key: &str) -> bool {
        self.keys.lock().index.contains(key)
    }

    // == Snapshot ==
    /// Point-in-time copy of the tracked keys, in first-write order.
    pub fn snapshot(&self) -> Vec<String> {
        self.keys.lock().order.iter().cloned().collect()
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.keys.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.lock().order.is_empty()
    }
}
