//! Embed registry
//!
//! Side table of intercepted frames keyed by frame identity. Entries hold a [`Weak`]
//! handle, so a frame that the page removes is dropped as soon as the document lets
//! go of it; the dead entry is pruned on the next scan.
//!
//! The key is the address of the frame's shared allocation. A live `Weak` keeps that
//! allocation reserved, so an address cannot be reused by another frame while the
//! entry exists.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

pub struct EmbedRecord<F> {
    frame: Weak<F>,
    original_source: String,
}

impl<F> EmbedRecord<F> {
    pub fn frame(&self) -> Option<Arc<F>> {
        self.frame.upgrade()
    }

    pub fn original_source(&self) -> &str {
        &self.original_source
    }

    fn is_live(&self) -> bool {
        self.frame.strong_count() > 0
    }
}

pub struct EmbedRegistry<F> {
    entries: HashMap<usize, EmbedRecord<F>>,
}

impl<F> EmbedRegistry<F> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    fn key(frame: &Arc<F>) -> usize {
        Arc::as_ptr(frame) as usize
    }

    pub fn is_tracked(&self, frame: &Arc<F>) -> bool {
        self.entries.contains_key(&Self::key(frame))
    }

    /// Start tracking a frame. Returns false (and changes nothing) if already tracked.
    pub fn track(&mut self, frame: &Arc<F>, original_source: String) -> bool {
        let key = Self::key(frame);
        if self.entries.contains_key(&key) {
            return false;
        }

        self.entries.insert(
            key,
            EmbedRecord {
                frame: Arc::downgrade(frame),
                original_source,
            },
        );
        true
    }

    pub fn lookup(&self, frame: &Arc<F>) -> Option<&str> {
        self.entries
            .get(&Self::key(frame))
            .map(EmbedRecord::original_source)
    }

    /// Stop tracking a frame, returning its recorded original source.
    pub fn untrack(&mut self, frame: &Arc<F>) -> Option<String> {
        self.entries
            .remove(&Self::key(frame))
            .map(|record| record.original_source)
    }

    /// Drop entries whose frame no longer exists. Returns how many were removed.
    pub fn prune(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, record| record.is_live());
        before - self.entries.len()
    }

    /// Live tracked frames, in no particular order.
    pub fn frames(&self) -> Vec<Arc<F>> {
        self.entries.values().filter_map(EmbedRecord::frame).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<F> Default for EmbedRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}
