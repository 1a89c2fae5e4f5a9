//! Headless in-memory document
//!
//! Used for tests and for driving the interceptor outside a browser.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::document::{Document, EmbedFrame, WindowId, SOURCE_ATTRIBUTE};

pub struct MemoryFrame {
    window: Option<WindowId>,
    attributes: RwLock<HashMap<String, String>>,
    source_writes: AtomicUsize,
}

impl MemoryFrame {
    pub fn new(source: Option<&str>) -> Self {
        let mut attributes = HashMap::new();
        if let Some(source) = source {
            attributes.insert(SOURCE_ATTRIBUTE.to_string(), source.to_string());
        }

        Self {
            window: Some(WindowId::new()),
            attributes: RwLock::new(attributes),
            source_writes: AtomicUsize::new(0),
        }
    }

    /// Number of times the source attribute was written (each write reloads a real frame).
    pub fn source_writes(&self) -> usize {
        self.source_writes.load(Ordering::SeqCst)
    }
}

impl EmbedFrame for MemoryFrame {
    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.read().get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        if name == SOURCE_ATTRIBUTE {
            self.source_writes.fetch_add(1, Ordering::SeqCst);
        }
        self.attributes
            .write()
            .insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&self, name: &str) {
        self.attributes.write().remove(name);
    }

    fn window(&self) -> Option<WindowId> {
        self.window
    }
}

const DEFAULT_LOCATION: &str = "https://www.youtube.com/";

struct DocumentInner {
    frames: Vec<Arc<MemoryFrame>>,
    has_body: bool,
    location: String,
}

impl DocumentInner {
    fn new(has_body: bool) -> Self {
        Self {
            frames: Vec::new(),
            has_body,
            location: DEFAULT_LOCATION.to_string(),
        }
    }
}

pub struct MemoryDocument {
    inner: Arc<RwLock<DocumentInner>>,
}

impl MemoryDocument {
    /// A loaded document with a body.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(DocumentInner::new(true))),
        }
    }

    /// A document still being parsed: no body yet.
    pub fn without_body() -> Self {
        Self {
            inner: Arc::new(RwLock::new(DocumentInner::new(false))),
        }
    }

    pub fn with_location(self, location: &str) -> Self {
        self.set_location(location);
        self
    }

    pub fn set_location(&self, location: &str) {
        self.inner.write().location = location.to_string();
    }

    pub fn attach_body(&self) {
        self.inner.write().has_body = true;
    }

    pub fn add_frame(&self, source: Option<&str>) -> Arc<MemoryFrame> {
        let frame = Arc::new(MemoryFrame::new(source));
        self.inner.write().frames.push(Arc::clone(&frame));
        frame
    }

    /// Attach an existing frame, e.g. one the page moved back into the document.
    pub fn insert_frame(&self, frame: Arc<MemoryFrame>) {
        let mut inner = self.inner.write();
        if !inner.frames.iter().any(|f| Arc::ptr_eq(f, &frame)) {
            inner.frames.push(frame);
        }
    }

    /// Detach a frame. Returns false if it was not attached.
    pub fn remove_frame(&self, frame: &Arc<MemoryFrame>) -> bool {
        let mut inner = self.inner.write();
        let before = inner.frames.len();
        inner.frames.retain(|f| !Arc::ptr_eq(f, frame));
        inner.frames.len() != before
    }

    pub fn frame_count(&self) -> usize {
        self.inner.read().frames.len()
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryDocument {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Document for MemoryDocument {
    type Frame = MemoryFrame;

    fn frames(&self) -> Vec<Arc<MemoryFrame>> {
        self.inner.read().frames.clone()
    }

    fn has_observation_root(&self) -> bool {
        self.inner.read().has_body
    }

    fn location(&self) -> String {
        self.inner.read().location.clone()
    }
}
