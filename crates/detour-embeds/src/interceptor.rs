//! Embed interception state machine
//!
//! A scan reconciles every frame of a document against the current behavior:
//! `Replace` moves eligible frames to the placeholder, `None` restores every frame
//! that is still showing one. Scans are idempotent; a second scan over an unchanged
//! document writes nothing.

use std::sync::Arc;

use crate::document::{Document, EmbedFrame, WindowId};
use crate::placeholder::{is_embed_source, PlaceholderResource};
use crate::registry::EmbedRegistry;
use crate::state::{
    bypass_marker, is_bypass_marker, EmbedState, InterceptionBehavior, BYPASS_ATTRIBUTE,
    STATE_ATTRIBUTE,
};

/// What a single scan changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub intercepted: usize,
    pub restored: usize,
}

impl ScanOutcome {
    pub fn is_noop(&self) -> bool {
        self.intercepted == 0 && self.restored == 0
    }
}

pub struct EmbedInterceptor<F> {
    registry: EmbedRegistry<F>,
    placeholder: PlaceholderResource,
}

impl<F: EmbedFrame> EmbedInterceptor<F> {
    pub fn new(placeholder: PlaceholderResource) -> Self {
        Self {
            registry: EmbedRegistry::new(),
            placeholder,
        }
    }

    pub fn placeholder(&self) -> &PlaceholderResource {
        &self.placeholder
    }

    pub fn registry(&self) -> &EmbedRegistry<F> {
        &self.registry
    }

    /// Reconcile all frames of `document` with `behavior`.
    pub fn scan<D>(
        &mut self,
        document: &D,
        behavior: InterceptionBehavior,
        label: &str,
    ) -> ScanOutcome
    where
        D: Document<Frame = F>,
    {
        let pruned = self.registry.prune();
        if pruned > 0 {
            tracing::debug!(pruned, "Dropped registry entries for removed frames");
        }

        match behavior {
            InterceptionBehavior::Replace => {
                let mut intercepted = 0;
                for frame in &document.frames() {
                    if self.should_intercept(frame) && self.intercept(frame, label) {
                        intercepted += 1;
                    }
                }
                ScanOutcome {
                    intercepted,
                    restored: 0,
                }
            }
            InterceptionBehavior::None => ScanOutcome {
                intercepted: 0,
                restored: self.restore_attached(document),
            },
        }
    }

    /// Eligibility for moving a frame to the placeholder.
    pub fn should_intercept(&self, frame: &Arc<F>) -> bool {
        if is_bypass_marker(frame.attribute(BYPASS_ATTRIBUTE).as_deref()) {
            return false;
        }

        if self.registry.is_tracked(frame) {
            return false;
        }

        let source = match frame.source() {
            Some(source) if !source.is_empty() => source,
            _ => return false,
        };

        is_embed_source(&source) && !self.placeholder.is_placeholder_source(&source)
    }

    fn intercept(&mut self, frame: &Arc<F>, label: &str) -> bool {
        let original = match frame.source() {
            Some(source) if !source.is_empty() => source,
            _ => return false,
        };

        if !self.state_of(frame).can_transition_to(EmbedState::Placeholder) {
            return false;
        }

        if !self.registry.track(frame, original.clone()) {
            return false;
        }

        frame.set_attribute(STATE_ATTRIBUTE, EmbedState::Placeholder.as_str());
        frame.set_source(&self.placeholder.url_for(&original, label));

        tracing::info!(source = %original, "Replaced embed with placeholder");

        true
    }

    /// Restore every attached frame whose marker says it shows the placeholder. Frames
    /// detached from the document keep their entry until they come back or are dropped.
    fn restore_attached<D>(&mut self, document: &D) -> usize
    where
        D: Document<Frame = F>,
    {
        let mut restored = 0;
        for frame in &document.frames() {
            let marker = frame.attribute(STATE_ATTRIBUTE);
            if EmbedState::from_marker(marker.as_deref()) != EmbedState::Placeholder {
                continue;
            }
            if self.restore(frame, false) {
                restored += 1;
            }
        }
        restored
    }

    /// Put a frame back to its recorded original source.
    ///
    /// With `persist_bypass` the frame is marked so later scans skip it; otherwise any
    /// earlier bypass marker is cleared. Returns false if the frame was not tracked.
    pub fn restore(&mut self, frame: &Arc<F>, persist_bypass: bool) -> bool {
        let Some(original) = self.registry.untrack(frame) else {
            return false;
        };

        if persist_bypass {
            frame.set_attribute(BYPASS_ATTRIBUTE, bypass_marker());
        } else {
            frame.remove_attribute(BYPASS_ATTRIBUTE);
        }

        frame.remove_attribute(STATE_ATTRIBUTE);

        if frame.source().as_deref() != Some(original.as_str()) {
            frame.set_source(&original);
        }

        tracing::info!(source = %original, bypass = persist_bypass, "Restored original embed");

        true
    }

    /// Find the tracked frame whose content window is `window`.
    pub fn find_by_window(&self, window: WindowId) -> Option<Arc<F>> {
        self.registry
            .frames()
            .into_iter()
            .find(|frame| frame.window() == Some(window))
    }

    pub fn original_source(&self, frame: &Arc<F>) -> Option<&str> {
        self.registry.lookup(frame)
    }

    pub fn state_of(&self, frame: &Arc<F>) -> EmbedState {
        if self.registry.is_tracked(frame) {
            EmbedState::Placeholder
        } else {
            EmbedState::Untouched
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;

    const PLACEHOLDER: &str = "chrome-extension://detour/iframe-placeholder.html";
    const EMBED: &str = "https://www.youtube.com/embed/dQw4w9WgXcQ?start=5&si=a%20b";

    fn interceptor() -> EmbedInterceptor<crate::memory::MemoryFrame> {
        EmbedInterceptor::new(PlaceholderResource::parse(PLACEHOLDER).unwrap())
    }

    #[test]
    fn test_replace_then_restore() {
        let doc = MemoryDocument::new();
        let frame = doc.add_frame(Some(EMBED));
        let mut interceptor = interceptor();

        let outcome = interceptor.scan(&doc, InterceptionBehavior::Replace, "Watch on");
        assert_eq!(outcome.intercepted, 1);

        let source = frame.source().unwrap();
        assert!(source.starts_with(PLACEHOLDER));
        assert!(source.contains("video="));
        assert_eq!(
            frame.attribute(STATE_ATTRIBUTE).as_deref(),
            Some("placeholder")
        );
        assert_eq!(interceptor.original_source(&frame), Some(EMBED));
        assert_eq!(interceptor.state_of(&frame), EmbedState::Placeholder);

        let outcome = interceptor.scan(&doc, InterceptionBehavior::None, "Watch on");
        assert_eq!(outcome.restored, 1);
        assert_eq!(frame.source().as_deref(), Some(EMBED));
        assert_eq!(frame.attribute(STATE_ATTRIBUTE), None);
        assert!(interceptor.registry().is_empty());
    }

    #[test]
    fn test_second_scan_is_noop() {
        let doc = MemoryDocument::new();
        let frame = doc.add_frame(Some(EMBED));
        let mut interceptor = interceptor();

        interceptor.scan(&doc, InterceptionBehavior::Replace, "Watch on");
        let writes = frame.source_writes();
        let source = frame.source();

        let outcome = interceptor.scan(&doc, InterceptionBehavior::Replace, "Watch on");
        assert!(outcome.is_noop());
        assert_eq!(frame.source_writes(), writes);
        assert_eq!(frame.source(), source);

        interceptor.scan(&doc, InterceptionBehavior::None, "Watch on");
        let writes = frame.source_writes();
        let outcome = interceptor.scan(&doc, InterceptionBehavior::None, "Watch on");
        assert!(outcome.is_noop());
        assert_eq!(frame.source_writes(), writes);
    }

    #[test]
    fn test_ineligible_frames_untouched() {
        let doc = MemoryDocument::new();
        let no_source = doc.add_frame(None);
        let empty = doc.add_frame(Some(""));
        let other = doc.add_frame(Some("https://player.vimeo.com/video/1"));
        let already = doc.add_frame(Some(
            "chrome-extension://detour/iframe-placeholder.html?video=https://www.youtube.com/embed/x",
        ));
        let mut interceptor = interceptor();

        let outcome = interceptor.scan(&doc, InterceptionBehavior::Replace, "Watch on");
        assert_eq!(outcome.intercepted, 0);
        for frame in [&no_source, &empty, &other, &already] {
            assert_eq!(frame.source_writes(), 0);
            assert_eq!(frame.attribute(STATE_ATTRIBUTE), None);
        }
    }

    #[test]
    fn test_privacy_enhanced_domain() {
        let doc = MemoryDocument::new();
        let frame = doc.add_frame(Some("https://www.youtube-nocookie.com/embed/abc"));
        let mut interceptor = interceptor();

        interceptor.scan(&doc, InterceptionBehavior::Replace, "Watch on");
        assert_eq!(interceptor.state_of(&frame), EmbedState::Placeholder);
    }

    #[test]
    fn test_bypass_is_sticky() {
        let doc = MemoryDocument::new();
        let kept = doc.add_frame(Some(EMBED));
        let mut interceptor = interceptor();

        interceptor.scan(&doc, InterceptionBehavior::Replace, "Watch on");
        assert!(interceptor.restore(&kept, true));
        assert_eq!(kept.source().as_deref(), Some(EMBED));
        assert_eq!(kept.attribute(BYPASS_ATTRIBUTE).as_deref(), Some("true"));

        let other = doc.add_frame(Some("https://www.youtube.com/embed/other"));
        let outcome = interceptor.scan(&doc, InterceptionBehavior::Replace, "Watch on");
        assert_eq!(outcome.intercepted, 1);
        assert_eq!(interceptor.state_of(&kept), EmbedState::Untouched);
        assert_eq!(interceptor.state_of(&other), EmbedState::Placeholder);
    }

    #[test]
    fn test_plain_restore_clears_bypass() {
        let doc = MemoryDocument::new();
        let frame = doc.add_frame(Some(EMBED));
        frame.set_attribute(BYPASS_ATTRIBUTE, "stale");
        let mut interceptor = interceptor();

        interceptor.scan(&doc, InterceptionBehavior::Replace, "Watch on");
        interceptor.scan(&doc, InterceptionBehavior::None, "Watch on");
        assert_eq!(frame.attribute(BYPASS_ATTRIBUTE), None);
    }

    #[test]
    fn test_restore_untracked_is_noop() {
        let doc = MemoryDocument::new();
        let frame = doc.add_frame(Some(EMBED));
        let mut interceptor = interceptor();

        assert!(!interceptor.restore(&frame, true));
        assert_eq!(frame.attribute(BYPASS_ATTRIBUTE), None);
        assert_eq!(frame.source_writes(), 0);
    }

    #[test]
    fn test_restore_skips_write_when_source_already_original() {
        let doc = MemoryDocument::new();
        let frame = doc.add_frame(Some(EMBED));
        let mut interceptor = interceptor();

        interceptor.scan(&doc, InterceptionBehavior::Replace, "Watch on");
        // The page itself put the original back.
        frame.set_source(EMBED);
        let writes = frame.source_writes();

        interceptor.scan(&doc, InterceptionBehavior::None, "Watch on");
        assert_eq!(frame.source_writes(), writes);
    }

    #[test]
    fn test_removed_frames_are_released() {
        let doc = MemoryDocument::new();
        let frame = doc.add_frame(Some(EMBED));
        let mut interceptor = interceptor();

        interceptor.scan(&doc, InterceptionBehavior::Replace, "Watch on");
        assert_eq!(interceptor.registry().len(), 1);

        let weak = Arc::downgrade(&frame);
        doc.remove_frame(&frame);
        drop(frame);
        assert!(weak.upgrade().is_none());

        interceptor.scan(&doc, InterceptionBehavior::Replace, "Watch on");
        assert!(interceptor.registry().is_empty());
    }

    #[test]
    fn test_find_by_window() {
        let doc = MemoryDocument::new();
        let a = doc.add_frame(Some(EMBED));
        let b = doc.add_frame(Some("https://www.youtube.com/embed/b"));
        let untracked = doc.add_frame(Some("https://example.com/"));
        let mut interceptor = interceptor();

        interceptor.scan(&doc, InterceptionBehavior::Replace, "Watch on");

        let found = interceptor.find_by_window(b.window().unwrap()).unwrap();
        assert!(Arc::ptr_eq(&found, &b));
        assert!(!Arc::ptr_eq(&found, &a));
        assert!(interceptor
            .find_by_window(untracked.window().unwrap())
            .is_none());
        assert!(interceptor.find_by_window(WindowId::new()).is_none());
    }

    #[test]
    fn test_detached_frames_are_not_restored() {
        let doc = MemoryDocument::new();
        let frame = doc.add_frame(Some(EMBED));
        let mut interceptor = interceptor();

        interceptor.scan(&doc, InterceptionBehavior::Replace, "Watch on");
        doc.remove_frame(&frame);
        let writes = frame.source_writes();

        let outcome = interceptor.scan(&doc, InterceptionBehavior::None, "Watch on");
        assert!(outcome.is_noop());
        assert_eq!(frame.source_writes(), writes);
        assert!(interceptor.registry().is_tracked(&frame));

        // Reattached frames are restored by the next scan
        doc.insert_frame(Arc::clone(&frame));
        let outcome = interceptor.scan(&doc, InterceptionBehavior::None, "Watch on");
        assert_eq!(outcome.restored, 1);
        assert_eq!(frame.source().as_deref(), Some(EMBED));
    }

    #[test]
    fn test_tracked_frame_cannot_be_intercepted_twice() {
        let doc = MemoryDocument::new();
        let frame = doc.add_frame(Some(EMBED));
        let mut interceptor = interceptor();

        assert!(interceptor.intercept(&frame, "Watch on"));
        assert_eq!(interceptor.state_of(&frame), EmbedState::Placeholder);

        // Even with a page script putting the embed URL back, a tracked frame stays put
        frame.set_source(EMBED);
        let writes = frame.source_writes();
        assert!(!interceptor.intercept(&frame, "Watch on"));
        assert_eq!(frame.source_writes(), writes);
        assert_eq!(interceptor.original_source(&frame), Some(EMBED));
    }

    #[test]
    fn test_restore_follows_state_marker() {
        let doc = MemoryDocument::new();
        let frame = doc.add_frame(Some(EMBED));
        let mut interceptor = interceptor();

        interceptor.scan(&doc, InterceptionBehavior::Replace, "Watch on");
        frame.remove_attribute(STATE_ATTRIBUTE);

        let outcome = interceptor.scan(&doc, InterceptionBehavior::None, "Watch on");
        assert!(outcome.is_noop());
        assert!(interceptor.registry().is_tracked(&frame));

        frame.set_attribute(STATE_ATTRIBUTE, EmbedState::Placeholder.as_str());
        let outcome = interceptor.scan(&doc, InterceptionBehavior::None, "Watch on");
        assert_eq!(outcome.restored, 1);
    }
}
