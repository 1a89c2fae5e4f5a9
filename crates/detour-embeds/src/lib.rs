//! Detour Embed Interception
//!
//! Tracks every embedded player frame on a page and swaps video-host embeds for a
//! local placeholder page:
//!
//! ```text
//! Untouched
//!   ↓ scan (behavior = replace)
//! Placeholder
//!   ↓ scan (behavior = none) / "keep original"
//! Untouched (optionally bypassed)
//! ```
//!
//! A bypassed frame is never intercepted again while the page stays loaded.

mod document;
mod error;
mod interceptor;
mod memory;
mod placeholder;
mod registry;
mod state;

pub use document::{Document, EmbedFrame, WindowId, SOURCE_ATTRIBUTE};
pub use error::EmbedError;
pub use interceptor::{EmbedInterceptor, ScanOutcome};
pub use memory::{MemoryDocument, MemoryFrame};
pub use placeholder::{is_embed_source, PlaceholderResource};
pub use registry::{EmbedRecord, EmbedRegistry};
pub use state::{EmbedState, InterceptionBehavior, BYPASS_ATTRIBUTE, STATE_ATTRIBUTE};

pub type Result<T> = std::result::Result<T, EmbedError>;
