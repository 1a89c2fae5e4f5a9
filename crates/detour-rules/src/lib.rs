//! Detour URL Rules
//!
//! Decides whether a URL on the video host is "redirectable".
//!
//! - Short links (`youtu.be/<id>`) are always redirectable.
//! - Other hosts must end with `youtube.com`; the host list is not configurable.
//! - Paths are matched by literal, lower-cased prefix. Deny always wins.
//! - `allowList` mode needs an allow prefix, `allowAllExcept` mode only needs to
//!   miss the deny list.
//!
//! The deny list cannot be changed from configuration: callers can narrow or widen
//! the allow list but never relax the deny floor.

mod classify;
mod error;
mod rules;

pub use classify::{classify, classify_raw, SHORT_LINK_HOST, VIDEO_HOST_SUFFIX};
pub use error::RulesError;
pub use rules::{normalize, RuleMode, RuleSet, DEFAULT_ALLOW_PREFIXES, DEFAULT_DENY_PREFIXES};

pub type Result<T> = std::result::Result<T, RulesError>;
