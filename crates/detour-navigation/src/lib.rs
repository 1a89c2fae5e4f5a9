//! Detour Navigation Interception
//!
//! Decides, for every click in the top-level document, whether the default
//! navigation should be cancelled and the link handed to the redirect path:
//! 1. Primary button, no modifiers, not already handled
//! 2. An anchor with an href that resolves against the document location
//! 3. No `download`, and no target that opens another browsing context
//! 4. Redirect-on-click enabled and the URL classifies as redirectable

mod click;
mod error;
mod interceptor;

pub use click::{Anchor, ClickEvent, Modifiers, MouseButton};
pub use error::NavigationError;
pub use interceptor::{resolve_href, ClickDecision, IgnoreReason, LinkInterceptor};

pub type Result<T> = std::result::Result<T, NavigationError>;
