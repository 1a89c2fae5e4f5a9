//! Placeholder resource and embed-source recognition

use url::Url;

use crate::error::EmbedError;
use crate::Result;

/// Embed paths on the standard and privacy-enhanced video host domains.
const EMBED_SOURCE_PATTERNS: &[&str] = &["youtube.com/embed", "youtube-nocookie.com/embed"];

/// Whether a frame source points at a video-host embed player.
pub fn is_embed_source(source: &str) -> bool {
    EMBED_SOURCE_PATTERNS
        .iter()
        .any(|pattern| source.contains(pattern))
}

/// The local page shown in place of an intercepted embed.
#[derive(Debug, Clone)]
pub struct PlaceholderResource {
    url: Url,
    origin: String,
}

impl PlaceholderResource {
    pub fn parse(url: &str) -> Result<Self> {
        let parsed =
            Url::parse(url).map_err(|e| EmbedError::InvalidPlaceholder(format!("{}: {}", url, e)))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| EmbedError::InvalidPlaceholder(format!("{}: missing host", url)))?;

        // Extension schemes have opaque origins under `Url::origin`, so build it by hand.
        let origin = match parsed.port() {
            Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
            None => format!("{}://{}", parsed.scheme(), host),
        };

        Ok(Self {
            url: parsed,
            origin,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Placeholder URL carrying the original source and the button label.
    pub fn url_for(&self, original_source: &str, label: &str) -> String {
        let mut url = self.url.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("video", original_source)
            .append_pair("label", label);
        url.to_string()
    }

    /// Whether a frame is already showing the placeholder.
    pub fn is_placeholder_source(&self, source: &str) -> bool {
        source.starts_with(&self.origin)
    }
}
