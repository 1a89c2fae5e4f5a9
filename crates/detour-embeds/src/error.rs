//! Embed error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("Invalid placeholder resource URL: {0}")]
    InvalidPlaceholder(String),
}
