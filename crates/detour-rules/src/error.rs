//! Rule error types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RulesError {
    #[error("Unknown rule mode: {0}")]
    UnknownMode(String),
}
