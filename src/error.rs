//! Error types for quote fetching, speech setup and user actions.
//!
//! None of these are fatal. The session controller turns each one into a
//! single transient notice for the user.

use thiserror::Error;

/// Failure to retrieve a quote from the remote service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Transport failure, non-success status, or a body that isn't a quote list.
    #[error("quote request failed: {0}")]
    Network(String),
    /// The service answered with an empty list.
    #[error("quote service returned no quotes")]
    Empty,
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Network(format!("timed out: {e}"))
        } else if e.is_connect() {
            Self::Network(format!("cannot connect: {e}"))
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// Speech engine could not be brought up.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SpeechInitError {
    #[error("speech engine failed to start: {0}")]
    EngineFailed(String),
    #[error("language not supported: {0}")]
    LanguageUnsupported(String),
}

/// The user-facing actions that operate on the current quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Speak,
    Copy,
    Share,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Speak => write!(f, "speak"),
            Self::Copy => write!(f, "copy"),
            Self::Share => write!(f, "share"),
        }
    }
}

/// Guard failure for actions that need a quote.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("No quote available to {0}")]
    NoQuoteAvailable(Action),
}

/// A platform adapter (clipboard, share, audio, notification) failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct PlatformError(pub String);

impl PlatformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
