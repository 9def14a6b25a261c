//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("Audio encoding error: {0}")]
    Audio(#[from] hound::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The generation service accepted the call but returned no operation handle.
    #[error("Video generation did not start an operation: {0}")]
    Submission(String),

    /// The service finished the operation and reported an error.
    #[error("Failed to generate video: {0}")]
    Generation(String),

    #[error(
        "The AI model finished but did not produce a video. This can happen if the prompt or \
         images trigger safety filters. Please try a different prompt or images."
    )]
    NoMediaProduced,

    #[error("Generation was cancelled before the operation completed")]
    Cancelled,

    #[error("Operation did not complete within {0:?}")]
    DeadlineExceeded(Duration),

    #[error("Operation still pending after {0} status checks")]
    PollLimitExceeded(usize),

    #[error("Invariant violation: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, Error>;
