/*!
 * Error types for the subtable application.
 *
 * This module contains custom error types for the different stages of the
 * translation pipeline, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether the adapter may retry the request after a pause
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimitExceeded(_) | Self::ConnectionError(_))
    }
}

/// Errors raised while reading or writing a caption track
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// A block does not follow the `index / timing / text` layout
    #[error("Malformed subtitle block at line {line}: {reason}")]
    MalformedBlock {
        line: usize,
        reason: String,
    },

    /// A timing line could not be parsed
    #[error("Invalid timestamp at line {line}: {value}")]
    InvalidTimestamp {
        line: usize,
        value: String,
    },

    /// The end of an entry lies before its start
    #[error("Invalid time range at line {line}: end {end_ms}ms is before start {start_ms}ms")]
    InvalidTimeRange {
        line: usize,
        start_ms: u64,
        end_ms: u64,
    },

    /// Reading or writing the track failed
    #[error("Subtitle I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error with subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// The token counter could not be built for the configured model
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// The model returned a table that does not mirror the request
    #[error("Malformed response for {expected} rows: {reason}")]
    MalformedResponse {
        expected: usize,
        reason: String,
    },

    /// A single entry kept failing validation and cannot be split further
    #[error("Unrecoverable translation failure for entry {seq_num} at {start}: {reason}")]
    Unrecoverable {
        seq_num: usize,
        start: String,
        reason: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
