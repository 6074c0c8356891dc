//! Error types for LexForge
//!
//! Provides a shared error taxonomy with:
//! - Distinct error types for each failure mode in the pipeline
//! - Machine-readable error codes for callers
//! - A retryability classification (retrieval outages are retryable,
//!   malformed documents and queries are not)

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Query errors (1xxx)
    InvalidQuery,

    // Document ingestion errors (2xxx)
    ParseError,

    // Retrieval errors (3xxx)
    RetrievalUnavailable,
    EmbeddingError,
    RerankUnavailable,
    HydrationFailed,

    // Citation errors (4xxx)
    UnsupportedSourceType,

    // Infrastructure errors (7xxx)
    DatabaseError,
    ConnectionError,
    CacheError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::InvalidQuery => 1001,

            ErrorCode::ParseError => 2001,

            ErrorCode::RetrievalUnavailable => 3001,
            ErrorCode::EmbeddingError => 3002,
            ErrorCode::RerankUnavailable => 3003,
            ErrorCode::HydrationFailed => 3004,

            ErrorCode::UnsupportedSourceType => 4001,

            ErrorCode::DatabaseError => 7001,
            ErrorCode::ConnectionError => 7002,
            ErrorCode::CacheError => 7003,

            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Query errors
    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    // Document ingestion errors
    #[error("Failed to parse document '{document}': {message}")]
    Parse { document: String, message: String },

    // Retrieval errors
    #[error("Retrieval backend unavailable: {message}")]
    RetrievalUnavailable { message: String },

    #[error("Embedding service error: {message}")]
    EmbeddingError { message: String },

    #[error("Cross-encoder unavailable: {message}")]
    RerankUnavailable { message: String },

    #[error("Failed to hydrate source '{source_id}': {message}")]
    HydrationFailed { source_id: String, message: String },

    // Citation errors
    #[error("No citation formatter for source type '{source_type}'")]
    UnsupportedSourceType { source_type: String },

    // Infrastructure errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Database connection error: {message}")]
    DatabaseConnection { message: String },

    #[error("Cache error: {message}")]
    CacheError { message: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::InvalidQuery { .. } => ErrorCode::InvalidQuery,
            AppError::Parse { .. } => ErrorCode::ParseError,
            AppError::RetrievalUnavailable { .. } => ErrorCode::RetrievalUnavailable,
            AppError::EmbeddingError { .. } => ErrorCode::EmbeddingError,
            AppError::RerankUnavailable { .. } => ErrorCode::RerankUnavailable,
            AppError::HydrationFailed { .. } => ErrorCode::HydrationFailed,
            AppError::UnsupportedSourceType { .. } => ErrorCode::UnsupportedSourceType,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::DatabaseConnection { .. } => ErrorCode::ConnectionError,
            AppError::CacheError { .. } => ErrorCode::CacheError,
            AppError::HttpClient(_) => ErrorCode::RetrievalUnavailable,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Whether a caller may retry the failed operation as-is.
    ///
    /// Transport and backend outages are retryable; malformed input
    /// (bad query, unparseable document, unknown source type) is not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::RetrievalUnavailable { .. }
                | AppError::EmbeddingError { .. }
                | AppError::RerankUnavailable { .. }
                | AppError::HydrationFailed { .. }
                | AppError::Database(_)
                | AppError::DatabaseConnection { .. }
                | AppError::CacheError { .. }
                | AppError::HttpClient(_)
        )
    }

    /// Whether this error indicates bad input rather than a system fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::InvalidQuery { .. } | AppError::Parse { .. })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::CacheError {
            message: err.to_string(),
        }
    }
}
