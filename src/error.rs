use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to bind to address {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to initialise component {component}: {source}")]
    Init {
        component: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Failures raised by a [`crate::port::MediaStore`] implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored record is invalid: {0}")]
    Corrupt(String),
}

/// Reason a source page could not be turned into records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("no candidates found in markup from {url}")]
    Markup { url: String },
}
