//! # Sync Error Types
//!
//! Error types for the offline queue engine.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Local Queue   │  │     Remote Store        │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  QueueLoad      │  │  Database               │ │
//! │  │  ConfigLoad     │  │  QueuePersist   │  │  RemoteTimeout          │ │
//! │  │  ConfigSave     │  │  Serialization  │  │  CreditRequiresRemote   │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  RETRY RULE: remote-store failures are retryable (the entry stays      │
//! │  queued and the next drain tries again); configuration and             │
//! │  serialization failures are not.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering the queue, checkout, and drain paths.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid sync configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Local Queue Errors
    // =========================================================================
    /// Failed to read the durable queue file.
    #[error("Failed to load offline queue: {0}")]
    QueueLoadFailed(String),

    /// Failed to write the durable queue file.
    #[error("Failed to persist offline queue: {0}")]
    QueuePersistFailed(String),

    /// Queue blob serialization failed.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    // =========================================================================
    // Remote Store Errors
    // =========================================================================
    /// Remote store operation failed.
    #[error("Remote store error: {0}")]
    Database(String),

    /// Remote write exceeded the configured timeout.
    #[error("Remote write timed out after {0} seconds")]
    RemoteTimeout(u64),

    /// Credit sales cannot be opened without the remote store.
    #[error("Opening a credit sale requires the remote store; retry when back online")]
    CreditRequiresRemote,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    /// Checkout input failed validation on the direct path.
    #[error(transparent)]
    Validation(#[from] lumen_core::ValidationError),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Channel send/receive failed.
    #[error("Channel error: {0}")]
    ChannelError(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<lumen_db::DbError> for SyncError {
    fn from(err: lumen_db::DbError) -> Self {
        SyncError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::SerializationFailed(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for the drain's keep-or-drop decision)
// =============================================================================

impl SyncError {
    /// Returns true if the failed operation can be retried on a later drain.
    ///
    /// A retryable failure keeps the queued sale in place; the entry is
    /// never dropped because of a transient remote problem.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::Database(_) | SyncError::RemoteTimeout(_))
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }
}
