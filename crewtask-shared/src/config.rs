//! Configuration management for CrewTask
//!
//! Loads configuration from environment variables and provides a type-safe
//! configuration struct. Every value has a default, so `from_env` only fails
//! on malformed overrides.
//!
//! # Environment Variables
//!
//! - `CREWTASK_LOG_ADMIN_WINDOW`: Activity log entries fetched for admins (default: 150)
//! - `CREWTASK_LOG_MEMBER_WINDOW`: Activity log entries fetched for other roles (default: 200)
//! - `CREWTASK_LOG_CLEAR_BATCH`: Maximum entries removed per log-clear sweep (default: 500)
//! - `CREWTASK_MAX_ATTACHMENT_BYTES`: Per-file attachment warning threshold (default: 307200)
//! - `CREWTASK_MAX_ATTACHMENT_TOTAL_BYTES`: Aggregate attachment warning threshold (default: 819200)
//!
//! # Example
//!
//! ```
//! use crewtask_shared::config::Config;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! assert!(config.logs.admin_window > 0);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Activity log retrieval configuration
    pub logs: LogConfig,

    /// Attachment size thresholds
    pub attachments: AttachmentConfig,
}

/// Activity log retrieval configuration
///
/// The log store is read through a bounded recent window and filtered by
/// role on the client side; entries older than the window are not reachable
/// for non-admin roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Most-recent entries fetched for an admin
    pub admin_window: usize,

    /// Most-recent entries fetched before role filtering for other roles
    pub member_window: usize,

    /// Maximum entries removed in one clear sweep
    pub clear_batch: usize,
}

/// Attachment size thresholds
///
/// Attachments are stored inline in the task record, so oversized payloads
/// are warned about in the service layer. The store itself never rejects
/// them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentConfig {
    /// Per-file warning threshold in bytes
    pub max_file_bytes: u64,

    /// Aggregate warning threshold in bytes
    pub max_total_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logs: LogConfig {
                admin_window: 150,
                member_window: 200,
                clear_batch: 500,
            },
            attachments: AttachmentConfig {
                max_file_bytes: 300 * 1024,
                max_total_bytes: 800 * 1024,
            },
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if an override variable is present but does not
    /// parse as a number.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let mut config = Config::default();

        if let Ok(v) = env::var("CREWTASK_LOG_ADMIN_WINDOW") {
            config.logs.admin_window = v.parse()?;
        }
        if let Ok(v) = env::var("CREWTASK_LOG_MEMBER_WINDOW") {
            config.logs.member_window = v.parse()?;
        }
        if let Ok(v) = env::var("CREWTASK_LOG_CLEAR_BATCH") {
            config.logs.clear_batch = v.parse()?;
        }
        if let Ok(v) = env::var("CREWTASK_MAX_ATTACHMENT_BYTES") {
            config.attachments.max_file_bytes = v.parse()?;
        }
        if let Ok(v) = env::var("CREWTASK_MAX_ATTACHMENT_TOTAL_BYTES") {
            config.attachments.max_total_bytes = v.parse()?;
        }

        Ok(config)
    }
}
