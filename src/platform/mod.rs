//! Collaborators the hook delegates to: the settings store holding the
//! webhook secret, and the release platform that owns app sources and
//! releases.

mod memory;
mod press;

pub use memory::{AppRelease, ErrorLogEntry, MemoryPlatform, SourceRegistration};
pub use press::{AdminCredentials, PressClient, DEFAULT_RELEASE_METHOD};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PlatformError;
use crate::webhook_payloads::forgejo::HeadCommit;

/// Registration binding a repository branch to an app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSource {
    pub name: String,
    pub app: String,
}

/// Lookup key for enabled app sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFilter {
    pub repository: String,
    pub branch: String,
}

#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// The configured webhook secret, `None` when unset.
    async fn webhook_secret(&self) -> Result<Option<String>, PlatformError>;
}

#[async_trait]
pub trait ReleasePlatform: Send + Sync {
    /// Enabled app sources for the repository and branch in `filter`.
    async fn find_app_sources(&self, filter: &SourceFilter)
        -> Result<Vec<AppSource>, PlatformError>;

    async fn create_app_release(
        &self,
        source: &str,
        app: &str,
        commit: &HeadCommit,
    ) -> Result<(), PlatformError>;

    /// Records an error entry on the platform. Failures are swallowed.
    async fn log_error(&self, title: &str, message: &str);

    async fn commit(&self) -> Result<(), PlatformError>;
}
