use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::lock::Mutex;
use serde::Deserialize;

use super::{AppSource, ReleasePlatform, SettingsProvider, SourceFilter};
use crate::error::PlatformError;
use crate::webhook_payloads::forgejo::HeadCommit;

/// App source as declared in the service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceRegistration {
    pub name: String,
    pub app: String,
    pub repository: String,
    pub branch: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppRelease {
    pub source: String,
    pub app: String,
    pub commit: HeadCommit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorLogEntry {
    pub title: String,
    pub message: String,
}

struct StoredRelease {
    release: AppRelease,
    committed: bool,
}

/// Process-local platform used for development setups and tests.
///
/// Releases are keyed by source and commit id, so a redelivered push fails
/// for every source that already has a release of that commit, staged or
/// not. New releases stay staged until [`ReleasePlatform::commit`] publishes
/// them. Staging is shared by the whole process: a commit publishes every
/// release staged so far, whichever delivery created it.
#[derive(Default)]
pub struct MemoryPlatform {
    webhook_secret: Option<String>,
    sources: DashMap<String, SourceRegistration>,
    releases: DashMap<(String, String), StoredRelease>,
    error_log: Mutex<Vec<ErrorLogEntry>>,
    commits: AtomicUsize,
}

impl MemoryPlatform {
    pub fn new(webhook_secret: Option<String>) -> Self {
        Self {
            webhook_secret,
            ..Default::default()
        }
    }

    pub fn with_sources(self, sources: impl IntoIterator<Item = SourceRegistration>) -> Self {
        for source in sources {
            self.register(source);
        }
        self
    }

    pub fn register(&self, source: SourceRegistration) {
        tracing::debug!("Registering app source {}", source.name);
        self.sources.insert(source.name.clone(), source);
    }

    /// Committed releases, ordered by source then commit.
    pub fn releases(&self) -> Vec<AppRelease> {
        self.collect_releases(true)
    }

    /// Releases created since the last commit.
    pub fn pending_releases(&self) -> Vec<AppRelease> {
        self.collect_releases(false)
    }

    fn collect_releases(&self, committed: bool) -> Vec<AppRelease> {
        let mut releases: Vec<AppRelease> = self
            .releases
            .iter()
            .filter(|entry| entry.committed == committed)
            .map(|entry| entry.release.clone())
            .collect();
        releases.sort_by(|a, b| (&a.source, &a.commit.id).cmp(&(&b.source, &b.commit.id)));
        releases
    }

    pub async fn error_log(&self) -> Vec<ErrorLogEntry> {
        self.error_log.lock().await.clone()
    }

    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SettingsProvider for MemoryPlatform {
    async fn webhook_secret(&self) -> Result<Option<String>, PlatformError> {
        Ok(self.webhook_secret.clone())
    }
}

#[async_trait]
impl ReleasePlatform for MemoryPlatform {
    async fn find_app_sources(
        &self,
        filter: &SourceFilter,
    ) -> Result<Vec<AppSource>, PlatformError> {
        let mut sources: Vec<AppSource> = self
            .sources
            .iter()
            .filter(|entry| {
                let source = entry.value();
                source.enabled
                    && source.branch == filter.branch
                    && source.repository == filter.repository
            })
            .map(|entry| AppSource {
                name: entry.name.clone(),
                app: entry.app.clone(),
            })
            .collect();
        sources.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(sources)
    }

    async fn create_app_release(
        &self,
        source: &str,
        app: &str,
        commit: &HeadCommit,
    ) -> Result<(), PlatformError> {
        match self.releases.entry((source.to_string(), commit.id.clone())) {
            Entry::Occupied(_) => Err(PlatformError::DuplicateRelease {
                source_name: source.to_string(),
                commit: commit.id.clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(StoredRelease {
                    release: AppRelease {
                        source: source.to_string(),
                        app: app.to_string(),
                        commit: commit.clone(),
                    },
                    committed: false,
                });
                Ok(())
            }
        }
    }

    async fn log_error(&self, title: &str, message: &str) {
        self.error_log.lock().await.push(ErrorLogEntry {
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    async fn commit(&self) -> Result<(), PlatformError> {
        let mut published = 0;
        for mut entry in self.releases.iter_mut() {
            if !entry.committed {
                entry.committed = true;
                published += 1;
            }
        }

        tracing::debug!("Committed {published} app releases");
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
