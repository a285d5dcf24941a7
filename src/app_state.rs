use std::sync::Arc;

use crate::platform::{MemoryPlatform, ReleasePlatform, SettingsProvider};

/// Collaborators shared by every webhook delivery.
#[derive(Clone)]
pub struct AppState {
    settings: Arc<dyn SettingsProvider>,
    platform: Arc<dyn ReleasePlatform>,
}

impl AppState {
    pub fn new(settings: Arc<dyn SettingsProvider>, platform: Arc<dyn ReleasePlatform>) -> Self {
        Self { settings, platform }
    }

    /// State backed by a single in-memory platform.
    pub fn in_memory(platform: Arc<MemoryPlatform>) -> Self {
        Self::new(platform.clone(), platform)
    }

    pub fn settings(&self) -> &dyn SettingsProvider {
        self.settings.as_ref()
    }

    pub fn platform(&self) -> &dyn ReleasePlatform {
        self.platform.as_ref()
    }
}
