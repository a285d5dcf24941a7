//! Service configuration: a YAML file plus a few environment overrides.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use secrecy::SecretString;
use serde::Deserialize;

use crate::app_state::AppState;
use crate::error::Result;
use crate::platform::{AdminCredentials, MemoryPlatform, PressClient, SourceRegistration};

pub const CONFIG_PATH_ENV: &str = "PRESS_HOOK_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "press-hook.yaml";
pub const DEFAULT_HOOK_PATH: &str = "/api/method/press.api.forgejo.hook";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen: String,
    pub hook_path: String,
    pub log_level: String,
    pub platform: PlatformConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3000".to_string(),
            hook_path: DEFAULT_HOOK_PATH.to_string(),
            log_level: "info".to_string(),
            platform: PlatformConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlatformConfig {
    Memory {
        #[serde(default)]
        webhook_secret: Option<String>,
        #[serde(default)]
        sources: Vec<SourceRegistration>,
    },
    Press {
        base_url: String,
        api_key: String,
        api_secret: SecretString,
        #[serde(default)]
        release_method: Option<String>,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

impl Default for PlatformConfig {
    fn default() -> Self {
        PlatformConfig::Memory {
            webhook_secret: None,
            sources: vec![],
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Reads the file named by `PRESS_HOOK_CONFIG` (or `press-hook.yaml`),
    /// then applies `PRESS_HOOK_LISTEN`, `PRESS_HOOK_LOG` and `PRESS_HOOK_PATH`.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(Path::new(&path))?;

        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;

        Ok(config)
    }

    /// Missing files yield the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;

        Self::from_yaml(&content).with_context(|| format!("Could not parse {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_yaml::from_str(content)?)
    }

    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(listen) = var("PRESS_HOOK_LISTEN") {
            self.listen = listen;
        }
        if let Some(log_level) = var("PRESS_HOOK_LOG") {
            self.log_level = log_level;
        }
        if let Some(hook_path) = var("PRESS_HOOK_PATH") {
            self.hook_path = hook_path;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.hook_path.starts_with('/') {
            bail!("hook_path must start with '/', got {:?}", self.hook_path);
        }

        match &self.platform {
            PlatformConfig::Memory { sources, .. } => {
                for source in sources {
                    let fields = [&source.name, &source.app, &source.repository, &source.branch];
                    if fields.iter().any(|field| field.is_empty()) {
                        bail!("App source {:?} has empty fields", source.name);
                    }
                }
            }
            PlatformConfig::Press { base_url, .. } => {
                if base_url.is_empty() {
                    bail!("platform.base_url must be set for the press platform");
                }
            }
        }

        Ok(())
    }

    /// True when the memory platform has no usable webhook secret. The press
    /// platform reads its secret per delivery, so this is never known upfront.
    pub fn signature_checks_disabled(&self) -> bool {
        match &self.platform {
            PlatformConfig::Memory { webhook_secret, .. } => {
                webhook_secret.as_deref().unwrap_or_default().is_empty()
            }
            PlatformConfig::Press { .. } => false,
        }
    }

    /// Builds the collaborators described by `platform`.
    pub fn app_state(&self) -> Result<AppState> {
        match &self.platform {
            PlatformConfig::Memory {
                webhook_secret,
                sources,
            } => {
                if self.signature_checks_disabled() {
                    tracing::warn!("No webhook secret configured, signatures will not be checked");
                }

                let platform = MemoryPlatform::new(webhook_secret.clone()).with_sources(sources.clone());
                Ok(AppState::in_memory(Arc::new(platform)))
            }
            PlatformConfig::Press {
                base_url,
                api_key,
                api_secret,
                release_method,
                timeout_secs,
            } => {
                let credentials = AdminCredentials {
                    api_key: api_key.clone(),
                    api_secret: api_secret.clone(),
                };
                let client = Arc::new(PressClient::new(
                    base_url,
                    credentials,
                    release_method.clone(),
                    Duration::from_secs(*timeout_secs),
                )?);

                Ok(AppState::new(client.clone(), client))
            }
        }
    }
}
