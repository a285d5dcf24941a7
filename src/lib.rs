//! Forgejo/Gitea push webhook that creates App Releases on a Press platform.

pub mod app_state;
pub mod config;
pub mod error;
pub mod handlers;
pub mod hook_response;
pub mod platform;
pub mod server;
pub mod signature;
pub mod webhook_payloads;

pub use app_state::AppState;
pub use config::Config;
pub use error::{HookError, PlatformError, Result};
pub use hook_response::HookResponse;
pub use server::{create_router, serve};
