pub mod health_handler;
pub mod push_hook_handler;

pub use health_handler::health_handler;
pub use push_hook_handler::{process_push, push_hook_handler};
