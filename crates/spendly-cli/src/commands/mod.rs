//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init) and shared utilities (open_db, load_config)
//! - `import` - User document import
//! - `predict` - Local forecasting
//! - `serve` - Web server command
//! - `users` - User listing, registration and deletion

pub mod core;
pub mod import;
pub mod predict;
pub mod serve;
pub mod users;

// Re-export command functions for main.rs
pub use core::*;
pub use import::*;
pub use predict::*;
pub use serve::*;
pub use users::*;
