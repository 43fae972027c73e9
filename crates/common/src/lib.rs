//! Shared building blocks for the rental listings workspace.
//!
//! - `types`: wire DTOs shared by the server and the API client
//! - `utils::logging`: tracing subscriber setup
//! - `env`: startup directory checks

pub mod env;
pub mod types;
pub mod utils;
