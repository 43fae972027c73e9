//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, login, token verification and profile maintenance live here,
//! independent of the HTTP layer.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::{AuthConfig, AuthService};
