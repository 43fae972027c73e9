//! Service layer providing business operations on top of models.
//! - Separates business logic from data access and HTTP.
//! - Repositories are traits with SeaORM implementations; auth also ships an
//!   in-memory mock for tests, doctests and benches.
//! - Errors are typed per workflow (`ServiceError`, `AuthError`).

pub mod errors;
pub mod auth;
pub mod apartment;
pub mod pagination;
pub mod search;
#[cfg(test)]
pub mod test_support;
