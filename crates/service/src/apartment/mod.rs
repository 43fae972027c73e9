//! Apartment listings: query building, validation, ownership rules and stats.

pub mod domain;
pub mod repository;
pub mod service;
pub mod repo;

pub use repository::Apartment;
pub use service::ApartmentService;
