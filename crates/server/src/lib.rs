//! HTTP edge of the rental listings API: axum router, handlers, extractors,
//! query validation, image uploads and OpenAPI docs.

pub mod errors;
pub mod extract;
pub mod openapi;
pub mod routes;
pub mod startup;
pub mod state;
pub mod uploads;
pub mod validation;

pub use startup::{build_app, build_state, run, serve};
pub use state::ServerState;
