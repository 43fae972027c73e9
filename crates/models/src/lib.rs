pub mod errors;
pub mod db;
pub mod validate;
pub mod user;
pub mod user_credentials;
pub mod apartment;
