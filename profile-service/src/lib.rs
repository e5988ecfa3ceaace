pub mod app;
pub mod auth_handlers;
pub mod authenticator;
pub mod config;
pub mod metrics;
pub mod role_store;

pub use app::{router, AppState};
