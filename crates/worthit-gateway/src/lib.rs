//! HTTP gateway: accepts `/analyze` and `/webhook` requests, enqueues tasks
//! onto `worthit-queue`, and exposes `/health` and `/metrics`.

mod config;
mod error;
mod handlers;
mod routes;
mod state;

pub use config::GatewayConfig;
pub use error::ApiError;
pub use routes::{app, MAX_BODY_BYTES};
pub use state::AppState;
