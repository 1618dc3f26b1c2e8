//! PillSquad Prediction API
//!
//! Axum service exposing the three classifiers over HTTP:
//! `/predict`, `/predict-company`, `/classify-image`, plus `/health` and
//! `/metrics`.

pub mod cli;
pub mod config;
pub mod routes;
pub mod state;

pub use cli::Cli;
pub use config::ApiConfig;
pub use routes::{create_router, AppError};
pub use state::AppState;
