//! PillSquad dashboard
//!
//! Single-page web UI for analyzing second-hand marketplace listings:
//! page text and image extraction, certified-product checks, seller and
//! ingredient predictions, and image classification through the prediction
//! API.

pub mod cli;
pub mod config;
pub mod server;
pub mod state;

pub use cli::Cli;
pub use config::DashboardConfig;
pub use server::{build_app, run_server};
pub use state::DashboardState;
