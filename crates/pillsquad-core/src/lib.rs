//! PillSquad Core
//!
//! Core types and utilities shared across PillSquad components.
//!
//! This crate provides:
//! - Error types and result handling
//! - Wire types exchanged between the prediction API, the tool layer and the dashboard
//! - The certified-product registry loaded from the MFDS product CSV

pub mod certified;
pub mod error;
pub mod types;

pub use certified::{CertifiedRegistry, RegistryColumns};
pub use error::{Error, Result};
pub use types::{
    CertifiedProductEntry, CompanyPrediction, CompanyRequest, ErrorBody, ImageVerdict,
    IngredientPrediction, IngredientRequest, ScrapeResult,
};
