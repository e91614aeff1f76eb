//! Client for the magpt text-generation backend
//!
//! Wraps the four backend calls (`/health`, `/models`, `/generate`,
//! `/metrics`) behind the mockable [`ApiClient`] trait.
//!
//! ## Features
//!
//! - **Trait-based design**: swap [`HttpApiClient`] for a test double
//! - **Live base URL**: read from the preference store on every call
//! - **Bounded lookups**: health, models and metrics carry timeouts;
//!   generation does not

pub mod client;
pub mod config;
pub mod error;
pub mod models;

pub use client::{ApiClient, HttpApiClient};
pub use config::{ApiConfig, HEALTH_TIMEOUT};
pub use error::{ApiError, Result};
pub use models::{
    GenerateRequest, GenerateResponse, GenerationMetrics, HealthStatus, ModelCatalog, ModelEntry,
    ModelOption, DEFAULT_MODEL_LABEL,
};

/// Re-export commonly used types
pub use reqwest::StatusCode;
