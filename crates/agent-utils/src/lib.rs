//! Shared utilities for deep-research
//!
//! This crate provides common functionality used across the workspace:
//! tracing setup and environment-based configuration helpers.

pub mod config;
pub mod logging;

pub use config::{env_var, load_dotenv};
pub use logging::{init_tracing, init_tracing_with_default};
