//! Shared types, errors, and configuration for Bilan.
//!
//! This crate provides common types used across all other crates:
//! - Account codes of the French chart of accounts (PCG)
//! - Balance sheet sides
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
