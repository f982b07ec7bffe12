//! Shared types, errors, and configuration for Forecourt.
//!
//! This crate provides common types used across all other crates:
//! - Currency codes and fixed-point amount helpers
//! - Pagination and sorting types for list endpoints
//! - Application-wide error types
//! - Configuration management
//! - JWT claims and validation

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::{Claims, Role};
pub use config::AppConfig;
pub use error::{AppError, AppResult, FieldErrors};
pub use jwt::{JwtConfig, JwtError, JwtService};
