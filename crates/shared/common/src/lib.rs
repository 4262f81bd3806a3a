//! Common utilities shared across the workspace.
//!
//! This crate provides:
//! - Unified error handling and the storage error taxonomy
//! - Configuration structures
//! - The pagination contract used by repositories and services

pub mod config;
pub mod error;
pub mod pagination;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt};
pub use pagination::{PageRequest, Paginated, PaginationMeta, PaginationParams};
