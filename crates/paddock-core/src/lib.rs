//! # paddock-core
//!
//! Core types for Paddock, a client for a remote machine-learning-dataset
//! management backend.
//!
//! This crate holds everything the client crates share:
//! - The unified [`PaddockError`] type and [`Result`] alias
//! - Typed records for the server-side resources (users, datasets, projects,
//!   teams, organisations, licenses, frameworks, domains, memberships)
//! - Client configuration loaded from `paddock.toml` or environment variables

mod config;
mod error;
mod types;

pub use config::ClientConfig;
pub use error::{PaddockError, Result};
pub use types::*;
