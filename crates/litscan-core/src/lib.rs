//! # litscan-core
//!
//! Core types, error taxonomy, configuration, and logging shared by every
//! crate in the literature-scanning pipeline.

pub mod config;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;

pub use error::{is_unique_violation, Error, Result};
pub use models::*;
