//! Backup Janitor Library
//!
//! Indexes backup generations, validates their integrity and selects the
//! ones that fall outside a profile's retention window.

pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod preflight;
pub mod services;
pub mod utils;

pub use error::{Error, ErrorKind, Result};
