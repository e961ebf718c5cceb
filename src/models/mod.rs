//! Data models.

pub mod config;
pub mod item;
pub mod profile;
