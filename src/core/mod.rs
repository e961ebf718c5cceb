//! Core business logic modules.

pub mod eraser;
pub mod indexer;
pub mod janitor;
pub mod retention;
pub mod validator;
