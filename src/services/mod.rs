//! Collaborators of the core: process execution and run reports.

pub mod command;
pub mod report;
