//! # CrewTask Shared Library
//!
//! This crate contains the domain model, validated input types, and
//! configuration shared by the CrewTask store and service layers.
//!
//! ## Module Organization
//!
//! - `models`: Domain records (users, teams, tasks, projects, duties,
//!   routines, log entries, notifications)
//! - `config`: Configuration management

pub mod config;
pub mod models;

/// Current version of the CrewTask shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
