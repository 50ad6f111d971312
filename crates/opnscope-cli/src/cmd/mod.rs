//! Subcommand implementations.
pub mod convert;
pub mod diff;
pub mod sanitize;
pub mod validate;
