//! Shared utilities for plinth.
//!
//! This crate provides cross-cutting concerns used by all other plinth crates:
//! the unified error type, filesystem helpers, and terminal status lines.

pub mod errors;
pub mod fs;
pub mod progress;
