//! Core data types for plinth.
//!
//! This crate defines the values that flow through resolution: module
//! requirements, resolved module descriptions, bundle versions and version
//! constraints, resolution configuration, and the platform description file
//! read by the task layer.
//!
//! This crate is intentionally free of resolution logic.

pub mod config;
pub mod module;
pub mod platform;
pub mod version;
