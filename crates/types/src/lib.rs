#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the episode installation pipeline
//!
//! This crate provides the value types shared by the download, install and
//! verification crates: package identity, the download request descriptor
//! and the structured validation result.

pub mod package;
pub mod validation;

// Re-export commonly used types
pub use package::{EpisodeResource, PackageRef};
pub use validation::ValidationResult;
