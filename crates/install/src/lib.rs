#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Episode installation with atomic commits
//!
//! An archive is decoded into a staging directory next to its final
//! location, validated, and committed with a single directory rename. A
//! failed install never leaves a staging directory or a partially populated
//! version directory behind.

mod extract;
mod installer;
mod staging;
mod validation;

pub use extract::{ArchiveDecoder, ZipDecoder};
pub use installer::EpisodeInstaller;
pub use staging::StagingDirectory;
pub use validation::ContentValidator;
