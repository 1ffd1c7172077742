#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Filesystem abstraction for the episode pipeline.
//!
//! This crate provides:
//! - [`FilesystemOperations`], the async seam every component that mutates
//!   the support or temp directories goes through
//! - [`LocalFilesystem`], the production implementation on `tokio::fs`
//! - synchronous tree inspection used by content validation, which runs on
//!   the blocking pool

pub mod filesystem;
pub mod tree;

pub use filesystem::{DirEntryInfo, FilesystemOperations, LocalFilesystem};
pub use tree::{file_is_blank, inspect, MemberState};
