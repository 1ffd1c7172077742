//! Structural inspection of an extracted tree
//!
//! Synchronous by design of its callers: content validation runs these on the
//! blocking pool.

use std::io;
use std::path::Path;

/// What sits at a required member path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberState {
    Missing,
    File { len: u64 },
    Directory,
    /// Anything else (sockets, fifos, dangling links)
    Other,
}

impl MemberState {
    #[must_use]
    pub fn is_file(self) -> bool {
        matches!(self, Self::File { .. })
    }

    #[must_use]
    pub fn is_dir(self) -> bool {
        matches!(self, Self::Directory)
    }
}

/// Inspect a path, following symlinks
#[must_use]
pub fn inspect(path: &Path) -> MemberState {
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => MemberState::File {
            len: metadata.len(),
        },
        Ok(metadata) if metadata.is_dir() => MemberState::Directory,
        Ok(_) => MemberState::Other,
        Err(e) if e.kind() == io::ErrorKind::NotFound => MemberState::Missing,
        Err(_) => MemberState::Other,
    }
}

/// Whether a file holds nothing but whitespace
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn file_is_blank(path: &Path) -> io::Result<bool> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_members() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("manifest.json"), b"{}").unwrap();
        std::fs::create_dir(temp.path().join("images")).unwrap();

        assert_eq!(
            inspect(&temp.path().join("manifest.json")),
            MemberState::File { len: 2 }
        );
        assert!(inspect(&temp.path().join("images")).is_dir());
        assert_eq!(inspect(&temp.path().join("absent")), MemberState::Missing);
    }

    #[test]
    fn test_file_is_blank() {
        let temp = tempfile::tempdir().unwrap();
        let blank = temp.path().join("blank");
        let full = temp.path().join("full");
        std::fs::write(&blank, b"  \n\t ").unwrap();
        std::fs::write(&full, b" {\"title\":\"pilot\"} ").unwrap();

        assert!(file_is_blank(&blank).unwrap());
        assert!(!file_is_blank(&full).unwrap());
    }
}
