//! Integration tests for error types

#[cfg(test)]
mod tests {
    use episode_errors::*;

    #[test]
    fn test_error_conversion() {
        let net_err = NetworkError::Timeout {
            url: "https://example.com".into(),
        };
        let err: Error = net_err.into();
        assert!(matches!(err, Error::Network(_)));
    }

    #[test]
    fn test_error_display() {
        let err = StorageError::DiskFull {
            path: "/var/episodes".into(),
        };
        assert_eq!(err.to_string(), "disk full: /var/episodes");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
        let err: Error = io_err.into();
        assert!(matches!(
            err,
            Error::Io {
                kind: std::io::ErrorKind::PermissionDenied,
                ..
            }
        ));
    }

    #[test]
    fn test_storage_error_from_io_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = StorageError::from_io_with_path(&io_err, std::path::Path::new("/tmp/x"));
        assert!(matches!(err, StorageError::PathNotFound { ref path } if path == "/tmp/x"));
    }

    #[test]
    fn test_extraction_wrap_passes_extraction_through() {
        let original = ExtractionError::new("validation failed");
        let wrapped = ExtractionError::wrap(original.clone().into());
        assert_eq!(wrapped.message, "validation failed");
        assert!(wrapped.cause.is_none());
    }

    #[test]
    fn test_extraction_wrap_keeps_cause() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let wrapped = ExtractionError::wrap(io_err.into());
        assert!(matches!(
            wrapped.cause.as_deref(),
            Some(Error::Io { message, .. }) if message == "disk on fire"
        ));
    }

    #[test]
    fn test_download_error_carries_resource() {
        let err = DownloadError::new("ep-1", NetworkError::DownloadFailed("reset".into()).into());
        assert_eq!(err.resource_id, "ep-1");
        assert_eq!(err.to_string(), "download of ep-1 failed: network error: download failed: reset");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_verification_missing_file_sentinel() {
        let err = VerificationError::file_not_found("abc");
        assert_eq!(err.actual, FILE_NOT_FOUND);
        assert!(err.is_missing_file());
        assert_eq!(err.user_code(), Some("verification.checksum_mismatch"));
    }

    #[test]
    fn test_error_clone() {
        let err: Error = ExtractionError::with_cause("decode failed", Error::Cancelled).into();
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }
}
