//! URL validation and HTTP response validation for downloads

use episode_errors::{Error, NetworkError};
use url::Url;

/// Validate URL and check for supported protocols
///
/// # Errors
///
/// Returns an error if the URL is malformed or not http(s).
pub fn validate_url(url: &str) -> Result<Url, Error> {
    let parsed = Url::parse(url).map_err(|e| NetworkError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(NetworkError::UnsupportedProtocol {
            protocol: scheme.to_string(),
        }
        .into()),
    }
}

/// Validate HTTP response for download
///
/// A resumed request must be answered with `206 Partial Content`; a server
/// that ignores the range and sends the whole body would corrupt the
/// appended file.
pub(crate) fn validate_response(
    response: &reqwest::Response,
    url: &str,
    is_resume: bool,
) -> Result<(), Error> {
    let status = response.status();

    if !status.is_success() {
        return Err(NetworkError::HttpError {
            status: status.as_u16(),
            message: status.to_string(),
        }
        .into());
    }

    if is_resume && status != reqwest::StatusCode::PARTIAL_CONTENT {
        return Err(NetworkError::PartialContentNotSupported {
            url: url.to_string(),
        }
        .into());
    }

    Ok(())
}

/// Whether a resume was refused only because `offset` is already the end
///
/// Servers answer a range starting at the resource length with
/// `416 Range Not Satisfiable` and `Content-Range: bytes */<length>`.
pub(crate) fn range_already_satisfied(response: &reqwest::Response, offset: u64) -> bool {
    if response.status() != reqwest::StatusCode::RANGE_NOT_SATISFIABLE {
        return false;
    }

    response
        .headers()
        .get(reqwest::header::CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(unsatisfied_range_length)
        == Some(offset)
}

fn unsatisfied_range_length(content_range: &str) -> Option<u64> {
    content_range
        .trim()
        .strip_prefix("bytes */")?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://cdn.example.com/ep/pilot_v3.zip").is_ok());
        assert!(validate_url("http://localhost:8080/a.zip").is_ok());
        assert!(matches!(
            validate_url("ftp://example.com/a.zip"),
            Err(Error::Network(NetworkError::UnsupportedProtocol { .. }))
        ));
        assert!(matches!(
            validate_url("not a url"),
            Err(Error::Network(NetworkError::InvalidUrl(_)))
        ));
    }

    #[test]
    fn test_unsatisfied_range_length() {
        assert_eq!(unsatisfied_range_length("bytes */1024"), Some(1024));
        assert_eq!(unsatisfied_range_length(" bytes */0 "), Some(0));
        assert_eq!(unsatisfied_range_length("bytes 0-9/1024"), None);
        assert_eq!(unsatisfied_range_length("bytes */*"), None);
    }
}
