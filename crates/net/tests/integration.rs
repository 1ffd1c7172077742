//! Integration tests for the HTTP transfer client

#[cfg(test)]
mod tests {
    use episode_errors::{Error, NetworkError};
    use episode_net::*;
    use httpmock::prelude::*;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::tempdir;

    fn fast_client(retry_count: u32) -> HttpTransferClient {
        let config = NetConfig {
            retry_count,
            retry_delay: Duration::from_millis(10),
            chunk_timeout: Duration::from_secs(5),
            ..NetConfig::default()
        };
        HttpTransferClient::new(NetClient::new(config).unwrap())
    }

    #[tokio::test]
    async fn test_fetch_full_body() {
        let server = MockServer::start_async().await;
        let content = b"episode archive bytes";
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/pilot_v1.zip");
                then.status(200)
                    .header("content-length", content.len().to_string())
                    .body(content);
            })
            .await;

        let temp = tempdir().unwrap();
        let request = TransferRequest {
            url: server.url("/pilot_v1.zip"),
            destination: temp.path().join("pilot_v1.zip.partial"),
            start_offset: 0,
        };
        let calls = Mutex::new(Vec::new());
        let on_progress = |received: u64, total: u64| calls.lock().unwrap().push((received, total));

        fast_client(0)
            .fetch(&request, &on_progress, &CancelToken::new())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(tokio::fs::read(&request.destination).await.unwrap(), content);

        let calls = calls.into_inner().unwrap();
        let (last_received, last_total) = *calls.last().unwrap();
        assert_eq!(last_received, content.len() as u64);
        assert_eq!(last_total, content.len() as u64);
        assert!(calls.windows(2).all(|w| w[0].0 <= w[1].0));
    }

    #[tokio::test]
    async fn test_resume_sends_range_and_appends() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/pilot_v2.zip")
                    .header("range", "bytes=6-");
                then.status(206)
                    .header("content-length", "5")
                    .body("world");
            })
            .await;

        let temp = tempdir().unwrap();
        let destination = temp.path().join("pilot_v2.zip.partial");
        tokio::fs::write(&destination, b"hello ").await.unwrap();

        let request = TransferRequest {
            url: server.url("/pilot_v2.zip"),
            destination: destination.clone(),
            start_offset: 6,
        };
        let last = Mutex::new((0, 0));
        let on_progress = |received: u64, total: u64| *last.lock().unwrap() = (received, total);

        fast_client(0)
            .fetch(&request, &on_progress, &CancelToken::new())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            tokio::fs::read(&destination).await.unwrap(),
            b"hello world"
        );
        // Counts are per request, not cumulative with the partial file
        assert_eq!(*last.lock().unwrap(), (5, 5));
    }

    #[tokio::test]
    async fn test_resume_requires_partial_content() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/full.zip");
                then.status(200).body("entire body again");
            })
            .await;

        let temp = tempdir().unwrap();
        let destination = temp.path().join("full.zip.partial");
        tokio::fs::write(&destination, b"entire").await.unwrap();

        let request = TransferRequest {
            url: server.url("/full.zip"),
            destination: destination.clone(),
            start_offset: 6,
        };
        let err = fast_client(0)
            .fetch(&request, &|_, _| {}, &CancelToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Network(NetworkError::PartialContentNotSupported { .. })
        ));
        // The partial file is left untouched
        assert_eq!(tokio::fs::read(&destination).await.unwrap(), b"entire");
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing.zip");
                then.status(404);
            })
            .await;

        let temp = tempdir().unwrap();
        let request = TransferRequest {
            url: server.url("/missing.zip"),
            destination: temp.path().join("missing.zip.partial"),
            start_offset: 0,
        };
        let err = fast_client(0)
            .fetch(&request, &|_, _| {}, &CancelToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Network(NetworkError::HttpError { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/flaky.zip");
                then.status(503);
            })
            .await;

        let temp = tempdir().unwrap();
        let request = TransferRequest {
            url: server.url("/flaky.zip"),
            destination: temp.path().join("flaky.zip.partial"),
            start_offset: 0,
        };
        let err = fast_client(2)
            .fetch(&request, &|_, _| {}, &CancelToken::new())
            .await
            .unwrap_err();

        mock.assert_hits_async(3).await;
        assert!(matches!(
            err,
            Error::Network(NetworkError::HttpError { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_cancelled_before_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/slow.zip");
                then.status(200)
                    .delay(Duration::from_secs(10))
                    .body("late");
            })
            .await;

        let temp = tempdir().unwrap();
        let request = TransferRequest {
            url: server.url("/slow.zip"),
            destination: temp.path().join("slow.zip.partial"),
            start_offset: 0,
        };
        let token = CancelToken::new();
        let canceller = {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                token.cancel();
            })
        };

        let err = tokio::time::timeout(
            Duration::from_secs(5),
            fast_client(0).fetch(&request, &|_, _| {}, &token),
        )
        .await
        .unwrap()
        .unwrap_err();
        canceller.await.unwrap();

        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_resume_at_end_of_resource_succeeds() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/done.zip")
                    .header("range", "bytes=10-");
                then.status(416).header("content-range", "bytes */10");
            })
            .await;

        let temp = tempdir().unwrap();
        let destination = temp.path().join("done.zip.partial");
        tokio::fs::write(&destination, b"0123456789").await.unwrap();

        let request = TransferRequest {
            url: server.url("/done.zip"),
            destination: destination.clone(),
            start_offset: 10,
        };
        fast_client(0)
            .fetch(&request, &|_, _| {}, &CancelToken::new())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(tokio::fs::read(&destination).await.unwrap(), b"0123456789");
    }

    #[tokio::test]
    async fn test_unsatisfiable_range_elsewhere_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/shrunk.zip");
                then.status(416).header("content-range", "bytes */4");
            })
            .await;

        let temp = tempdir().unwrap();
        let destination = temp.path().join("shrunk.zip.partial");
        tokio::fs::write(&destination, b"0123456789").await.unwrap();

        let request = TransferRequest {
            url: server.url("/shrunk.zip"),
            destination,
            start_offset: 10,
        };
        let err = fast_client(0)
            .fetch(&request, &|_, _| {}, &CancelToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Network(NetworkError::HttpError { status: 416, .. })
        ));
    }

    #[tokio::test]
    async fn test_response_headers_timeout() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/stalled.zip");
                then.status(200)
                    .delay(Duration::from_secs(5))
                    .body("late");
            })
            .await;

        let config = NetConfig {
            timeout: Duration::from_millis(100),
            retry_count: 0,
            ..NetConfig::default()
        };
        let client = HttpTransferClient::new(NetClient::new(config).unwrap());

        let temp = tempdir().unwrap();
        let request = TransferRequest {
            url: server.url("/stalled.zip"),
            destination: temp.path().join("stalled.zip.partial"),
            start_offset: 0,
        };
        let err = tokio::time::timeout(
            Duration::from_secs(3),
            client.fetch(&request, &|_, _| {}, &CancelToken::new()),
        )
        .await
        .unwrap()
        .unwrap_err();

        assert!(matches!(err, Error::Network(NetworkError::Timeout { .. })));
    }
}
