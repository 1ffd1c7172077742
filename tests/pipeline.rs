//! Download, verify and install against a local HTTP server

mod common;

use common::{completed_records, drain, episode_archive, TestEnvironment};
use episode_errors::{Error, VerificationError};
use episode_hash::{Hash, HashAlgorithm};
use episode_types::EpisodeResource;
use httpmock::prelude::*;

#[tokio::test]
async fn test_download_verify_install() {
    let env = TestEnvironment::new();
    let archive = episode_archive("Pilot", 4);
    let digest = Hash::from_data(HashAlgorithm::Sha256, &archive).to_hex();

    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/episodes/pilot_v1.zip");
            then.status(200)
                .header("content-length", archive.len().to_string())
                .body(archive.clone());
        })
        .await;

    let resource = EpisodeResource::new(
        "pilot",
        1,
        archive.len() as u64,
        server.url("/episodes/pilot_v1.zip"),
    );
    let records = completed_records(drain(env.downloader.download(resource.clone())).await);
    mock.assert_async().await;
    assert!(records.windows(2).all(|w| w[0].progress <= w[1].progress));
    assert_eq!(records.last().unwrap().total_bytes, archive.len() as u64);
    assert!(!env.downloader.is_active("pilot"));

    let archive_path = env.downloader.completed_archive_path(&resource);
    env.verifier
        .verify(&archive_path, &digest.to_uppercase())
        .await
        .unwrap();

    let installed = env
        .installer
        .install(&archive_path, "pilot", 1)
        .await
        .unwrap();
    assert_eq!(installed, env.layout.final_path("pilot", 1));
    assert!(installed.join("manifest.json").is_file());
    assert!(installed.join("images/003.png").is_file());
    assert_eq!(
        env.installer.installed_version_numbers("pilot").await.unwrap(),
        vec![1]
    );
}

#[tokio::test]
async fn test_resume_over_http() {
    let env = TestEnvironment::new();
    let archive = episode_archive("Resumed", 8);
    let split = archive.len() / 3;

    tokio::fs::create_dir_all(env.layout.temp_dir()).await.unwrap();
    tokio::fs::write(env.layout.partial_path("resumed", 2), &archive[..split])
        .await
        .unwrap();

    let server = MockServer::start_async().await;
    let rest = archive[split..].to_vec();
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/resumed_v2.zip")
                .header("range", format!("bytes={split}-"));
            then.status(206)
                .header("content-length", rest.len().to_string())
                .body(rest.clone());
        })
        .await;

    let resource = EpisodeResource::new(
        "resumed",
        2,
        archive.len() as u64,
        server.url("/resumed_v2.zip"),
    );
    let records = completed_records(drain(env.downloader.download(resource.clone())).await);
    mock.assert_async().await;

    // The record after the initial one already counts the partial file
    assert_eq!(records[1].bytes_received, split as u64);
    assert!(records[2..]
        .iter()
        .all(|r| r.total_bytes == archive.len() as u64));
    assert!(records
        .windows(2)
        .all(|w| w[0].bytes_received <= w[1].bytes_received));

    let archive_path = env.downloader.completed_archive_path(&resource);
    assert_eq!(tokio::fs::read(&archive_path).await.unwrap(), archive);
    assert!(!env.layout.partial_path("resumed", 2).exists());

    env.installer
        .install(&archive_path, "resumed", 2)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_digest_mismatch_is_reported() {
    let env = TestEnvironment::new();
    let archive = episode_archive("Tampered", 2);

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/tampered_v1.zip");
            then.status(200).body(archive.clone());
        })
        .await;

    let resource = EpisodeResource::new("tampered", 1, 0, server.url("/tampered_v1.zip"));
    completed_records(drain(env.downloader.download(resource.clone())).await);

    let expected = "0".repeat(64);
    let err = env
        .verifier
        .verify(&env.downloader.completed_archive_path(&resource), &expected)
        .await
        .unwrap_err();

    match err {
        Error::Verification(VerificationError {
            expected: reported,
            actual,
            ..
        }) => {
            assert_eq!(reported, expected);
            assert_eq!(
                actual,
                Hash::from_data(HashAlgorithm::Sha256, &archive).to_hex()
            );
        }
        other => panic!("expected verification error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_versions_live_side_by_side() {
    let env = TestEnvironment::new();
    let server = MockServer::start_async().await;

    for version in [1u32, 2] {
        let archive = episode_archive(&format!("Finale v{version}"), 1);
        let path = format!("/finale_v{version}.zip");
        server
            .mock_async(|when, then| {
                when.method(GET).path(path.clone());
                then.status(200).body(archive.clone());
            })
            .await;

        let resource = EpisodeResource::new("finale", version, 0, server.url(&path));
        completed_records(drain(env.downloader.download(resource.clone())).await);
        env.installer
            .install(
                &env.downloader.completed_archive_path(&resource),
                "finale",
                version,
            )
            .await
            .unwrap();
    }

    assert_eq!(
        env.installer.installed_version_numbers("finale").await.unwrap(),
        vec![1, 2]
    );

    env.installer.remove_version("finale", 1).await.unwrap();
    assert_eq!(
        env.installer.installed_version_numbers("finale").await.unwrap(),
        vec![2]
    );

    // Both completed archives are still in the temp directory
    assert_eq!(env.downloader.cleanup_temp_files("finale").await, 2);
}
