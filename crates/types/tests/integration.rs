//! Integration tests for shared types

use episode_types::{EpisodeResource, PackageRef, ValidationResult};

#[test]
fn test_package_ref_display() {
    let package = PackageRef::new("pilot", 3);
    assert_eq!(package.to_string(), "pilot@v3");
}

#[test]
fn test_resource_package_ref() {
    let resource = EpisodeResource::new("pilot", 7, 1024, "https://cdn.example.com/pilot.zip");
    assert_eq!(resource.package_ref(), PackageRef::new("pilot", 7));
}

#[test]
fn test_resource_size_defaults_to_zero() {
    let json = r#"{"id":"pilot","version":2,"download_url":"https://cdn.example.com/p.zip"}"#;
    let resource: EpisodeResource = serde_json::from_str(json).unwrap();
    assert_eq!(resource.size_bytes, 0);
    assert_eq!(resource.version, 2);
}

#[test]
fn test_validation_result_tracks_errors() {
    let ok = ValidationResult::from_errors(Vec::new());
    assert!(ok.is_valid);
    assert_eq!(ok, ValidationResult::valid());

    let bad = ValidationResult::from_errors(vec![
        "missing manifest".to_string(),
        "missing images directory".to_string(),
    ]);
    assert!(!bad.is_valid);
    assert_eq!(bad.summary(), "missing manifest; missing images directory");
}
