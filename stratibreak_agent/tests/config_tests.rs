//! Integration tests for loading configuration from disk.

use std::path::Path;

use stratibreak_agent::{ConfigError, StratibreakConfig};
use stratibreak_core::BucketPolicy;

#[test]
fn test_load_yaml_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("stratibreak.yaml");
    std::fs::write(
        &path,
        r#"
detection:
  tolerance: 0.1
  default_confidence: 0.6
scoring:
  severity_weight: 0.4
  impact_weight: 0.3
  variance_weight: 0.2
  confidence_weight: 0.1
summary:
  bucket_policy: non_empty_only
"#,
    )
    .unwrap();

    let config = StratibreakConfig::load(&path).unwrap();
    assert_eq!(config.detection.tolerance, 0.1);
    assert_eq!(config.detection.default_confidence, 0.6);
    assert_eq!(config.scoring.impact_weight, 0.3);
    assert_eq!(config.summary.bucket_policy, BucketPolicy::NonEmptyOnly);
}

#[test]
fn test_missing_file_reports_path() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("absent.yaml");

    let err = StratibreakConfig::load(&path).unwrap_err();
    match &err {
        ConfigError::Io { path: reported, .. } => assert_eq!(reported, &path),
        other => panic!("expected I/O error, got {:?}", other),
    }
    assert!(err.to_string().contains("absent.yaml"));
}

#[test]
fn test_load_or_default_without_path() {
    let config = StratibreakConfig::load_or_default(None::<&Path>).unwrap();
    assert_eq!(config, StratibreakConfig::default());
}

#[test]
fn test_invalid_confidence_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("bad.yaml");
    std::fs::write(&path, "detection:\n  default_confidence: 1.5\n").unwrap();

    assert!(matches!(
        StratibreakConfig::load(&path),
        Err(ConfigError::Invalid(_))
    ));
}
