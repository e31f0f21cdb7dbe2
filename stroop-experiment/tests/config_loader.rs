use std::io::Write;

use stroop_experiment::{ConfigLoadError, InvalidConfig, SessionConfig};
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn loads_explicit_file() {
    let file = write_config(
        r#"
        trial_count = 24
        stimulus_duration_ms = 900
        congruency_ratio = 0.25
        "#,
    );
    let config = SessionConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.trial_count, 24);
    assert_eq!(config.stimulus_duration_ms, 900.0);
    assert_eq!(config.congruency_ratio, 0.25);
    assert_eq!(config.fixation_duration_ms, 500.0);
}

#[test]
fn missing_explicit_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    match SessionConfig::load(Some(&path)) {
        Err(ConfigLoadError::Read { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected read error, got {other:?}"),
    }
}

#[test]
fn malformed_file_is_a_parse_error() {
    let file = write_config("trial_count = [");
    assert!(matches!(
        SessionConfig::load(Some(file.path())),
        Err(ConfigLoadError::Parse { .. })
    ));
}

#[test]
fn out_of_range_values_fail_validation() {
    let file = write_config("congruency_ratio = 1.5");
    match SessionConfig::load(Some(file.path())) {
        Err(ConfigLoadError::Invalid(err)) => {
            assert_eq!(err, InvalidConfig::CongruencyRatio(1.5));
            assert!(err.to_string().contains("congruency_ratio"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn negative_duration_fails_validation_not_parsing() {
    let file = write_config("stimulus_duration_ms = -5");
    match SessionConfig::load(Some(file.path())) {
        Err(ConfigLoadError::Invalid(err)) => {
            assert_eq!(err, InvalidConfig::StimulusDuration);
            assert_eq!(err.to_string(), "stimulus_duration_ms must be > 0");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn fractional_durations_load() {
    let file = write_config(
        r#"
        stimulus_duration_ms = 1200.5
        feedback_duration_ms = 450.25
        "#,
    );
    let config = SessionConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.stimulus_duration_ms, 1200.5);
    assert_eq!(config.feedback_duration_ms, 450.25);
}

#[test]
fn infinite_duration_fails_validation() {
    let file = write_config("fixation_duration_ms = inf");
    assert!(matches!(
        SessionConfig::load(Some(file.path())),
        Err(ConfigLoadError::Invalid(InvalidConfig::FixationDuration))
    ));
}
