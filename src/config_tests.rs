//! Tests for configuration assembly and INI loading.

use super::*;
use std::io::Write as _;

use rstest::rstest;
use tempfile::NamedTempFile;

fn complete() -> LoggerBuilder {
    LoggerBuilder::new()
        .with_endpoint("cn-hangzhou.log.aliyuncs.com")
        .with_credentials("id", "secret")
        .with_project("proj")
        .with_logstore("app")
}

#[test]
fn defaults_match_documented_values() {
    let config = LoggerConfig::default();
    assert_eq!(config.queue_capacity, 100);
    assert_eq!(config.worker_count, 3);
    assert!(!config.debug);
    assert_eq!(config.default_timezone, "Asia/Shanghai");
    assert_eq!(config.connect_timeout, Duration::from_secs(5));
    assert_eq!(config.request_timeout, Duration::from_secs(30));
}

#[test]
fn complete_builder_validates() {
    let config = complete()
        .with_queue_capacity(8)
        .with_worker_count(2)
        .with_request_timeout_ms(1_500)
        .config()
        .expect("valid config");
    assert_eq!(config.queue_capacity, 8);
    assert_eq!(config.worker_count, 2);
    assert_eq!(config.request_timeout, Duration::from_millis(1_500));
}

#[rstest]
#[case(LoggerBuilder::new().with_queue_capacity(0), "queue_capacity")]
#[case(LoggerBuilder::new().with_worker_count(0), "worker_count")]
#[case(LoggerBuilder::new().with_connect_timeout_ms(0), "connect_timeout_ms")]
fn zero_sizes_are_invalid(#[case] builder: LoggerBuilder, #[case] field: &str) {
    match builder.with_debug(true).config() {
        Err(ConfigError::InvalidConfig(msg)) => assert!(msg.contains(field), "{msg}"),
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
}

#[rstest]
#[case(complete().with_project(""), "project")]
#[case(complete().with_logstore(" "), "logstore")]
#[case(complete().with_endpoint(""), "endpoint")]
#[case(complete().with_credentials("", "secret"), "access_key_id")]
#[case(complete().with_credentials("id", ""), "access_key_secret")]
fn missing_settings_are_named(#[case] builder: LoggerBuilder, #[case] field: &str) {
    match builder.config() {
        Err(ConfigError::Missing(name)) => assert_eq!(name, field),
        other => panic!("expected Missing, got {other:?}"),
    }
}

#[test]
fn debug_mode_requires_nothing() {
    assert!(LoggerBuilder::new().with_debug(true).config().is_ok());
}

#[test]
fn secrets_are_redacted_in_debug_output() {
    let config = complete()
        .with_notifier_credentials("tok", "SECdingtalk")
        .config()
        .expect("valid config");
    let rendered = format!("{config:?}");
    assert!(!rendered.contains("SECdingtalk"));
    assert!(!rendered.contains("\"secret\""));
    assert!(rendered.contains("<redacted>"));
}

const SAMPLE: &str = "\
[sls]
endpoint = https://cn-beijing.log.aliyuncs.com
access_key_id = LTAIexample
access_key_secret = hush
project = shop
logstore = orders
source = web-1

[notifier]
token = abc123
secret = SECxyz

[pipeline]
queue_capacity = 16
worker_count = 4
debug = no
default_timezone = Europe/Berlin
request_timeout_ms = 2500
";

#[test]
fn ini_sections_populate_config() {
    let config = LoggerConfig::from_ini_str(SAMPLE).expect("parse ini");
    assert_eq!(config.endpoint, "https://cn-beijing.log.aliyuncs.com");
    assert_eq!(config.access_key_id, "LTAIexample");
    assert_eq!(config.project, "shop");
    assert_eq!(config.logstore, "orders");
    assert_eq!(config.source.as_deref(), Some("web-1"));
    assert_eq!(config.notifier_token, "abc123");
    assert_eq!(config.notifier_secret, "SECxyz");
    assert_eq!(config.queue_capacity, 16);
    assert_eq!(config.worker_count, 4);
    assert!(!config.debug);
    assert_eq!(config.default_timezone, "Europe/Berlin");
    assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
    assert_eq!(config.request_timeout, Duration::from_millis(2_500));
    config.validate(false).expect("sample is complete");
}

#[rstest]
#[case("[pipeline]\nworker_count = many\n")]
#[case("[pipeline]\nqueue_capacity = -1\n")]
#[case("[pipeline]\ndebug = perhaps\n")]
fn malformed_values_are_invalid(#[case] text: &str) {
    assert!(matches!(
        LoggerConfig::from_ini_str(text),
        Err(ConfigError::InvalidConfig(_))
    ));
}

#[test]
fn ini_file_is_read_from_disk() {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(SAMPLE.as_bytes()).expect("write sample");
    let config = LoggerConfig::from_ini_file(file.path()).expect("load file");
    assert_eq!(config.project, "shop");
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = LoggerConfig::from_ini_file(dir.path().join("absent.ini")).expect_err("no file");
    assert!(matches!(err, ConfigError::Io(_)));
}
