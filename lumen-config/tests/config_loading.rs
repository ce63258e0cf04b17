use std::env;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use lumen_config::models::player::{CONFIG_JSON_ENV, CONFIG_PATH_ENV};
use lumen_config::{PlayerConfig, PlayerConfigSource};
use once_cell::sync::Lazy;
use tempfile::NamedTempFile;

// Environment variables are process-global; keep the tests that touch them
// from interleaving.
static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

fn clear_env() {
    // SAFETY: callers hold ENV_LOCK, so no other test thread reads or
    // writes these variables concurrently.
    unsafe {
        env::remove_var(CONFIG_PATH_ENV);
        env::remove_var(CONFIG_JSON_ENV);
    }
}

fn write_temp(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn defaults_when_nothing_is_configured() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let (config, source) = PlayerConfig::load_from_env().unwrap();
    assert_eq!(source, PlayerConfigSource::Default);
    assert_eq!(config, PlayerConfig::default());
}

#[test]
fn env_path_takes_precedence_over_inline_json() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let file = write_temp(
        ".toml",
        "[buffering]\nspinner_debounce_ms = 200\n\n[seek]\nscrub_throttle_ms = 33\n",
    );
    unsafe {
        env::set_var(CONFIG_PATH_ENV, file.path());
        env::set_var(CONFIG_JSON_ENV, r#"{ "seek": { "scrub_throttle_ms": 1 } }"#);
    }

    let (config, source) = PlayerConfig::load_from_env().unwrap();
    clear_env();

    assert_eq!(source, PlayerConfigSource::EnvPath(file.path().to_path_buf()));
    assert_eq!(config.buffering.spinner_debounce_ms, 200);
    assert_eq!(config.seek.scrub_throttle_ms, 33);
    assert_eq!(config.watch_sync.completion_threshold, 0.95);
}

#[test]
fn inline_json_is_used_without_a_path() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    unsafe {
        env::set_var(
            CONFIG_JSON_ENV,
            r#"{ "watch_sync": { "debounce_ms": 2500, "min_delta_seconds": 2.0 } }"#,
        );
    }

    let (config, source) = PlayerConfig::load_from_env().unwrap();
    clear_env();

    assert_eq!(source, PlayerConfigSource::EnvInline);
    assert_eq!(config.watch_sync.debounce_ms, 2_500);
    assert_eq!(config.watch_sync.min_delta_seconds, 2.0);
}

#[test]
fn invalid_values_fail_loading() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    unsafe {
        env::set_var(
            CONFIG_JSON_ENV,
            r#"{ "watch_sync": { "completion_threshold": 1.5 } }"#,
        );
    }

    let result = PlayerConfig::load_from_env();
    clear_env();

    let err = format!("{:#}", result.unwrap_err());
    assert!(err.contains("completion threshold"), "{err}");
}

#[test]
fn json_file_extension_is_parsed_as_json() {
    let file = write_temp(".json", r#"{ "startup": { "autoplay": false } }"#);
    let config = PlayerConfig::load_from_file(file.path()).unwrap();
    assert!(!config.startup.autoplay);
    assert_eq!(config.startup.auto_quality_grace_ms, 1_000);
}

#[test]
fn extensionless_file_falls_back_through_both_formats() {
    let file = write_temp(
        "",
        "[controls]\nauto_hide_ms = 4000\nprevious_restart_ratio = 0.1\n",
    );
    let config = PlayerConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.controls.auto_hide_ms, 4_000);
    assert_eq!(config.controls.previous_restart_ratio, 0.1);
}

#[test]
fn missing_file_reports_path() {
    let err = PlayerConfig::load_from_file(Path::new("/nonexistent/player.toml"))
        .unwrap_err()
        .to_string();
    assert!(err.contains("/nonexistent/player.toml"));
}
