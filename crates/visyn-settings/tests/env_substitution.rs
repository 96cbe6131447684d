//! Integration tests for environment variable substitution.
//!
//! These tests resolve [`GlobalSettings`] against explicit environment
//! snapshots, so the process environment never leaks in.

use serde_json::json;
use visyn_settings::{EnvSnapshot, GlobalSettings, SettingsError, SettingsLoader};

fn env(vars: &[(&str, &str)]) -> EnvSnapshot {
    vars.iter().copied().collect()
}

fn scenario() -> EnvSnapshot {
    env(&[
        // Basic top-level key substitution
        ("SECRET_KEY", "Custom_Secret_Key"),
        // Deeply nested key of a typed model, coerced to bool
        ("visyn_core__SECURITY__STORE__ALB_SECURITY_STORE__ENABLE", "True"),
        // Keys inside the logging map are not coerced
        ("visyn_core__LOGGING__VERSION", "2"),
        ("visyn_core__LOGGING__ROOT__LEVEL", "DEBUG"),
    ])
}

#[test]
fn test_defaults_without_overrides() {
    let settings = GlobalSettings::from_env(EnvSnapshot::new()).unwrap();

    assert_ne!(settings.secret_key, "Custom_Secret_Key");
    assert!(!settings.visyn_core.security.store.alb_security_store.enable);
    assert_eq!(settings.visyn_core.logging["version"], 1);
    assert_eq!(settings.visyn_core.logging["root"]["level"], "INFO");
}

#[test]
fn test_env_substitution() {
    let settings = GlobalSettings::from_env(scenario()).unwrap();

    assert_eq!(settings.secret_key, "Custom_Secret_Key");
    assert!(settings.visyn_core.security.store.alb_security_store.enable);
    // A string: the logging map declares no value types.
    assert_eq!(settings.visyn_core.logging["version"], "2");
    assert_eq!(settings.visyn_core.logging["root"]["level"], "DEBUG");

    assert_eq!(settings.get_nested("secret_key").unwrap(), &json!("Custom_Secret_Key"));
    assert_eq!(
        settings
            .get_nested("visyn_core.security.store.alb_security_store.enable")
            .unwrap(),
        &json!(true)
    );
    assert_eq!(settings.get_nested("visyn_core.logging.version").unwrap(), &json!("2"));
    assert_eq!(settings.get_nested("visyn_core.logging.root.level").unwrap(), &json!("DEBUG"));
}

#[test]
fn test_env_substitution_keeps_untouched_map_keys() {
    let settings = GlobalSettings::from_env(scenario()).unwrap();
    let logging = &settings.visyn_core.logging;

    assert_eq!(logging["root"]["handlers"], json!(["console"]));
    assert_eq!(logging["handlers"]["console"]["formatter"], "line");
}

#[test]
fn test_nested_reads_match_attribute_access() {
    let settings = GlobalSettings::from_env(scenario()).unwrap();

    let enable: bool = settings
        .get_nested_as("visyn_core.security.store.alb_security_store.enable")
        .unwrap();
    assert_eq!(enable, settings.visyn_core.security.store.alb_security_store.enable);

    let expire: i64 = settings.get_nested_as("JWT_EXPIRE_IN_SECONDS").unwrap();
    assert_eq!(expire, settings.jwt_expire_in_seconds);

    let logging = settings.get_nested("visyn_core.logging").unwrap();
    assert_eq!(logging.as_object(), Some(&settings.visyn_core.logging));

    let store = settings.get_nested("visyn_core.security.store").unwrap();
    assert_eq!(
        store,
        &serde_json::to_value(&settings.visyn_core.security.store).unwrap()
    );
}

#[test]
fn test_nested_read_of_unknown_path_fails() {
    let settings = GlobalSettings::from_env(scenario()).unwrap();

    for path in [
        "visyn_core.nope",
        "visyn_core.logging.missing",
        "visyn_core.logging.ROOT.level",
        "secret_key.length",
        "visyn_core.logging.version.major",
        "",
    ] {
        let err = settings.get_nested(path).unwrap_err();
        assert!(err.is_path_error(), "{path}: {err}");
    }
}

#[test]
fn test_nested_read_type_mismatch() {
    let settings = GlobalSettings::from_env(scenario()).unwrap();
    let err = settings
        .get_nested_as::<i64>("visyn_core.logging.version")
        .unwrap_err();
    assert!(matches!(err, SettingsError::Deserialize { ref path, .. } if path == "visyn_core.logging.version"));
}

#[test]
fn test_resolution_is_idempotent() {
    let first = GlobalSettings::from_env(scenario()).unwrap();
    let second = GlobalSettings::from_env(scenario()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_malformed_bool_names_variable() {
    let err = GlobalSettings::from_env(env(&[(
        "visyn_core__SECURITY__STORE__ALB_SECURITY_STORE__ENABLE",
        "sometimes",
    )]))
    .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("visyn_core__SECURITY__STORE__ALB_SECURITY_STORE__ENABLE"));
    assert!(message.contains("bool"));
}

#[test]
fn test_coercion_failure_fails_whole_load() {
    let mut vars = scenario();
    vars.set("VISYN_CORE__CYPRESS", "maybe");

    let err = GlobalSettings::from_env(vars).unwrap_err();
    assert!(matches!(err, SettingsError::Coercion { ref var, .. } if var == "VISYN_CORE__CYPRESS"));

    let settings = GlobalSettings::from_env(scenario()).unwrap();
    assert_eq!(settings.secret_key, "Custom_Secret_Key");
    assert!(!settings.visyn_core.cypress);
}

#[test]
fn test_mistyped_nested_variable_fails() {
    let err = GlobalSettings::from_env(env(&[(
        "visyn_core__SECURITY__STORE__ALB_SECURTY_STORE__ENABLE",
        "True",
    )]))
    .unwrap_err();
    assert!(matches!(err, SettingsError::PathNotFound { ref segment, .. } if segment == "ALB_SECURTY_STORE"));
}

#[test]
fn test_foreign_variables_are_skipped() {
    let mut vars = scenario();
    vars.set("PATH", "/usr/local/bin:/usr/bin");
    vars.set("HOME", "/home/visyn");

    let with_foreign = GlobalSettings::from_env(vars).unwrap();
    let without = GlobalSettings::from_env(scenario()).unwrap();
    assert_eq!(with_foreign, without);
}

#[test]
fn test_foreign_variables_rejected_in_strict_mode() {
    let mut vars = scenario();
    vars.set("HOME", "/home/visyn");

    let err = SettingsLoader::<GlobalSettings>::new()
        .with_env(vars)
        .deny_unknown_variables()
        .load()
        .unwrap_err();
    assert!(matches!(err, SettingsError::UnknownVariable { ref var } if var == "HOME"));
}

#[test]
fn test_strict_mode_accepts_known_variables() {
    let settings = SettingsLoader::<GlobalSettings>::new()
        .with_env(scenario())
        .deny_unknown_variables()
        .load()
        .unwrap();
    assert_eq!(settings.secret_key, "Custom_Secret_Key");
}

#[test]
fn test_snapshot_replaces_environment() {
    // The second snapshot carries no override, so nothing from the first one leaks.
    let _ = GlobalSettings::from_env(scenario()).unwrap();
    let settings = GlobalSettings::from_env(EnvSnapshot::new()).unwrap();
    assert_eq!(settings.visyn_core.logging["version"], 1);
}

#[test]
fn test_concurrent_nested_reads() {
    let settings = GlobalSettings::from_env(scenario()).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    settings
                        .get_nested("visyn_core.logging.root.level")
                        .unwrap()
                        .clone()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), json!("DEBUG"));
        }
    });
}
