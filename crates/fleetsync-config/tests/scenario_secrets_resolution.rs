//! Secret resolution from env var names.
//!
//! The lookups go through `resolve_secrets_with` with a map, so nothing here
//! touches the process environment. `resolve_secrets` is exercised with var
//! names nobody sets.

use std::collections::HashMap;

use fleetsync_config::load_layered_yaml_from_strings;
use fleetsync_config::secrets::{
    parse_env_names, resolve_secrets, resolve_secrets_with, DEFAULT_DIVERA_ACCESSKEY_VAR,
    DEFAULT_STEIN_API_KEY_VAR,
};

const YAML: &str = r#"
divera:
  keys_env:
    accesskey: "OV_PB_DIVERA"
stein:
  business_unit: "Paderborn"
  keys_env:
    api_key: "OV_PB_STEIN_KEY"
    username: "OV_PB_STEIN_USER"
    password: "OV_PB_STEIN_PASS"
"#;

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn names_come_from_config() {
    let cfg = load_layered_yaml_from_strings(&[YAML]).unwrap();
    let names = parse_env_names(&cfg.config_json);
    assert_eq!(names.divera_accesskey_var, "OV_PB_DIVERA");
    assert_eq!(names.stein_password_var, "OV_PB_STEIN_PASS");
}

#[test]
fn names_default_when_absent() {
    let names = parse_env_names(&serde_json::json!({}));
    assert_eq!(names.divera_accesskey_var, DEFAULT_DIVERA_ACCESSKEY_VAR);
    assert_eq!(names.stein_api_key_var, DEFAULT_STEIN_API_KEY_VAR);
}

#[test]
fn full_set_resolves_with_login() {
    let cfg = load_layered_yaml_from_strings(&[YAML]).unwrap();
    let vars = env(&[
        ("OV_PB_DIVERA", "d-key"),
        ("OV_PB_STEIN_KEY", "s-key"),
        ("OV_PB_STEIN_USER", "ov-pb"),
        ("OV_PB_STEIN_PASS", "hunter2"),
    ]);
    let s = resolve_secrets_with(&cfg.config_json, |n| vars.get(n).cloned()).unwrap();
    assert_eq!(s.divera_accesskey, "d-key");
    assert_eq!(s.stein_api_key, "s-key");
    let login = s.stein_login.as_ref().unwrap();
    assert_eq!(login.username, "ov-pb");

    let dbg = format!("{s:?}");
    assert!(!dbg.contains("d-key"));
    assert!(!dbg.contains("hunter2"));
    assert!(dbg.contains("<REDACTED>"));
}

#[test]
fn login_is_optional() {
    let cfg = load_layered_yaml_from_strings(&[YAML]).unwrap();
    let vars = env(&[("OV_PB_DIVERA", "d-key"), ("OV_PB_STEIN_KEY", "s-key")]);
    let s = resolve_secrets_with(&cfg.config_json, |n| vars.get(n).cloned()).unwrap();
    assert!(s.stein_login.is_none());
}

#[test]
fn half_a_login_is_rejected() {
    let cfg = load_layered_yaml_from_strings(&[YAML]).unwrap();
    let vars = env(&[
        ("OV_PB_DIVERA", "d-key"),
        ("OV_PB_STEIN_KEY", "s-key"),
        ("OV_PB_STEIN_USER", "ov-pb"),
    ]);
    let err = resolve_secrets_with(&cfg.config_json, |n| vars.get(n).cloned()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("SECRETS_INCOMPLETE"));
    assert!(msg.contains("OV_PB_STEIN_PASS"));
}

#[test]
fn blank_value_counts_as_missing() {
    let cfg = load_layered_yaml_from_strings(&[YAML]).unwrap();
    let vars = env(&[("OV_PB_DIVERA", "   "), ("OV_PB_STEIN_KEY", "s-key")]);
    let err = resolve_secrets_with(&cfg.config_json, |n| vars.get(n).cloned()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("SECRETS_MISSING"));
    assert!(msg.contains("OV_PB_DIVERA"));
}

#[test]
fn unset_process_env_is_missing() {
    let cfg = serde_json::json!({
        "divera": {"keys_env": {"accesskey": "FLEETSYNC_TEST_SENTINEL_NEVER_SET_7f3a"}}
    });
    let err = resolve_secrets(&cfg).unwrap_err();
    assert!(err
        .to_string()
        .contains("FLEETSYNC_TEST_SENTINEL_NEVER_SET_7f3a"));
}
