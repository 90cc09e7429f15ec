use std::{collections::HashMap, io::Write};

use super::*;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_target_local_functions_gateway() {
    let settings = Settings::default();
    assert_eq!(settings.functions_url, "http://127.0.0.1:54321/functions/v1");
    assert_eq!(settings.function_name, "audit-design");
    assert_eq!(settings.api_key, None);
    settings.validate().expect("defaults are valid");
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
functions_url = "https://proj.example.co/functions/v1"
api_key = "anon"
"#,
    )
    .expect("parse");
    assert_eq!(settings.functions_url, "https://proj.example.co/functions/v1");
    assert_eq!(settings.api_key.as_deref(), Some("anon"));
    assert_eq!(settings.function_name, "audit-design");
}

#[test]
fn unknown_file_keys_are_rejected() {
    let mut settings = Settings::default();
    assert!(apply_file(&mut settings, "functions_uri = \"x\"").is_err());
}

#[test]
fn env_overrides_file_and_app_prefix_wins() {
    let mut settings = Settings::default();
    apply_file(&mut settings, "api_key = \"from-file\"").expect("parse");
    apply_env(
        &mut settings,
        env(&[
            ("AUDIT_API_KEY", "from-env"),
            ("AUDIT_FUNCTIONS_URL", "https://a.example/functions/v1"),
            ("APP__FUNCTIONS_URL", "https://b.example/functions/v1"),
            ("FIGMA_TOKEN", "figd"),
        ]),
    );
    assert_eq!(settings.api_key.as_deref(), Some("from-env"));
    assert_eq!(settings.functions_url, "https://b.example/functions/v1");
    assert_eq!(settings.figma_token.as_deref(), Some("figd"));
}

#[test]
fn cli_overrides_apply_last() {
    let settings = Settings::default().with_overrides(
        Some("https://cli.example/functions/v1".into()),
        Some("cli-key".into()),
    );
    assert_eq!(settings.functions_url, "https://cli.example/functions/v1");
    assert_eq!(settings.api_key.as_deref(), Some("cli-key"));
}

#[test]
fn validation_rejects_bad_urls() {
    let mut settings = Settings {
        functions_url: "ftp://example.com/functions".into(),
        ..Settings::default()
    };
    assert!(settings.validate().is_err());
    settings.functions_url = "nope".into();
    assert!(settings.validate().is_err());
}

#[test]
fn explicit_config_file_is_loaded_and_must_exist() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(file, "function_name = \"audit-design-v2\"").expect("write");

    let settings = load_settings(Some(file.path())).expect("load");
    assert_eq!(settings.function_name, "audit-design-v2");

    let missing = file.path().with_extension("missing");
    assert!(load_settings(Some(&missing)).is_err());
}

#[test]
fn cli_url_replaces_invalid_env_url_before_validation() {
    let loaded = load_layers(None, env(&[("AUDIT_FUNCTIONS_URL", "not a url")]))
        .expect("loading does not validate");
    assert!(loaded.validate().is_err());

    let settings = loaded.with_overrides(Some("https://cli.example/functions/v1".into()), None);
    settings.validate().expect("cli url wins");
    assert_eq!(settings.functions_url, "https://cli.example/functions/v1");
}
