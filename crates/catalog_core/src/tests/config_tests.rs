use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_settings_file(contents: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("catalog_core_config_test_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("catalog.toml");
    fs::write(&path, contents).expect("write settings");
    path
}

#[test]
fn defaults_point_at_public_providers() {
    let settings = ProviderSettings::default();
    assert_eq!(settings.tmdb_api_url, "https://api.themoviedb.org/3");
    assert_eq!(settings.discovery_language, "en");
    assert!(settings.tmdb_api_key.is_empty());
    settings.validate().expect("defaults are valid");
}

#[test]
fn file_values_override_defaults() {
    let mut settings = ProviderSettings::default();
    let file_cfg = HashMap::from([
        ("tmdb_api_key".to_string(), "file-key".to_string()),
        ("discovery_language".to_string(), "ja".to_string()),
    ]);
    apply_file_overrides(&mut settings, &file_cfg);
    assert_eq!(settings.tmdb_api_key, "file-key");
    assert_eq!(settings.discovery_language, "ja");
    assert_eq!(settings.omdb_api_url, "https://www.omdbapi.com/");
}

#[test]
fn prefixed_env_keys_win_over_plain_ones() {
    let mut settings = ProviderSettings::default();
    let vars = HashMap::from([
        ("TMDB_API_KEY", "plain"),
        ("APP__TMDB_API_KEY", "prefixed"),
        ("OMDB_API_KEY", "omdb-key"),
    ]);
    apply_env_overrides(&mut settings, |key| vars.get(key).map(|v| v.to_string()));
    assert_eq!(settings.tmdb_api_key, "prefixed");
    assert_eq!(settings.omdb_api_key, "omdb-key");
}

#[test]
fn rejects_unparseable_base_urls() {
    let settings = ProviderSettings {
        omdb_api_url: "not a url".into(),
        ..ProviderSettings::default()
    };
    let err = settings.validate().expect_err("must fail");
    assert!(err.to_string().contains("omdb_api_url"));
}

#[test]
fn loads_explicit_settings_file() {
    let path = temp_settings_file(
        "tmdb_api_url = \"http://127.0.0.1:9000/3\"\nposter_base_url = \"http://127.0.0.1:9000/img/\"\n",
    );
    let settings = load_settings_from(&path).expect("load settings");
    assert_eq!(settings.tmdb_api_url, "http://127.0.0.1:9000/3");
    assert_eq!(settings.poster_base_url, "http://127.0.0.1:9000/img/");
    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn missing_explicit_settings_file_is_an_error() {
    let err = load_settings_from(Path::new("/definitely/not/here/catalog.toml"))
        .expect_err("must fail");
    assert!(err.to_string().contains("does not exist"));
}
