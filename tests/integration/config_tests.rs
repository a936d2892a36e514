use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use rowdupe::config::Config;
use rowdupe::duplicates::NullEquality;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

use super::{clear_env, ENV_MUTEX};

#[test]
fn test_config_load_defaults() {
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
max_duplicates = 2
columns = ["email"]
output = "dupes.csv"
nulls_equal = false
null_values = ["", "-"]
"#,
    )
    .unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config.max_duplicates, 2);
    assert_eq!(config.columns, vec!["email"]);
    assert_eq!(config.output, PathBuf::from("dupes.csv"));
    assert_eq!(config.null_equality(), NullEquality::Distinct);
    assert_eq!(config.null_values, vec!["", "-"]);
    assert_eq!(config.delimiter, ',');
}

#[test]
fn test_env_overrides_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "max_duplicates = 2\nprogress = true\n").unwrap();

    std::env::set_var("ROWDUPE_MAX_DUPLICATES", "9");
    std::env::set_var("ROWDUPE_PROGRESS", "false");
    let from_figment: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .merge(Env::prefixed("ROWDUPE_").split("__"))
        .extract()
        .unwrap();
    let loaded = Config::load_from_path(config_path);
    clear_env();

    assert_eq!(from_figment.max_duplicates, 9);
    assert!(!from_figment.progress);
    assert_eq!(loaded, from_figment);
}

#[test]
fn test_invalid_toml_is_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "max_duplicates = [").unwrap();

    assert!(Config::try_load_from_path(&config_path).is_err());
    assert_eq!(Config::load_from_path(config_path), Config::default());
}

#[test]
fn test_to_toml_round_trip() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let mut config = Config::default();
    config.delimiter = '\t';
    config.debug_sample_rows = 10;
    let text = config.to_toml_string().unwrap();
    assert!(text.contains("debug_sample_rows = 10"));

    fs::write(&config_path, text).unwrap();
    assert_eq!(Config::try_load_from_path(&config_path).unwrap(), config);
}
