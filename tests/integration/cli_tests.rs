use clap::Parser;
use rowdupe::cli::Cli;
use rowdupe::error::ExitCode;
use rowdupe::run_app;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

use super::{clear_env, ENV_MUTEX};

fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let mut argv = vec!["rowdupe", "-q", "--no-color"];
    argv.extend_from_slice(args);
    run_app(Cli::try_parse_from(argv).unwrap())
}

fn s(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_analyze_writes_export() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let output = dir.path().join("out.csv");
    let config = dir.path().join("config.toml");
    fs::write(&input, "a,b\n1,2\n1,2\n1,2\n3,4\n").unwrap();

    let code = run(&[
        "analyze",
        s(&input),
        "-m",
        "2",
        "-o",
        s(&output),
        "--config",
        s(&config),
    ])
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "a,b,duplicate_count\n1,2,3\n1,2,3\n3,4,1\n"
    );
}

#[test]
fn test_analyze_without_duplicates() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let output = dir.path().join("out.csv");
    let config = dir.path().join("config.toml");
    fs::write(&input, "a\n1\n2\n").unwrap();

    let code = run(&[
        "analyze",
        s(&input),
        "-o",
        s(&output),
        "--config",
        s(&config),
        "--report",
        "json",
    ])
    .unwrap();

    assert_eq!(code, ExitCode::NoDuplicates);
    assert!(output.exists());
}

#[test]
fn test_unknown_column_is_general_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let output = dir.path().join("out.csv");
    let config = dir.path().join("config.toml");
    fs::write(&input, "name,email\nA,a@x\n").unwrap();

    let err = run(&[
        "analyze",
        s(&input),
        "-c",
        "emial",
        "-o",
        s(&output),
        "--config",
        s(&config),
    ])
    .unwrap_err();

    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    let message = format!("{:#}", err);
    assert!(message.contains("emial"));
    assert!(message.contains("email"));
    assert!(!output.exists());
}

#[test]
fn test_header_only_input_is_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let output = dir.path().join("out.csv");
    let config = dir.path().join("config.toml");
    fs::write(&input, "a,b\n").unwrap();

    let err = run(&["analyze", s(&input), "-o", s(&output), "--config", s(&config)]).unwrap_err();
    assert!(format!("{:#}", err).contains("empty"));
    assert!(!output.exists());
}

#[test]
fn test_missing_input_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let err = run(&[
        "analyze",
        s(&dir.path().join("nope.csv")),
        "--config",
        s(&config),
    ])
    .unwrap_err();
    assert!(format!("{:#}", err).contains("not found"));
}

#[test]
fn test_config_file_supplies_columns() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let output = dir.path().join("out.csv");
    let config = dir.path().join("config.toml");
    fs::write(&input, "id,k\n1,x\n2,x\n3,y\n").unwrap();
    fs::write(&config, "columns = [\"k\"]\nmax_duplicates = 1\n").unwrap();

    let code = run(&["analyze", s(&input), "-o", s(&output), "--config", s(&config)]).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "id,k,duplicate_count\n1,x,2\n3,y,1\n"
    );
}

#[test]
fn test_invalid_env_override_without_config_flag_is_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let output = dir.path().join("out.csv");
    fs::write(&input, "a\n1\n1\n").unwrap();

    let saved: Vec<_> = ["HOME", "XDG_CONFIG_HOME"]
        .iter()
        .map(|key| (*key, std::env::var_os(key)))
        .collect();
    std::env::set_var("HOME", dir.path());
    std::env::set_var("XDG_CONFIG_HOME", dir.path().join("config"));
    std::env::set_var("ROWDUPE_MAX_DUPLICATES", "0");

    let result = run(&["analyze", s(&input), "-o", s(&output)]);

    clear_env();
    for (key, value) in saved {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }

    let err = result.unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(!output.exists());
}

#[test]
fn test_config_init_and_show() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let config = dir.path().join("rowdupe").join("config.toml");

    let code = run(&["config", "--init", "--config", s(&config)]).unwrap();
    assert_eq!(code, ExitCode::Success);
    assert!(fs::read_to_string(&config)
        .unwrap()
        .contains("max_duplicates = 5"));

    assert!(run(&["config", "--init", "--config", s(&config)]).is_err());
    assert!(run(&["config", "--init", "--force", "--config", s(&config)]).is_ok());
    assert_eq!(
        run(&["config", "--config", s(&config)]).unwrap(),
        ExitCode::Success
    );
}
