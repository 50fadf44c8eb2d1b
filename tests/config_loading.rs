// tests/config_loading.rs

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::NamedTempFile;
use pollwatch::config::{load_and_validate, load_or_default};
use pollwatch::errors::PollwatchError;
use pollwatch::{ErrorPolicy, FileSelector};

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_watch_section_is_honoured() {
    let file = config_file(
        r#"
[watch]
roots = ["src", "cmd"]
interval = "500ms"
extensions = ["rs"]
exclude = ["**/target/**"]
on_error = "skip"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.interval(), Duration::from_millis(500));

    let watch = cfg.to_watch_config().unwrap();
    assert_eq!(watch.roots(), &[PathBuf::from("src"), PathBuf::from("cmd")]);
    assert_eq!(watch.error_policy(), ErrorPolicy::Skip);
    assert!(watch.selector().matches(Path::new("src/lib.rs")));
    assert!(!watch.selector().matches(Path::new("src/lib.go")));
    assert!(!watch.selector().matches(Path::new("src/target/gen.rs")));
}

#[test]
fn empty_file_uses_defaults() {
    let file = config_file("");
    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.interval(), Duration::from_secs(2));
    let watch = cfg.to_watch_config().unwrap();
    assert_eq!(watch.roots(), &[PathBuf::from(".")]);
    assert!(watch.selector().matches(Path::new("./main.go")));
    assert_eq!(watch.error_policy(), ErrorPolicy::Abort);
}

#[test]
fn zero_interval_returns_config_error() {
    let file = config_file("[watch]\ninterval = \"0ms\"\n");

    match load_and_validate(file.path()) {
        Err(PollwatchError::ConfigError(msg)) => assert!(msg.contains("interval")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn unknown_policy_is_a_toml_error() {
    let file = config_file("[watch]\non_error = \"retry\"\n");

    match load_and_validate(file.path()) {
        Err(PollwatchError::TomlError(_)) => {}
        Err(e) => panic!("Expected TomlError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn explicit_missing_config_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("Pollwatch.toml");

    assert!(matches!(
        load_or_default(Some(&missing)),
        Err(PollwatchError::IoError(_))
    ));
}
