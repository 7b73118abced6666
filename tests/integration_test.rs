//! Integration tests for the sectioncfg CLI.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const SCHEMA: &str = r#"
app:
  debug:
    type: boolean
  name:
    type: string
    required: true
    empty: false
db:
  port:
    type: integer
    min: 1
    max: 65535
"#;

const DEFAULTS: &str = r#"
app:
  debug: false
db:
  port: 5432
"#;

/// Create a settings file with a per-section config directory.
fn create_workspace(dir: &Path) -> PathBuf {
    fs::write(dir.join("schema.yml"), SCHEMA).expect("Failed to write schema");
    fs::write(dir.join("defaults.yml"), DEFAULTS).expect("Failed to write defaults");
    fs::create_dir_all(dir.join("config")).expect("Failed to create config dir");
    fs::write(dir.join("config").join("app.yml"), "name: shop\n")
        .expect("Failed to write section");

    let settings_path = dir.join("settings.toml");
    fs::write(
        &settings_path,
        r#"
schema_file = "schema.yml"
defaults_file = "defaults.yml"
config_dir = "config"
"#,
    )
    .expect("Failed to write settings");
    settings_path
}

/// Run sectioncfg with the given settings file and return (stdout, stderr, exit_code).
fn run_with_settings(settings: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_sectioncfg"))
        .arg("--settings")
        .arg(settings)
        .args(args)
        .output()
        .expect("Failed to run sectioncfg");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

#[test]
fn test_show_merges_defaults_and_file() {
    let dir = tempfile::tempdir().unwrap();
    let settings = create_workspace(dir.path());

    let (stdout, stderr, exit_code) = run_with_settings(&settings, &["show", "app"]);

    assert_eq!(exit_code, 0, "show should succeed: {}", stderr);
    assert!(stdout.contains("debug: false"), "Output: {}", stdout);
    assert!(stdout.contains("name: shop"), "Output: {}", stdout);
}

#[test]
fn test_show_json_format() {
    let dir = tempfile::tempdir().unwrap();
    let settings = create_workspace(dir.path());

    let (stdout, stderr, exit_code) =
        run_with_settings(&settings, &["show", "db", "--format", "json"]);

    assert_eq!(exit_code, 0, "show should succeed: {}", stderr);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("Output should be JSON");
    assert_eq!(parsed["port"], 5432);
}

#[test]
fn test_show_unknown_section_fails() {
    let dir = tempfile::tempdir().unwrap();
    let settings = create_workspace(dir.path());

    let (_stdout, stderr, exit_code) = run_with_settings(&settings, &["show", "ghost"]);

    assert_ne!(exit_code, 0, "Unknown section should fail");
    assert!(stderr.contains("ghost"), "Error should name the section: {}", stderr);
}

#[test]
fn test_sections_lists_schema_sections() {
    let dir = tempfile::tempdir().unwrap();
    let settings = create_workspace(dir.path());

    let (stdout, _stderr, exit_code) = run_with_settings(&settings, &["sections"]);

    assert_eq!(exit_code, 0);
    assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["app", "db"]);
}

#[test]
fn test_check_passes_for_valid_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let settings = create_workspace(dir.path());

    let (_stdout, stderr, exit_code) = run_with_settings(&settings, &["check"]);

    assert_eq!(exit_code, 0, "check should succeed: {}", stderr);
    assert!(stderr.contains("app: ok"), "Stderr: {}", stderr);
    assert!(stderr.contains("db: ok"), "Stderr: {}", stderr);
}

#[test]
fn test_check_reports_invalid_section() {
    let dir = tempfile::tempdir().unwrap();
    let settings = create_workspace(dir.path());
    fs::write(dir.path().join("config").join("db.yml"), "port: 70000\n").unwrap();

    let (_stdout, stderr, exit_code) = run_with_settings(&settings, &["check"]);

    assert_ne!(exit_code, 0, "check should fail");
    assert!(stderr.contains("db:"), "Stderr should name the section: {}", stderr);
    assert!(stderr.contains("app: ok"), "Other sections still checked: {}", stderr);
}

#[test]
fn test_save_valid_document() {
    let dir = tempfile::tempdir().unwrap();
    let settings = create_workspace(dir.path());
    let document = dir.path().join("db-new.yml");
    fs::write(&document, "port: 6543\n").unwrap();

    let (_stdout, stderr, exit_code) =
        run_with_settings(&settings, &["save", "db", document.to_str().unwrap()]);

    assert_eq!(exit_code, 0, "save should succeed: {}", stderr);
    let saved = fs::read_to_string(dir.path().join("config").join("db.yml")).unwrap();
    assert_eq!(saved, "port: 6543\n");

    let (stdout, _stderr, _exit_code) = run_with_settings(&settings, &["show", "db"]);
    assert!(stdout.contains("port: 6543"), "Output: {}", stdout);
}

#[test]
fn test_save_invalid_document_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let settings = create_workspace(dir.path());
    let document = dir.path().join("app-new.yml");
    fs::write(&document, "debug: true\n").unwrap();

    let (_stdout, stderr, exit_code) =
        run_with_settings(&settings, &["save", "app", document.to_str().unwrap()]);

    assert_ne!(exit_code, 0, "Missing required field should be rejected");
    assert!(stderr.contains("name"), "Error should name the field: {}", stderr);
    let existing = fs::read_to_string(dir.path().join("config").join("app.yml")).unwrap();
    assert_eq!(existing, "name: shop\n", "Existing section must be untouched");
}

#[test]
fn test_single_file_layout() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("schema.yml"), SCHEMA).unwrap();
    fs::create_dir_all(dir.path().join("etc")).unwrap();
    fs::write(
        dir.path().join("etc").join("app.yml"),
        "app:\n  name: single\ndb:\n  port: 1\n",
    )
    .unwrap();
    let settings = dir.path().join("settings.toml");
    fs::write(
        &settings,
        r#"
schema_file = "schema.yml"
config_file = "app.yml"
search_path = ["missing", "etc"]
"#,
    )
    .unwrap();

    let (stdout, stderr, exit_code) = run_with_settings(&settings, &["show", "app"]);

    assert_eq!(exit_code, 0, "show should succeed: {}", stderr);
    assert!(stdout.contains("name: single"), "Output: {}", stdout);
}

#[test]
fn test_missing_settings_file_fails() {
    let dir = tempfile::tempdir().unwrap();

    let (_stdout, stderr, exit_code) =
        run_with_settings(&dir.path().join("absent.toml"), &["sections"]);

    assert_ne!(exit_code, 0);
    assert!(
        stderr.contains("Failed to read settings file"),
        "Stderr: {}",
        stderr
    );
}

#[test]
fn test_init_command_creates_settings() {
    let dir = tempfile::tempdir().unwrap();
    let settings_path = dir.path().join("nested").join("settings.toml");

    let output = Command::new(env!("CARGO_BIN_EXE_sectioncfg"))
        .arg("init")
        .arg("--path")
        .arg(&settings_path)
        .output()
        .expect("Failed to run init command");

    assert!(output.status.success(), "init command should succeed");
    assert!(settings_path.exists(), "Settings file should be created");

    let content = fs::read_to_string(&settings_path).expect("Failed to read settings");
    assert!(content.contains("schema_file"), "Settings should contain schema_file");
    assert!(content.contains("config_dir"), "Settings should contain config_dir");
}

#[test]
fn test_help_command() {
    let output = Command::new(env!("CARGO_BIN_EXE_sectioncfg"))
        .arg("--help")
        .output()
        .expect("Failed to run help command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Help should succeed");
    assert!(stdout.contains("sectioncfg"), "Help should mention program name");
    assert!(stdout.contains("show"), "Help should mention show command");
    assert!(stdout.contains("save"), "Help should mention save command");
}

#[test]
fn test_version_command() {
    let output = Command::new(env!("CARGO_BIN_EXE_sectioncfg"))
        .arg("version")
        .output()
        .expect("Failed to run version command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Version should succeed");
    assert!(
        stdout.contains(env!("CARGO_PKG_VERSION")),
        "Version should print the package version"
    );
}
