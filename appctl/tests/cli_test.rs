//! End-to-end tests against the compiled binary

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn appctl(config_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_appctl"))
        .args(args)
        .env("HOME", config_dir)
        .env("XDG_CONFIG_HOME", config_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run appctl")
}

#[test]
fn test_unknown_flag_exits_with_usage_code() {
    let home = TempDir::new().unwrap();
    let output = appctl(home.path(), &["app", "run", "--bogus"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--bogus"));
}

#[test]
fn test_duplicate_setting_exits_with_usage_code() {
    let home = TempDir::new().unwrap();
    let output = appctl(home.path(), &["app", "run", "-p", "A=1", "-p", "A=2"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("'A'"));
}

#[test]
fn test_missing_app_directory_is_host_failure() {
    let home = TempDir::new().unwrap();
    let missing = home.path().join("no-such-dir");
    let output = appctl(
        home.path(),
        &["app", "run", "-d", missing.to_str().unwrap(), "--storage", home.path().to_str().unwrap()],
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("Directory not found").count(), 1, "stderr: {}", stderr);
}

#[test]
fn test_app_exit_code_is_relayed() {
    let home = TempDir::new().unwrap();
    let apps = home.path().join("apps");
    std::fs::create_dir(&apps).unwrap();
    std::fs::write(
        apps.join("hello.wasm"),
        r#"(module
             (memory (export "memory") 1)
             (data (i32.const 16) "\93\01\a5hello\a0")
             (func (export "app_alloc") (param i32) (result i32) i32.const 1024)
             (func (export "app_dealloc") (param i32 i32))
             (func (export "app_manifest") (result i64)
               (i64.or (i64.shl (i64.const 16) (i64.const 32)) (i64.const 9)))
             (func (export "app_run") (param i32 i32) (result i32) i32.const 7))"#,
    )
    .unwrap();

    let output = appctl(
        home.path(),
        &["app", "run", "-d", apps.to_str().unwrap(), "--storage", home.path().to_str().unwrap()],
    );

    assert_eq!(output.status.code(), Some(7));
}

#[test]
fn test_missing_config_file_exits_with_usage_code() {
    let home = TempDir::new().unwrap();
    let missing = home.path().join("missing.json");
    let output = appctl(
        home.path(),
        &["--config", missing.to_str().unwrap(), "app", "run"],
    );

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_version_command() {
    let home = TempDir::new().unwrap();
    let output = appctl(home.path(), &["version"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("appctl "));
}

#[test]
fn test_version_ignores_missing_config_file() {
    let home = TempDir::new().unwrap();
    let missing = home.path().join("missing.json");
    let output = appctl(home.path(), &["--config", missing.to_str().unwrap(), "version"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("appctl "));
}
