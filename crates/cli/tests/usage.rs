//! Command-line behaviour that needs no S3 server

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn run_s3sign(args: &[&str], home: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_s3sign"))
        .args(args)
        .env("S3SIGN_CONFIG_DIR", home.join("config"))
        .env("AWS_CONFIG_FILE", home.join("aws-config"))
        .env("AWS_SHARED_CREDENTIALS_FILE", home.join("aws-credentials"))
        .env("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE")
        .env("AWS_SECRET_ACCESS_KEY", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY")
        .env("AWS_EC2_METADATA_DISABLED", "true")
        .env_remove("AWS_PROFILE")
        .env_remove("AWS_SESSION_TOKEN")
        .env_remove("S3SIGN_REGION")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute s3sign")
}

#[test]
fn test_no_arguments_prints_usage() {
    let home = TempDir::new().unwrap();
    let output = run_s3sign(&[], home.path());
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn test_odd_sign_arguments() {
    let home = TempDir::new().unwrap();
    let output = run_s3sign(&["bucket-only"], home.path());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_conflicting_modes() {
    let home = TempDir::new().unwrap();
    let output = run_s3sign(&["-l", "a", "-d", "b"], home.path());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_output_dir_without_download() {
    let home = TempDir::new().unwrap();
    let output = run_s3sign(&["-l", "a", "-o", "out"], home.path());
    assert_eq!(output.status.code(), Some(2));

    let output = run_s3sign(&["-o", "out", "b", "k"], home.path());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_help_and_version() {
    let home = TempDir::new().unwrap();
    let output = run_s3sign(&["--help"], home.path());
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("--upload"));

    let output = run_s3sign(&["--version"], home.path());
    assert!(output.status.success());
}

#[test]
fn test_completions() {
    let home = TempDir::new().unwrap();
    let output = run_s3sign(&["--completions", "bash"], home.path());
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("s3sign"));
}

#[test]
fn test_invalid_config_file() {
    let home = TempDir::new().unwrap();
    std::fs::create_dir_all(home.path().join("config")).unwrap();
    std::fs::write(
        home.path().join("config").join("config.toml"),
        "not = [valid",
    )
    .unwrap();

    let output = run_s3sign(&["b", "k"], home.path());
    assert_ne!(output.status.code(), Some(0));
}

#[test]
fn test_sign_is_offline() {
    let home = TempDir::new().unwrap();
    let output = run_s3sign(
        &["--region", "eu-west-1", "mybucket", "dir/file.txt"],
        home.path(),
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let url = stdout.trim();
    assert!(url.starts_with("https://"));
    assert!(url.contains("mybucket"));
    assert!(url.contains("dir/file.txt"));
    assert!(url.contains("X-Amz-Expires=432000"));
}
