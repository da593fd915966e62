//! Integration tests for the ai-bridge CLI.
//!
//! These tests verify the CLI interface works correctly by running the
//! binary and checking its output and exit codes. They only exercise
//! commands that do not need a running Illustrator instance.

use std::process::Command;

/// Path to the ai-bridge binary under test.
fn binary() -> &'static str {
    env!("CARGO_BIN_EXE_ai-bridge")
}

#[test]
fn test_help_outputs_usage_information() {
    let output = Command::new(binary())
        .arg("--help")
        .output()
        .expect("Failed to execute ai-bridge");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ai-bridge"), "Got: {}", stdout);
    assert!(stdout.contains("--export"), "Got: {}", stdout);
    assert!(stdout.contains("--connect"), "Got: {}", stdout);
}

#[test]
fn test_no_arguments_shows_help() {
    let output = Command::new(binary())
        .output()
        .expect("Failed to execute ai-bridge");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("USAGE"), "Got: {}", stdout);
}

#[test]
fn test_formats_outputs_valid_json() {
    let output = Command::new(binary())
        .arg("--formats")
        .output()
        .expect("Failed to execute ai-bridge");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("Output should be valid JSON");

    let extensions = json["extensions"]
        .as_array()
        .expect("'extensions' should be an array");
    let extensions: Vec<&str> = extensions.iter().filter_map(|v| v.as_str()).collect();

    for ext in [".jpg", ".jpeg", ".png", ".tif", ".tiff", ".svg", ".psd"] {
        assert!(extensions.contains(&ext), "missing {}: {:?}", ext, extensions);
    }
}

#[test]
fn test_locate_apps_outputs_valid_json() {
    let output = Command::new(binary())
        .arg("--locate-apps")
        .output()
        .expect("Failed to execute ai-bridge");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("Output should be valid JSON");
    assert!(json["install_dirs"].is_array());
}

#[test]
fn test_unknown_argument_fails_with_message() {
    let output = Command::new(binary())
        .arg("--bogus")
        .output()
        .expect("Failed to execute ai-bridge");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown argument"), "Got: {}", stderr);
}

#[test]
fn test_save_without_path_fails() {
    let output = Command::new(binary())
        .arg("--save")
        .output()
        .expect("Failed to execute ai-bridge");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--save requires"), "Got: {}", stderr);
}

#[test]
fn test_uninstall_of_clean_directory_reports_nothing_removed() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(binary())
        .arg("--uninstall")
        .arg(dir.path())
        .output()
        .expect("Failed to execute ai-bridge");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("Output should be valid JSON");
    assert_eq!(json["removed"], serde_json::Value::Bool(false));
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
#[test]
fn test_connect_fails_on_unsupported_platform() {
    let output = Command::new(binary())
        .arg("--connect")
        .output()
        .expect("Failed to execute ai-bridge");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Connection failed"), "Got: {}", stderr);
}
