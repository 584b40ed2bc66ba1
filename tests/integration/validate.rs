use modgraph_cli::test_utils::ConfigFixture;
use serde_json::Value;

use crate::common::TestProject;

/// Test validating a valid configuration
#[test]
fn test_validate_valid_config() {
    let project = TestProject::new().unwrap();
    project.write_config(&ConfigFixture::basic().content).unwrap();

    let output = project.run_modgraph(&["validate"]).unwrap();
    output
        .assert_success()
        .assert_stdout_contains("✓")
        .assert_stdout_contains("Configuration is valid (3 module(s), 1 global exclude(s))");
}

/// Test that without modgraph.toml the defaults validate
#[test]
fn test_validate_no_config() {
    let project = TestProject::new().unwrap();

    let output = project.run_modgraph(&["validate"]).unwrap();
    output.assert_success().assert_stdout_contains("0 module(s)");
}

/// Test that an invalid pattern is only a warning by default
#[test]
fn test_validate_invalid_pattern_warns() {
    let project = TestProject::new().unwrap();
    project.write_config(&ConfigFixture::invalid_pattern().content).unwrap();

    let output = project.run_modgraph(&["validate"]).unwrap();
    output
        .assert_success()
        .assert_stdout_contains("⚠")
        .assert_stdout_contains("'org.(broken' in module 'broken' artifact rule");
}

/// Test that --strict turns invalid patterns into a failure
#[test]
fn test_validate_strict_fails() {
    let project = TestProject::new().unwrap();
    project.write_config(&ConfigFixture::invalid_pattern().content).unwrap();

    let output = project.run_modgraph(&["validate", "--strict"]).unwrap();
    output
        .assert_failure()
        .assert_stderr_contains("Invalid pattern 'org.(broken'")
        .assert_stderr_contains("Escape regex metacharacters");
    assert!(!output.stdout.contains("✓"));
}

/// Test the JSON report
#[test]
fn test_validate_json() {
    let project = TestProject::new().unwrap();
    project.write_config(&ConfigFixture::invalid_pattern().content).unwrap();

    let output = project.run_modgraph(&["validate", "--format", "json"]).unwrap();
    output.assert_success();

    let report: Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(report["valid"], true);
    assert_eq!(report["modules"], 1);
    assert_eq!(report["invalid_patterns"][0]["pattern"], "org.(broken");
}

/// Test a module without a name
#[test]
fn test_validate_missing_name() {
    let project = TestProject::new().unwrap();
    project.write_config(&ConfigFixture::missing_name().content).unwrap();

    let output = project.run_modgraph(&["validate"]).unwrap();
    output
        .assert_failure()
        .assert_stderr_contains("Module descriptor #0 has no name")
        .assert_stderr_contains("name = ");
}

/// Test malformed TOML
#[test]
fn test_validate_invalid_syntax() {
    let project = TestProject::new().unwrap();
    project.write_config(&ConfigFixture::invalid_syntax().content).unwrap();

    let output = project.run_modgraph(&["validate"]).unwrap();
    output.assert_failure().assert_stderr_contains("TOML parsing error");
}
