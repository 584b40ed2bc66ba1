use modgraph_cli::test_utils::{ConfigFixture, GraphFixture};
use serde_json::Value;

use crate::common::TestProject;

/// Test the text plan of the basic fixture
#[test]
fn test_plan_text_output() {
    let project = TestProject::new().unwrap();
    project.write_config(&ConfigFixture::basic().content).unwrap();
    project.write_graph(&GraphFixture::basic().content).unwrap();

    let output = project.run_modgraph(&["plan", "--graph", "graph.toml"]).unwrap();
    output
        .assert_success()
        .assert_stdout_contains("3 module(s), slot strategy version-major, default slot main")
        .assert_stdout_contains("app:1\n")
        .assert_stdout_contains("  member org.example:app-core:1.2.0")
        .assert_stdout_contains("  depends javax.api:main [static, services=import]")
        .assert_stdout_contains("  depends org.apache.commons:3\n")
        .assert_stdout_contains("  depends legacy:0\n")
        .assert_stdout_contains("  depends org.slf4j.slf4j-api:1\n")
        .assert_stdout_contains("  main-class org.example.Main")
        .assert_stdout_contains("org.apache.commons:2\n")
        .assert_stdout_contains("org.slf4j.slf4j-api:1 (synthesized)")
        .assert_stdout_contains("Slot mismatches\n  app:1 -> org.apache.commons:3\n")
        .assert_stdout_contains("  junit:junit:4.13.2 (exclusion)")
        .assert_stdout_contains("  org.legacy:old:0.9 (skip-module)");

    assert!(!output.stdout.contains("hamcrest"));
}

/// Test the JSON plan of the basic fixture
#[test]
fn test_plan_json_output() {
    let project = TestProject::new().unwrap();
    project.write_config(&ConfigFixture::basic().content).unwrap();
    project.write_graph(&GraphFixture::basic().content).unwrap();

    let output =
        project.run_modgraph(&["plan", "--graph", "graph.toml", "--format", "json"]).unwrap();
    output.assert_success();

    let plan: Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(plan["slot_strategy"], "version-major");

    let modules = plan["modules"].as_array().unwrap();
    let names: Vec<_> = modules.iter().map(|m| m["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["app", "org.apache.commons", "org.slf4j.slf4j-api"]);

    let app = &modules[0];
    assert_eq!(app["main_class"], "org.example.Main");
    assert_eq!(app["members"].as_array().unwrap().len(), 2);

    let dependencies = app["dependencies"].as_array().unwrap();
    assert_eq!(dependencies[0]["name"], "javax.api");
    assert_eq!(dependencies[0]["origin"], "static");
    assert_eq!(dependencies[2]["name"], "legacy");
    assert_eq!(dependencies[3]["name"], "org.slf4j.slf4j-api");
    assert_eq!(dependencies[3]["optional"], false);

    assert_eq!(plan["pruned"].as_array().unwrap().len(), 2);
}

/// Test that a skipped module is a dependency target without members of its own
#[test]
fn test_plan_skipped_module_is_target_only() {
    let project = TestProject::new().unwrap();
    project.write_config(&ConfigFixture::basic().content).unwrap();
    project.write_graph(&GraphFixture::basic().content).unwrap();

    let output =
        project.run_modgraph(&["plan", "--graph", "graph.toml", "--format", "json"]).unwrap();
    output.assert_success();

    let plan: Value = serde_json::from_str(&output.stdout).unwrap();
    let modules = plan["modules"].as_array().unwrap();
    assert!(modules.iter().all(|m| m["name"] != "legacy"));
    for module in modules {
        for member in module["members"].as_array().unwrap() {
            assert!(!member.as_str().unwrap().starts_with("org.legacy:"));
        }
    }

    let app = modules.iter().find(|m| m["name"] == "app").unwrap();
    let legacy = app["dependencies"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["name"] == "legacy")
        .unwrap();
    assert_eq!(legacy["slot"], "0");
    assert_eq!(legacy["origin"], "resolved");

    let pruned = plan["pruned"].as_array().unwrap();
    assert!(
        pruned
            .iter()
            .any(|p| p["coordinates"] == "org.legacy:old:0.9" && p["policy"] == "skip-module")
    );
}

/// Test that an unresolvable root fails with an exclude suggestion
#[test]
fn test_plan_unknown_root_fails() {
    let project = TestProject::new().unwrap();
    project.write_graph(&GraphFixture::unknown_root().content).unwrap();

    let output = project.run_modgraph(&["plan", "--graph", "graph.toml"]).unwrap();
    output
        .assert_failure()
        .assert_stderr_contains("Cannot resolve root dependencies")
        .assert_stderr_contains("[[exclude]] rule for 'org.example:missing:1.0'");
    assert_eq!(output.code, Some(1));
}

/// Test a missing graph file
#[test]
fn test_plan_missing_graph_file() {
    let project = TestProject::new().unwrap();

    let output = project.run_modgraph(&["plan", "--graph", "nope.toml"]).unwrap();
    output.assert_failure().assert_stderr_contains("Failed to read dependency graph");
}

/// Test an explicit configuration path
#[test]
fn test_plan_with_explicit_config() {
    let project = TestProject::new().unwrap();
    project.write_file("custom.toml", &ConfigFixture::basic().content).unwrap();
    project.write_graph(&GraphFixture::basic().content).unwrap();

    let output =
        project.run_modgraph(&["-c", "custom.toml", "plan", "--graph", "graph.toml"]).unwrap();
    output.assert_success().assert_stdout_contains("app:1\n");
}

/// Test that without a configuration every artifact gets a synthesized module
#[test]
fn test_plan_without_config() {
    let project = TestProject::new().unwrap();
    project.write_graph(&GraphFixture::basic().content).unwrap();

    let output = project.run_modgraph(&["plan", "--graph", "graph.toml"]).unwrap();
    output
        .assert_success()
        .assert_stdout_contains("slot strategy main")
        .assert_stdout_contains("org.example.app:main (synthesized)")
        .assert_stdout_contains("org.legacy.old:main (synthesized)")
        .assert_stdout_contains("junit:main (synthesized)");
}
