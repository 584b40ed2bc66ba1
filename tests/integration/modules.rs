use assert_cmd::Command;
use modgraph_cli::test_utils::ConfigFixture;
use predicates::prelude::*;

use crate::common::TestProject;

fn modgraph(project: &TestProject) -> Command {
    let mut cmd = Command::cargo_bin("modgraph").unwrap();
    cmd.current_dir(project.project_path()).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_modules_lists_descriptors_in_order() {
    let project = TestProject::new().unwrap();
    project.write_config(&ConfigFixture::basic().content).unwrap();

    modgraph(&project)
        .arg("modules")
        .assert()
        .success()
        .stdout(predicate::str::contains("app (1 rule(s), 1 static dependency(ies))"))
        .stdout(predicate::str::contains("org.apache.commons (2 rule(s))"))
        .stdout(predicate::str::contains("legacy (skip, 1 rule(s))"))
        .stdout(predicate::str::is_match("(?s)app .*org.apache.commons .*legacy").unwrap());
}

#[test]
fn test_modules_json() {
    let project = TestProject::new().unwrap();
    project.write_config(&ConfigFixture::basic().content).unwrap();

    let output = modgraph(&project).args(["modules", "--format", "json"]).output().unwrap();
    assert!(output.status.success());

    let list: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(list.as_array().unwrap().len(), 3);
    assert_eq!(list[0]["static_dependencies"][0], "javax.api");
    assert_eq!(list[2]["skip"], true);
}

#[test]
fn test_modules_empty_config() {
    let project = TestProject::new().unwrap();

    modgraph(&project)
        .arg("modules")
        .assert()
        .success()
        .stdout(predicate::str::contains("No modules configured"));
}

#[test]
fn test_quiet_suppresses_logging() {
    let project = TestProject::new().unwrap();

    modgraph(&project)
        .args(["--quiet", "modules"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}
