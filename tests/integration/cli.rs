//! `roo-md` command tests.

use anyhow::Result;
use predicates::prelude::*;

use crate::common::{PETCLINIC, PHYSICAL_CLASS, TestProject};

#[test]
fn test_scan_text_lists_contributed_members() -> Result<()> {
    let project = TestProject::new(PETCLINIC)?;

    project
        .roo_md()
        .arg("scan")
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("com.example.Owner"))
        .stdout(predicate::str::contains("org.springframework.roo.addon.equals.EqualsMetadata"))
        .stdout(predicate::str::contains("method java.lang.String getLastName()"))
        .stdout(predicate::str::contains("method java.lang.String toString()"))
        .stdout(predicate::str::contains("(no ITDs)"))
        .stdout(predicate::str::contains("3 type(s), 2 with ITDs"));
    Ok(())
}

#[test]
fn test_scan_json() -> Result<()> {
    let project = TestProject::new(PETCLINIC)?;

    let output = project.roo_md().args(["scan", "--format", "json"]).arg(project.path()).output()?;
    assert!(output.status.success());

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let reports = reports.as_array().expect("array of type reports");
    assert_eq!(reports.len(), 3);
    let owner = reports
        .iter()
        .find(|r| r["name"] == "com.example.Owner")
        .expect("owner reported");
    assert_eq!(owner["itds"].as_array().map(Vec::len), Some(3));
    Ok(())
}

#[test]
fn test_status_json_reports_statistics() -> Result<()> {
    let project = TestProject::new(PETCLINIC)?;

    let output = project.roo_md().args(["status", "-f", "json"]).arg(project.path()).output()?;
    assert!(output.status.success());

    let status: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(status["statistics"]["providers"], 4);
    assert!(status["statistics"]["valid_gets"].as_u64().unwrap_or(0) > 0);
    assert!(!status["timings"].as_array().expect("timings").is_empty());
    Ok(())
}

#[test]
fn test_status_text() -> Result<()> {
    let project = TestProject::new(PETCLINIC)?;

    project
        .roo_md()
        .arg("status")
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Providers:      4"))
        .stdout(predicate::str::contains("Provider timings"));
    Ok(())
}

#[test]
fn test_graph_shows_subclass_downstream() -> Result<()> {
    let project = TestProject::new(PETCLINIC)?;
    let base = format!("MID:{PHYSICAL_CLASS}#com.example.BaseEntity");

    project
        .roo_md()
        .arg("graph")
        .arg(project.path())
        .arg(&base)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(base.clone()))
        .stdout(predicate::str::contains(format!("MID:{PHYSICAL_CLASS}#com.example.Owner")));
    Ok(())
}

#[test]
fn test_describe_shows_upstream() -> Result<()> {
    let project = TestProject::new(PETCLINIC)?;

    project
        .roo_md()
        .arg("describe")
        .arg(project.path())
        .arg("MID:org.springframework.roo.addon.tostring.ToStringMetadata#com.example.Owner")
        .assert()
        .success()
        .stdout(predicate::str::contains("upstream:"))
        .stdout(predicate::str::contains(format!("MID:{PHYSICAL_CLASS}#com.example.Owner")));
    Ok(())
}

#[test]
fn test_invalid_identifier_fails() -> Result<()> {
    let project = TestProject::new(PETCLINIC)?;

    project
        .roo_md()
        .arg("describe")
        .arg(project.path())
        .arg("not-an-id")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid metadata identification string"))
        .stderr(predicate::str::contains("suggestion"));
    Ok(())
}

#[test]
fn test_malformed_project_fails() -> Result<()> {
    let project = TestProject::new("[[types]]\nname = \"a.Foo\"\ncolour = \"red\"\n")?;

    project
        .roo_md()
        .arg("scan")
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
    Ok(())
}

#[test]
fn test_invalid_config_rejected() -> Result<()> {
    let project = TestProject::new(PETCLINIC)?;
    std::fs::write(project.dir().join("roo-metadata.toml"), "cache_capacity = 0\n")?;

    project
        .roo_md()
        .arg("scan")
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cache_capacity"));
    Ok(())
}

#[test]
fn test_explicit_config_must_exist() -> Result<()> {
    let project = TestProject::new(PETCLINIC)?;

    project
        .roo_md()
        .args(["--config", "missing.toml", "scan"])
        .arg(project.path())
        .assert()
        .failure();
    Ok(())
}

#[test]
fn test_configured_trace_level_is_printed() -> Result<()> {
    let project = TestProject::new(PETCLINIC)?;

    project
        .roo_md()
        .arg("scan")
        .arg(project.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("took").not());

    std::fs::write(project.dir().join("roo-metadata.toml"), "trace_level = 2\n")?;
    project
        .roo_md()
        .arg("scan")
        .arg(project.path())
        .assert()
        .success()
        .stderr(predicate::str::contains(format!("{PHYSICAL_CLASS} took")));
    Ok(())
}
