#![allow(missing_docs, clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::{SITE, pagecap_cmd, write_catalog};
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

#[test]
fn robots_inherits_from_parent() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let catalog = write_catalog(dir.path(), "site.toml", SITE);

    pagecap_cmd()
        .arg("robots")
        .arg(&catalog)
        .args(["docs", "/guide/install"])
        .assert()
        .success()
        .stdout(predicate::str::contains("docs:/guide/install allow robots: yes"));

    pagecap_cmd()
        .arg("robots")
        .arg(&catalog)
        .args(["docs", "/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("allow robots: no"));
    Ok(())
}

#[test]
fn robots_conflict_fails_with_both_values() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let catalog = write_catalog(dir.path(), "site.toml", SITE);

    pagecap_cmd()
        .arg("robots")
        .arg(&catalog)
        .args(["docs", "/downloads"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("allow_robots"))
        .stderr(predicate::str::contains("false"))
        .stderr(predicate::str::contains("true"));
    Ok(())
}

#[test]
fn copyright_json_merges_fields() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let catalog = write_catalog(dir.path(), "site.toml", SITE);

    let stdout = pagecap_cmd()
        .args(["--format", "json", "copyright"])
        .arg(&catalog)
        .args(["docs", "/downloads"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&stdout)?;

    assert_eq!(value["page"], "docs:/downloads");
    assert_eq!(value["copyright"]["rights_holder"], "ACME");
    assert_eq!(value["copyright"]["rights"], "CC-BY");
    assert_eq!(value["copyright"]["date_copyrighted"], "2024");
    assert!(value["stats"]["builds"].as_u64().unwrap() >= 1);
    Ok(())
}

#[test]
fn has_element_recursive_follows_children_through_cycle() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let catalog = write_catalog(dir.path(), "site.toml", SITE);

    for scope in ["shared", "subrequest", "request"] {
        let stdout = pagecap_cmd()
            .args(["--format", "json", "--scope", scope, "has-element"])
            .arg(&catalog)
            .args(["docs", "/", "file", "--recursive"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let value: Value = serde_json::from_slice(&stdout)?;
        assert_eq!(value["found"], true, "scope {scope}");
    }

    pagecap_cmd()
        .arg("has-element")
        .arg(&catalog)
        .args(["docs", "/", "file"])
        .assert()
        .success()
        .stdout(predicate::str::contains("has file: no"));
    Ok(())
}

#[test]
fn has_element_missing_kind_is_false() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let catalog = write_catalog(dir.path(), "site.toml", SITE);

    pagecap_cmd()
        .arg("has-element")
        .arg(&catalog)
        .args(["docs", "/", "image", "-r"])
        .assert()
        .success()
        .stdout(predicate::str::contains("has image (recursive): no"));
    Ok(())
}

#[test]
fn verify_accepts_consistent_catalog() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let catalog = write_catalog(dir.path(), "site.toml", SITE);

    pagecap_cmd()
        .arg("verify")
        .arg(&catalog)
        .assert()
        .success()
        .stdout(predicate::str::contains("5 pages, all links consistent"));
    Ok(())
}

#[test]
fn verify_reports_one_sided_links() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let catalog = write_catalog(
        dir.path(),
        "broken.json",
        r#"{
            "books": [{ "name": "docs" }],
            "pages": [
                { "book": "docs", "path": "/", "children": ["/orphan"] },
                { "book": "docs", "path": "/orphan" }
            ]
        }"#,
    );

    let stdout = pagecap_cmd()
        .args(["verify", "--format", "json"])
        .arg(&catalog)
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 parent/child violation(s) found"))
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&stdout)?;
    assert_eq!(value["pages"], 2);
    assert_eq!(value["violations"].as_array().unwrap().len(), 1);
    Ok(())
}

#[test]
fn unknown_catalog_fails_with_path() {
    pagecap_cmd()
        .args(["robots", "does-not-exist.toml", "docs", "/"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.toml"));
}

#[test]
fn missing_book_page_is_not_found() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let catalog = write_catalog(dir.path(), "site.toml", SITE);

    pagecap_cmd()
        .arg("robots")
        .arg(&catalog)
        .args(["archive", "/old"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("archive:/old"));
    Ok(())
}
