//! Integration tests for the export and check commands.

use std::fs;

use ead_cli::commands::{ExportRequest, run_check, run_export};
use tempfile::TempDir;

const RECORD: &str = r#"{
    "identifiers": ["MS", "7"],
    "title": "Harbour records",
    "extents": [{"number": "2", "extent_type": "linear_feet"}],
    "children": [0, 1],
    "components": [
        {"ref_id": "r1", "title": "Minutes"},
        {"ref_id": "r2", "title": "Draft", "publish": false}
    ]
}"#;

const CONFIG: &str = r#"
use_numbered_c_tags = true
id_prefix = "x_"
pretty = false

[labels.extent_extent_type]
linear_feet = "Linear Feet"
"#;

fn workspace() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("record.json"), RECORD).expect("write record");
    fs::write(dir.path().join("export.toml"), CONFIG).expect("write config");
    dir
}

#[test]
fn export_writes_document_with_config_labels() {
    let dir = workspace();
    let output = dir.path().join("out.xml");
    let request = ExportRequest {
        record: dir.path().join("record.json"),
        config: Some(dir.path().join("export.toml")),
        output: Some(output.clone()),
        ..Default::default()
    };

    let summary = run_export(&request).expect("export");
    assert_eq!(summary.components_written, 1);
    assert_eq!(summary.components_skipped, 1);
    assert!(!summary.has_failures());

    let xml = fs::read_to_string(&output).expect("read output");
    assert!(xml.contains("<c01 id=\"x_r1\">"));
    assert!(xml.contains(">2 Linear Feet</extent>"));
    assert!(!xml.contains("Draft"));
}

#[test]
fn flags_override_the_config_file() {
    let dir = workspace();
    let output = dir.path().join("out.xml");
    let request = ExportRequest {
        record: dir.path().join("record.json"),
        config: Some(dir.path().join("export.toml")),
        output: Some(output.clone()),
        include_unpublished: true,
        id_prefix: Some("y_".to_string()),
        ..Default::default()
    };

    let summary = run_export(&request).expect("export");
    assert_eq!(summary.components_written, 2);
    let xml = fs::read_to_string(&output).expect("read output");
    assert!(xml.contains("<c01 id=\"y_r2\" audience=\"internal\">"));
}

#[test]
fn missing_record_is_reported_with_context() {
    let dir = workspace();
    let request = ExportRequest {
        record: dir.path().join("absent.json"),
        output: Some(dir.path().join("out.xml")),
        ..Default::default()
    };
    let error = run_export(&request).expect_err("missing record");
    assert!(format!("{error:#}").contains("load record"));
}

#[test]
fn bad_config_is_rejected() {
    let dir = workspace();
    fs::write(dir.path().join("bad.toml"), "pretty = \"yes\"").expect("write config");
    let request = ExportRequest {
        record: dir.path().join("record.json"),
        config: Some(dir.path().join("bad.toml")),
        output: Some(dir.path().join("out.xml")),
        ..Default::default()
    };
    let error = run_export(&request).expect_err("bad config");
    assert!(format!("{error:#}").contains("load config"));
}

#[test]
fn check_accepts_exported_documents() {
    let dir = workspace();
    let output = dir.path().join("out.xml");
    let request = ExportRequest {
        record: dir.path().join("record.json"),
        output: Some(output.clone()),
        ..Default::default()
    };
    run_export(&request).expect("export");

    let diagnostics = run_check(&output).expect("check");
    assert!(
        diagnostics.iter().all(|d| d.is_suppressed()),
        "{diagnostics:?}"
    );
}

#[test]
fn check_reports_broken_fragments() {
    let dir = workspace();
    let path = dir.path().join("fragment.xml");
    fs::write(&path, "<p>open <emph>text</p>").expect("write fragment");

    let diagnostics = run_check(&path).expect("check");
    assert!(diagnostics.iter().any(|d| !d.is_suppressed()));
}
