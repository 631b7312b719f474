//! Integration tests for ExportService (file-based import/export)

use std::sync::Arc;

use tempfile::TempDir;

use orgchart::application::services::ExportService;
use orgchart::application::ApplicationError;
use orgchart::domain::{Chart, OrgNode};
use orgchart::infrastructure::traits::RealFileSystem;

fn service() -> ExportService {
    ExportService::new(Arc::new(RealFileSystem))
}

fn chart(name: &str) -> Chart {
    let mut chart = Chart::new(
        name,
        None,
        OrgNode::new("r", "CEO", "Exec").with_children(vec![OrgNode::new("a", "Bob", "VP")]),
    );
    chart.id = Some("rec-1".into());
    chart
}

#[test]
fn given_chart_when_exporting_then_writes_named_file_in_new_dir() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("exports");

    let path = service().export_json(&chart("Sales Team"), &dir).unwrap();

    assert_eq!(path, dir.join("Sales_Team.json"));
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("\"name\": \"Sales Team\""));
}

#[test]
fn given_exported_file_when_importing_with_keep_id_then_equal() {
    let temp = TempDir::new().unwrap();
    let original = chart("Acme");
    let path = service().export_json(&original, temp.path()).unwrap();

    let imported = service().import_json(&path, true).unwrap();

    assert_eq!(imported, original);
}

#[test]
fn given_exported_file_when_importing_without_keep_id_then_id_cleared() {
    let temp = TempDir::new().unwrap();
    let path = service().export_json(&chart("Acme"), temp.path()).unwrap();

    let imported = service().import_json(&path, false).unwrap();

    assert!(imported.id.is_none());
    assert_eq!(imported.data.children.len(), 1);
}

#[test]
fn given_missing_file_when_importing_then_operation_failed_with_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nope.json");

    let err = service().import_json(&path, false).unwrap_err();

    assert!(matches!(err, ApplicationError::OperationFailed { .. }));
    assert!(err.to_string().contains("nope.json"));
}

#[test]
fn given_invalid_file_when_importing_then_format_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bad.json");
    std::fs::write(&path, r#"{"name": "x"}"#).unwrap();

    let err = service().import_json(&path, false).unwrap_err();

    assert!(matches!(err, ApplicationError::Format { .. }));
}
