//! Chart import/export encoding.
//!
//! Charts travel as pretty-printed UTF-8 JSON containing every field of the
//! data model, `groups` included. Decoding rejects malformed JSON, missing
//! required fields and trees that reuse a node id.

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Chart, NodeIndex};

/// Fallback file stem for charts whose name is blank.
pub const DEFAULT_FILE_STEM: &str = "orgchart";

/// Serialize a chart to pretty JSON.
pub fn export_json(chart: &Chart) -> ApplicationResult<String> {
    serde_json::to_string_pretty(chart).map_err(|e| ApplicationError::Format {
        message: format!("serialize chart '{}': {e}", chart.name),
    })
}

/// Parse a chart from JSON. Absent `groups` default to empty.
pub fn import_json(input: &str) -> ApplicationResult<Chart> {
    let chart: Chart = serde_json::from_str(input).map_err(|e| ApplicationError::Format {
        message: e.to_string(),
    })?;
    NodeIndex::build(&chart.data).map_err(|e| ApplicationError::Format {
        message: e.to_string(),
    })?;
    Ok(chart)
}

/// File name for an exported chart: whitespace runs become `_`.
///
/// `export_file_name("Sales Team", "json")` → `Sales_Team.json`
pub fn export_file_name(chart_name: &str, extension: &str) -> String {
    if chart_name.trim().is_empty() {
        return format!("{DEFAULT_FILE_STEM}.{extension}");
    }
    let mut stem = String::with_capacity(chart_name.len());
    let mut in_whitespace = false;
    for c in chart_name.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                stem.push('_');
            }
            in_whitespace = true;
        } else {
            stem.push(c);
            in_whitespace = false;
        }
    }
    format!("{stem}.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Group, NodeId, OrgNode};
    use rstest::rstest;

    #[rstest]
    #[case("Sales Team", "json", "Sales_Team.json")]
    #[case("Sales   Team  2025", "json", "Sales_Team_2025.json")]
    #[case("Board", "png", "Board.png")]
    #[case(" Lead Crew ", "json", "_Lead_Crew_.json")]
    #[case("", "json", "orgchart.json")]
    #[case("   ", "png", "orgchart.png")]
    fn test_export_file_name(#[case] name: &str, #[case] ext: &str, #[case] expected: &str) {
        assert_eq!(export_file_name(name, ext), expected);
    }

    #[test]
    fn given_chart_without_groups_key_when_importing_then_groups_empty() {
        let input = r#"{
            "name": "Legacy",
            "data": {"id": "r", "name": "CEO", "position": "Exec", "children": []}
        }"#;
        let chart = import_json(input).unwrap();
        assert!(chart.groups.is_empty());
        assert!(chart.id.is_none());
    }

    #[test]
    fn given_chart_missing_data_when_importing_then_format_error() {
        let err = import_json(r#"{"name": "Broken"}"#).unwrap_err();
        assert!(matches!(err, ApplicationError::Format { .. }));
    }

    #[test]
    fn given_duplicate_ids_when_importing_then_format_error() {
        let input = r#"{
            "name": "Dupes",
            "data": {"id": "r", "name": "CEO", "position": "Exec", "children": [
                {"id": "r", "name": "Clone", "position": "VP", "children": []}
            ]}
        }"#;
        let err = import_json(input).unwrap_err();
        assert!(err.to_string().contains("duplicate node id"));
    }

    #[test]
    fn given_chart_when_exporting_then_groups_always_present() {
        let chart = Chart::new("Acme", None, OrgNode::new("r", "CEO", "Exec"));
        let json = export_json(&chart).unwrap();
        assert!(json.contains("\"groups\": []"));
        assert!(json.contains('\n'), "export should be pretty-printed");
    }

    #[test]
    fn given_full_chart_when_round_tripping_then_equal() {
        let mut chart = Chart::new(
            "Acme",
            Some("All hands".into()),
            OrgNode::new("r", "CEO", "Exec").with_children(vec![OrgNode::new("a", "Bob", "VP")]),
        );
        chart.id = Some("chart-1".into());
        chart.created_at = Some(chrono::Utc::now());
        chart.updated_at = chart.created_at;
        let mut group = Group::new("Leads", None);
        group.leader_ids.push(NodeId::from("a"));
        group.member_ids.push(NodeId::from("a"));
        chart.groups.push(group);

        let back = import_json(&export_json(&chart).unwrap()).unwrap();
        assert_eq!(back, chart);
    }
}
