use crate::error::ToolError;
use regex::Regex;
use serde::Deserialize;
use serde_yaml::Value as YamlValue;
use std::fmt;
use std::sync::OnceLock;

pub const DISABLE_LABEL: &str = "- disable -";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitNode {
    pub ip: String,
    pub online: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramStatus {
    Enabled,
    Disabled,
}

impl ProgramStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProgramStatus::Enabled => "enabled",
            ProgramStatus::Disabled => "disabled",
        }
    }

    /// Label of the button that flips this status.
    pub fn toggle_label(self) -> &'static str {
        match self {
            ProgramStatus::Enabled => "Disable",
            ProgramStatus::Disabled => "Enable",
        }
    }
}

impl fmt::Display for ProgramStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedProgram {
    pub name: String,
    pub status: ProgramStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VpnStatus {
    pub active_exit_node: Option<String>,
}

impl VpnStatus {
    pub fn is_active(&self) -> bool {
        self.active_exit_node.is_some()
    }
}

/// One entry of the exit-node picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitChoice {
    Disable,
    Node(String),
}

impl ExitChoice {
    pub fn label(&self) -> &str {
        match self {
            ExitChoice::Disable => DISABLE_LABEL,
            ExitChoice::Node(ip) => ip,
        }
    }
}

/// The synthetic disable entry followed by every online node, in tool order.
pub fn exit_choices(nodes: &[ExitNode]) -> Vec<ExitChoice> {
    std::iter::once(ExitChoice::Disable)
        .chain(
            nodes
                .iter()
                .filter(|n| n.online)
                .map(|n| ExitChoice::Node(n.ip.clone())),
        )
        .collect()
}

fn status_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*Active Exit Node:[ \t]*(.*?)\s*$").expect("status line pattern")
    })
}

/// Parse `ghostscale status`. The first `Active Exit Node:` line wins; a dash
/// or an empty value means no exit node is active.
pub fn parse_status(text: &str) -> Result<VpnStatus, ToolError> {
    let caps = status_line_re()
        .captures(text)
        .ok_or_else(|| ToolError::schema("status", "missing 'Active Exit Node:' line"))?;
    let value = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
    let active_exit_node = if value.is_empty() || value == "-" {
        None
    } else {
        Some(value.to_string())
    };
    Ok(VpnStatus { active_exit_node })
}

/// Parse `ghostscale exits`: `{exit_nodes: [{ip, online}, ...]}`.
pub fn parse_exit_nodes(text: &str) -> Result<Vec<ExitNode>, ToolError> {
    let doc: YamlValue = serde_yaml::from_str(text).map_err(|source| ToolError::YamlParse {
        subcommand: "exits",
        source,
    })?;
    let top = doc
        .as_mapping()
        .ok_or_else(|| ToolError::schema("exits", "expected a mapping at top level"))?;
    let list = match top.get("exit_nodes") {
        None | Some(YamlValue::Null) => return Ok(Vec::new()),
        Some(v) => v
            .as_sequence()
            .ok_or_else(|| ToolError::schema("exits", "'exit_nodes' is not a list"))?,
    };
    let mut out = Vec::with_capacity(list.len());
    for (i, item) in list.iter().enumerate() {
        // Entries that are not records carry no node; skip them.
        if !item.is_mapping() {
            continue;
        }
        // Only an explicit `true` counts as online.
        let online = matches!(item.get("online"), Some(YamlValue::Bool(true)));
        match item.get("ip").and_then(YamlValue::as_str) {
            Some(ip) => out.push(ExitNode {
                ip: ip.to_string(),
                online,
            }),
            None if online => {
                return Err(ToolError::schema(
                    "exits",
                    format!("exit_nodes[{i}] is online but has no string 'ip'"),
                ));
            }
            // Offline records are never offered, so their shape does not matter.
            None => {}
        }
    }
    Ok(out)
}

#[derive(Debug, Deserialize)]
struct ProgramRecord {
    status: ProgramStatus,
}

/// Unquoted keys such as `2048` or `true` are still program names.
fn program_name(key: &YamlValue) -> Option<String> {
    match key {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse `ghostscale list`: a mapping of program name to `{status: ...}`.
/// Either every entry is valid or the whole document is rejected.
pub fn parse_programs(text: &str) -> Result<Vec<ManagedProgram>, ToolError> {
    let doc: YamlValue = serde_yaml::from_str(text).map_err(|source| ToolError::YamlParse {
        subcommand: "list",
        source,
    })?;
    let top = doc
        .as_mapping()
        .ok_or_else(|| ToolError::schema("list", "expected a mapping of programs"))?;
    let mut out = Vec::with_capacity(top.len());
    for (k, v) in top {
        let name = program_name(k).ok_or_else(|| {
            ToolError::schema("list", format!("program name {k:?} is not a scalar"))
        })?;
        let rec: ProgramRecord = serde_yaml::from_value(v.clone())
            .map_err(|e| ToolError::schema("list", format!("{name}: {e}")))?;
        out.push(ManagedProgram {
            name,
            status: rec.status,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_with_address_is_active() {
        let st = parse_status("Active Exit Node: 100.64.0.7\n").unwrap();
        assert_eq!(st.active_exit_node.as_deref(), Some("100.64.0.7"));
        assert!(st.is_active());
    }

    #[test]
    fn status_dash_or_empty_is_inactive() {
        assert!(!parse_status("Active Exit Node: -").unwrap().is_active());
        assert!(!parse_status("Active Exit Node:\n").unwrap().is_active());
        assert!(!parse_status("  Active Exit Node:   -  \n").unwrap().is_active());
    }

    #[test]
    fn status_line_found_among_other_output() {
        let text = "Tailscale: up\nActive Exit Node: 10.0.0.1\nPrograms: 3\n";
        let st = parse_status(text).unwrap();
        assert_eq!(st.active_exit_node.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn status_without_line_is_schema_mismatch() {
        let err = parse_status("something else").unwrap_err();
        assert!(matches!(err, ToolError::SchemaMismatch { .. }));
    }

    #[test]
    fn exits_offers_disable_plus_online_nodes() {
        let text = r#"
exit_nodes:
  - ip: "1.2.3.4"
    online: true
  - ip: "5.6.7.8"
    online: false
"#;
        let nodes = parse_exit_nodes(text).unwrap();
        assert_eq!(nodes.len(), 2);
        let labels: Vec<String> = exit_choices(&nodes)
            .iter()
            .map(|c| c.label().to_string())
            .collect();
        assert_eq!(labels, vec!["- disable -", "1.2.3.4"]);
    }

    #[test]
    fn exits_missing_list_yields_only_disable() {
        let nodes = parse_exit_nodes("other: 1\n").unwrap();
        assert!(nodes.is_empty());
        assert_eq!(exit_choices(&nodes), vec![ExitChoice::Disable]);
    }

    #[test]
    fn exits_skips_non_record_entries() {
        let text = "exit_nodes:\n  - junk\n  - {ip: 9.9.9.9, online: true}\n";
        let nodes = parse_exit_nodes(text).unwrap();
        assert_eq!(
            nodes,
            vec![ExitNode {
                ip: "9.9.9.9".into(),
                online: true
            }]
        );
    }

    #[test]
    fn exits_online_without_ip_is_rejected() {
        let err = parse_exit_nodes("exit_nodes:\n  - {online: true}\n").unwrap_err();
        assert!(matches!(err, ToolError::SchemaMismatch { .. }));
    }

    #[test]
    fn exits_ignores_shape_of_offline_records() {
        let text = "exit_nodes:\n  - {ip: 1.2.3.4, online: true}\n  - {ip: 10, online: false}\n  - {ip: x, online: null}\n  - {ip: 7.7.7.7, online: yes please}\n";
        let nodes = parse_exit_nodes(text).unwrap();
        let labels: Vec<String> = exit_choices(&nodes)
            .iter()
            .map(|c| c.label().to_string())
            .collect();
        assert_eq!(labels, vec!["- disable -", "1.2.3.4"]);
    }

    #[test]
    fn exits_online_with_numeric_ip_is_rejected() {
        let err = parse_exit_nodes("exit_nodes:\n  - {ip: 10, online: true}\n").unwrap_err();
        assert!(matches!(err, ToolError::SchemaMismatch { .. }));
    }

    #[test]
    fn exits_malformed_yaml_is_parse_error() {
        let err = parse_exit_nodes("exit_nodes: [unclosed").unwrap_err();
        assert!(matches!(err, ToolError::YamlParse { subcommand: "exits", .. }));
    }

    #[test]
    fn exits_scalar_document_is_schema_mismatch() {
        let err = parse_exit_nodes("daemon not running").unwrap_err();
        assert!(matches!(err, ToolError::SchemaMismatch { .. }));
    }

    #[test]
    fn programs_keep_document_order_and_status() {
        let text = "vpnApp:\n  status: enabled\nbrowser:\n  status: disabled\n";
        let progs = parse_programs(text).unwrap();
        assert_eq!(progs.len(), 2);
        assert_eq!(progs[0].name, "vpnApp");
        assert_eq!(progs[0].status, ProgramStatus::Enabled);
        assert_eq!(progs[0].status.toggle_label(), "Disable");
        assert_eq!(progs[1].name, "browser");
        assert_eq!(progs[1].status.toggle_label(), "Enable");
    }

    #[test]
    fn programs_extra_fields_are_ignored() {
        let text = "vpnApp: {status: enabled, path: /usr/bin/vpnapp}\n";
        let progs = parse_programs(text).unwrap();
        assert_eq!(progs[0].status, ProgramStatus::Enabled);
    }

    #[test]
    fn programs_unknown_status_rejects_whole_document() {
        let text = "a: {status: enabled}\nb: {status: maybe}\n";
        let err = parse_programs(text).unwrap_err();
        match err {
            ToolError::SchemaMismatch { detail, .. } => assert!(detail.starts_with("b:")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn programs_non_mapping_document_is_rejected() {
        assert!(matches!(
            parse_programs("- a\n- b\n").unwrap_err(),
            ToolError::SchemaMismatch { .. }
        ));
        assert!(matches!(
            parse_programs("").unwrap_err(),
            ToolError::SchemaMismatch { .. }
        ));
    }

    #[test]
    fn programs_with_scalar_names_are_listed() {
        let progs = parse_programs("2048: {status: enabled}\ntrue: {status: disabled}\n").unwrap();
        assert_eq!(progs[0].name, "2048");
        assert_eq!(progs[0].status, ProgramStatus::Enabled);
        assert_eq!(progs[1].name, "true");
    }

    #[test]
    fn programs_with_compound_name_are_rejected() {
        let err = parse_programs("? [a, b]\n: {status: enabled}\n").unwrap_err();
        assert!(matches!(err, ToolError::SchemaMismatch { .. }));
    }

    #[test]
    fn programs_malformed_yaml_is_parse_error() {
        let err = parse_programs("a: {status: enabled\n").unwrap_err();
        assert!(matches!(err, ToolError::YamlParse { subcommand: "list", .. }));
    }
}
