use thiserror::Error;

/// Everything that can go wrong between issuing a ghostscale command and
/// holding a parsed value. None of these end the application; they are
/// rendered where the command was triggered.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` failed ({}): {stderr}", exit_label(.code))]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("invalid YAML from `{subcommand}`: {source}")]
    YamlParse {
        subcommand: &'static str,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("unexpected `{subcommand}` output: {detail}")]
    SchemaMismatch {
        subcommand: &'static str,
        detail: String,
    },
}

impl ToolError {
    pub(crate) fn schema(subcommand: &'static str, detail: impl Into<String>) -> Self {
        ToolError::SchemaMismatch {
            subcommand,
            detail: detail.into(),
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {c}"),
        None => "terminated by signal".to_string(),
    }
}
