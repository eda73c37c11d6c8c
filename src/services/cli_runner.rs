use crate::error::ToolError;
use std::process::Command;

/// Runs one subcommand of the external tool and returns its stdout.
pub trait CommandRunner {
    fn run(&self, args: &[&str]) -> Result<String, ToolError>;

    /// Human-readable command line for logs.
    fn describe(&self, args: &[&str]) -> String;
}

/// Spawns the tool as a child process and blocks until it exits.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    argv: Vec<String>,
}

impl ProcessRunner {
    /// `argv` is the tool command line: the program followed by any fixed
    /// leading arguments (e.g. `["sudo", "ghostscale"]`). Must be non-empty.
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, args: &[&str]) -> Result<String, ToolError> {
        let command = self.describe(args);
        let (program, fixed) = self.argv.split_first().ok_or_else(|| ToolError::Spawn {
            command: command.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty tool command"),
        })?;
        let output = Command::new(program)
            .args(fixed)
            .args(args)
            .output()
            .map_err(|source| ToolError::Spawn {
                command: command.clone(),
                source,
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ToolError::NonZeroExit {
                command,
                code: output.status.code(),
                stderr,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn describe(&self, args: &[&str]) -> String {
        self.argv
            .iter()
            .map(String::as_str)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
