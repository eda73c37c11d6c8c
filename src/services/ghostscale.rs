use crate::error::ToolError;
use crate::model::{
    parse_exit_nodes, parse_programs, parse_status, ExitNode, ManagedProgram, VpnStatus,
};
use crate::services::cli_runner::CommandRunner;

/// Everything the panel needs from the VPN wrapper. Mutations return the
/// tool's own confirmation text.
pub trait VpnTool {
    fn get_status(&self) -> Result<VpnStatus, ToolError>;
    fn list_exit_nodes(&self) -> Result<Vec<ExitNode>, ToolError>;
    fn list_programs(&self) -> Result<Vec<ManagedProgram>, ToolError>;
    fn toggle_program(&self, name: &str) -> Result<String, ToolError>;
    fn set_exit(&self, ip: &str) -> Result<String, ToolError>;
    fn disable_exit(&self) -> Result<String, ToolError>;

    /// Command line used for `args`, for the debug log.
    fn describe(&self, args: &[&str]) -> String;
}

/// `VpnTool` backed by the `ghostscale` command line.
pub struct GhostscaleCli<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> GhostscaleCli<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    #[cfg(test)]
    pub fn runner(&self) -> &R {
        &self.runner
    }
}

impl<R: CommandRunner> VpnTool for GhostscaleCli<R> {
    fn get_status(&self) -> Result<VpnStatus, ToolError> {
        parse_status(&self.runner.run(&["status"])?)
    }

    fn list_exit_nodes(&self) -> Result<Vec<ExitNode>, ToolError> {
        parse_exit_nodes(&self.runner.run(&["exits"])?)
    }

    fn list_programs(&self) -> Result<Vec<ManagedProgram>, ToolError> {
        parse_programs(&self.runner.run(&["list"])?)
    }

    fn toggle_program(&self, name: &str) -> Result<String, ToolError> {
        Ok(self.runner.run(&["toggle", name])?.trim().to_string())
    }

    fn set_exit(&self, ip: &str) -> Result<String, ToolError> {
        Ok(self.runner.run(&["set-exit", ip])?.trim().to_string())
    }

    fn disable_exit(&self) -> Result<String, ToolError> {
        Ok(self.runner.run(&["disable-exit"])?.trim().to_string())
    }

    fn describe(&self, args: &[&str]) -> String {
        self.runner.describe(args)
    }
}
