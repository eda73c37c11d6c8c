use anyhow::{anyhow, Result};
use std::env;

const DEFAULT_BIN: &str = "ghostscale";

/// Runtime settings, read from `GHOSTSCALE_TUI_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Tool command line: program plus fixed leading arguments.
    pub tool_argv: Vec<String>,
    pub debug_pane: bool,
    pub headless: bool,
    pub headless_ticks: u64,
    pub headless_summary: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tool_argv: vec![DEFAULT_BIN.to_string()],
            debug_pane: false,
            headless: false,
            headless_ticks: 10,
            headless_summary: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Config::default();
        if let Some(bin) = get("GHOSTSCALE_TUI_BIN").filter(|s| !s.trim().is_empty()) {
            // Split like a shell so "sudo ghostscale" or a quoted path with spaces works
            let parts = shlex::split(&bin)
                .filter(|p| !p.is_empty())
                .ok_or_else(|| anyhow!("GHOSTSCALE_TUI_BIN is not a valid command line: {bin}"))?;
            cfg.tool_argv = parts;
        }
        cfg.debug_pane = flag(get("GHOSTSCALE_TUI_DEBUG"));
        cfg.headless = flag(get("GHOSTSCALE_TUI_HEADLESS"));
        if let Some(ticks) = get("GHOSTSCALE_TUI_TICKS").and_then(|s| s.parse::<u64>().ok()) {
            cfg.headless_ticks = ticks;
        }
        cfg.headless_summary = flag(get("GHOSTSCALE_TUI_SMOKE_SUMMARY"));
        Ok(cfg)
    }
}

fn flag(v: Option<String>) -> bool {
    v.map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}
