pub mod cli_runner;
pub mod ghostscale;
