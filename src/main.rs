mod app;
mod config;
mod error;
mod model;
mod services;
mod theme;
mod ui;
mod widgets;

use anyhow::Result;

fn main() -> Result<()> {
    ui::run()
}
