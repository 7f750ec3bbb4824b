mod animation;
mod cli;
mod commands;
mod config;
mod geometry;
mod logging;
mod model;
mod notebook;
mod notify;
mod storage;
mod sync;
mod ui;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let settings = config::Settings::resolve(&args.global)?;
    let _log_guard = logging::init(&settings.log_path())?;
    let command = args.command.unwrap_or(cli::Command::Tui);
    match command {
        cli::Command::List => commands::list(&settings),
        cli::Command::Add {
            title,
            content,
            color,
        } => commands::add(&settings, title, content, color),
        cli::Command::Edit {
            note_id,
            title,
            content,
            color,
            clear_color,
        } => commands::edit(&settings, note_id, title, content, color, clear_color),
        cli::Command::Delete { note_id } => commands::delete(&settings, note_id),
        cli::Command::Colors => commands::colors(),
        cli::Command::Tui => commands::tui(&settings),
    }
}
