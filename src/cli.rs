use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "notecards", version, about = "Terminal note cards with animated editing")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Directory holding the notes file and the log
    #[arg(long, global = true, env = "NOTECARDS_DIR")]
    pub store_dir: Option<PathBuf>,
    /// Length of the card/dialog animation in milliseconds
    #[arg(long, global = true, env = "NOTECARDS_ANIMATION_MS")]
    pub animation_ms: Option<u64>,
    /// Make every remote sync call fail
    #[arg(long, global = true, env = "NOTECARDS_OFFLINE")]
    pub offline: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List notes, most recently updated first
    List,
    /// Add a new note
    Add {
        /// Title of the note
        title: String,
        /// Note content
        #[arg(long)]
        content: Option<String>,
        /// Color tag (see `colors`)
        #[arg(long)]
        color: Option<String>,
    },
    /// Edit an existing note
    Edit {
        /// Note id to edit
        note_id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New content
        #[arg(long)]
        content: Option<String>,
        /// New color tag
        #[arg(long, conflicts_with = "clear_color")]
        color: Option<String>,
        /// Remove the color tag
        #[arg(long)]
        clear_color: bool,
    },
    /// Delete a note
    Delete {
        /// Note id to delete
        note_id: String,
    },
    /// Show the color tag palette
    Colors,
    /// Launch the interactive TUI
    Tui,
}
