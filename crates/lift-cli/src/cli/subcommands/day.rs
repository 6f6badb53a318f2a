use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Subcommand;

/// Day commands.
#[derive(Clone, Debug, Subcommand)]
pub enum DayCommands {
    /// Show a day's entries by group.
    Show { date: NaiveDate },
    /// Reconcile a day against a session form file.
    Save {
        /// JSON file holding a session form (see `lift schema`).
        #[arg(long)]
        form: PathBuf,
        /// Allow a save that deletes every entry of the day.
        #[arg(long)]
        confirm_clear: bool,
    },
    /// Compact a day's group numbers to 1..=k.
    Renumber { date: NaiveDate },
}
