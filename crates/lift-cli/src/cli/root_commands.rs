use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use crate::cli::subcommands::{DayCommands, EntryCommands, GroupCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Initialize liftlog for a project.
    Init(InitArgs),
    /// Work with one day of entries.
    Day {
        #[command(subcommand)]
        action: DayCommands,
    },
    /// Persisted workout entries.
    Entry {
        #[command(subcommand)]
        action: EntryCommands,
    },
    /// Exercise groups within a day.
    Group {
        #[command(subcommand)]
        action: GroupCommands,
    },
    /// Show every day of a week, grouped.
    Week(WeekArgs),
    /// Print the JSON Schema of a liftlog type.
    Schema(SchemaArgs),
}

/// Arguments for `lift init`.
#[derive(Clone, Debug, Args)]
pub struct InitArgs {
    /// Person written as `general.default_person`.
    #[arg(long)]
    pub person: Option<i64>,
    /// Overwrite an existing project config.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `lift week`.
#[derive(Clone, Debug, Args)]
pub struct WeekArgs {
    /// First day to show (defaults to this week's Monday).
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// Number of days (defaults to `session.week_length_days`).
    #[arg(long)]
    pub days: Option<u32>,
}

/// Arguments for `lift schema`.
#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    #[arg(value_enum, default_value = "session-form")]
    pub type_name: SchemaType,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SchemaType {
    SessionForm,
    WorkoutEntry,
    OrderUpdate,
}
