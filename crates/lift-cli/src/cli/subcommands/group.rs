use chrono::NaiveDate;
use clap::Subcommand;

/// Group commands.
#[derive(Clone, Debug, Subcommand)]
pub enum GroupCommands {
    /// Print the first unused group number for a day.
    ///
    /// Nothing is stored; `lift entry move <id> --group <n>` fills it.
    Next { date: NaiveDate },
}
