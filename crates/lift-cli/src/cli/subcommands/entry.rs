use clap::Subcommand;

/// Entry commands.
#[derive(Clone, Debug, Subcommand)]
pub enum EntryCommands {
    /// Delete an entry by ID.
    Delete { id: i64 },
    /// Move an entry to a group and position within its day.
    Move {
        id: i64,
        #[arg(long)]
        group: u32,
        /// Zero-based slot in the destination group (defaults to the end).
        #[arg(long)]
        position: Option<usize>,
    },
}
