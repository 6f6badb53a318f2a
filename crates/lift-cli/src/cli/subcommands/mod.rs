mod day;
mod entry;
mod group;

pub use day::DayCommands;
pub use entry::EntryCommands;
pub use group::GroupCommands;
