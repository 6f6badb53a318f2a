mod delete;
mod move_entry;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::EntryCommands;
use crate::context::AppContext;

/// Handle `lift entry`.
pub async fn handle(
    action: &EntryCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        EntryCommands::Delete { id } => delete::run(*id, ctx, flags).await,
        EntryCommands::Move {
            id,
            group,
            position,
        } => move_entry::run(*id, *group, *position, ctx, flags).await,
    }
}
