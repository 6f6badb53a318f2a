mod renumber;
mod save;
mod show;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::DayCommands;
use crate::context::AppContext;

/// Handle `lift day`.
pub async fn handle(
    action: &DayCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        DayCommands::Show { date } => show::run(*date, ctx, flags).await,
        DayCommands::Save {
            form,
            confirm_clear,
        } => save::run(form, *confirm_clear, ctx, flags).await,
        DayCommands::Renumber { date } => renumber::run(*date, ctx, flags).await,
    }
}
