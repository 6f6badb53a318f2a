use lift_engine::Projection;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::GroupCommands;
use crate::commands::shared::day::open_day;
use crate::context::AppContext;
use crate::output::output;

/// Handle `lift group`.
pub async fn handle(
    action: &GroupCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        GroupCommands::Next { date } => {
            let projection = open_day(ctx, *date).await?;
            output(
                &json!({
                    "date": date,
                    "group_number": next_group_number(&projection),
                }),
                flags.format,
            )
        }
    }
}

fn next_group_number(projection: &Projection) -> u32 {
    projection
        .groups
        .iter()
        .map(|group| group.group_number)
        .max()
        .unwrap_or(0)
        + 1
}

#[cfg(test)]
mod tests {
    use lift_core::entities::Group;

    use super::*;

    fn with_groups(numbers: &[u32]) -> Projection {
        Projection {
            groups: numbers
                .iter()
                .map(|&group_number| Group {
                    group_number,
                    entries: Vec::new(),
                })
                .collect(),
            ..Projection::default()
        }
    }

    #[test]
    fn empty_day_starts_at_one() {
        assert_eq!(next_group_number(&with_groups(&[])), 1);
    }

    #[test]
    fn gaps_are_not_reused() {
        assert_eq!(next_group_number(&with_groups(&[1, 4])), 5);
    }
}
