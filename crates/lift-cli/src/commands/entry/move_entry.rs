use lift_core::ids::EntryId;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::commands::shared::day::open_entry_day;
use crate::context::AppContext;
use crate::output::{entry_rows, output_with_rows};

pub async fn run(
    id: i64,
    group: u32,
    position: Option<usize>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let entry = open_entry_day(ctx, id).await?;
    let projection = ctx
        .controller
        .begin_drag(EntryId(id), group, position)
        .await?;
    tracing::debug!(
        id,
        from = entry.group_number,
        to = group,
        "entry moved"
    );

    output_with_rows(
        &json!({
            "date": entry.date,
            "groups": projection.groups,
        }),
        &entry_rows(&projection.groups),
        flags.format,
    )
}
