use lift_core::ids::EntryId;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::commands::shared::day::open_entry_day;
use crate::context::AppContext;
use crate::output::{entry_rows, output_with_rows};

pub async fn run(id: i64, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let entry = open_entry_day(ctx, id).await?;
    let projection = ctx.controller.delete_entry(EntryId(id)).await?;

    output_with_rows(
        &json!({
            "deleted": entry,
            "groups": projection.groups,
        }),
        &entry_rows(&projection.groups),
        flags.format,
    )
}
