use chrono::NaiveDate;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::commands::shared::day::open_day;
use crate::context::AppContext;
use crate::output::{entry_rows, output_with_rows};

pub async fn run(date: NaiveDate, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let projection = open_day(ctx, date).await?;
    output_with_rows(
        &json!({
            "person_id": projection.person_id,
            "date": date,
            "groups": projection.groups,
        }),
        &entry_rows(&projection.groups),
        flags.format,
    )
}
