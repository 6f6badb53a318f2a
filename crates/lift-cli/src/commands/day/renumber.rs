use chrono::NaiveDate;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output_with_rows;

pub async fn run(date: NaiveDate, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let person = ctx.require_person()?;
    let changes = ctx.service().renumber_groups(person, date).await?;
    let rows = changes
        .iter()
        .map(|(from, to)| json!({ "from": from, "to": to }))
        .collect::<Vec<_>>();

    output_with_rows(
        &json!({
            "person_id": person,
            "date": date,
            "renumbered": rows,
        }),
        &rows,
        flags.format,
    )
}
