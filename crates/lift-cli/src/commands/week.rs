use chrono::{Datelike, Days, NaiveDate};
use lift_core::entities::DateRange;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::WeekArgs;
use crate::context::AppContext;
use crate::output::{entry_rows, output_with_rows};

/// Handle `lift week`.
pub async fn handle(args: &WeekArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.require_person()?;
    let start = args
        .start
        .unwrap_or_else(|| week_start(chrono::Local::now().date_naive()));
    let days = args.days.unwrap_or(ctx.config.session.week_length_days);
    let range = DateRange::spanning(start, days)?;

    let by_day = ctx.controller.fetch_range(range).await?;
    let rows = by_day
        .values()
        .flat_map(|groups| entry_rows(groups))
        .collect::<Vec<_>>();

    output_with_rows(
        &json!({
            "start": range.start,
            "end": range.end,
            "days": by_day,
        }),
        &rows,
        flags.format,
    )
}

/// The Monday on or before `date`.
fn week_start(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}
