use anyhow::Context;
use chrono::NaiveDate;
use lift_core::entities::WorkoutEntry;
use lift_core::ids::EntryId;
use lift_engine::Projection;

use crate::context::AppContext;

/// Open `date` for the selected person.
pub async fn open_day(ctx: &AppContext, date: NaiveDate) -> anyhow::Result<Projection> {
    ctx.require_person()?;
    Ok(ctx.controller.open_day(date).await?)
}

/// Look up an entry and open the day it lives on.
///
/// The entry's owner becomes the selected person. An explicit person that
/// does not own the entry is refused.
pub async fn open_entry_day(ctx: &AppContext, id: i64) -> anyhow::Result<WorkoutEntry> {
    let entry = ctx
        .service()
        .get_entry(EntryId(id))
        .await
        .with_context(|| format!("entry {id} not found"))?;

    if let Some(person) = ctx.person
        && person != entry.person_id
    {
        anyhow::bail!(
            "entry {id} belongs to person {}, not {person}",
            entry.person_id
        );
    }

    ctx.controller.select_person(entry.person_id);
    ctx.controller.open_day(entry.date).await?;
    Ok(entry)
}
