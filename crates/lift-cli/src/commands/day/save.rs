use std::path::Path;

use lift_engine::{ReconcileError, SessionError};
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::commands::shared::day::open_day;
use crate::commands::shared::form::{load_drafts, read_session_form};
use crate::context::AppContext;
use crate::output::{entry_rows, output_with_rows};

pub async fn run(
    form_path: &Path,
    confirm_clear: bool,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let form = read_session_form(form_path)?;
    let date = form.date;
    open_day(ctx, date).await?;
    load_drafts(&ctx.controller, form.drafts)?;

    let report = match ctx.controller.save_session(confirm_clear).await {
        Ok(report) => report,
        Err(SessionError::Reconcile(ReconcileError::ConfirmationRequired { deletes })) => {
            anyhow::bail!(
                "saving would delete all {deletes} entries on {date}; pass --confirm-clear to proceed"
            );
        }
        Err(error) => return Err(error.into()),
    };
    tracing::info!(
        %date,
        deleted = report.deleted.len(),
        inserted = report.inserted.len(),
        reordered = report.reordered,
        "day saved"
    );

    let projection = ctx.controller.projection();
    output_with_rows(
        &json!({
            "date": date,
            "report": report,
            "groups": projection.groups,
        }),
        &entry_rows(&projection.groups),
        flags.format,
    )
}
