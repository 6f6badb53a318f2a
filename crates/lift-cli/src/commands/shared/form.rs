use std::path::Path;

use anyhow::Context;
use lift_core::entities::{DaySessionForm, DraftUpdate, EntryDraft};
use lift_engine::{SessionController, SessionError};
use serde_json::Value;

/// Read a session form file, checking it against the form's JSON Schema
/// before deserializing.
pub fn read_session_form(path: &Path) -> anyhow::Result<DaySessionForm> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read form file {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let problems = schema_errors(&value)?;
    if !problems.is_empty() {
        anyhow::bail!(
            "{} does not match the session form schema:\n  {}",
            path.display(),
            problems.join("\n  ")
        );
    }

    serde_json::from_value(value)
        .with_context(|| format!("failed to parse session form {}", path.display()))
}

/// Schema violations of `instance`, one message per error.
pub fn schema_errors(instance: &Value) -> anyhow::Result<Vec<String>> {
    let schema = serde_json::to_value(schemars::schema_for!(DaySessionForm))?;
    let validator = jsonschema::validator_for(&schema)
        .map_err(|error| anyhow::anyhow!("session form schema is invalid: {error}"))?;
    Ok(validator
        .iter_errors(instance)
        .map(|error| format!("{error} (at '{}')", error.instance_path))
        .collect())
}

/// Replace the open form's rows with `drafts`, one field edit at a time.
pub fn load_drafts<G>(
    controller: &SessionController<G>,
    drafts: Vec<EntryDraft>,
) -> Result<(), SessionError> {
    let open_rows = controller.projection().drafts.len();
    for index in (0..open_rows).rev() {
        controller.remove_draft_row(index)?;
    }

    for (index, draft) in drafts.into_iter().enumerate() {
        controller.add_draft_row()?;
        let updates = [
            DraftUpdate::Exercise(draft.exercise_id),
            DraftUpdate::Sets(draft.sets),
            DraftUpdate::Reps(draft.reps),
            DraftUpdate::Weight(draft.weight),
            DraftUpdate::Notes(draft.notes),
            DraftUpdate::Group(draft.group_number),
        ];
        for update in updates {
            controller.update_draft(index, update)?;
        }
    }
    Ok(())
}
