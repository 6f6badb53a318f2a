use lift_core::entities::{DaySessionForm, OrderUpdate, WorkoutEntry};
use schemars::schema_for;

use crate::cli::root_commands::{SchemaArgs, SchemaType};
use crate::cli::{GlobalFlags, OutputFormat};
use crate::output::output;

/// Handle `lift schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = schema_value(args.type_name)?;
    // A schema has no sensible table form.
    let format = match flags.format {
        OutputFormat::Table => OutputFormat::Json,
        other => other,
    };
    output(&schema, format)
}

fn schema_value(type_name: SchemaType) -> anyhow::Result<serde_json::Value> {
    let schema = match type_name {
        SchemaType::SessionForm => schema_for!(DaySessionForm),
        SchemaType::WorkoutEntry => schema_for!(WorkoutEntry),
        SchemaType::OrderUpdate => schema_for!(OrderUpdate),
    };
    Ok(serde_json::to_value(schema)?)
}
