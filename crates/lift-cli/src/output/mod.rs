use lift_core::entities::Group;
use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(value),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

/// Print `value` as JSON, or `rows` when a table was asked for.
///
/// Nested responses such as grouped days read badly as key/value tables.
pub fn output_with_rows<T: Serialize, R: Serialize>(
    value: &T,
    rows: &[R],
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => output(&rows, format),
        OutputFormat::Json | OutputFormat::Raw => output(value, format),
    }
}

/// One table line of a grouped day. Empty groups get a line with only
/// `group` set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryRow {
    pub date: String,
    pub group: u32,
    pub position: Option<u32>,
    pub id: Option<i64>,
    pub exercise: Option<i64>,
    pub sets: Option<u32>,
    pub reps: Option<u32>,
    pub weight: Option<f64>,
    pub notes: Option<String>,
}

#[must_use]
pub fn entry_rows(groups: &[Group]) -> Vec<EntryRow> {
    let mut rows = Vec::new();
    for group in groups {
        if group.entries.is_empty() {
            rows.push(EntryRow {
                date: String::new(),
                group: group.group_number,
                position: None,
                id: None,
                exercise: None,
                sets: None,
                reps: None,
                weight: None,
                notes: None,
            });
            continue;
        }
        for entry in &group.entries {
            rows.push(EntryRow {
                date: entry.date.to_string(),
                group: group.group_number,
                position: Some(entry.order_index),
                id: Some(entry.id.get()),
                exercise: Some(entry.exercise_id.get()),
                sets: Some(entry.sets),
                reps: Some(entry.reps),
                weight: entry.weight,
                notes: entry.notes.clone(),
            });
        }
    }
    rows
}

fn table_options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    }
}

fn render_table<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let options = table_options();
    let value = serde_json::to_value(value)?;
    match value {
        Value::Array(items) => Ok(render_array_table(&items, options)),
        Value::Object(map) => {
            let headers = ["key", "value"];
            let rows = map
                .into_iter()
                .map(|(key, value)| vec![key, value_to_cell(&value)])
                .collect::<Vec<_>>();
            Ok(table::render_table(&headers, &rows, options))
        }
        scalar => {
            let headers = ["value"];
            let rows = vec![vec![value_to_cell(&scalar)]];
            Ok(table::render_table(&headers, &rows, options))
        }
    }
}

/// Columns follow the field order of the first object.
fn render_array_table(items: &[Value], options: table::TableOptions) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }

    if !items.iter().all(Value::is_object) {
        let headers = ["value"];
        let rows = items
            .iter()
            .map(|item| vec![value_to_cell(item)])
            .collect::<Vec<_>>();
        return table::render_table(&headers, &rows, options);
    }

    let mut headers = Vec::<String>::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    if headers.is_empty() {
        return String::from("(no columns)");
    }

    let header_refs = headers.iter().map(String::as_str).collect::<Vec<_>>();
    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|header| {
                    map.get(header)
                        .map_or_else(|| String::from("-"), value_to_cell)
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    table::render_table(&header_refs, &rows, options)
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) if v.is_empty() => String::from("-"),
        Value::String(v) => v.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use lift_core::entities::{Group, WorkoutEntry};
    use lift_core::ids::{EntryId, ExerciseId, PersonId};
    use pretty_assertions::assert_eq;

    use super::{entry_rows, render};
    use crate::cli::OutputFormat;

    fn entry(id: i64, group: u32, order: u32) -> WorkoutEntry {
        WorkoutEntry {
            id: EntryId(id),
            person_id: PersonId(1),
            exercise_id: ExerciseId(id * 10),
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            sets: 3,
            reps: 8,
            weight: None,
            notes: None,
            order_index: order,
            group_number: group,
        }
    }

    #[test]
    fn json_render_is_valid_json() {
        let out = render(&entry(1, 1, 0), OutputFormat::Json).expect("json render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["id"], 1);
        assert_eq!(parsed["exercise_id"], 10);
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let out = render(&entry(1, 1, 0), OutputFormat::Raw).expect("raw render should work");
        assert!(!out.contains('\n'));
    }

    #[test]
    fn table_render_keeps_field_order() {
        let rows = entry_rows(&[Group {
            group_number: 1,
            entries: vec![entry(4, 1, 0)],
        }]);
        let out = render(&rows, OutputFormat::Table).expect("table render should work");
        let header = out.lines().next().expect("header line");
        let date_at = header.find("date").expect("date column");
        let group_at = header.find("group").expect("group column");
        assert!(date_at < group_at);
    }

    #[test]
    fn empty_group_becomes_a_single_placeholder_row() {
        let groups = vec![
            Group {
                group_number: 1,
                entries: vec![entry(1, 1, 0), entry(2, 1, 1)],
            },
            Group::placeholder(2),
        ];
        let rows = entry_rows(&groups);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].group, 2);
        assert_eq!(rows[2].id, None);
        assert_eq!(rows[1].position, Some(1));
    }

    #[test]
    fn empty_list_renders_no_rows_marker() {
        let rows: Vec<super::EntryRow> = Vec::new();
        let out = render(&rows, OutputFormat::Table).expect("table render should work");
        assert_eq!(out, "(no rows)");
    }
}
