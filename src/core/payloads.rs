use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Map, Value};

use super::model::{ProjectRef, TodoCreate};
use crate::config::settings::{write_name, PropertySchema};

/// An AND of zero or more query conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCondition {
    conditions: Vec<Value>,
}

impl FilterCondition {
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[Value] {
        &self.conditions
    }

    /// The `filter` body, or `None` when there is nothing to filter on.
    pub fn to_json(&self) -> Option<Value> {
        if self.conditions.is_empty() {
            None
        } else {
            Some(json!({ "and": self.conditions }))
        }
    }
}

/// UTC ISO-8601 rendering used for every instant sent to Notion filters and
/// schedule updates.
pub fn to_utc_string<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
    dt.with_timezone(&Utc).to_rfc3339()
}

pub fn build_filter_condition<Tz: TimeZone>(
    start: Option<&DateTime<Tz>>,
    end: Option<&DateTime<Tz>>,
    done: Option<bool>,
    schema: &PropertySchema,
) -> FilterCondition {
    let date_prop = write_name(&schema.date);
    let mut conditions = Vec::new();

    if let Some(done) = done {
        conditions.push(json!({
            "property": write_name(&schema.done),
            "checkbox": { "equals": done }
        }));
    }
    if let Some(start) = start {
        conditions.push(json!({
            "property": date_prop,
            "date": { "on_or_after": to_utc_string(start) }
        }));
    }
    if let Some(end) = end {
        conditions.push(json!({
            "property": date_prop,
            "date": { "on_or_before": to_utc_string(end) }
        }));
    }

    FilterCondition { conditions }
}

/// Query body: newest first, filter only when it constrains something.
pub fn build_query_payload(filter: &FilterCondition, start_cursor: Option<&str>) -> Value {
    let mut payload = json!({
        "sorts": [
            { "timestamp": "created_time", "direction": "descending" }
        ]
    });
    if let Some(filter) = filter.to_json() {
        payload["filter"] = filter;
    }
    if let Some(cursor) = start_cursor {
        payload["start_cursor"] = json!(cursor);
    }
    payload
}

fn select(name: &str) -> Value {
    json!({ "type": "select", "select": { "name": name } })
}

/// Notion `properties` for a todo. When `creating` the checkbox is always
/// false, whatever `todo.done` says.
pub fn build_properties_for_todo(
    todo: &TodoCreate,
    creating: bool,
    schema: &PropertySchema,
) -> Value {
    let mut properties = Map::new();

    properties.insert(
        write_name(&schema.title).to_string(),
        json!({
            "type": "title",
            "title": [{ "type": "text", "text": { "content": todo.name } }]
        }),
    );
    properties.insert(
        write_name(&schema.done).to_string(),
        json!({ "type": "checkbox", "checkbox": !creating && todo.done }),
    );

    if let Some(date) = &todo.date {
        properties.insert(
            write_name(&schema.date).to_string(),
            json!({ "type": "date", "date": { "start": date.to_rfc3339() } }),
        );
    }
    if let Some(priority) = &todo.priority {
        properties.insert(write_name(&schema.priority).to_string(), select(priority));
    }
    match &todo.project {
        Some(ProjectRef::Label(label)) => {
            properties.insert(write_name(&schema.project).to_string(), select(label));
        }
        Some(ProjectRef::Relations(relations)) => {
            let ids: Vec<Value> = relations.iter().map(|r| json!({ "id": r.id })).collect();
            properties.insert(
                write_name(&schema.project).to_string(),
                json!({ "type": "relation", "relation": ids }),
            );
        }
        None => {}
    }
    if let Some(repeat) = &todo.repeat {
        properties.insert(write_name(&schema.repeat).to_string(), select(repeat));
    }

    Value::Object(properties)
}

/// Date property overwrite used when rescheduling.
pub fn build_schedule_properties<Tz: TimeZone>(
    start: &DateTime<Tz>,
    end: Option<&DateTime<Tz>>,
    schema: &PropertySchema,
) -> Value {
    let mut properties = Map::new();
    properties.insert(
        write_name(&schema.date).to_string(),
        json!({
            "type": "date",
            "date": {
                "start": to_utc_string(start),
                "end": end.map(to_utc_string)
            }
        }),
    );
    Value::Object(properties)
}

pub fn build_complete_properties(schema: &PropertySchema) -> Value {
    let mut properties = Map::new();
    properties.insert(
        write_name(&schema.done).to_string(),
        json!({ "type": "checkbox", "checkbox": true }),
    );
    Value::Object(properties)
}
