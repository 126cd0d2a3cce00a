use chrono::Duration;
use serde_json::Value;

use super::args::{optional_str, page_id, parse_datetime, required_str, Bound};
use super::ToolError;
use crate::core::api::NotionClient;

pub const NAME: &str = "change_todo_schedule";

/// Shortest slot a reschedule with an explicit end may cover.
const MIN_SLOT_MINUTES: i64 = 30;

pub fn definition() -> Value {
    serde_json::json!({
        "name": NAME,
        "description": "Change the schedule of a todo item",
        "inputSchema": {
            "type": "object",
            "properties": {
                "task_id": {
                    "type": "string",
                    "description": "The ID of the todo task to change the schedule"
                },
                "start_datetime": {
                    "type": "string",
                    "description": "The datetime the task should be done (YYYY-MM-DDTHH:MM:SS)"
                },
                "end_datetime": {
                    "type": "string",
                    "description": "The datetime the task should be finished (YYYY-MM-DDTHH:MM:SS). If omitted, the todo keeps only a start. Must be at least 30 minutes after start_datetime."
                }
            },
            "required": ["task_id", "start_datetime"]
        }
    })
}

pub async fn execute(client: &NotionClient, args: &Value) -> Result<String, ToolError> {
    let tz = client.settings().timezone;
    let task_id = page_id(args, "task_id")?;
    let start = parse_datetime(required_str(args, "start_datetime")?, &tz, Bound::Start)?;
    let end = optional_str(args, "end_datetime")?
        .map(|s| parse_datetime(s, &tz, Bound::End))
        .transpose()?;

    if let Some(end) = &end {
        let earliest_end = start
            .checked_add_signed(Duration::minutes(MIN_SLOT_MINUTES))
            .ok_or_else(|| ToolError::invalid("start_datetime is out of range"))?;
        if *end < earliest_end {
            return Err(ToolError::invalid(format!(
                "end_datetime must be at least {} minutes after start_datetime",
                MIN_SLOT_MINUTES
            )));
        }
    }

    let todo = client.change_todo_schedule(&task_id, start, end).await?;
    let until = end
        .map(|e| e.with_timezone(&tz).to_rfc3339())
        .unwrap_or_else(|| "open end".to_string());
    Ok(format!(
        "Changed todo schedule: {} from {} to {}",
        todo.name,
        start.with_timezone(&tz).to_rfc3339(),
        until
    ))
}
