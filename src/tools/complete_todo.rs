use serde_json::Value;

use super::args::page_id;
use super::ToolError;
use crate::core::api::NotionClient;

pub const NAME: &str = "complete_todo";

pub fn definition() -> Value {
    serde_json::json!({
        "name": NAME,
        "description": "Mark a todo item as complete",
        "inputSchema": {
            "type": "object",
            "properties": {
                "task_id": {
                    "type": "string",
                    "description": "The ID of the todo task to mark as complete"
                }
            },
            "required": ["task_id"]
        }
    })
}

pub async fn execute(client: &NotionClient, args: &Value) -> Result<String, ToolError> {
    let task_id = page_id(args, "task_id")?;
    let todo = client.complete_todo(&task_id).await?;
    Ok(format!("Marked todo as complete: {}", todo.name))
}
