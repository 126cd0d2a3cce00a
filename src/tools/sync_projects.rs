use serde_json::Value;

use super::ToolError;
use crate::core::api::NotionClient;

pub const NAME: &str = "sync_projects";

pub fn definition() -> Value {
    serde_json::json!({
        "name": NAME,
        "description": "Reload project names from the Notion project database into the local cache. Run this when a todo refers to a project that is not cached yet.",
        "inputSchema": {
            "type": "object",
            "properties": {}
        }
    })
}

pub async fn execute(client: &NotionClient, _args: &Value) -> Result<String, ToolError> {
    let count = client.sync_projects().await?;
    Ok(format!("Synced {} projects into the relation cache", count))
}
