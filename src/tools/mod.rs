pub mod add_todo;
pub mod args;
pub mod change_schedule;
pub mod complete_todo;
pub mod show_todos;
pub mod sync_projects;

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::config::settings::Settings;
use crate::core::api::NotionClient;
use crate::core::cache::RelationCache;
use crate::core::error::NotionError;

/// One text block of a tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub content_type: &'static str,
    pub text: String,
}

impl TextContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            content_type: "text",
            text: text.into(),
        }
    }
}

/// What a tool call hands back to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    pub content: Vec<TextContent>,
    pub is_error: bool,
}

impl ToolResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![TextContent::new(text)],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![TextContent::new(text)],
            is_error: true,
        }
    }

    /// All blocks joined by newlines.
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments failed validation; the client was never called.
    #[error("{0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Notion(#[from] NotionError),
}

impl ToolError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }
}

/// The todo tools exposed to the host.
#[derive(Clone)]
pub struct TodoTools {
    client: NotionClient,
}

impl TodoTools {
    pub fn new(client: NotionClient) -> Self {
        Self { client }
    }

    /// Open the relation cache named in `settings` and build the client.
    pub fn from_settings(settings: Settings) -> Self {
        let cache = Arc::new(RelationCache::open(&settings.cache_file));
        Self::new(NotionClient::new(settings, cache))
    }

    pub fn client(&self) -> &NotionClient {
        &self.client
    }

    /// Tool catalogue in MCP `tools/list` shape.
    pub fn tool_definitions(&self) -> Vec<Value> {
        vec![
            add_todo::definition(),
            show_todos::definition(),
            change_schedule::definition(),
            complete_todo::definition(),
            sync_projects::definition(),
        ]
    }

    /// Run a tool by name. Always returns a response; failures become error
    /// text rather than propagating to the host.
    pub async fn call_tool(&self, name: &str, args: Value) -> ToolResponse {
        let args = match args {
            Value::Null => Value::Object(Default::default()),
            Value::Object(_) => args,
            _ => return ToolResponse::error("Invalid arguments, must be an object"),
        };

        let result = match name {
            add_todo::NAME => add_todo::execute(&self.client, &args).await,
            show_todos::NAME => show_todos::execute(&self.client, &args).await,
            change_schedule::NAME => change_schedule::execute(&self.client, &args).await,
            complete_todo::NAME => complete_todo::execute(&self.client, &args).await,
            sync_projects::NAME => sync_projects::execute(&self.client, &args).await,
            _ => return ToolResponse::error(format!("Unknown tool: {}", name)),
        };

        match result {
            Ok(text) => ToolResponse::text(text),
            Err(e) => report(name, e),
        }
    }
}

fn report(tool: &str, error: ToolError) -> ToolResponse {
    match error {
        ToolError::InvalidArguments(msg) => {
            tracing::debug!(tool, %msg, "rejected tool arguments");
            ToolResponse::error(format!("Error: {}", msg))
        }
        ToolError::Notion(e @ NotionError::Http { .. })
        | ToolError::Notion(e @ NotionError::UncachedRelation { .. }) => {
            tracing::warn!(tool, error = %e, "tool call failed");
            ToolResponse::error(e.to_string())
        }
        ToolError::Notion(e) => {
            tracing::error!(tool, error = %e, "unexpected error");
            ToolResponse::error(format!("An unexpected error occurred: {}", e))
        }
    }
}
