use chrono::{Offset, Utc};
use serde_json::Value;

use super::args::{optional_str, required_str};
use super::ToolError;
use crate::core::api::NotionClient;
use crate::core::model::TodoCreate;

pub const NAME: &str = "add_todo";

pub fn definition() -> Value {
    serde_json::json!({
        "name": NAME,
        "description": "Add a new todo item. 'today' schedules it for now, 'later' leaves it unscheduled.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "task": {
                    "type": "string",
                    "description": "The todo task description"
                },
                "datetime": {
                    "type": "string",
                    "enum": ["today", "later"],
                    "description": "When the task should be done. Defaults to 'later'."
                },
                "priority": {
                    "type": "string",
                    "description": "Priority label, e.g. 'High'. Optional."
                },
                "repeat": {
                    "type": "string",
                    "description": "Repeat label, e.g. 'Weekly'. Optional."
                }
            },
            "required": ["task"]
        }
    })
}

pub async fn execute(client: &NotionClient, args: &Value) -> Result<String, ToolError> {
    let task = required_str(args, "task")?;
    // `when` is accepted as an alias of `datetime`.
    let when = match optional_str(args, "datetime")? {
        Some(when) => Some(when),
        None => optional_str(args, "when")?,
    };
    let when = when.unwrap_or("later").to_lowercase();

    let date = match when.as_str() {
        "today" => {
            let now = Utc::now().with_timezone(&client.settings().timezone);
            Some(now.with_timezone(&now.offset().fix()))
        }
        "later" => None,
        other => {
            return Err(ToolError::invalid(format!(
                "datetime must be 'today' or 'later', got '{}'",
                other
            )))
        }
    };

    let todo = TodoCreate {
        date,
        priority: optional_str(args, "priority")?.map(String::from),
        repeat: optional_str(args, "repeat")?.map(String::from),
        ..TodoCreate::new(task)
    };

    let created = client.create_todo(&todo).await?;
    let scheduled_for = created
        .date
        .map(|d| d.to_rfc3339())
        .unwrap_or_else(|| "later".to_string());
    Ok(format!(
        "Added todo: {} scheduled for {}",
        created.name, scheduled_for
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::Settings;
    use crate::tools::TodoTools;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn tools(server: &MockServer, tmp: &TempDir) -> TodoTools {
        TodoTools::from_settings(Settings {
            api_key: "secret_test".to_string(),
            todo_database_id: "todo-db".to_string(),
            project_database_id: "project-db".to_string(),
            timezone: chrono_tz::Asia::Tokyo,
            base_url: server.uri(),
            cache_file: tmp.path().join("cache.json"),
            ..Settings::default()
        })
    }

    /// Echo the submitted properties back as a created page.
    fn echo_page(request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        ResponseTemplate::new(200).set_body_json(json!({
            "id": "page-1",
            "created_time": "2024-06-01T00:00:00.000Z",
            "properties": body["properties"]
        }))
    }

    #[tokio::test]
    async fn later_creates_an_unscheduled_todo() {
        let server = MockServer::start().await;
        let tmp = TempDir::new().unwrap();
        Mock::given(method("POST"))
            .and(path("/pages"))
            .and(body_partial_json(json!({
                "properties": {
                    "Task": { "title": [{ "text": { "content": "Buy milk" } }] },
                    "Checkbox": { "checkbox": false },
                    "Priority": { "select": { "name": "High" } }
                }
            })))
            .respond_with(echo_page)
            .expect(1)
            .mount(&server)
            .await;

        let response = tools(&server, &tmp)
            .call_tool("add_todo", json!({ "task": "Buy milk", "priority": "High" }))
            .await;
        assert!(!response.is_error, "{}", response.joined_text());
        assert_eq!(
            response.joined_text(),
            "Added todo: Buy milk scheduled for later"
        );
    }

    #[tokio::test]
    async fn today_schedules_in_display_timezone() {
        let server = MockServer::start().await;
        let tmp = TempDir::new().unwrap();
        Mock::given(method("POST"))
            .and(path("/pages"))
            .respond_with(echo_page)
            .expect(1)
            .mount(&server)
            .await;

        let response = tools(&server, &tmp)
            .call_tool("add_todo", json!({ "task": "Call mom", "datetime": "Today" }))
            .await;
        let text = response.joined_text();
        assert!(text.starts_with("Added todo: Call mom scheduled for "), "{text}");
        assert!(text.ends_with("+09:00"), "{text}");
    }

    #[tokio::test]
    async fn unknown_when_is_rejected() {
        let server = MockServer::start().await;
        let tmp = TempDir::new().unwrap();
        let response = tools(&server, &tmp)
            .call_tool("add_todo", json!({ "task": "x", "datetime": "tomorrow" }))
            .await;
        assert!(response.is_error);
        assert!(response.joined_text().contains("'today' or 'later'"));
    }

    #[tokio::test]
    async fn when_is_an_alias_for_datetime() {
        let server = MockServer::start().await;
        let tmp = TempDir::new().unwrap();
        Mock::given(method("POST"))
            .and(path("/pages"))
            .respond_with(echo_page)
            .expect(2)
            .mount(&server)
            .await;
        let tools = tools(&server, &tmp);

        let response = tools
            .call_tool("add_todo", json!({ "task": "Stretch", "when": "today" }))
            .await;
        assert!(response.joined_text().ends_with("+09:00"), "{}", response.joined_text());

        let response = tools
            .call_tool(
                "add_todo",
                json!({ "task": "Stretch", "datetime": "later", "when": "today" }),
            )
            .await;
        assert_eq!(
            response.joined_text(),
            "Added todo: Stretch scheduled for later"
        );
    }
}
