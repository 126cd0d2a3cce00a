use serde_json::Value;

use super::args::{optional_bool, optional_str, parse_datetime, Bound};
use super::ToolError;
use crate::core::api::NotionClient;
use crate::core::error::NotionError;

pub const NAME: &str = "show_specific_date_todos";

pub fn definition() -> Value {
    serde_json::json!({
        "name": NAME,
        "description": "Show todo items from Notion within a date range, newest first. A date without a time covers that whole day.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "start_date": {
                    "type": "string",
                    "description": "Start date (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS). Can be omitted."
                },
                "end_date": {
                    "type": "string",
                    "description": "End date (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS). Can be omitted."
                },
                "done": {
                    "type": "boolean",
                    "description": "Only completed (true) or open (false) todos. Can be omitted."
                }
            }
        }
    })
}

pub async fn execute(client: &NotionClient, args: &Value) -> Result<String, ToolError> {
    let tz = client.settings().timezone;
    let start = optional_str(args, "start_date")?
        .map(|s| parse_datetime(s, &tz, Bound::Start))
        .transpose()?;
    let end = optional_str(args, "end_date")?
        .map(|s| parse_datetime(s, &tz, Bound::End))
        .transpose()?;
    let done = optional_bool(args, "done")?;

    if let (Some(start), Some(end)) = (&start, &end) {
        if end < start {
            return Err(ToolError::invalid("end_date must not be before start_date"));
        }
    }

    let todos = client.fetch_todos(start, end, done).await?;
    serde_json::to_string_pretty(&todos).map_err(|e| ToolError::Notion(NotionError::Json(e)))
}

#[cfg(test)]
mod tests {
    use crate::config::settings::Settings;
    use crate::tools::TodoTools;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

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

    #[tokio::test]
    async fn date_range_becomes_utc_filter_and_json_output() {
        let server = MockServer::start().await;
        let tmp = TempDir::new().unwrap();
        Mock::given(method("POST"))
            .and(path("/databases/todo-db/query"))
            .and(body_partial_json(json!({
                "filter": { "and": [
                    { "property": "Checkbox", "checkbox": { "equals": false } },
                    { "property": "Date", "date": { "on_or_after": "2024-05-31T15:00:00+00:00" } },
                    { "property": "Date", "date": { "on_or_before": "2024-06-07T14:59:59.999999999+00:00" } }
                ] }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{
                    "id": "page-1",
                    "created_time": "2024-05-30T00:00:00.000Z",
                    "properties": {
                        "Task": { "type": "title", "title": [{ "text": { "content": "Water plants" } }] },
                        "Checkbox": { "type": "checkbox", "checkbox": false },
                        "Date": { "type": "date", "date": { "start": "2024-06-02T01:00:00.000Z" } },
                        "Project": { "type": "select", "select": { "name": "Home" } }
                    }
                }],
                "has_more": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = tools(&server, &tmp)
            .call_tool(
                "show_specific_date_todos",
                json!({ "start_date": "2024-06-01", "end_date": "2024-06-07", "done": false }),
            )
            .await;
        assert!(!response.is_error, "{}", response.joined_text());

        let listed: Value = serde_json::from_str(&response.joined_text()).unwrap();
        assert_eq!(listed[0]["name"], "Water plants");
        assert_eq!(listed[0]["date"], "2024-06-02T10:00:00+09:00");
        assert_eq!(listed[0]["project"], json!({ "kind": "label", "value": "Home" }));
        assert_eq!(listed[0]["done"], false);
    }

    #[tokio::test]
    async fn reversed_range_is_rejected() {
        let server = MockServer::start().await;
        let tmp = TempDir::new().unwrap();
        let response = tools(&server, &tmp)
            .call_tool(
                "show_specific_date_todos",
                json!({ "start_date": "2024-06-07", "end_date": "2024-06-01" }),
            )
            .await;
        assert!(response.is_error);
        assert!(response.joined_text().contains("before start_date"));
    }

    #[tokio::test]
    async fn empty_result_is_an_empty_list() {
        let server = MockServer::start().await;
        let tmp = TempDir::new().unwrap();
        Mock::given(method("POST"))
            .and(path("/databases/todo-db/query"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "results": [], "has_more": false })),
            )
            .mount(&server)
            .await;

        let response = tools(&server, &tmp)
            .call_tool("show_specific_date_todos", json!({}))
            .await;
        assert_eq!(response.joined_text(), "[]");
    }
}
