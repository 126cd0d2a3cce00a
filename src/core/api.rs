use chrono::{DateTime, FixedOffset};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use super::cache::RelationCache;
use super::error::{NotionError, Result};
use super::mapper::TodoMapper;
use super::model::{Todo, TodoCreate};
use super::parsers::parse_title;
use super::payloads::{
    build_complete_properties, build_filter_condition, build_properties_for_todo,
    build_query_payload, build_schedule_properties, FilterCondition,
};
use crate::config::settings::Settings;

const NOTION_VERSION_HEADER: &str = "Notion-Version";

/// Title property of pages in the project database.
const PROJECT_TITLE: &str = "Name";

// ── Client ──────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    settings: Settings,
    mapper: TodoMapper,
}

impl NotionClient {
    pub fn new(settings: Settings, cache: Arc<RelationCache>) -> Self {
        let mapper = TodoMapper::new(
            cache,
            settings.schema.clone(),
            settings.project_database_id.clone(),
            settings.timezone,
        );
        Self {
            http: reqwest::Client::new(),
            settings,
            mapper,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache(&self) -> &RelationCache {
        self.mapper.cache()
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.settings.api_key))
                .map_err(|_| NotionError::InvalidHeader(AUTHORIZATION.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("notion-version"),
            HeaderValue::from_str(&self.settings.notion_version)
                .map_err(|_| NotionError::InvalidHeader(NOTION_VERSION_HEADER.to_string()))?,
        );
        Ok(headers)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    /// Send one request and return the decoded body of a 2xx response.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request.headers(self.headers()?).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %body, "Notion request failed");
            return Err(NotionError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    /// Every page of a database query, following `next_cursor`.
    async fn query_all(&self, database_id: &str, filter: &FilterCondition) -> Result<Vec<Value>> {
        let url = self.url(&format!("/databases/{}/query", database_id));
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let body = build_query_payload(filter, cursor.as_deref());
            tracing::debug!(database_id, payload = %body, "querying database");

            let data = self.send(self.http.post(&url).json(&body)).await?;
            if let Some(results) = data.get("results").and_then(|r| r.as_array()) {
                pages.extend(results.iter().cloned());
            }

            let has_more = data.get("has_more").and_then(|v| v.as_bool()).unwrap_or(false);
            cursor = data
                .get("next_cursor")
                .and_then(|v| v.as_str())
                .map(String::from);
            if !has_more || cursor.is_none() {
                break;
            }
        }

        Ok(pages)
    }

    /// Todos in the todo database, newest first, optionally limited to a
    /// date range and completion state.
    pub async fn fetch_todos(
        &self,
        start: Option<DateTime<FixedOffset>>,
        end: Option<DateTime<FixedOffset>>,
        done: Option<bool>,
    ) -> Result<Vec<Todo>> {
        let filter =
            build_filter_condition(start.as_ref(), end.as_ref(), done, &self.settings.schema);
        let pages = self.query_all(&self.settings.todo_database_id, &filter).await?;
        self.mapper.map_pages(&pages)
    }

    /// Create a todo. New todos always start incomplete.
    pub async fn create_todo(&self, todo: &TodoCreate) -> Result<Todo> {
        let properties = build_properties_for_todo(todo, true, &self.settings.schema);
        let body = json!({
            "parent": { "database_id": self.settings.todo_database_id },
            "properties": properties
        });

        let data = self.send(self.http.post(self.url("/pages")).json(&body)).await?;
        self.single_todo(&data, "create")
    }

    /// Overwrite the date of a todo with `start` and, when given, `end`.
    pub async fn change_todo_schedule(
        &self,
        page_id: &str,
        start: DateTime<FixedOffset>,
        end: Option<DateTime<FixedOffset>>,
    ) -> Result<Todo> {
        let properties = build_schedule_properties(&start, end.as_ref(), &self.settings.schema);
        self.update_page(page_id, properties, "reschedule").await
    }

    pub async fn complete_todo(&self, page_id: &str) -> Result<Todo> {
        let properties = build_complete_properties(&self.settings.schema);
        self.update_page(page_id, properties, "complete").await
    }

    async fn update_page(&self, page_id: &str, properties: Value, action: &str) -> Result<Todo> {
        let url = self.url(&format!("/pages/{}", page_id));
        let body = json!({ "properties": properties });
        let data = self.send(self.http.patch(url).json(&body)).await?;
        self.single_todo(&data, action)
    }

    fn single_todo(&self, data: &Value, action: &str) -> Result<Todo> {
        self.mapper
            .map_page(data)?
            .ok_or_else(|| NotionError::IncompleteRecord(action.to_string()))
    }

    /// Load every project's title into the relation cache. Returns the
    /// number of projects cached.
    pub async fn sync_projects(&self) -> Result<usize> {
        let database_id = &self.settings.project_database_id;
        let pages = self
            .query_all(database_id, &FilterCondition::default())
            .await?;

        let mut projects = HashMap::new();
        for page in &pages {
            let id = page.get("id").and_then(|v| v.as_str());
            let props = page.get("properties").unwrap_or(&Value::Null);
            if let (Some(id), Some(name)) = (id, parse_title(props, PROJECT_TITLE)) {
                projects.insert(id.to_string(), name);
            }
        }

        if projects.is_empty() {
            return Err(NotionError::NoProjects);
        }

        self.cache().bulk_set(database_id, &projects);
        Ok(projects.len())
    }
}
