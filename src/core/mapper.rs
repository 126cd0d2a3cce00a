use chrono_tz::Tz;
use serde_json::Value;
use std::sync::Arc;

use super::cache::RelationCache;
use super::error::Result;
use super::model::Todo;
use super::parsers::{
    checkbox_value, parse_date, parse_project, parse_select, parse_timestamp, parse_title,
};
use crate::config::settings::PropertySchema;

/// Builds [`Todo`]s from raw Notion page objects.
#[derive(Clone)]
pub struct TodoMapper {
    cache: Arc<RelationCache>,
    schema: PropertySchema,
    project_database_id: String,
    tz: Tz,
}

fn first_present<T>(candidates: &[String], read: impl Fn(&str) -> Option<T>) -> Option<T> {
    candidates.iter().find_map(|name| read(name.as_str()))
}

impl TodoMapper {
    pub fn new(
        cache: Arc<RelationCache>,
        schema: PropertySchema,
        project_database_id: impl Into<String>,
        tz: Tz,
    ) -> Self {
        Self {
            cache,
            schema,
            project_database_id: project_database_id.into(),
            tz,
        }
    }

    pub fn cache(&self) -> &RelationCache {
        &self.cache
    }

    /// `Ok(None)` for pages without an id or title. Errors only when a
    /// project relation is not in the cache.
    pub fn map_page(&self, page: &Value) -> Result<Option<Todo>> {
        let props = page.get("properties").unwrap_or(&Value::Null);

        let id = page.get("id").and_then(|v| v.as_str()).filter(|s| !s.is_empty());
        let name = first_present(&self.schema.title, |n| parse_title(props, n));
        let (Some(id), Some(name)) = (id, name) else {
            tracing::debug!(id = ?page.get("id"), "skipping page without id or title");
            return Ok(None);
        };

        let done = first_present(&self.schema.done, |n| checkbox_value(props, n)).unwrap_or(false);
        let date = first_present(&self.schema.date, |n| parse_date(props, n, &self.tz));
        let priority = first_present(&self.schema.priority, |n| parse_select(props, n));
        let repeat = first_present(&self.schema.repeat, |n| parse_select(props, n));

        let mut project = None;
        for candidate in &self.schema.project {
            project = parse_project(&self.cache, props, candidate, &self.project_database_id)?;
            if project.is_some() {
                break;
            }
        }

        let created = page
            .get("created_time")
            .and_then(|v| v.as_str())
            .and_then(|s| parse_timestamp(s, &self.tz));

        Ok(Some(Todo {
            id: id.to_string(),
            name,
            date,
            priority,
            project,
            repeat,
            created,
            done,
        }))
    }

    /// Map query result pages, dropping incomplete ones.
    pub fn map_pages(&self, pages: &[Value]) -> Result<Vec<Todo>> {
        let mut todos = Vec::with_capacity(pages.len());
        for page in pages {
            if let Some(todo) = self.map_page(page)? {
                todos.push(todo);
            }
        }
        Ok(todos)
    }
}
