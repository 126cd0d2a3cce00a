use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";
pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";

/// Ordered candidate property names for each logical todo field.
///
/// Databases created at different times name the same column differently
/// (`Name` vs `Task`, `Checkbox` vs `Done`). Reads try each candidate in
/// order and take the first one present on the page; writes use the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertySchema {
    pub title: Vec<String>,
    pub done: Vec<String>,
    pub date: Vec<String>,
    pub priority: Vec<String>,
    pub project: Vec<String>,
    pub repeat: Vec<String>,
}

impl Default for PropertySchema {
    fn default() -> Self {
        Self {
            title: names(&["Task", "Name"]),
            done: names(&["Checkbox", "Done"]),
            date: names(&["Date"]),
            priority: names(&["Priority"]),
            project: names(&["Project"]),
            repeat: names(&["Repeat"]),
        }
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Property name used when writing a field. Falls back to an empty name for
/// a misconfigured (empty) candidate list, which Notion rejects loudly.
pub fn write_name(candidates: &[String]) -> &str {
    candidates.first().map(String::as_str).unwrap_or("")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub todo_database_id: String,
    #[serde(default)]
    pub project_database_id: String,
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    #[serde(default = "default_notion_version")]
    pub notion_version: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,
    #[serde(default)]
    pub schema: PropertySchema,
}

fn default_timezone() -> Tz {
    Tz::UTC
}

fn default_notion_version() -> String {
    DEFAULT_NOTION_VERSION.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_cache_file() -> PathBuf {
    config_dir().join("relation-cache.json")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            todo_database_id: String::new(),
            project_database_id: String::new(),
            timezone: default_timezone(),
            notion_version: default_notion_version(),
            base_url: default_base_url(),
            cache_file: default_cache_file(),
            schema: PropertySchema::default(),
        }
    }
}

impl Settings {
    /// Apply environment overrides. `lookup` is `std::env::var(..).ok()` in
    /// production and a map lookup in tests.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty("NOTION_API_KEY") {
            self.api_key = v;
        }
        if let Some(v) = non_empty("NOTION_TODO_DATABASE_ID") {
            self.todo_database_id = v;
        }
        if let Some(v) = non_empty("NOTION_PROJECT_DATABASE_ID") {
            self.project_database_id = v;
        }
        if let Some(v) = non_empty("TZ") {
            self.timezone = v
                .trim()
                .parse::<Tz>()
                .map_err(|e| anyhow!("Invalid TZ '{}': {}", v, e))?;
        }
        if let Some(v) = non_empty("NOTION_VERSION") {
            self.notion_version = v;
        }
        if let Some(v) = non_empty("NOTION_BASE_URL") {
            self.base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = non_empty("NOTION_TODO_CACHE_FILE") {
            self.cache_file = PathBuf::from(v);
        }
        Ok(())
    }

    /// Check that the credential and both database ids are set.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.api_key.trim().is_empty() {
            missing.push("apiKey (NOTION_API_KEY)");
        }
        if self.todo_database_id.trim().is_empty() {
            missing.push("todoDatabaseId (NOTION_TODO_DATABASE_ID)");
        }
        if self.project_database_id.trim().is_empty() {
            missing.push("projectDatabaseId (NOTION_PROJECT_DATABASE_ID)");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("Missing required settings: {}", missing.join(", ")))
        }
    }
}

/// Returns the path to ~/.notion-todo/
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".notion-todo")
}

/// Returns the path to ~/.notion-todo/config.json
pub fn config_file() -> PathBuf {
    config_dir().join("config.json")
}

/// Load settings from ~/.notion-todo/config.json (when present), then the
/// process environment, then validate.
pub fn load_settings() -> Result<Settings> {
    let mut settings = read_settings_file(&config_file())?;
    settings.apply_env(|key| std::env::var(key).ok())?;
    settings.validate()?;
    Ok(settings)
}

/// Read settings from `path`; a missing file yields the defaults.
pub fn read_settings_file(path: &std::path::Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let settings = serde_json::from_str::<Settings>(&raw)
        .with_context(|| format!("Invalid settings in {}", path.display()))?;
    Ok(settings)
}
