//! Readers for Notion page properties.
//!
//! Every function takes the page's `properties` object and a property name.
//! Missing or mistyped properties read as absent; only relation resolution
//! can fail.

use chrono::{DateTime, NaiveDate, TimeZone};
use chrono_tz::Tz;
use serde_json::Value;

use super::cache::RelationCache;
use super::error::{NotionError, Result};
use super::model::{ProjectRef, Relation};

fn property<'a>(props: &'a Value, name: &str) -> Option<&'a Value> {
    props.get(name).filter(|v| !v.is_null())
}

/// Text content of the first run of a title property.
pub fn parse_title(props: &Value, name: &str) -> Option<String> {
    property(props, name)?
        .get("title")?
        .as_array()?
        .first()?
        .get("text")?
        .get("content")?
        .as_str()
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// The checkbox value, or `None` when the page has no such checkbox.
pub fn checkbox_value(props: &Value, name: &str) -> Option<bool> {
    property(props, name)?.get("checkbox")?.as_bool()
}

pub fn parse_checkbox(props: &Value, name: &str) -> bool {
    checkbox_value(props, name).unwrap_or(false)
}

/// Start of a date property in the display timezone.
pub fn parse_date(props: &Value, name: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let start = property(props, name)?.get("date")?.get("start")?.as_str()?;
    parse_timestamp(start, tz)
}

/// Parse an ISO-8601 instant (`Z` or numeric offset) or a bare date, and
/// convert it to `tz`. Bare dates mean midnight in `tz`. Anything else is
/// logged and dropped.
pub fn parse_timestamp(text: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(tz));
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .and_then(|midnight| tz.from_local_datetime(&midnight).earliest());
    }
    tracing::debug!(value = text, "ignoring unparseable timestamp");
    None
}

/// Label of the selected option of a select property.
pub fn parse_select(props: &Value, name: &str) -> Option<String> {
    property(props, name)?
        .get("select")?
        .get("name")?
        .as_str()
        .map(String::from)
}

/// Related page ids of a relation property, in page order.
pub fn relation_ids(props: &Value, name: &str) -> Vec<String> {
    property(props, name)
        .and_then(|p| p.get("relation"))
        .and_then(|r| r.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("id").and_then(|id| id.as_str()))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Resolve every related page to its cached name. Fails on the first id the
/// cache does not know.
pub fn parse_relations(
    cache: &RelationCache,
    props: &Value,
    name: &str,
    database_id: &str,
) -> Result<Vec<Relation>> {
    relation_ids(props, name)
        .into_iter()
        .map(|id| match cache.get_name(database_id, &id) {
            Some(resolved) => Ok(Relation { id, name: resolved }),
            None => Err(NotionError::UncachedRelation {
                database_id: database_id.to_string(),
                relation_id: id,
            }),
        })
        .collect()
}

/// Read a project column in whichever shape the database uses.
pub fn parse_project(
    cache: &RelationCache,
    props: &Value,
    name: &str,
    database_id: &str,
) -> Result<Option<ProjectRef>> {
    let Some(prop) = property(props, name) else {
        return Ok(None);
    };
    if prop.get("relation").is_some() {
        let relations = parse_relations(cache, props, name, database_id)?;
        if relations.is_empty() {
            return Ok(None);
        }
        return Ok(Some(ProjectRef::Relations(relations)));
    }
    Ok(parse_select(props, name).map(ProjectRef::Label))
}
