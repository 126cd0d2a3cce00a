//! Todo-list tools backed by a Notion database.
//!
//! A host (usually an MCP server loop) builds [`Settings`], hands them to
//! [`TodoTools::from_settings`], publishes [`TodoTools::tool_definitions`] and
//! forwards every call to [`TodoTools::call_tool`].

pub mod config;
pub mod core;
pub mod logging;
pub mod tools;

pub use crate::config::settings::{load_settings, PropertySchema, Settings};
pub use crate::core::api::NotionClient;
pub use crate::core::cache::RelationCache;
pub use crate::core::error::NotionError;
pub use crate::core::model::{ProjectRef, Relation, Todo, TodoCreate};
pub use crate::tools::{TextContent, TodoTools, ToolResponse};
