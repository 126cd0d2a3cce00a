use thiserror::Error;

pub type Result<T> = std::result::Result<T, NotionError>;

/// Errors raised while talking to Notion or shaping its responses.
#[derive(Debug, Error)]
pub enum NotionError {
    /// Notion answered with a non-success status.
    #[error("Notion API error {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never produced a response (DNS, TLS, connection reset).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A header value (usually the API key) contains bytes HTTP forbids.
    #[error("invalid header value for {0}")]
    InvalidHeader(String),

    /// A page references a relation whose display name was never cached.
    #[error(
        "relation {relation_id} in database {database_id} is not cached; run sync_projects first"
    )]
    UncachedRelation {
        database_id: String,
        relation_id: String,
    },

    /// Notion returned a page without an id or a title.
    #[error("incomplete record returned by {0}")]
    IncompleteRecord(String),

    #[error("no projects found in the project database")]
    NoProjects,
}

impl NotionError {
    pub fn is_uncached_relation(&self) -> bool {
        matches!(self, NotionError::UncachedRelation { .. })
    }
}
