use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct QueryRecord {
    pub id: i64,
    pub image_id: Option<i64>,
    pub query_text: String,
    pub response_text: Option<String>,
    pub query_timestamp: NaiveDateTime,
}

/// A query row joined with the upload it refers to. The image columns are
/// `None` when the query had no image or the upload row is gone.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecentQuery {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub query: QueryRecord,
    pub filename: Option<String>,
    pub original_filename: Option<String>,
}
