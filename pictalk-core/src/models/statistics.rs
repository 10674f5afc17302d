use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_messages: i64,
    pub total_images: i64,
    pub total_queries: i64,
    pub today_messages: i64,
}
