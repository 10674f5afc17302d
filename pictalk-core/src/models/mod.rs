pub mod chat_message;
pub mod image_upload;
pub mod query;
pub mod statistics;

pub use chat_message::{ChatMessage, MessageType};
pub use image_upload::ImageUpload;
pub use query::{QueryRecord, RecentQuery};
pub use statistics::Statistics;
