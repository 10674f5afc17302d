pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod responder;
pub mod utils;

pub use config::{PictalkConfig, Profile};
pub use db::Database;
pub use error::PictalkError;
pub use models::{ChatMessage, ImageUpload, MessageType, QueryRecord, RecentQuery, Statistics};
