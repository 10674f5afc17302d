//! SQLite record store for chat messages, image uploads and query/response pairs.
//!
//! Every operation opens its own connection, runs its statement(s), commits and
//! closes. There is no pool; callers are assumed to be a single process.

use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};

use crate::error::PictalkError;
use crate::models::{ChatMessage, ImageUpload, MessageType, RecentQuery, Statistics};

pub const DEFAULT_HISTORY_LIMIT: u32 = 50;
pub const DEFAULT_RECENT_QUERIES_LIMIT: u32 = 10;
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS chat_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        session_id TEXT NOT NULL,
        message_type TEXT NOT NULL,
        content TEXT NOT NULL,
        image_path TEXT,
        timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS image_uploads (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        filename TEXT NOT NULL,
        original_filename TEXT NOT NULL,
        file_path TEXT NOT NULL,
        file_size INTEGER,
        upload_timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS queries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        image_id INTEGER,
        query_text TEXT NOT NULL,
        response_text TEXT,
        query_timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (image_id) REFERENCES image_uploads (id)
    )
    "#,
];

#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
    options: SqliteConnectOptions,
}

impl Database {
    /// Open (creating if needed) the database file and make sure the schema exists.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, PictalkError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // The image_id reference is declarative only, so FK enforcement stays off.
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .foreign_keys(false);

        let db = Self { path, options };
        db.init_db().await?;
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn connect(&self) -> Result<SqliteConnection, sqlx::Error> {
        self.options.connect().await
    }

    async fn init_db(&self) -> Result<(), PictalkError> {
        let mut conn = self.connect().await?;
        for statement in SCHEMA {
            sqlx::query(statement).execute(&mut conn).await?;
        }
        conn.close().await?;
        tracing::debug!("Database schema ready at {}", self.path.display());
        Ok(())
    }

    pub async fn health_check(&self) -> Result<String, PictalkError> {
        let mut conn = self.connect().await?;
        let version: String = sqlx::query_scalar("SELECT sqlite_version()")
            .fetch_one(&mut conn)
            .await?;
        conn.close().await?;
        Ok(version)
    }

    pub async fn add_chat_message(
        &self,
        session_id: &str,
        message_type: MessageType,
        content: &str,
        image_path: Option<&str>,
    ) -> Result<i64, PictalkError> {
        let mut conn = self.connect().await?;
        let id = sqlx::query(
            r#"
            INSERT INTO chat_history (session_id, message_type, content, image_path)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(session_id)
        .bind(message_type)
        .bind(content)
        .bind(image_path)
        .execute(&mut conn)
        .await?
        .last_insert_rowid();
        conn.close().await?;
        Ok(id)
    }

    /// Most recent messages of a session, newest first.
    pub async fn get_chat_history(
        &self,
        session_id: &str,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, PictalkError> {
        let mut conn = self.connect().await?;
        let rows = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT id, session_id, message_type, content, image_path, timestamp
            FROM chat_history
            WHERE session_id = ?
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(session_id)
        .bind(i64::from(limit))
        .fetch_all(&mut conn)
        .await?;
        conn.close().await?;
        Ok(rows)
    }

    pub async fn add_image_upload(
        &self,
        filename: &str,
        original_filename: &str,
        file_path: &str,
        file_size: i64,
    ) -> Result<i64, PictalkError> {
        let mut conn = self.connect().await?;
        let id = sqlx::query(
            r#"
            INSERT INTO image_uploads (filename, original_filename, file_path, file_size)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(filename)
        .bind(original_filename)
        .bind(file_path)
        .bind(file_size)
        .execute(&mut conn)
        .await?
        .last_insert_rowid();
        conn.close().await?;
        Ok(id)
    }

    pub async fn get_image_upload(&self, id: i64) -> Result<Option<ImageUpload>, PictalkError> {
        let mut conn = self.connect().await?;
        let row = sqlx::query_as::<_, ImageUpload>(
            r#"
            SELECT id, filename, original_filename, file_path, file_size, upload_timestamp
            FROM image_uploads
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut conn)
        .await?;
        conn.close().await?;
        Ok(row)
    }

    pub async fn add_query(
        &self,
        image_id: Option<i64>,
        query_text: &str,
        response_text: &str,
    ) -> Result<i64, PictalkError> {
        let mut conn = self.connect().await?;
        let id = sqlx::query(
            r#"
            INSERT INTO queries (image_id, query_text, response_text)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(image_id)
        .bind(query_text)
        .bind(response_text)
        .execute(&mut conn)
        .await?
        .last_insert_rowid();
        conn.close().await?;
        Ok(id)
    }

    /// Latest queries with the filenames of their uploads, newest first.
    pub async fn get_recent_queries(&self, limit: u32) -> Result<Vec<RecentQuery>, PictalkError> {
        let mut conn = self.connect().await?;
        let rows = sqlx::query_as::<_, RecentQuery>(
            r#"
            SELECT q.id, q.image_id, q.query_text, q.response_text, q.query_timestamp,
                   i.filename, i.original_filename
            FROM queries q
            LEFT JOIN image_uploads i ON q.image_id = i.id
            ORDER BY q.query_timestamp DESC, q.id DESC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&mut conn)
        .await?;
        conn.close().await?;
        Ok(rows)
    }

    /// Retention sweep over chat_history and queries. image_uploads is never touched.
    ///
    /// Returns the number of chat_history rows removed; deleted queries are
    /// logged but not counted.
    pub async fn clear_old_data(&self, days: u32) -> Result<u64, PictalkError> {
        let days = i64::from(days);
        let mut conn = self.connect().await?;
        let mut tx = conn.begin().await?;

        let chat_deleted = sqlx::query(
            "DELETE FROM chat_history WHERE timestamp < datetime('now', '-' || ? || ' days')",
        )
        .bind(days)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let queries_deleted = sqlx::query(
            "DELETE FROM queries WHERE query_timestamp < datetime('now', '-' || ? || ' days')",
        )
        .bind(days)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        conn.close().await?;

        tracing::info!(
            "Retention sweep ({} days): {} chat messages, {} queries deleted",
            days,
            chat_deleted,
            queries_deleted
        );

        Ok(chat_deleted)
    }

    pub async fn get_statistics(&self) -> Result<Statistics, PictalkError> {
        let mut conn = self.connect().await?;

        let total_messages: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chat_history")
            .fetch_one(&mut conn)
            .await?;
        let total_images: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM image_uploads")
            .fetch_one(&mut conn)
            .await?;
        let total_queries: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM queries")
            .fetch_one(&mut conn)
            .await?;
        let today_messages: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM chat_history WHERE DATE(timestamp) = DATE('now')",
        )
        .fetch_one(&mut conn)
        .await?;

        conn.close().await?;

        Ok(Statistics {
            total_messages,
            total_images,
            total_queries,
            today_messages,
        })
    }
}
