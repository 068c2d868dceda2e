use crate::db;
use chrono::Utc;
use reqwest::blocking::Client;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

/// 书籍没有类型时写入的默认值
pub const UNKNOWN_GENRE: &str = "Unknown";

#[derive(Error, Debug)]
pub enum ReadingLogError {
    #[error("阅读记录存储错误: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("阅读记录上报失败: {0}")]
    Http(#[from] reqwest::Error),
    #[error("阅读记录不可用: {0}")]
    Unavailable(String),
}

/// 阅读记录（只写一次）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingLogEntry {
    pub user_id: String,
    pub book_id: String,
    pub pages_read: u32,
    pub genre: String,
}

/// 阅读记录协作方
///
/// 调用是阻塞的；完成检测器负责把它放到后台执行
pub trait ReadingLog: Send + Sync {
    fn submit(&self, entry: &ReadingLogEntry) -> Result<(), ReadingLogError>;
}

/// SQLite 阅读记录
pub struct SqliteReadingLog {
    conn: Mutex<Connection>,
}

impl SqliteReadingLog {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ReadingLogError> {
        Ok(Self::from_connection(db::init_db(path)?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, ReadingLogError> {
        self.conn
            .lock()
            .map_err(|e| ReadingLogError::Unavailable(format!("锁定数据库连接失败: {}", e)))
    }

    /// 读取某用户的全部记录（按写入顺序）
    pub fn entries_for_user(&self, user_id: &str) -> Result<Vec<ReadingLogEntry>, ReadingLogError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, book_id, pages_read, genre FROM books_read WHERE user_id = ?1 ORDER BY id",
        )?;

        let entries = stmt
            .query_map([user_id], |row| {
                Ok(ReadingLogEntry {
                    user_id: row.get(0)?,
                    book_id: row.get(1)?,
                    pages_read: row.get(2)?,
                    genre: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}

impl ReadingLog for SqliteReadingLog {
    fn submit(&self, entry: &ReadingLogEntry) -> Result<(), ReadingLogError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO books_read (user_id, book_id, pages_read, genre, logged_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                entry.user_id,
                entry.book_id,
                entry.pages_read,
                entry.genre,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }
}

/// HTTP 阅读记录
///
/// 以 JSON 形式 POST 到远端表接口。内部使用阻塞客户端，
/// 不要在异步上下文中创建或销毁
pub struct HttpReadingLog {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpReadingLog {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ReadingLogError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: None,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

impl ReadingLog for HttpReadingLog {
    fn submit(&self, entry: &ReadingLogEntry) -> Result<(), ReadingLogError> {
        let mut request = self.client.post(&self.endpoint).json(entry);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        request.send()?.error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn sample_entry() -> ReadingLogEntry {
        ReadingLogEntry {
            user_id: "user-1".to_string(),
            book_id: "book-9".to_string(),
            pages_read: 12,
            genre: "Mystery".to_string(),
        }
    }

    #[test]
    fn test_entry_serialization() {
        let json = serde_json::to_value(sample_entry()).unwrap();
        assert_eq!(json["user_id"], "user-1");
        assert_eq!(json["pages_read"], 12);
    }

    #[test]
    fn test_sqlite_log_roundtrip() {
        let log = SqliteReadingLog::from_connection(db::init_memory_db().unwrap());
        log.submit(&sample_entry()).unwrap();

        let entries = log.entries_for_user("user-1").unwrap();
        assert_eq!(entries, vec![sample_entry()]);
        assert!(log.entries_for_user("nobody").unwrap().is_empty());
    }

    #[test]
    fn test_http_log_posts_json() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/rest/v1/books_read")
                .header("authorization", "Bearer secret")
                .json_body(serde_json::json!({
                    "user_id": "user-1",
                    "book_id": "book-9",
                    "pages_read": 12,
                    "genre": "Mystery"
                }));
            then.status(201);
        });

        let log = HttpReadingLog::new(server.url("/rest/v1/books_read"), Duration::from_secs(5))
            .unwrap()
            .with_api_key("secret");
        log.submit(&sample_entry()).unwrap();

        mock.assert();
    }

    #[test]
    fn test_http_log_surfaces_server_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/log");
            then.status(500);
        });

        let log = HttpReadingLog::new(server.url("/log"), Duration::from_secs(5)).unwrap();
        let err = log.submit(&sample_entry()).unwrap_err();
        assert!(matches!(err, ReadingLogError::Http(_)));
    }
}
