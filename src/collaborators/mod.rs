//! 外部协作方接口：书籍存储、身份、阅读记录、滚动宿主

use crate::parser::{detect_legacy_format, ContentFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

pub mod reading_log;

pub use reading_log::{
    HttpReadingLog, ReadingLog, ReadingLogEntry, ReadingLogError, SqliteReadingLog,
    UNKNOWN_GENRE,
};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("书籍存储不可用: {0}")]
    Unavailable(String),
}

/// 书籍（只读）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub content: String,
    pub content_format: ContentFormat,
    pub genre: Option<String>,
    /// 作者提供的字数估计，用于计算阅读页数
    pub word_estimate: Option<usize>,
}

impl Book {
    pub fn new(id: impl Into<String>, content: impl Into<String>, content_format: ContentFormat) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            content_format,
            genre: None,
            word_estimate: None,
        }
    }

    /// 迁移没有格式标签的旧书籍，只在导入时推断一次
    pub fn from_legacy(id: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let content_format = detect_legacy_format(&content);
        let book = Self::new(id, content, content_format);
        tracing::info!(
            book_id = %book.id,
            format = content_format.as_str(),
            "legacy book migrated with sniffed content format"
        );
        book
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_word_estimate(mut self, words: usize) -> Self {
        self.word_estimate = Some(words);
        self
    }
}

/// 书籍存储
pub trait BookSource {
    /// 按 ID 获取书籍；不存在时返回 `Ok(None)`
    fn fetch(&self, id: &str) -> Result<Option<Book>, SourceError>;
}

/// 内存书籍存储
#[derive(Default)]
pub struct MemoryBookSource {
    books: HashMap<String, Book>,
}

impl MemoryBookSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, book: Book) {
        self.books.insert(book.id.clone(), book);
    }
}

impl BookSource for MemoryBookSource {
    fn fetch(&self, id: &str) -> Result<Option<Book>, SourceError> {
        Ok(self.books.get(id).cloned())
    }
}

/// 身份提供方，匿名阅读时返回 None
pub trait IdentityProvider: Send + Sync {
    fn current_user_id(&self) -> Option<String>;
}

/// 固定身份
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(pub Option<String>);

impl StaticIdentity {
    pub fn user(id: impl Into<String>) -> Self {
        Self(Some(id.into()))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user_id(&self) -> Option<String> {
        self.0.clone()
    }
}

/// 滚动监听句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// 滚动宿主
///
/// 宿主在监听期间把视口滚动事件转交给会话
pub trait ScrollHost: Send + Sync {
    fn attach(&self) -> ListenerId;
    fn detach(&self, id: ListenerId);
}

/// 记录监听注册情况的宿主，用于测试与无界面运行
#[derive(Default)]
pub struct RecordingScrollHost {
    state: Mutex<(u64, Vec<ListenerId>)>,
}

impl RecordingScrollHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前已注册的监听数量
    pub fn active_listeners(&self) -> usize {
        self.state.lock().map(|state| state.1.len()).unwrap_or(0)
    }
}

impl ScrollHost for RecordingScrollHost {
    fn attach(&self) -> ListenerId {
        match self.state.lock() {
            Ok(mut state) => {
                state.0 += 1;
                let id = ListenerId(state.0);
                state.1.push(id);
                id
            }
            Err(_) => ListenerId(0),
        }
    }

    fn detach(&self, id: ListenerId) {
        if let Ok(mut state) = self.state.lock() {
            state.1.retain(|active| *active != id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_book_source() {
        let mut source = MemoryBookSource::new();
        source.insert(Book::new("b1", "text", ContentFormat::Markdown).with_genre("Fantasy"));

        let book = source.fetch("b1").unwrap().unwrap();
        assert_eq!(book.genre.as_deref(), Some("Fantasy"));
        assert!(source.fetch("missing").unwrap().is_none());
    }

    #[test]
    fn test_legacy_book_sniffs_format_once() {
        let book = Book::from_legacy("old", "<p>Once upon a time</p>");
        assert_eq!(book.content_format, ContentFormat::RichText);

        let book = Book::from_legacy("old-md", "# Title\n\nBody");
        assert_eq!(book.content_format, ContentFormat::Markdown);
    }

    #[test]
    fn test_book_serialization() {
        let book = Book::new("b2", "x", ContentFormat::RichText).with_word_estimate(1200);
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["content_format"], "richtext");
        assert_eq!(json["word_estimate"], 1200);
    }

    #[test]
    fn test_static_identity() {
        assert_eq!(StaticIdentity::user("u1").current_user_id().as_deref(), Some("u1"));
        assert!(StaticIdentity::anonymous().current_user_id().is_none());
    }

    #[test]
    fn test_recording_scroll_host() {
        let host = RecordingScrollHost::new();
        let a = host.attach();
        let b = host.attach();
        assert_ne!(a, b);
        assert_eq!(host.active_listeners(), 2);

        host.detach(a);
        host.detach(a);
        assert_eq!(host.active_listeners(), 1);
    }
}
