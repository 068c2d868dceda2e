//! 阅读会话引擎
//!
//! 书籍内容 → 分页（带缓存）→ 布局状态机 → 阅读进度 → 完成上报

pub mod collaborators;
pub mod completion;
pub mod config;
pub mod db;
pub mod layout;
pub mod pagination;
pub mod parser;
pub mod preferences;
pub mod progress;
pub mod session;

pub use collaborators::{
    Book, BookSource, HttpReadingLog, IdentityProvider, MemoryBookSource, ReadingLog,
    ReadingLogEntry, ScrollHost, SqliteReadingLog, StaticIdentity,
};
pub use completion::{CompletionDetector, CompletionDispatcher, CompletionStatus};
pub use config::{ConfigError, PreferencePolicy, ReaderConfig};
pub use layout::{Direction, LayoutController, LayoutMode, VisibleWindow};
pub use pagination::{chunk, chunk_with_budget, ChunkCache, Page, WORDS_PER_PAGE};
pub use parser::{split_blocks, Block, ContentFormat};
pub use preferences::{
    MemoryPreferenceStore, PreferencePatch, PreferenceStore, Preferences, SqlitePreferenceStore,
};
pub use progress::{ProgressTracker, ScrollMetrics};
pub use session::{KeyCommand, OpenOutcome, ReaderSession, SessionDeps, SessionError, SessionSnapshot};
