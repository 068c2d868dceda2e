use crate::collaborators::{Book, IdentityProvider, ReadingLog, ReadingLogEntry, UNKNOWN_GENRE};
use crate::layout::{LayoutController, LayoutMode};
use crate::parser::count_words;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// 是否已读到末尾
///
/// 单页模式看到最后一页、双页模式最后一页进入可见窗口即视为读完；
/// 滚动模式不依赖页指针，由滚动进度判定
pub fn is_finished(mode: LayoutMode, index: usize, total_pages: usize) -> bool {
    if total_pages == 0 {
        return false;
    }
    match mode {
        LayoutMode::Single => index + 1 >= total_pages,
        LayoutMode::Double => index + 2 >= total_pages,
        LayoutMode::Scroll => false,
    }
}

/// 估算阅读页数
///
/// 优先使用作者提供的字数估计，否则按全文词数计算，四舍五入
pub fn estimate_pages_read(word_estimate: Option<usize>, content: &str, words_per_page: usize) -> u32 {
    let words = word_estimate.unwrap_or_else(|| count_words(content));
    let pages = (words as f64 / words_per_page.max(1) as f64).round();
    pages.min(f64::from(u32::MAX)) as u32
}

/// 完成记录的对象，打开书籍时一次算好
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSubject {
    pub book_id: String,
    pub genre: String,
    pub pages_read: u32,
}

impl CompletionSubject {
    pub fn from_book(book: &Book, words_per_page: usize) -> Self {
        Self {
            book_id: book.id.clone(),
            genre: book
                .genre
                .clone()
                .filter(|genre| !genre.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_GENRE.to_string()),
            pages_read: estimate_pages_read(book.word_estimate, &book.content, words_per_page),
        }
    }
}

/// 上报方式
#[derive(Debug, Clone)]
pub enum CompletionDispatcher {
    /// 在当前线程同步提交，失败只记日志
    Inline,
    /// 在 tokio 运行时后台提交，超时后放弃等待
    Runtime { handle: Handle, timeout: Duration },
}

/// 一次观察的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    NotFinished,
    /// 已读完但没有登录用户，跳过
    Anonymous,
    /// 本次观察触发了上报
    Reported,
    /// 本会话已经上报过
    AlreadyReported,
}

/// 完成检测器
///
/// 每个会话最多上报一次阅读记录
pub struct CompletionDetector {
    subject: CompletionSubject,
    identity: Arc<dyn IdentityProvider>,
    reading_log: Arc<dyn ReadingLog>,
    dispatcher: CompletionDispatcher,
    scroll_threshold: f64,
    completed: bool,
    pending: Option<JoinHandle<()>>,
}

impl CompletionDetector {
    pub fn new(
        subject: CompletionSubject,
        identity: Arc<dyn IdentityProvider>,
        reading_log: Arc<dyn ReadingLog>,
        dispatcher: CompletionDispatcher,
        scroll_threshold: f64,
    ) -> Self {
        Self {
            subject,
            identity,
            reading_log,
            dispatcher,
            scroll_threshold,
            completed: false,
            pending: None,
        }
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn subject(&self) -> &CompletionSubject {
        &self.subject
    }

    /// 翻页或切换布局后观察
    pub fn observe_layout(&mut self, layout: &LayoutController) -> CompletionStatus {
        let finished = match layout.current_index() {
            Some(index) => is_finished(layout.mode(), index, layout.total_pages()),
            None => false,
        };
        self.observe(finished)
    }

    /// 滚动事件后观察（仅滚动模式）
    pub fn observe_scroll(&mut self, progress: f64, total_pages: usize) -> CompletionStatus {
        let finished = total_pages > 0 && progress >= self.scroll_threshold;
        self.observe(finished)
    }

    fn observe(&mut self, finished: bool) -> CompletionStatus {
        if !finished {
            return CompletionStatus::NotFinished;
        }
        if self.completed {
            return CompletionStatus::AlreadyReported;
        }

        let Some(user_id) = self.identity.current_user_id() else {
            debug!(book_id = %self.subject.book_id, "book finished anonymously, skipping reading log");
            return CompletionStatus::Anonymous;
        };

        let entry = ReadingLogEntry {
            user_id,
            book_id: self.subject.book_id.clone(),
            pages_read: self.subject.pages_read,
            genre: self.subject.genre.clone(),
        };

        // 先置位，上报失败也不重试
        self.completed = true;
        self.dispatch(entry);
        CompletionStatus::Reported
    }

    fn dispatch(&mut self, entry: ReadingLogEntry) {
        match self.dispatcher {
            CompletionDispatcher::Inline => submit_logged(self.reading_log.as_ref(), &entry),
            CompletionDispatcher::Runtime {
                ref handle,
                timeout,
            } => {
                let reading_log = Arc::clone(&self.reading_log);
                let book_id = entry.book_id.clone();
                let task = handle.spawn(async move {
                    let job = tokio::task::spawn_blocking(move || {
                        submit_logged(reading_log.as_ref(), &entry)
                    });
                    match tokio::time::timeout(timeout, job).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => warn!(book_id = %book_id, error = %e, "reading log task panicked"),
                        Err(_) => warn!(
                            book_id = %book_id,
                            timeout_ms = timeout.as_millis() as u64,
                            "reading log submission timed out"
                        ),
                    }
                });
                self.pending = Some(task);
            }
        }
    }

    /// 取出后台上报任务，宿主可以等待它，也可以直接丢弃
    pub fn take_pending_report(&mut self) -> Option<JoinHandle<()>> {
        self.pending.take()
    }
}

fn submit_logged(reading_log: &dyn ReadingLog, entry: &ReadingLogEntry) {
    match reading_log.submit(entry) {
        Ok(()) => info!(
            book_id = %entry.book_id,
            pages_read = entry.pages_read,
            "book marked as read"
        ),
        Err(e) => warn!(book_id = %entry.book_id, error = %e, "failed to submit reading log"),
    }
}
