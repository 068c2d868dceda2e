//! 阅读会话：一次打开的书籍
//!
//! 会话持有分页结果、布局状态、进度与完成检测器；
//! 字号和布局模式通过偏好设置存储跨会话保留，页位置与进度不持久化

use crate::collaborators::{BookSource, IdentityProvider, ReadingLog, ScrollHost, SourceError};
use crate::completion::{CompletionDetector, CompletionDispatcher, CompletionSubject};
use crate::config::{ConfigError, ReaderConfig};
use crate::layout::{Direction, LayoutController, LayoutMode, VisibleWindow};
use crate::pagination::{ChunkCache, Page};
use crate::preferences::{PreferencePatch, PreferenceStore, Preferences};
use crate::progress::{ProgressTracker, ScrollMetrics};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub mod input;
pub mod scroll;


pub use input::KeyCommand;
pub use scroll::ScrollSubscription;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("书籍获取失败: {0}")]
    Source(#[from] SourceError),
    #[error("配置无效: {0}")]
    Config(#[from] ConfigError),
}

/// 会话依赖
#[derive(Clone)]
pub struct SessionDeps {
    pub preferences: Arc<dyn PreferenceStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub reading_log: Arc<dyn ReadingLog>,
    pub dispatcher: CompletionDispatcher,
}

/// 打开书籍的结果
pub enum OpenOutcome {
    NotFound,
    /// 书籍存在但没有可分页的内容
    NotReady,
    Ready(Box<ReaderSession>),
}

impl OpenOutcome {
    pub fn into_session(self) -> Option<ReaderSession> {
        match self {
            OpenOutcome::Ready(session) => Some(*session),
            OpenOutcome::NotFound | OpenOutcome::NotReady => None,
        }
    }
}

/// 会话状态快照，供宿主渲染
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub book_id: String,
    pub total_pages: usize,
    pub page_index: usize,
    pub layout_mode: LayoutMode,
    pub font_size_px: u32,
    pub progress: f64,
    pub completed: bool,
    pub page_label: Option<String>,
    pub can_go_back: bool,
    pub can_go_forward: bool,
}

pub struct ReaderSession {
    book_id: String,
    pages: Arc<[Page]>,
    layout: LayoutController,
    progress: ProgressTracker,
    completion: CompletionDetector,
    preferences: Arc<dyn PreferenceStore>,
    font_size_px: u32,
    scroll: Option<ScrollSubscription>,
}

impl ReaderSession {
    /// 打开书籍
    ///
    /// 页位置、进度和完成标记都从零开始；字号与布局模式取自偏好设置，
    /// 读取失败时使用默认值
    pub fn open(
        source: &dyn BookSource,
        book_id: &str,
        cache: &mut ChunkCache,
        deps: SessionDeps,
        config: &ReaderConfig,
    ) -> Result<OpenOutcome, SessionError> {
        config.validate()?;
        if *deps.preferences.policy() != config.preferences {
            return Err(ConfigError::Invalid(
                "偏好设置存储的取值范围与配置不一致".to_string(),
            )
            .into());
        }

        let Some(book) = source.fetch(book_id)? else {
            info!(book_id, "book not found");
            return Ok(OpenOutcome::NotFound);
        };

        let pages = cache.pages_with_budget(&book.content, book.content_format, config.words_per_page);
        if pages.is_empty() {
            info!(book_id, "book has no readable content yet");
            return Ok(OpenOutcome::NotReady);
        }

        let prefs = deps.preferences.load().unwrap_or_else(|e| {
            warn!(error = %e, "failed to load preferences, using defaults");
            Preferences::defaults(&config.preferences)
        });

        let layout = LayoutController::new(prefs.layout_mode, pages.len());
        let mut progress = ProgressTracker::new();
        progress.update_from_layout(&layout);

        let mut completion = CompletionDetector::new(
            CompletionSubject::from_book(&book, config.words_per_page),
            deps.identity,
            deps.reading_log,
            deps.dispatcher,
            config.scroll_completion_threshold,
        );
        // 页数不足一屏的书在打开时即读完
        completion.observe_layout(&layout);

        info!(
            book_id = %book.id,
            pages = pages.len(),
            layout = prefs.layout_mode.as_str(),
            font_size_px = prefs.font_size_px,
            "reader session opened"
        );

        Ok(OpenOutcome::Ready(Box::new(Self {
            book_id: book.id,
            pages,
            layout,
            progress,
            completion,
            preferences: deps.preferences,
            font_size_px: prefs.font_size_px,
            scroll: None,
        })))
    }

    /// 开始监听滚动，重复调用不会重复注册
    ///
    /// # 返回
    /// 本次是否新注册了监听
    pub fn start_session(&mut self, host: Arc<dyn ScrollHost>) -> bool {
        if self.scroll.is_some() {
            return false;
        }
        self.scroll = Some(ScrollSubscription::attach(host));
        true
    }

    /// 结束会话，注销滚动监听
    ///
    /// # 返回
    /// 尚未被取走的后台上报任务
    pub fn end_session(&mut self) -> Option<JoinHandle<()>> {
        if let Some(mut subscription) = self.scroll.take() {
            subscription.detach();
        }
        debug!(book_id = %self.book_id, "reader session ended");
        self.completion.take_pending_report()
    }

    pub fn is_listening(&self) -> bool {
        self.scroll.is_some()
    }

    /// 翻页，越界时夹紧
    pub fn advance(&mut self, direction: Direction) -> bool {
        let changed = self.layout.advance(direction);
        if changed {
            self.after_navigation();
        }
        changed
    }

    /// 切换布局模式并持久化
    pub fn switch_layout(&mut self, mode: LayoutMode) -> bool {
        let changed = self.layout.switch_mode(mode);
        if let Err(e) = self.preferences.save(PreferencePatch::layout(mode)) {
            warn!(error = %e, layout = mode.as_str(), "failed to persist layout mode");
        }
        if changed {
            self.after_navigation();
        }
        changed
    }

    fn after_navigation(&mut self) {
        self.progress.update_from_layout(&self.layout);
        self.completion.observe_layout(&self.layout);
    }

    /// 处理按键
    ///
    /// # 返回
    /// 按键是否有绑定
    pub fn handle_key(&mut self, key: &str) -> bool {
        match KeyCommand::from_key(key) {
            Some(KeyCommand::Advance(direction)) => {
                self.advance(direction);
                true
            }
            Some(KeyCommand::AdjustFont(steps)) => {
                self.adjust_font(steps);
                true
            }
            None => false,
        }
    }

    /// 滚动事件，仅滚动模式且监听中才生效
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> f64 {
        if self.scroll.is_none() || self.layout.mode() != LayoutMode::Scroll {
            return self.progress.percent();
        }

        let percent = self.progress.update_from_scroll(metrics);
        self.completion.observe_scroll(percent, self.pages.len());
        percent
    }

    /// 调整字号，保存失败时仍在本会话内生效
    pub fn adjust_font(&mut self, steps: i32) -> u32 {
        self.font_size_px = match self.preferences.adjust_font_size(steps) {
            Ok(prefs) => prefs.font_size_px,
            Err(e) => {
                warn!(error = %e, "failed to persist font size");
                let policy = self.preferences.policy();
                let delta = i64::from(steps) * i64::from(policy.font_step_px);
                let target = (i64::from(self.font_size_px) + delta).clamp(0, i64::from(u32::MAX));
                policy.clamp_font(target as u32)
            }
        };
        self.font_size_px
    }

    pub fn book_id(&self) -> &str {
        &self.book_id
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn layout(&self) -> &LayoutController {
        &self.layout
    }

    pub fn mode(&self) -> LayoutMode {
        self.layout.mode()
    }

    pub fn font_size_px(&self) -> u32 {
        self.font_size_px
    }

    pub fn progress(&self) -> f64 {
        self.progress.percent()
    }

    pub fn completed(&self) -> bool {
        self.completion.completed()
    }

    /// 当前可见的页
    pub fn visible_pages(&self) -> Vec<&Page> {
        match self.layout.visible_window() {
            VisibleWindow::All { .. } => self.pages.iter().collect(),
            window => window
                .slots()
                .into_iter()
                .flatten()
                .filter_map(|index| self.pages.get(index))
                .collect(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            book_id: self.book_id.clone(),
            total_pages: self.pages.len(),
            page_index: self.layout.page_index(),
            layout_mode: self.layout.mode(),
            font_size_px: self.font_size_px,
            progress: self.progress.percent(),
            completed: self.completion.completed(),
            page_label: self.layout.page_label(),
            can_go_back: self.layout.can_go_back(),
            can_go_forward: self.layout.can_go_forward(),
        }
    }
}
