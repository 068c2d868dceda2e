use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// 布局模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    Single,
    Double,
    Scroll,
}

impl LayoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::Single => "single",
            LayoutMode::Double => "double",
            LayoutMode::Scroll => "scroll",
        }
    }

    /// 翻页步长；滚动模式没有离散指针
    pub fn step(&self) -> Option<usize> {
        match self {
            LayoutMode::Single => Some(1),
            LayoutMode::Double => Some(2),
            LayoutMode::Scroll => None,
        }
    }
}

impl Default for LayoutMode {
    fn default() -> Self {
        LayoutMode::Double
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(LayoutMode::Single),
            "double" => Ok(LayoutMode::Double),
            "scroll" => Ok(LayoutMode::Scroll),
            other => Err(format!("未知的布局模式: {}", other)),
        }
    }
}

/// 翻页方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Back,
}

/// 分页模式（单页/双页）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagedMode {
    Single,
    Double,
}

impl PagedMode {
    fn step(&self) -> usize {
        match self {
            PagedMode::Single => 1,
            PagedMode::Double => 2,
        }
    }

    fn as_layout(&self) -> LayoutMode {
        match self {
            PagedMode::Single => LayoutMode::Single,
            PagedMode::Double => LayoutMode::Double,
        }
    }
}

/// 布局状态
///
/// 只有分页模式持有当前页指针；滚动模式只记住切回分页时要恢复的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutState {
    Paged { mode: PagedMode, index: usize },
    Scroll { resume_index: usize },
}

/// 布局事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutEvent {
    Advance(Direction),
    SwitchMode(LayoutMode),
}

impl LayoutState {
    pub fn initial(mode: LayoutMode) -> Self {
        Self::at(mode, 0)
    }

    fn at(mode: LayoutMode, index: usize) -> Self {
        match mode {
            LayoutMode::Single => LayoutState::Paged {
                mode: PagedMode::Single,
                index,
            },
            LayoutMode::Double => LayoutState::Paged {
                mode: PagedMode::Double,
                index,
            },
            LayoutMode::Scroll => LayoutState::Scroll {
                resume_index: index,
            },
        }
    }

    pub fn mode(&self) -> LayoutMode {
        match self {
            LayoutState::Paged { mode, .. } => mode.as_layout(),
            LayoutState::Scroll { .. } => LayoutMode::Scroll,
        }
    }

    /// 当前页位置（滚动模式下为恢复位置）
    pub fn page_index(&self) -> usize {
        match *self {
            LayoutState::Paged { index, .. } => index,
            LayoutState::Scroll { resume_index } => resume_index,
        }
    }

    /// 状态转移函数
    ///
    /// # 参数
    /// - `event`: 布局事件
    /// - `total_pages`: 总页数
    ///
    /// # 返回
    /// 新状态。越界请求一律夹紧，不报错
    pub fn transition(self, event: LayoutEvent, total_pages: usize) -> LayoutState {
        match (self, event) {
            (LayoutState::Paged { mode, index }, LayoutEvent::Advance(direction)) => {
                let last = total_pages.saturating_sub(1);
                let index = match direction {
                    Direction::Forward => index.saturating_add(mode.step()).min(last),
                    Direction::Back => index.saturating_sub(mode.step()),
                };
                LayoutState::Paged { mode, index }
            }
            (LayoutState::Scroll { .. }, LayoutEvent::Advance(_)) => self,
            (state, LayoutEvent::SwitchMode(mode)) => LayoutState::at(mode, state.page_index()),
        }
    }
}

/// 可见窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibleWindow {
    /// 没有页可显示
    Empty,
    Single(usize),
    /// 第二栏越过末页时为 `None`，渲染为空白
    Double(usize, Option<usize>),
    /// 滚动模式：依次渲染全部页
    All { total: usize },
}

impl VisibleWindow {
    /// 各栏位对应的页序号
    pub fn slots(&self) -> Vec<Option<usize>> {
        match *self {
            VisibleWindow::Empty => Vec::new(),
            VisibleWindow::Single(index) => vec![Some(index)],
            VisibleWindow::Double(left, right) => vec![Some(left), right],
            VisibleWindow::All { total } => (0..total).map(Some).collect(),
        }
    }

    /// 实际有内容的栏位数
    pub fn filled(&self) -> usize {
        self.slots().iter().filter(|slot| slot.is_some()).count()
    }
}

/// 布局控制器
///
/// 持有布局状态与总页数，对外提供翻页、切换模式与可见窗口
#[derive(Debug, Clone)]
pub struct LayoutController {
    state: LayoutState,
    total_pages: usize,
}

impl LayoutController {
    pub fn new(mode: LayoutMode, total_pages: usize) -> Self {
        Self {
            state: LayoutState::initial(mode),
            total_pages,
        }
    }

    pub fn state(&self) -> LayoutState {
        self.state
    }

    pub fn mode(&self) -> LayoutMode {
        self.state.mode()
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn step(&self) -> Option<usize> {
        self.mode().step()
    }

    /// 当前页指针；滚动模式没有指针
    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            LayoutState::Paged { index, .. } => Some(index),
            LayoutState::Scroll { .. } => None,
        }
    }

    /// 当前页位置，跨模式保持
    pub fn page_index(&self) -> usize {
        self.state.page_index()
    }

    fn apply(&mut self, event: LayoutEvent) -> bool {
        let next = self.state.transition(event, self.total_pages);
        let changed = next != self.state;
        if changed {
            debug!(
                from = ?self.state,
                to = ?next,
                total_pages = self.total_pages,
                "layout transition"
            );
        }
        self.state = next;
        changed
    }

    /// 翻页
    ///
    /// # 返回
    /// 页指针是否发生变化
    pub fn advance(&mut self, direction: Direction) -> bool {
        if self.total_pages == 0 {
            return false;
        }
        self.apply(LayoutEvent::Advance(direction))
    }

    /// 切换布局模式，页位置保持不变
    pub fn switch_mode(&mut self, mode: LayoutMode) -> bool {
        self.apply(LayoutEvent::SwitchMode(mode))
    }

    pub fn visible_window(&self) -> VisibleWindow {
        if self.total_pages == 0 {
            return VisibleWindow::Empty;
        }

        match self.state {
            LayoutState::Paged {
                mode: PagedMode::Single,
                index,
            } => VisibleWindow::Single(index),
            LayoutState::Paged {
                mode: PagedMode::Double,
                index,
            } => {
                let right = index + 1;
                VisibleWindow::Double(index, (right < self.total_pages).then_some(right))
            }
            LayoutState::Scroll { .. } => VisibleWindow::All {
                total: self.total_pages,
            },
        }
    }

    /// 上一页按钮是否可用
    pub fn can_go_back(&self) -> bool {
        matches!(self.current_index(), Some(index) if index > 0)
    }

    /// 下一页按钮是否可用
    pub fn can_go_forward(&self) -> bool {
        match (self.current_index(), self.step()) {
            (Some(index), Some(step)) => index + step < self.total_pages,
            _ => false,
        }
    }

    /// 页码标签，如 "Page 4–5 of 9"
    pub fn page_label(&self) -> Option<String> {
        match self.visible_window() {
            VisibleWindow::Single(index) | VisibleWindow::Double(index, None) => {
                Some(format!("Page {} of {}", index + 1, self.total_pages))
            }
            VisibleWindow::Double(left, Some(right)) => Some(format!(
                "Page {}–{} of {}",
                left + 1,
                right + 1,
                self.total_pages
            )),
            VisibleWindow::Empty | VisibleWindow::All { .. } => None,
        }
    }
}
