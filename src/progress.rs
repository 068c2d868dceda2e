use crate::layout::{LayoutController, LayoutMode};
use serde::{Deserialize, Serialize};

/// 视口滚动数据
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// 滚动进度
///
/// 内容不足一屏（可滚动距离 <= 0）时定义为 0
pub fn scroll_progress(metrics: ScrollMetrics) -> f64 {
    let scrollable = metrics.scroll_height - metrics.client_height;
    if scrollable.is_nan() || scrollable <= 0.0 {
        return 0.0;
    }
    clamp_percent(metrics.scroll_top / scrollable * 100.0)
}

/// 分页进度：(当前页 + 可见页数) / 总页数
pub fn page_progress(index: usize, window_size: usize, total_pages: usize) -> f64 {
    if total_pages == 0 {
        return 0.0;
    }
    clamp_percent((index + window_size) as f64 / total_pages as f64 * 100.0)
}

/// 阅读进度跟踪器
///
/// 仅供展示，完成判定不依赖该值
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    percent: f64,
    /// 最近一次滚动事件，进入滚动模式时据此重算
    last_scroll: Option<ScrollMetrics>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub fn reset(&mut self) {
        self.percent = 0.0;
        self.last_scroll = None;
    }

    /// 滚动事件后更新
    pub fn update_from_scroll(&mut self, metrics: ScrollMetrics) -> f64 {
        self.last_scroll = Some(metrics);
        self.percent = scroll_progress(metrics);
        self.percent
    }

    /// 翻页或切换模式后更新
    ///
    /// 滚动模式下取最近一次滚动数据，还没有滚动过时为 0
    pub fn update_from_layout(&mut self, layout: &LayoutController) -> f64 {
        self.percent = match layout.mode() {
            LayoutMode::Scroll => self.last_scroll.map(scroll_progress).unwrap_or(0.0),
            LayoutMode::Single | LayoutMode::Double => page_progress(
                layout.page_index(),
                layout.visible_window().filled(),
                layout.total_pages(),
            ),
        };
        self.percent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Direction;

    #[test]
    fn test_scroll_progress() {
        assert_eq!(scroll_progress(ScrollMetrics::new(0.0, 2000.0, 1000.0)), 0.0);
        assert_eq!(scroll_progress(ScrollMetrics::new(500.0, 2000.0, 1000.0)), 50.0);
        assert_eq!(scroll_progress(ScrollMetrics::new(1000.0, 2000.0, 1000.0)), 100.0);
    }

    #[test]
    fn test_scroll_progress_short_content() {
        // 内容比视口短
        assert_eq!(scroll_progress(ScrollMetrics::new(0.0, 600.0, 800.0)), 0.0);
        assert_eq!(scroll_progress(ScrollMetrics::new(0.0, 800.0, 800.0)), 0.0);
    }

    #[test]
    fn test_scroll_progress_clamped() {
        // 回弹滚动可能出现越界值
        assert_eq!(scroll_progress(ScrollMetrics::new(1200.0, 2000.0, 1000.0)), 100.0);
        assert_eq!(scroll_progress(ScrollMetrics::new(-40.0, 2000.0, 1000.0)), 0.0);
        assert_eq!(scroll_progress(ScrollMetrics::new(f64::NAN, 2000.0, 1000.0)), 0.0);
    }

    #[test]
    fn test_page_progress() {
        assert_eq!(page_progress(0, 1, 4), 25.0);
        assert_eq!(page_progress(2, 2, 4), 100.0);
        assert_eq!(page_progress(4, 1, 5), 100.0);
        assert_eq!(page_progress(0, 0, 0), 0.0);
    }

    #[test]
    fn test_tracker_follows_layout() {
        let mut layout = LayoutController::new(LayoutMode::Double, 5);
        let mut tracker = ProgressTracker::new();

        assert_eq!(tracker.update_from_layout(&layout), 40.0);

        layout.advance(Direction::Forward);
        layout.advance(Direction::Forward);
        // 窗口 [4, 空]：只算一页
        assert_eq!(tracker.update_from_layout(&layout), 100.0);
    }

    #[test]
    fn test_tracker_scroll_mode_keeps_scroll_value() {
        let layout = LayoutController::new(LayoutMode::Scroll, 5);
        let mut tracker = ProgressTracker::new();

        tracker.update_from_scroll(ScrollMetrics::new(250.0, 1500.0, 500.0));
        assert_eq!(tracker.update_from_layout(&layout), 25.0);

        tracker.reset();
        assert_eq!(tracker.percent(), 0.0);
    }

    #[test]
    fn test_entering_scroll_drops_page_fraction() {
        let mut layout = LayoutController::new(LayoutMode::Single, 2);
        let mut tracker = ProgressTracker::new();
        layout.advance(Direction::Forward);
        assert_eq!(tracker.update_from_layout(&layout), 100.0);

        layout.switch_mode(LayoutMode::Scroll);
        assert_eq!(tracker.update_from_layout(&layout), 0.0);

        tracker.update_from_scroll(ScrollMetrics::new(300.0, 1600.0, 400.0));
        layout.switch_mode(LayoutMode::Single);
        assert_eq!(tracker.update_from_layout(&layout), 100.0);

        // 回到滚动模式时沿用上次的滚动位置
        layout.switch_mode(LayoutMode::Scroll);
        assert_eq!(tracker.update_from_layout(&layout), 25.0);
    }
}
