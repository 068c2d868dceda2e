use regex::Regex;
use super::*;

/// 旧数据格式检测器
///
/// 早期书籍没有保存格式标签，只能靠"看起来像 HTML"来猜测。
/// 该启发式在 Markdown 内嵌 HTML 时并不可靠，因此只用于一次性迁移，
/// 阅读路径上永远使用书籍自带的 `ContentFormat`
pub struct FormatDetector {
    /// 块级/行内 HTML 标签匹配模式列表
    patterns: Vec<Regex>,
}

impl FormatDetector {
    /// 创建新的格式检测器实例
    pub fn new() -> Self {
        let patterns = [
            // 富文本编辑器输出的段落与换行
            r"(?i)^\s*<p[\s>]",
            r"(?i)</p\s*>",
            r"(?i)<br\s*/?\s*>",
            // 常见块级元素
            r"(?i)<(?:div|h[1-6]|ul|ol|li|blockquote|pre)[\s>]",
        ];

        let patterns = patterns
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect();

        Self { patterns }
    }

    /// 检测内容格式
    ///
    /// # 参数
    /// - `content`: 没有格式标签的原始内容
    ///
    /// # 返回
    /// 匹配任一 HTML 模式则为 `RichText`，否则为 `Markdown`
    pub fn detect(&self, content: &str) -> ContentFormat {
        if self.patterns.iter().any(|pattern| pattern.is_match(content)) {
            ContentFormat::RichText
        } else {
            ContentFormat::Markdown
        }
    }
}

impl Default for FormatDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// 迁移旧书籍时推断格式
pub fn detect_legacy_format(content: &str) -> ContentFormat {
    FormatDetector::new().detect(content)
}
