use super::*;
use regex::Regex;
use std::sync::LazyLock;

/// 两个及以上连续换行（兼容 `\r\n`）
static BLANK_LINE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\r?\n){2,}").expect("静态正则必须合法"));

/// Markdown 分块器
///
/// 以空行为段落边界切分内容，块文本原样保留（仅去除首尾空白）
#[derive(Clone)]
pub struct MarkdownSplitter;

impl MarkdownSplitter {
    /// 创建新的 Markdown 分块器实例
    pub fn new() -> Self {
        Self
    }

    /// 分割文本为段落
    ///
    /// # 参数
    /// - `content`: Markdown 文本内容
    ///
    /// # 返回
    /// 非空段落列表
    fn split_into_paragraphs<'a>(&self, content: &'a str) -> Vec<&'a str> {
        BLANK_LINE_SEPARATOR
            .split(content)
            .map(str::trim)
            .filter(|paragraph| !paragraph.is_empty())
            .collect()
    }
}

impl BlockSplitter for MarkdownSplitter {
    fn split(&self, content: &str) -> Vec<Block> {
        self.split_into_paragraphs(content)
            .into_iter()
            .map(|paragraph| Block::new(paragraph, count_words(paragraph)))
            .collect()
    }

    fn format(&self) -> ContentFormat {
        ContentFormat::Markdown
    }
}

impl Default for MarkdownSplitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_md_splitter_creation() {
        let splitter = MarkdownSplitter::new();
        assert_eq!(splitter.format(), ContentFormat::Markdown);
    }

    #[test]
    fn test_split_on_blank_lines() {
        let splitter = MarkdownSplitter::new();
        let content = "# Chapter One\n\nIt was a dark night.\nThe wind howled.\n\n\n\nThe end.";

        let blocks = splitter.split(content);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].text, "# Chapter One");
        assert_eq!(blocks[0].word_count, 3);
        // 单个换行不分段
        assert_eq!(blocks[1].text, "It was a dark night.\nThe wind howled.");
        assert_eq!(blocks[1].word_count, 8);
        assert_eq!(blocks[2].text, "The end.");
    }

    #[test]
    fn test_crlf_separators() {
        let splitter = MarkdownSplitter::new();
        let blocks = splitter.split("first para\r\n\r\nsecond para");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "first para");
        assert_eq!(blocks[1].text, "second para");
    }

    #[test]
    fn test_markup_is_kept() {
        let splitter = MarkdownSplitter::new();
        let blocks = splitter.split("This is **bold** and <em>inline html</em>.");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "This is **bold** and <em>inline html</em>.");
    }

    #[test]
    fn test_no_separator_single_block() {
        let splitter = MarkdownSplitter::new();
        let blocks = splitter.split("one long line without any blank line at all");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].word_count, 8);
    }

    #[test]
    fn test_empty_markdown() {
        let splitter = MarkdownSplitter::new();
        assert!(splitter.split("").is_empty());
        assert!(splitter.split("\n\n   \n\n").is_empty());
    }
}
