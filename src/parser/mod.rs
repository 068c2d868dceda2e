use serde::{Deserialize, Serialize};

// 子模块声明
pub mod md_parser;
pub mod rich_text_parser;
pub mod format_detector;

pub use format_detector::{detect_legacy_format, FormatDetector};
pub use md_parser::MarkdownSplitter;
pub use rich_text_parser::RichTextSplitter;

/// 内容格式
///
/// 在创作时随书籍一起保存，阅读时不再重新推断
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    /// Markdown 文本，空行分段
    Markdown,
    /// 富文本（HTML 片段），按段落/换行标记分段
    RichText,
}

impl ContentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentFormat::Markdown => "markdown",
            ContentFormat::RichText => "richtext",
        }
    }
}

/// 内容块
///
/// 表示一个段落级的结构单元。`text` 保留原始标记用于渲染，
/// `word_count` 仅基于去除标记后的文本计算
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    /// 原始块文本（含标记）
    pub text: String,
    /// 字数（按空白分隔的词计数）
    pub word_count: usize,
}

impl Block {
    pub fn new(text: impl Into<String>, word_count: usize) -> Self {
        Self {
            text: text.into(),
            word_count,
        }
    }
}

/// 分块器 trait
///
/// 每种内容格式对应一个实现，负责把原始内容切分为有序的内容块
pub trait BlockSplitter: Send + Sync {
    /// 切分内容
    ///
    /// # 参数
    /// - `content`: 原始内容
    ///
    /// # 返回
    /// 按原文顺序排列的内容块；空内容返回空列表
    fn split(&self, content: &str) -> Vec<Block>;

    /// 该分块器处理的格式
    fn format(&self) -> ContentFormat;
}

/// 分块器路由器
///
/// 根据内容格式标签路由到对应的分块器
pub struct SplitterRouter {
    markdown: MarkdownSplitter,
    rich_text: RichTextSplitter,
}

impl SplitterRouter {
    /// 创建新的路由器实例
    pub fn new() -> Self {
        Self {
            markdown: MarkdownSplitter::new(),
            rich_text: RichTextSplitter::new(),
        }
    }

    /// 根据格式路由到对应的分块器
    pub fn route(&self, format: ContentFormat) -> &dyn BlockSplitter {
        match format {
            ContentFormat::Markdown => &self.markdown,
            ContentFormat::RichText => &self.rich_text,
        }
    }
}

impl Default for SplitterRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// 按格式切分内容块
pub fn split_blocks(content: &str, format: ContentFormat) -> Vec<Block> {
    SplitterRouter::new().route(format).split(content)
}

/// 统计纯文本字数
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
