use super::*;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;

/// 换行标记：`<br>`、`<br/>`、`<br />`，作为分隔符被消耗
static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?\s*>").expect("静态正则必须合法"));

/// 段落结束标记：保留在所属块的末尾
static PARAGRAPH_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</p\s*>").expect("静态正则必须合法"));

/// 没有文字也需要保留的媒体元素
static MEDIA_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:img|video|audio|iframe|hr|figure|picture|svg|table)\b")
        .expect("静态正则必须合法")
});

/// 富文本分块器
///
/// 按段落结束标记和换行标记切分 HTML 片段。
/// 标记只在计数时去除，块文本保留完整标记用于渲染
#[derive(Clone)]
pub struct RichTextSplitter;

impl RichTextSplitter {
    /// 创建新的富文本分块器实例
    pub fn new() -> Self {
        Self
    }

    /// 把一个片段在每个 `</p>` 之后切开
    fn split_after_paragraphs<'a>(&self, segment: &'a str, out: &mut Vec<&'a str>) {
        let mut start = 0;
        for close in PARAGRAPH_CLOSE.find_iter(segment) {
            out.push(&segment[start..close.end()]);
            start = close.end();
        }
        out.push(&segment[start..]);
    }

    /// 空块：没有文字且不含媒体元素，如 `<p></p>` 或残留的闭合标签
    fn is_empty_block(&self, raw: &str, word_count: usize) -> bool {
        raw.is_empty() || (word_count == 0 && !MEDIA_ELEMENT.is_match(raw))
    }
}

/// 块级元素：前后视为词边界
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "dt", "dd", "h1", "h2", "h3", "h4", "h5", "h6",
    "blockquote", "pre", "table", "tr", "td", "th", "section", "article", "header", "footer",
    "figure", "figcaption", "hr",
];

/// 提取 HTML 片段的纯文本
///
/// 行内标签直接拼接，块级标签处补空格，避免 `un<em>believ</em>able` 被拆成多个词。
/// 尽力而为：格式错误的标记不会报错，只会影响计数精度
pub fn strip_markup(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut text = String::new();
    collect_text(fragment.root_element(), &mut text);
    text
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            let is_block = BLOCK_ELEMENTS.contains(&child_element.value().name());
            if is_block {
                out.push(' ');
            }
            collect_text(child_element, out);
            if is_block {
                out.push(' ');
            }
        }
    }
}

/// 富文本字数统计
pub fn count_rich_text_words(html: &str) -> usize {
    count_words(&strip_markup(html))
}

impl BlockSplitter for RichTextSplitter {
    fn split(&self, content: &str) -> Vec<Block> {
        let mut raw_blocks = Vec::new();
        for segment in LINE_BREAK.split(content) {
            self.split_after_paragraphs(segment, &mut raw_blocks);
        }

        raw_blocks
            .into_iter()
            .map(str::trim)
            .map(|raw| (raw, count_rich_text_words(raw)))
            .filter(|(raw, words)| !self.is_empty_block(raw, *words))
            .map(|(raw, words)| Block::new(raw, words))
            .collect()
    }

    fn format(&self) -> ContentFormat {
        ContentFormat::RichText
    }
}

impl Default for RichTextSplitter {
    fn default() -> Self {
        Self::new()
    }
}
