use crate::parser::Block;
use serde::{Deserialize, Serialize};

/// 每页字数预算
pub const WORDS_PER_PAGE: usize = 250;

/// 页
///
/// 有序、非空的内容块序列。多块页的总字数不超过预算；
/// 单块页允许超出预算（超长段落不拆分）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 页序号（从 0 开始）
    pub index: usize,
    pub blocks: Vec<Block>,
    /// 本页所有块字数之和
    pub word_count: usize,
}

impl Page {
    /// 以一个块开启新页
    pub fn new(index: usize, first: Block) -> Self {
        let word_count = first.word_count;
        Self {
            index,
            blocks: vec![first],
            word_count,
        }
    }

    /// 追加内容块
    pub fn push(&mut self, block: Block) {
        self.word_count += block.word_count;
        self.blocks.push(block);
    }

    /// 按段落分隔符拼接出本页原文，供渲染层使用
    pub fn joined_text(&self) -> String {
        self.blocks
            .iter()
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_word_count_tracks_blocks() {
        let mut page = Page::new(0, Block::new("a b c", 3));
        page.push(Block::new("d e", 2));

        assert_eq!(page.word_count, 5);
        assert_eq!(page.blocks.len(), 2);
        assert_eq!(page.joined_text(), "a b c\n\nd e");
    }

    #[test]
    fn test_page_serialization() {
        let page = Page::new(3, Block::new("hello", 1));
        let json = serde_json::to_string(&page).unwrap();
        let back: Page = serde_json::from_str(&json).unwrap();
        assert_eq!(back, page);
    }
}
