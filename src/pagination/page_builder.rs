use crate::pagination::types::*;
use crate::parser::{split_blocks, Block, ContentFormat};

/// Page Builder
/// 按字数预算把内容块贪心分组为页
pub struct PageBuilder {
    budget: usize,
}

impl PageBuilder {
    /// 创建新的 PageBuilder
    ///
    /// 预算为 0 时按 1 处理，即每块独占一页
    pub fn new(budget: usize) -> Self {
        Self {
            budget: budget.max(1),
        }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// 构建页列表
    ///
    /// # 参数
    /// - `blocks`: 按原文顺序排列的内容块
    ///
    /// # 返回
    /// 页列表；没有内容块时为空
    pub fn build(&self, blocks: Vec<Block>) -> Vec<Page> {
        let mut pages = Vec::new();
        let mut current_page: Option<Page> = None;

        for block in blocks {
            match current_page {
                Some(ref mut page) if page.word_count + block.word_count <= self.budget => {
                    page.push(block);
                }
                _ => {
                    // 当前页放不下（或还没有页），关闭当前页并以该块开启新页
                    if let Some(page) = current_page.take() {
                        pages.push(page);
                    }
                    current_page = Some(Page::new(pages.len(), block));
                }
            }
        }

        // 保存最后一页
        if let Some(page) = current_page {
            pages.push(page);
        }

        pages
    }
}

impl Default for PageBuilder {
    fn default() -> Self {
        Self::new(WORDS_PER_PAGE)
    }
}

/// 按默认预算分页
pub fn chunk(content: &str, format: ContentFormat) -> Vec<Page> {
    chunk_with_budget(content, format, WORDS_PER_PAGE)
}

/// 按指定预算分页
pub fn chunk_with_budget(content: &str, format: ContentFormat, budget: usize) -> Vec<Page> {
    PageBuilder::new(budget).build(split_blocks(content, format))
}
