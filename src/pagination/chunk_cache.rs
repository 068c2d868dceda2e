use crate::pagination::page_builder::chunk_with_budget;
use crate::pagination::types::*;
use crate::parser::ContentFormat;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// 缓存键：内容哈希 + 格式 + 预算
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChunkKey {
    content_hash: String,
    format: ContentFormat,
    budget: usize,
}

impl ChunkKey {
    pub fn new(content: &str, format: ContentFormat, budget: usize) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let content_hash = format!("{:x}", hasher.finalize());

        Self {
            content_hash,
            format,
            budget,
        }
    }
}

/// 默认最多缓存的书籍数
pub const DEFAULT_MAX_ENTRIES: usize = 8;

/// 分页缓存
///
/// 分页是纯函数，相同输入直接复用上次的结果，避免重复渲染时重新分页。
/// 条目数有上限，超出时淘汰最久未使用的条目
pub struct ChunkCache {
    entries: HashMap<ChunkKey, Arc<[Page]>>,
    /// 使用顺序，队尾最新
    recency: VecDeque<ChunkKey>,
    budget: usize,
    max_entries: usize,
    hits: u64,
    misses: u64,
}

impl ChunkCache {
    pub fn new() -> Self {
        Self::with_budget(WORDS_PER_PAGE)
    }

    pub fn with_budget(budget: usize) -> Self {
        Self::with_limits(budget, DEFAULT_MAX_ENTRIES)
    }

    /// `max_entries` 为 0 时按 1 处理
    pub fn with_limits(budget: usize, max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            recency: VecDeque::new(),
            budget,
            max_entries: max_entries.max(1),
            hits: 0,
            misses: 0,
        }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// 按缓存自身的预算获取分页结果
    pub fn pages(&mut self, content: &str, format: ContentFormat) -> Arc<[Page]> {
        self.pages_with_budget(content, format, self.budget)
    }

    /// 按指定预算获取分页结果，未命中时计算并缓存
    pub fn pages_with_budget(
        &mut self,
        content: &str,
        format: ContentFormat,
        budget: usize,
    ) -> Arc<[Page]> {
        let key = ChunkKey::new(content, format, budget);

        if let Some(pages) = self.entries.get(&key) {
            let pages = Arc::clone(pages);
            self.hits += 1;
            self.touch(&key);
            return pages;
        }

        self.misses += 1;
        let pages: Arc<[Page]> = chunk_with_budget(content, format, budget).into();
        tracing::debug!(
            format = format.as_str(),
            pages = pages.len(),
            budget,
            "chunk cache miss"
        );

        while self.entries.len() >= self.max_entries {
            let Some(oldest) = self.recency.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
        self.entries.insert(key.clone(), Arc::clone(&pages));
        self.recency.push_back(key);
        pages
    }

    fn touch(&mut self, key: &ChunkKey) {
        if let Some(position) = self.recency.iter().position(|k| k == key) {
            if let Some(key) = self.recency.remove(position) {
                self.recency.push_back(key);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (命中次数, 未命中次数)
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }
}

impl Default for ChunkCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_hit_returns_same_pages() {
        let mut cache = ChunkCache::new();
        let content = "one two\n\nthree four";

        let first = cache.pages(content, ContentFormat::Markdown);
        let second = cache.pages(content, ContentFormat::Markdown);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats(), (1, 1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_format_is_part_of_key() {
        let mut cache = ChunkCache::new();
        let content = "<p>a</p><p>b</p>";

        let markdown = cache.pages(content, ContentFormat::Markdown);
        let rich = cache.pages(content, ContentFormat::RichText);

        assert_eq!(cache.len(), 2);
        assert_eq!(markdown[0].blocks.len(), 1);
        assert_eq!(rich[0].blocks.len(), 2);
    }

    #[test]
    fn test_cached_matches_direct_chunk() {
        let mut cache = ChunkCache::with_budget(3);
        let content = "a b\n\nc d\n\ne";

        let cached = cache.pages(content, ContentFormat::Markdown);
        let direct = chunk_with_budget(content, ContentFormat::Markdown, 3);
        assert_eq!(cached.to_vec(), direct);
    }

    #[test]
    fn test_clear() {
        let mut cache = ChunkCache::new();
        cache.pages("x", ContentFormat::Markdown);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_entry_count_is_bounded() {
        let mut cache = ChunkCache::with_limits(WORDS_PER_PAGE, 4);
        for i in 0..1000 {
            cache.pages(&format!("book {}", i), ContentFormat::Markdown);
            assert!(cache.len() <= 4);
        }
        assert_eq!(cache.len(), 4);
        assert_eq!(cache.stats(), (0, 1000));
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = ChunkCache::with_limits(WORDS_PER_PAGE, 2);
        let a = cache.pages("a", ContentFormat::Markdown);
        cache.pages("b", ContentFormat::Markdown);

        // 访问 a 后，b 成为最旧的条目
        cache.pages("a", ContentFormat::Markdown);
        cache.pages("c", ContentFormat::Markdown);

        assert!(Arc::ptr_eq(&a, &cache.pages("a", ContentFormat::Markdown)));
        assert_eq!(cache.stats(), (2, 3));

        cache.pages("b", ContentFormat::Markdown);
        assert_eq!(cache.stats(), (2, 4));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_budget_is_part_of_key() {
        let mut cache = ChunkCache::new();
        let content = (0..10)
            .map(|_| vec!["w"; 30].join(" "))
            .collect::<Vec<_>>()
            .join("\n\n");

        let default_budget = cache.pages(&content, ContentFormat::Markdown);
        let small_budget = cache.pages_with_budget(&content, ContentFormat::Markdown, 100);

        assert_eq!(default_budget.len(), 2);
        assert_eq!(small_budget.len(), 4);
        assert!(small_budget.iter().all(|page| page.word_count <= 100));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_key_differs_by_content() {
        let a = ChunkKey::new("a", ContentFormat::Markdown, 250);
        let b = ChunkKey::new("b", ContentFormat::Markdown, 250);
        assert_ne!(a, b);
        assert_eq!(a, ChunkKey::new("a", ContentFormat::Markdown, 250));
    }
}
