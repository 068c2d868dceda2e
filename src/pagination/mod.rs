// 分页模块
// 把内容块按字数预算贪心分组为页

pub mod types;
pub mod page_builder;
pub mod chunk_cache;

// 重新导出主要类型
pub use types::*;
pub use page_builder::{chunk, chunk_with_budget, PageBuilder};
pub use chunk_cache::{ChunkCache, ChunkKey};
