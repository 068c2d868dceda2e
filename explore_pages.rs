/// 分页探索工具
///
/// 对一个文本文件分页，打印每页的块数、字数和开头内容，
/// 再按指定布局从头翻到尾

use clap::{Parser, ValueEnum};
use nook_reader_lib::parser::detect_legacy_format;
use nook_reader_lib::{
    chunk_with_budget, ContentFormat, Direction, LayoutController, LayoutMode, ReaderConfig,
};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// 按内容推断
    Auto,
    Markdown,
    Richtext,
}

/// Paginate a book file and walk through it page by page
#[derive(Parser, Debug)]
#[command(name = "explore_pages")]
struct Args {
    /// Book content file
    file: PathBuf,

    /// Content format
    #[arg(short, long, value_enum, default_value = "auto")]
    format: FormatArg,

    /// Words per page, overrides the config file
    #[arg(short, long)]
    budget: Option<usize>,

    /// Layout used for the walkthrough (single, double, scroll)
    #[arg(short, long)]
    layout: Option<LayoutMode>,

    /// Reader config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn preview(text: &str, limit: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= limit {
        flat
    } else {
        format!("{}…", flat.chars().take(limit).collect::<String>())
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match args.config {
        Some(ref path) => match ReaderConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("错误: 无法加载配置 {:?}: {}", path, e);
                return;
            }
        },
        None => ReaderConfig::default(),
    };

    let content = match fs::read_to_string(&args.file) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("错误: 无法读取文件 {:?}: {}", args.file, e);
            return;
        }
    };

    let format = match args.format {
        FormatArg::Auto => detect_legacy_format(&content),
        FormatArg::Markdown => ContentFormat::Markdown,
        FormatArg::Richtext => ContentFormat::RichText,
    };
    let budget = args.budget.unwrap_or(config.words_per_page);

    println!("正在分页: {:?} (格式: {}, 每页 {} 词)\n", args.file, format.as_str(), budget);

    let pages = chunk_with_budget(&content, format, budget);
    if pages.is_empty() {
        println!("没有可阅读的内容");
        return;
    }

    println!("=== Pages ===");
    for page in &pages {
        println!(
            "  [{}] {} 块, {} 词 | {}",
            page.index,
            page.blocks.len(),
            page.word_count,
            preview(&page.joined_text(), 60)
        );
    }
    println!();

    let mode = args.layout.unwrap_or(config.preferences.default_layout);
    let mut layout = LayoutController::new(mode, pages.len());

    println!("=== Walkthrough ({}) ===", mode);
    match layout.page_label() {
        Some(label) => {
            println!("  {}", label);
            while layout.advance(Direction::Forward) {
                if let Some(label) = layout.page_label() {
                    println!("  {}", label);
                }
            }
        }
        None => println!("  滚动模式: 一次显示全部 {} 页", pages.len()),
    }

    let total_words: usize = pages.iter().map(|page| page.word_count).sum();
    println!("\n共 {} 页, {} 词", pages.len(), total_words);
}
