use crate::layout::LayoutMode;
use crate::pagination::WORDS_PER_PAGE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("读取配置文件失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("配置文件格式错误: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("配置无效: {0}")]
    Invalid(String),
}

pub const MIN_FONT_SIZE_PX: u32 = 14;
pub const MAX_FONT_SIZE_PX: u32 = 32;
pub const FONT_SIZE_STEP_PX: u32 = 2;
pub const DEFAULT_FONT_SIZE_PX: u32 = 18;
/// 滚动模式下视为读完的进度阈值（百分比）
pub const SCROLL_COMPLETION_THRESHOLD: f64 = 98.0;
pub const REPORT_TIMEOUT_MS: u64 = 5_000;

/// 偏好设置的取值范围与默认值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencePolicy {
    pub min_font_px: u32,
    pub max_font_px: u32,
    pub font_step_px: u32,
    pub default_font_px: u32,
    pub default_layout: LayoutMode,
}

impl PreferencePolicy {
    /// 把字号夹紧到允许范围
    pub fn clamp_font(&self, font_px: u32) -> u32 {
        font_px.clamp(self.min_font_px, self.max_font_px)
    }
}

impl Default for PreferencePolicy {
    fn default() -> Self {
        Self {
            min_font_px: MIN_FONT_SIZE_PX,
            max_font_px: MAX_FONT_SIZE_PX,
            font_step_px: FONT_SIZE_STEP_PX,
            default_font_px: DEFAULT_FONT_SIZE_PX,
            default_layout: LayoutMode::Double,
        }
    }
}

/// 阅读器配置
///
/// 所有字段都有内置默认值，配置文件只需写要覆盖的项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub words_per_page: usize,
    pub preferences: PreferencePolicy,
    pub scroll_completion_threshold: f64,
    pub report_timeout_ms: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            words_per_page: WORDS_PER_PAGE,
            preferences: PreferencePolicy::default(),
            scroll_completion_threshold: SCROLL_COMPLETION_THRESHOLD,
            report_timeout_ms: REPORT_TIMEOUT_MS,
        }
    }
}

impl ReaderConfig {
    /// 从 TOML 文本解析并校验
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ReaderConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let prefs = &self.preferences;
        if self.words_per_page == 0 {
            return Err(ConfigError::Invalid("words_per_page 必须大于 0".to_string()));
        }
        if prefs.min_font_px > prefs.max_font_px {
            return Err(ConfigError::Invalid(format!(
                "字号范围无效: {} > {}",
                prefs.min_font_px, prefs.max_font_px
            )));
        }
        if prefs.font_step_px == 0 {
            return Err(ConfigError::Invalid("font_step_px 必须大于 0".to_string()));
        }
        if !(0.0..=100.0).contains(&self.scroll_completion_threshold) {
            return Err(ConfigError::Invalid(format!(
                "滚动完成阈值超出范围: {}",
                self.scroll_completion_threshold
            )));
        }
        Ok(())
    }
}
