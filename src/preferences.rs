use crate::config::PreferencePolicy;
use crate::db;
use crate::layout::LayoutMode;
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

/// 持久化键名
pub const FONT_SIZE_KEY: &str = "font-size";
pub const LAYOUT_MODE_KEY: &str = "layout-mode";

#[derive(Error, Debug)]
pub enum PreferenceError {
    #[error("偏好设置存储错误: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("偏好设置存储不可用: {0}")]
    Unavailable(String),
}

/// 阅读偏好
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub font_size_px: u32,
    pub layout_mode: LayoutMode,
}

impl Preferences {
    pub fn defaults(policy: &PreferencePolicy) -> Self {
        Self {
            font_size_px: policy.default_font_px,
            layout_mode: policy.default_layout,
        }
    }

    /// 合并补丁并重新夹紧
    pub fn merged(self, patch: PreferencePatch, policy: &PreferencePolicy) -> Self {
        Self {
            font_size_px: policy.clamp_font(patch.font_size_px.unwrap_or(self.font_size_px)),
            layout_mode: patch.layout_mode.unwrap_or(self.layout_mode),
        }
    }
}

/// 局部更新
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreferencePatch {
    pub font_size_px: Option<u32>,
    pub layout_mode: Option<LayoutMode>,
}

impl PreferencePatch {
    pub fn font_size(font_size_px: u32) -> Self {
        Self {
            font_size_px: Some(font_size_px),
            ..Self::default()
        }
    }

    pub fn layout(layout_mode: LayoutMode) -> Self {
        Self {
            layout_mode: Some(layout_mode),
            ..Self::default()
        }
    }
}

/// 偏好设置存储
///
/// 纯键值缓存加校验，不感知书籍或会话
pub trait PreferenceStore: Send + Sync {
    /// 取值范围与默认值
    fn policy(&self) -> &PreferencePolicy;

    /// 读取偏好；缺失或损坏的值回退为默认值
    fn load(&self) -> Result<Preferences, PreferenceError>;

    /// 合并补丁、夹紧后持久化
    ///
    /// # 返回
    /// 实际保存的偏好
    fn save(&self, patch: PreferencePatch) -> Result<Preferences, PreferenceError>;

    /// 按步长调整字号，`steps` 为正放大、为负缩小
    fn adjust_font_size(&self, steps: i32) -> Result<Preferences, PreferenceError> {
        let current = self.load()?;
        let delta = i64::from(steps) * i64::from(self.policy().font_step_px);
        let target = (i64::from(current.font_size_px) + delta).clamp(0, i64::from(u32::MAX));
        self.save(PreferencePatch::font_size(target as u32))
    }
}

/// 解析存储的字号，无法解析时返回 None
fn parse_font_size(raw: &str, policy: &PreferencePolicy) -> Option<u32> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
        .map(|value| policy.clamp_font(value.round() as u32))
}

/// 内存存储
pub struct MemoryPreferenceStore {
    policy: PreferencePolicy,
    current: Mutex<Option<Preferences>>,
}

impl MemoryPreferenceStore {
    pub fn new(policy: PreferencePolicy) -> Self {
        Self {
            policy,
            current: Mutex::new(None),
        }
    }

    /// 以已有值创建（加载时同样会夹紧）
    pub fn with_preferences(policy: PreferencePolicy, preferences: Preferences) -> Self {
        Self {
            policy,
            current: Mutex::new(Some(preferences)),
        }
    }
}

impl Default for MemoryPreferenceStore {
    fn default() -> Self {
        Self::new(PreferencePolicy::default())
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn policy(&self) -> &PreferencePolicy {
        &self.policy
    }

    fn load(&self) -> Result<Preferences, PreferenceError> {
        let current = self
            .current
            .lock()
            .map_err(|e| PreferenceError::Unavailable(format!("锁定偏好设置失败: {}", e)))?;

        Ok(match *current {
            Some(prefs) => prefs.merged(PreferencePatch::default(), &self.policy),
            None => Preferences::defaults(&self.policy),
        })
    }

    fn save(&self, patch: PreferencePatch) -> Result<Preferences, PreferenceError> {
        let mut current = self
            .current
            .lock()
            .map_err(|e| PreferenceError::Unavailable(format!("锁定偏好设置失败: {}", e)))?;

        let base = (*current).unwrap_or_else(|| Preferences::defaults(&self.policy));
        let next = base.merged(patch, &self.policy);
        *current = Some(next);
        Ok(next)
    }
}

/// SQLite 存储
///
/// 偏好写入 `preferences` 表，跨进程重启保留
pub struct SqlitePreferenceStore {
    policy: PreferencePolicy,
    conn: Mutex<Connection>,
}

impl SqlitePreferenceStore {
    pub fn open<P: AsRef<Path>>(path: P, policy: PreferencePolicy) -> Result<Self, PreferenceError> {
        let conn = db::init_db(path)?;
        Ok(Self::from_connection(conn, policy))
    }

    /// 使用已初始化的连接
    pub fn from_connection(conn: Connection, policy: PreferencePolicy) -> Self {
        Self {
            policy,
            conn: Mutex::new(conn),
        }
    }

    fn read_value(conn: &Connection, key: &str) -> Result<Option<String>, PreferenceError> {
        let value = conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_value(conn: &Connection, key: &str, value: &str) -> Result<(), PreferenceError> {
        conn.execute(
            "INSERT INTO preferences (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }

    fn load_from(&self, conn: &Connection) -> Result<Preferences, PreferenceError> {
        let defaults = Preferences::defaults(&self.policy);

        let font_size_px = match Self::read_value(conn, FONT_SIZE_KEY)? {
            Some(raw) => parse_font_size(&raw, &self.policy).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "stored font size is corrupt, using default");
                defaults.font_size_px
            }),
            None => defaults.font_size_px,
        };

        let layout_mode = match Self::read_value(conn, LAYOUT_MODE_KEY)? {
            Some(raw) => raw.parse::<LayoutMode>().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "stored layout mode is corrupt, using default");
                defaults.layout_mode
            }),
            None => defaults.layout_mode,
        };

        Ok(Preferences {
            font_size_px,
            layout_mode,
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, PreferenceError> {
        self.conn
            .lock()
            .map_err(|e| PreferenceError::Unavailable(format!("锁定数据库连接失败: {}", e)))
    }
}

impl PreferenceStore for SqlitePreferenceStore {
    fn policy(&self) -> &PreferencePolicy {
        &self.policy
    }

    fn load(&self) -> Result<Preferences, PreferenceError> {
        let conn = self.lock()?;
        self.load_from(&conn)
    }

    fn save(&self, patch: PreferencePatch) -> Result<Preferences, PreferenceError> {
        let conn = self.lock()?;
        let next = self.load_from(&conn)?.merged(patch, &self.policy);

        if patch.font_size_px.is_some() {
            Self::write_value(&conn, FONT_SIZE_KEY, &next.font_size_px.to_string())?;
        }
        if patch.layout_mode.is_some() {
            Self::write_value(&conn, LAYOUT_MODE_KEY, next.layout_mode.as_str())?;
        }

        Ok(next)
    }
}
