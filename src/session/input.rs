use crate::layout::Direction;

/// 键盘命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Advance(Direction),
    /// 字号调整步数，正数放大
    AdjustFont(i32),
}

impl KeyCommand {
    /// 按键名映射为命令，未绑定的按键返回 None
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowRight" => Some(Self::Advance(Direction::Forward)),
            "ArrowLeft" => Some(Self::Advance(Direction::Back)),
            "+" | "=" => Some(Self::AdjustFont(1)),
            "-" => Some(Self::AdjustFont(-1)),
            _ => None,
        }
    }
}
