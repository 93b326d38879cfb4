//! ユーザー向け通知
//!
//! 失敗は致命的にせず、通知として積んでおく。表示は CLI が行うので、ログには debug で流す。

use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        let notice = Self {
            level,
            message: message.into(),
        };
        notice.log();
        notice
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Danger, message)
    }

    fn log(&self) {
        debug!(level = ?self.level, "{}", self.message);
    }

    /// 端末表示用の接頭辞
    pub fn symbol(&self) -> &'static str {
        match self.level {
            NoticeLevel::Info => "ℹ",
            NoticeLevel::Success => "✔",
            NoticeLevel::Warning => "⚠",
            NoticeLevel::Danger => "✖",
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.symbol(), self.message)
    }
}
