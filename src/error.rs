use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeadAiError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("URLが不正です: {0}")]
    InvalidUrl(String),

    #[error("送信先メールアドレスが不正です: {0}")]
    MissingRecipient(String),

    #[error("リードが選択されていません")]
    NoLeadsSelected,

    #[error("リードが見つかりません: {0}")]
    LeadNotFound(String),

    #[error("不明なソート項目: {0}")]
    InvalidSortField(String),

    #[error("不明な期間指定: {0}")]
    InvalidDateMode(String),

    #[error("バックエンド通信エラー: {0}")]
    Gateway(String),

    #[error("バックエンドがエラーを返しました: {0}")]
    Backend(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("エクスポートエラー: {0}")]
    Export(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] lead_ai_common::Error),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, LeadAiError>;
