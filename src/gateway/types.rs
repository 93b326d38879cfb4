//! バックエンドとのリクエスト/レスポンス型

use crate::export::ExportFormat;
use crate::store::CrmSettings;
use lead_ai_common::{Lead, Verification, VerificationStatus};
use serde::{Deserialize, Serialize};

/// `{status, message?}` 形式の応答
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusReply {
    #[serde(default)]
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusReply {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".into(),
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.message.as_deref().unwrap_or(fallback)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub id: String,
    pub status: VerificationStatus,
    pub notes: String,
    pub verified_by: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerifyReply {
    #[serde(flatten)]
    pub reply: StatusReply,

    /// サーバー側で確定した検証レコード
    #[serde(default)]
    pub verification: Option<Verification>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmSyncRequest {
    pub lead_ids: Vec<String>,
    pub settings: CrmSettings,
}

/// リード単位の同期結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmSyncResult {
    pub id: String,
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crm_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CrmSyncResult {
    pub fn synced(id: impl Into<String>, crm_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: "success".into(),
            crm_id: Some(crm_id.into()),
            message: None,
        }
    }

    pub fn failed(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: "error".into(),
            crm_id: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrmSyncReply {
    #[serde(flatten)]
    pub reply: StatusReply,

    #[serde(default)]
    pub results: Vec<CrmSyncResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailExportRequest {
    pub recipient: String,
    pub subject: String,
    pub message: String,
    pub format: ExportFormat,
    pub leads: Vec<Lead>,
    pub field_selection: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetLeadsReply {
    #[serde(flatten)]
    pub reply: StatusReply,

    #[serde(default)]
    pub leads: Option<Vec<Lead>>,
}

/// 接続テストの入力（設定画面の認証項目のみ）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTest {
    pub provider: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_url: String,
}

impl From<&CrmSettings> for ConnectionTest {
    fn from(settings: &CrmSettings) -> Self {
        Self {
            provider: settings.provider.clone(),
            api_key: settings.api_key.clone(),
            api_secret: settings.api_secret.clone(),
            api_url: settings.api_url.clone(),
        }
    }
}

/// サーバー側で生成するレポートの形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerExport {
    Csv,
    Json,
}

impl ServerExport {
    pub fn endpoint(&self) -> &'static str {
        match self {
            ServerExport::Csv => "/export-csv",
            ServerExport::Json => "/export-json",
        }
    }

    pub fn default_file_name(&self) -> &'static str {
        match self {
            ServerExport::Csv => "lead_data.csv",
            ServerExport::Json => "lead_analysis.json",
        }
    }
}
