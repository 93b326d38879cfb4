//! リードと解析結果の型定義
//!
//! CLIと将来のフロントエンドで共有される型:
//! - AnalysisReport: `/analyze` のレスポンス（バックエンドのスコアリング結果）
//! - Lead: 保存済みリード（ローカルストアに一括で永続化される）
//! - Verification / CrmState / RemoteSync: リードに付随する可変ステータス

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// リードの温度感
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LeadTier {
    Hot,
    Warm,
    Nurture,
    #[serde(other)]
    Unknown,
}

impl LeadTier {
    pub const ALL: [LeadTier; 3] = [LeadTier::Hot, LeadTier::Warm, LeadTier::Nurture];

    pub fn label(&self) -> &'static str {
        match self {
            LeadTier::Hot => "Hot",
            LeadTier::Warm => "Warm",
            LeadTier::Nurture => "Nurture",
            LeadTier::Unknown => "Unknown",
        }
    }
}

/// 検証ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationStatus {
    Verified,
    Pending,
    Flagged,
    #[serde(other)]
    Unknown,
}

impl VerificationStatus {
    pub const ALL: [VerificationStatus; 3] = [
        VerificationStatus::Verified,
        VerificationStatus::Pending,
        VerificationStatus::Flagged,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            VerificationStatus::Verified => "Verified",
            VerificationStatus::Pending => "Pending",
            VerificationStatus::Flagged => "Flagged",
            VerificationStatus::Unknown => "Unknown",
        }
    }
}

/// CRM同期ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrmStatus {
    #[serde(rename = "Not Synced")]
    NotSynced,
    Queued,
    Synced,
    Failed,
    #[serde(other)]
    Unknown,
}

impl CrmStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CrmStatus::NotSynced => "Not Synced",
            CrmStatus::Queued => "Queued",
            CrmStatus::Synced => "Synced",
            CrmStatus::Failed => "Failed",
            CrmStatus::Unknown => "Unknown",
        }
    }
}

/// 企業規模カテゴリ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompanySize {
    Small,
    Medium,
    Large,
    Enterprise,
    Unknown,
}

/// 規模表示文字列 → カテゴリ
///
/// ダッシュボードのフォーム表記と、解析バックエンドが返す表記の両方を持つ
const COMPANY_SIZE_TABLE: &[(&str, CompanySize)] = &[
    ("Small Business (< 50 employees)", CompanySize::Small),
    ("Medium Business (50-250 employees)", CompanySize::Medium),
    ("Large Business (251-1000 employees)", CompanySize::Large),
    ("Enterprise (1000+ employees)", CompanySize::Enterprise),
    ("Small Company/Startup", CompanySize::Small),
    ("Mid-size Company", CompanySize::Medium),
    ("Large Enterprise", CompanySize::Enterprise),
];

impl CompanySize {
    pub const ALL: [CompanySize; 5] = [
        CompanySize::Small,
        CompanySize::Medium,
        CompanySize::Large,
        CompanySize::Enterprise,
        CompanySize::Unknown,
    ];

    /// 表示文字列からカテゴリを引く（未登録は Unknown）
    pub fn from_indicator(indicator: &str) -> Self {
        COMPANY_SIZE_TABLE
            .iter()
            .find(|(display, _)| *display == indicator)
            .map(|(_, size)| *size)
            .unwrap_or(CompanySize::Unknown)
    }
}

/// 技術カテゴリごとの検出数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechCategory {
    pub total: u64,
    pub indicators: BTreeMap<String, u64>,
}

/// 主要コンタクト（経営陣から選出）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrimaryContact {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutreachApproach {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conversation_starters: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutreachRecommendation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approach: Option<OutreachApproach>,
}

/// 営業向けインサイト
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesInsights {
    /// 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_tier: Option<LeadTier>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_contact: Option<PrimaryContact>,

    #[serde(default)]
    pub pain_points: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outreach_recommendation: Option<OutreachRecommendation>,

    #[serde(default)]
    pub score_components: BTreeMap<String, f64>,

    /// crm_ready など、パイプラインが参照しない項目
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 検証レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub status: VerificationStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default)]
    pub notes: String,

    /// サーバー同期の結果（ローカルコミットとは別に記録）
    #[serde(default)]
    pub remote_sync: RemoteSync,
}

impl Verification {
    pub fn new(status: VerificationStatus, now: DateTime<Utc>, notes: impl Into<String>) -> Self {
        Self {
            status,
            date: Some(format_timestamp(&now)),
            notes: notes.into(),
            remote_sync: RemoteSync::NotAttempted,
        }
    }

    pub fn pending(now: DateTime<Utc>) -> Self {
        Self::new(VerificationStatus::Pending, now, "")
    }
}

/// CRM連携レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmState {
    pub status: CrmStatus,

    #[serde(default)]
    pub date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crm_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CrmState {
    pub fn not_synced() -> Self {
        Self {
            status: CrmStatus::NotSynced,
            date: None,
            crm_id: None,
            error: None,
        }
    }

    pub fn with_status(status: CrmStatus, now: DateTime<Utc>) -> Self {
        Self {
            status,
            date: Some(format_timestamp(&now)),
            crm_id: None,
            error: None,
        }
    }
}

/// リモート書き込みの結果
///
/// 書き込みは常にローカル先行。サーバーへの反映結果だけをここに残す。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RemoteSync {
    #[default]
    NotAttempted,
    Synced,
    LocalOnly { reason: String },
}

/// `/analyze` のレスポンス
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,

    /// 0-10
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_readiness_score: Option<f64>,

    #[serde(default)]
    pub score_components: BTreeMap<String, f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_size_indicator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_indicators: Option<BTreeMap<String, TechCategory>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leadership_team: Option<Vec<Value>>,

    #[serde(default)]
    pub transformation_opportunities: Vec<Opportunity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_insights: Option<SalesInsights>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<Verification>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crm: Option<CrmState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment_match: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financials: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_details: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry_details: Option<Value>,

    /// pages_analyzed, contact_info など
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,
}

/// 保存済みリード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    /// `lead_<timestamp>`、作成後は不変
    pub id: String,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub company_name: String,

    #[serde(with = "timestamp")]
    pub date_added: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_readiness_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_size_indicator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_indicators: Option<BTreeMap<String, TechCategory>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leadership_team: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_insights: Option<SalesInsights>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<Verification>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crm: Option<CrmState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment_match: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financials: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_details: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry_details: Option<Value>,

    /// `/save-lead` への反映結果
    #[serde(default)]
    pub remote_sync: RemoteSync,
}

impl Lead {
    /// 最小構成のリード（テスト・サーバー統合用）
    pub fn new(id: impl Into<String>, company_name: impl Into<String>, date_added: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            url: String::new(),
            company_name: company_name.into(),
            date_added,
            ai_readiness_score: None,
            company_size_indicator: None,
            tech_indicators: None,
            leadership_team: None,
            sales_insights: None,
            verification: None,
            crm: None,
            investment_match: None,
            financials: None,
            business_details: None,
            industry_details: None,
            remote_sync: RemoteSync::NotAttempted,
        }
    }

    pub fn tier(&self) -> Option<LeadTier> {
        self.sales_insights.as_ref().and_then(|s| s.lead_tier)
    }

    pub fn lead_score(&self) -> Option<f64> {
        self.sales_insights.as_ref().and_then(|s| s.lead_score)
    }

    pub fn verification_status(&self) -> Option<VerificationStatus> {
        self.verification.as_ref().map(|v| v.status)
    }

    pub fn crm_status(&self) -> Option<CrmStatus> {
        self.crm.as_ref().map(|c| c.status)
    }

    pub fn primary_contact(&self) -> Option<&PrimaryContact> {
        self.sales_insights.as_ref().and_then(|s| s.primary_contact.as_ref())
    }

    /// 投資適合度（`investment_match.match_tier`）
    pub fn investment_tier(&self) -> Option<&str> {
        self.investment_match
            .as_ref()
            .and_then(|m| m.get("match_tier"))
            .and_then(Value::as_str)
    }

    pub fn company_size(&self) -> Option<CompanySize> {
        self.company_size_indicator
            .as_deref()
            .map(CompanySize::from_indicator)
    }
}

/// JSの `toISOString()` と同じ形式で出力
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// タイムスタンプ文字列を寛容にパース
///
/// RFC 3339、タイムゾーンなしのISO形式（UTCとみなす）、日付のみを受け付ける
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    None
}

/// `date_added` 用のserdeアダプタ
pub mod timestamp {
    use super::{format_timestamp, parse_timestamp};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
    }
}
