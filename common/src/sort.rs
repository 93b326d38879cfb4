//! リードのソート
//!
//! ソート可能なフィールドは閉じた列挙で表し、カテゴリ値はランク表で数値化する。
//! 非破壊（新しいVecを返す）かつ安定ソート。

use crate::types::{CrmStatus, Lead, LeadTier, VerificationStatus};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// ソート可能フィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortField {
    Company,
    Score,
    LeadScore,
    Tier,
    Verification,
    Crm,
    Investment,
    DateAdded,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Company => "company",
            SortField::Score => "score",
            SortField::LeadScore => "lead-score",
            SortField::Tier => "tier",
            SortField::Verification => "verification",
            SortField::Crm => "crm",
            SortField::Investment => "investment",
            SortField::DateAdded => "date-added",
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "company" => Ok(SortField::Company),
            "score" => Ok(SortField::Score),
            "lead-score" => Ok(SortField::LeadScore),
            "tier" => Ok(SortField::Tier),
            "verification" => Ok(SortField::Verification),
            "crm" => Ok(SortField::Crm),
            "investment" => Ok(SortField::Investment),
            "date-added" | "date" => Ok(SortField::DateAdded),
            _ => Err(format!(
                "Unknown sort field: {}. Use company, score, lead-score, tier, verification, crm, investment, or date-added",
                s
            )),
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// ソート仕様
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::LeadScore,
            direction: SortDirection::Desc,
        }
    }
}

pub fn tier_rank(tier: Option<LeadTier>) -> u8 {
    match tier {
        Some(LeadTier::Hot) => 3,
        Some(LeadTier::Warm) => 2,
        Some(LeadTier::Nurture) => 1,
        _ => 0,
    }
}

pub fn verification_rank(status: Option<VerificationStatus>) -> u8 {
    match status {
        Some(VerificationStatus::Verified) => 3,
        Some(VerificationStatus::Pending) => 2,
        Some(VerificationStatus::Flagged) => 1,
        _ => 0,
    }
}

pub fn crm_rank(status: Option<CrmStatus>) -> u8 {
    match status {
        Some(CrmStatus::Synced) => 3,
        Some(CrmStatus::Queued) => 2,
        Some(CrmStatus::Failed) => 1,
        _ => 0,
    }
}

pub fn investment_rank(match_tier: Option<&str>) -> u8 {
    match match_tier {
        Some("Strong Match") => 4,
        Some("Potential Match") => 3,
        Some("Partial Match") => 2,
        Some("Weak Match") => 1,
        _ => 0,
    }
}

/// 比較用に解決したキー
#[derive(Debug, Clone, PartialEq)]
enum SortKey<'a> {
    Text(&'a str),
    Number(f64),
}

fn sort_key(lead: &Lead, field: SortField) -> SortKey<'_> {
    match field {
        SortField::Company => SortKey::Text(&lead.company_name),
        SortField::Score => SortKey::Number(lead.ai_readiness_score.unwrap_or(0.0)),
        SortField::LeadScore => SortKey::Number(lead.lead_score().unwrap_or(0.0)),
        SortField::Tier => SortKey::Number(tier_rank(lead.tier()) as f64),
        SortField::Verification => SortKey::Number(verification_rank(lead.verification_status()) as f64),
        SortField::Crm => SortKey::Number(crm_rank(lead.crm_status()) as f64),
        SortField::Investment => SortKey::Number(investment_rank(lead.investment_tier()) as f64),
        SortField::DateAdded => SortKey::Number(lead.date_added.timestamp_millis() as f64),
    }
}

/// 大文字小文字を無視し、同値ならバイト順で決める
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn compare_keys(a: &SortKey<'_>, b: &SortKey<'_>) -> Ordering {
    match (a, b) {
        (SortKey::Text(a), SortKey::Text(b)) => compare_text(a, b),
        (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
        // 同一フィールドでは型が揃うので到達しない
        (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
    }
}

/// 2件の比較（方向込み）
pub fn compare_leads(a: &Lead, b: &Lead, spec: &SortSpec) -> Ordering {
    let ordering = compare_keys(&sort_key(a, spec.field), &sort_key(b, spec.field));
    match spec.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// ソート済みの新しいVecを返す
pub fn sort_leads(leads: &[Lead], spec: &SortSpec) -> Vec<Lead> {
    let mut sorted = leads.to_vec();
    sorted.sort_by(|a, b| compare_leads(a, b, spec));
    sorted
}
