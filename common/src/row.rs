//! 一覧表示用の行データ
//!
//! バッジや表示文字列はリードのフィールドだけから決まる（固定の対応表）。
//! フィールドが無い場合は「保留/不明」のバッジにフォールバックする。

use crate::types::{CrmStatus, Lead, LeadTier, VerificationStatus};
use serde::Serialize;

/// ステータスバッジ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub label: String,
    pub class: &'static str,
    pub icon: Option<&'static str>,
}

impl Badge {
    fn new(label: &str, class: &'static str, icon: Option<&'static str>) -> Self {
        Self {
            label: label.to_string(),
            class,
            icon,
        }
    }
}

/// コンタクトの簡易表示
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactDisplay {
    pub initials: String,
    pub name: String,
    pub title: String,
}

/// 一覧の1行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadRow {
    pub id: String,
    pub company: String,
    pub url: String,
    pub score: f64,
    pub tier: Badge,
    pub verification: Badge,
    pub crm: Badge,
    pub contact: Option<ContactDisplay>,
}

impl LeadRow {
    pub fn from_lead(lead: &Lead) -> Self {
        Self {
            id: lead.id.clone(),
            company: lead.company_name.clone(),
            url: lead.url.clone(),
            score: lead.ai_readiness_score.unwrap_or(0.0),
            tier: tier_badge(lead.tier()),
            verification: verification_badge(lead.verification_status()),
            crm: crm_badge(lead.crm_status()),
            contact: lead.primary_contact().and_then(|c| {
                initials(&c.name).map(|initials| ContactDisplay {
                    initials,
                    name: c.name.clone(),
                    title: c.title.clone(),
                })
            }),
        }
    }
}

pub fn tier_badge(tier: Option<LeadTier>) -> Badge {
    match tier {
        Some(LeadTier::Hot) => Badge::new("Hot", "tier-hot", None),
        Some(LeadTier::Warm) => Badge::new("Warm", "tier-warm", None),
        Some(other) => Badge::new(other.label(), "tier-nurture", None),
        None => Badge::new("Nurture", "tier-nurture", None),
    }
}

pub fn verification_badge(status: Option<VerificationStatus>) -> Badge {
    match status {
        Some(VerificationStatus::Verified) => Badge::new("Verified", "status-verified", Some("fa-check-circle")),
        Some(VerificationStatus::Flagged) => Badge::new("Flagged", "status-flagged", Some("fa-flag")),
        Some(other) => Badge::new(other.label(), "status-pending", Some("fa-clock")),
        None => Badge::new("Pending", "status-pending", Some("fa-clock")),
    }
}

pub fn crm_badge(status: Option<CrmStatus>) -> Badge {
    match status {
        Some(CrmStatus::Synced) => Badge::new("Synced", "status-synced", Some("fa-check-circle")),
        Some(CrmStatus::Failed) => Badge::new("Failed", "status-failed", Some("fa-exclamation-circle")),
        Some(CrmStatus::Queued) => Badge::new("Queued", "status-queued", Some("fa-sync")),
        Some(other) => Badge::new(other.label(), "status-pending", Some("fa-times-circle")),
        None => Badge::new("Not Synced", "status-pending", Some("fa-times-circle")),
    }
}

/// 姓名の頭文字（1語なら先頭1文字）
pub fn initials(name: &str) -> Option<String> {
    let parts: Vec<&str> = name.split_whitespace().collect();
    let first = parts.first()?.chars().next()?;
    match parts.last() {
        Some(last) if parts.len() > 1 => {
            let last = last.chars().next()?;
            Some(format!("{}{}", first, last))
        }
        _ => Some(first.to_string()),
    }
}
