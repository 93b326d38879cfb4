//! 解析結果からリードを組み立てる

use crate::error::{LeadAiError, Result};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use lead_ai_common::types::{AnalysisReport, CrmState, Lead, Verification};
use regex::Regex;
use reqwest::Url;

lazy_static! {
    static ref SCHEME_RE: Regex = Regex::new(r"^https?://").unwrap();
}

/// 入力URLの正規化（前後空白除去、スキーム補完）
pub fn normalize_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LeadAiError::InvalidUrl("URLを入力してください".into()));
    }
    let candidate = if SCHEME_RE.is_match(trimmed) {
        trimmed.to_string()
    } else if trimmed.contains("://") {
        return Err(LeadAiError::InvalidUrl(raw.to_string()));
    } else {
        format!("https://{}", trimmed)
    };
    match Url::parse(&candidate) {
        Ok(url) if url.host_str().is_some() => Ok(candidate),
        _ => Err(LeadAiError::InvalidUrl(raw.to_string())),
    }
}

/// ホスト名から会社名を作る（先頭の `www.` は除く）
pub fn company_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// 表示用URL（スキームと末尾スラッシュを除く）
pub fn display_url(url: &str) -> String {
    SCHEME_RE.replace(url, "").trim_end_matches('/').to_string()
}

/// 解析結果から新しいリードを作る
///
/// 検証は Pending、CRMは未同期で初期化する。報告側に既にあればそれを使う。
pub fn new_lead_from_report(report: &AnalysisReport, url: &str, id: String, now: DateTime<Utc>) -> Lead {
    let company_name = report
        .company_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .or_else(|| company_from_url(url))
        .unwrap_or_else(|| display_url(url));

    let mut lead = Lead::new(id, company_name, now);
    lead.url = report.url.clone().unwrap_or_else(|| url.to_string());
    lead.ai_readiness_score = report.ai_readiness_score;
    lead.company_size_indicator = report.company_size_indicator.clone();
    lead.tech_indicators = report.tech_indicators.clone();
    lead.leadership_team = report.leadership_team.clone();
    lead.sales_insights = report.sales_insights.clone();
    lead.verification = Some(
        report
            .verification
            .clone()
            .unwrap_or_else(|| Verification::pending(now)),
    );
    lead.crm = Some(report.crm.clone().unwrap_or_else(CrmState::not_synced));
    lead.investment_match = report.investment_match.clone();
    lead.financials = report.financials.clone();
    lead.business_details = report.business_details.clone();
    lead.industry_details = report.industry_details.clone();
    lead
}

/// `lead_<ミリ秒>` 形式のID
pub fn lead_id(now: DateTime<Utc>) -> String {
    format!("lead_{}", now.timestamp_millis())
}
