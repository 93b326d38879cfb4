//! リードのフィルタ
//!
//! 多条件フィルタ仕様に対する純粋な述語。全条件をANDで評価し、
//! 入力の相対順序はそのまま保つ。

use crate::types::{CompanySize, Lead, LeadTier, VerificationStatus};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// 既定の技術フォーカス
pub const DEFAULT_TECH_FOCUS: [&str; 4] = ["ai_ml", "data", "cloud", "integration"];

/// 登録日の絞り込みモード
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateAddedMode {
    #[default]
    All,
    Today,
    Week,
    Month,
    Custom,
}

impl std::str::FromStr for DateAddedMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(DateAddedMode::All),
            "today" => Ok(DateAddedMode::Today),
            "week" => Ok(DateAddedMode::Week),
            "month" => Ok(DateAddedMode::Month),
            "custom" => Ok(DateAddedMode::Custom),
            _ => Err(format!("Unknown date mode: {}. Use all, today, week, month, or custom", s)),
        }
    }
}

/// カスタム期間（どちらの端も省略可）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomDateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// フィルタ仕様
///
/// 「適用」で丸ごと置き換え、「リセット」で全件通過の既定値に戻す
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    pub lead_tier: Vec<LeadTier>,
    /// [min, max]（両端含む）
    pub ai_score: (f64, f64),
    /// OR条件: いずれかのカテゴリを持っていれば通過
    pub tech_focus: Vec<String>,
    pub company_size: Vec<CompanySize>,
    pub verification_status: Vec<VerificationStatus>,
    pub date_added: DateAddedMode,
    pub custom_date_range: CustomDateRange,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            lead_tier: LeadTier::ALL.to_vec(),
            ai_score: (0.0, 10.0),
            tech_focus: DEFAULT_TECH_FOCUS.iter().map(|s| s.to_string()).collect(),
            company_size: CompanySize::ALL.to_vec(),
            verification_status: VerificationStatus::ALL.to_vec(),
            date_added: DateAddedMode::All,
            custom_date_range: CustomDateRange::default(),
        }
    }
}

impl FilterSpec {
    /// 単一リードの判定（`now` は期間計算の基準時刻）
    pub fn matches<Tz: TimeZone>(&self, lead: &Lead, now: &DateTime<Tz>) -> bool {
        self.matches_tier(lead)
            && self.matches_score(lead)
            && self.matches_tech(lead)
            && self.matches_size(lead)
            && self.matches_verification(lead)
            && self.matches_date(lead, now)
    }

    fn matches_tier(&self, lead: &Lead) -> bool {
        // ティアなしのリードは除外しない
        match lead.tier() {
            Some(tier) => self.lead_tier.contains(&tier),
            None => true,
        }
    }

    fn matches_score(&self, lead: &Lead) -> bool {
        // スコアなしは0扱い。範囲が0を含まなければ除外される
        let score = lead.ai_readiness_score.unwrap_or(0.0);
        score >= self.ai_score.0 && score <= self.ai_score.1
    }

    fn matches_tech(&self, lead: &Lead) -> bool {
        match &lead.tech_indicators {
            Some(indicators) => self
                .tech_focus
                .iter()
                .any(|focus| indicators.contains_key(focus)),
            None => true,
        }
    }

    fn matches_size(&self, lead: &Lead) -> bool {
        match lead.company_size() {
            Some(size) => self.company_size.contains(&size),
            None => true,
        }
    }

    fn matches_verification(&self, lead: &Lead) -> bool {
        match lead.verification_status() {
            Some(status) => self.verification_status.contains(&status),
            None => true,
        }
    }

    fn matches_date<Tz: TimeZone>(&self, lead: &Lead, now: &DateTime<Tz>) -> bool {
        let added = lead.date_added;
        let tz = now.timezone();
        let today = now.date_naive();

        match self.date_added {
            DateAddedMode::All => true,
            DateAddedMode::Today => after_start(added, &tz, today),
            DateAddedMode::Week => {
                // 直近の日曜日
                let offset = today.weekday().num_days_from_sunday() as i64;
                after_start(added, &tz, today - Duration::days(offset))
            }
            DateAddedMode::Month => {
                let first = today.with_day(1).unwrap_or(today);
                after_start(added, &tz, first)
            }
            DateAddedMode::Custom => {
                let range = &self.custom_date_range;
                let after_from = range
                    .from
                    .map(|from| after_start(added, &tz, from))
                    .unwrap_or(true);
                let before_to = range
                    .to
                    .map(|to| before_end(added, &tz, to))
                    .unwrap_or(true);
                after_from && before_to
            }
        }
    }
}

/// `day` の現地0時以降か
fn after_start<Tz: TimeZone>(added: DateTime<Utc>, tz: &Tz, day: NaiveDate) -> bool {
    match local_instant(tz, day, NaiveTime::default()) {
        Some(start) => added >= start,
        None => true,
    }
}

/// `day` の現地23:59:59.999以前か
fn before_end<Tz: TimeZone>(added: DateTime<Utc>, tz: &Tz, day: NaiveDate) -> bool {
    let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::default());
    match local_instant(tz, day, end_of_day) {
        Some(end) => added <= end,
        None => true,
    }
}

fn local_instant<Tz: TimeZone>(tz: &Tz, day: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&day.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// フィルタを適用（期間の基準は現在時刻）
pub fn filter_leads(leads: &[Lead], spec: &FilterSpec) -> Vec<Lead> {
    filter_leads_at(leads, spec, &Local::now())
}

/// 基準時刻を指定してフィルタを適用
pub fn filter_leads_at<Tz: TimeZone>(leads: &[Lead], spec: &FilterSpec, now: &DateTime<Tz>) -> Vec<Lead> {
    leads
        .iter()
        .filter(|lead| spec.matches(lead, now))
        .cloned()
        .collect()
}
