//! エクスポート項目の定義と値の取り出し
//!
//! 項目の並び順は `EXPORT_FIELDS` が正。CSV/JSON/Excelすべてこの順で出力する。

use crate::error::{Error, Result};
use crate::types::Lead;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldGroup {
    Company,
    Contact,
    Assessment,
    Verification,
}

impl FieldGroup {
    /// JSON出力でのグループ名
    pub fn json_key(&self) -> &'static str {
        match self {
            FieldGroup::Company => "company",
            FieldGroup::Contact => "contact",
            FieldGroup::Assessment => "assessment",
            FieldGroup::Verification => "verification",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportField {
    CompanyName,
    Website,
    CompanySize,
    Industry,
    Location,
    ContactName,
    ContactTitle,
    ContactEmail,
    ContactPhone,
    AiScore,
    LeadScore,
    LeadTier,
    TechIndicators,
    Approach,
    PainPoints,
    VerificationStatus,
    VerificationDate,
    VerificationNotes,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDefinition {
    pub field: ExportField,
    pub group: FieldGroup,
    /// CLIで指定するキー（`company.name` など）
    pub key: &'static str,
    /// CSV/Excelのヘッダー
    pub label: &'static str,
    /// JSONのグループ内キー
    pub json_key: &'static str,
}

const fn def(
    field: ExportField,
    group: FieldGroup,
    key: &'static str,
    label: &'static str,
    json_key: &'static str,
) -> FieldDefinition {
    FieldDefinition { field, group, key, label, json_key }
}

pub const EXPORT_FIELDS: &[FieldDefinition] = &[
    def(ExportField::CompanyName, FieldGroup::Company, "company.name", "Company Name", "name"),
    def(ExportField::Website, FieldGroup::Company, "company.website", "Website", "website"),
    def(ExportField::CompanySize, FieldGroup::Company, "company.size", "Company Size", "size"),
    def(ExportField::Industry, FieldGroup::Company, "company.industry", "Industry", "industry"),
    def(ExportField::Location, FieldGroup::Company, "company.location", "Location", "location"),
    def(ExportField::ContactName, FieldGroup::Contact, "contact.name", "Contact Name", "name"),
    def(ExportField::ContactTitle, FieldGroup::Contact, "contact.title", "Contact Title", "title"),
    def(ExportField::ContactEmail, FieldGroup::Contact, "contact.email", "Contact Email", "email"),
    def(ExportField::ContactPhone, FieldGroup::Contact, "contact.phone", "Contact Phone", "phone"),
    def(ExportField::AiScore, FieldGroup::Assessment, "assessment.aiScore", "AI Readiness Score", "aiReadinessScore"),
    def(ExportField::LeadScore, FieldGroup::Assessment, "assessment.leadScore", "Lead Score", "leadScore"),
    def(ExportField::LeadTier, FieldGroup::Assessment, "assessment.leadTier", "Lead Tier", "leadTier"),
    def(ExportField::TechIndicators, FieldGroup::Assessment, "assessment.techIndicators", "Technology Indicators", "techIndicators"),
    def(ExportField::Approach, FieldGroup::Assessment, "assessment.approach", "Recommended Approach", "recommendedApproach"),
    def(ExportField::PainPoints, FieldGroup::Assessment, "assessment.painPoints", "Pain Points", "painPoints"),
    def(ExportField::VerificationStatus, FieldGroup::Verification, "verification.status", "Verification Status", "status"),
    def(ExportField::VerificationDate, FieldGroup::Verification, "verification.date", "Verification Date", "date"),
    def(ExportField::VerificationNotes, FieldGroup::Verification, "verification.notes", "Verification Notes", "notes"),
];

/// 出力する項目の集合
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    enabled: Vec<ExportField>,
}

impl Default for FieldSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl FieldSelection {
    pub fn all() -> Self {
        Self {
            enabled: EXPORT_FIELDS.iter().map(|d| d.field).collect(),
        }
    }

    pub fn none() -> Self {
        Self { enabled: Vec::new() }
    }

    /// `company.name` 形式、またはグループ名（`contact`）で指定
    pub fn from_keys<S: AsRef<str>>(keys: &[S]) -> Result<Self> {
        let mut selection = Self::none();
        for key in keys {
            let key = key.as_ref().trim();
            let matched: Vec<ExportField> = EXPORT_FIELDS
                .iter()
                .filter(|d| d.key.eq_ignore_ascii_case(key) || d.group.json_key() == key)
                .map(|d| d.field)
                .collect();
            if matched.is_empty() {
                return Err(Error::Parse(format!("unknown export field: {}", key)));
            }
            for field in matched {
                selection.enable(field);
            }
        }
        Ok(selection)
    }

    pub fn enable(&mut self, field: ExportField) {
        if !self.enabled.contains(&field) {
            self.enabled.push(field);
        }
    }

    pub fn contains(&self, field: ExportField) -> bool {
        self.enabled.contains(&field)
    }

    /// 定義順で有効な項目を返す
    pub fn definitions(&self) -> impl Iterator<Item = &'static FieldDefinition> + '_ {
        EXPORT_FIELDS.iter().filter(move |d| self.contains(d.field))
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }
}

/// 表形式出力のセル値
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

/// 表形式（CSV/Excel）向けの値
pub fn cell_value(lead: &Lead, field: ExportField) -> CellValue {
    let contact = lead.primary_contact();
    let text = |s: Option<&str>| CellValue::Text(s.unwrap_or_default().to_string());

    match field {
        ExportField::CompanyName => text(Some(&lead.company_name)),
        ExportField::Website => text(Some(&lead.url)),
        ExportField::CompanySize => text(lead.company_size_indicator.as_deref()),
        ExportField::Industry => text(industry(lead)),
        ExportField::Location => text(location(lead)),
        ExportField::ContactName => text(contact.map(|c| c.name.as_str())),
        ExportField::ContactTitle => text(contact.map(|c| c.title.as_str())),
        ExportField::ContactEmail => text(contact.and_then(|c| c.email.as_deref())),
        ExportField::ContactPhone => text(contact.and_then(|c| c.phone.as_deref())),
        ExportField::AiScore => CellValue::Number(lead.ai_readiness_score.unwrap_or(0.0)),
        ExportField::LeadScore => CellValue::Number(lead.lead_score().unwrap_or(0.0)),
        ExportField::LeadTier => text(lead.tier().map(|t| t.label())),
        ExportField::TechIndicators => CellValue::Text(tech_indicator_names(lead).join(", ")),
        ExportField::Approach => text(approach_focus(lead)),
        ExportField::PainPoints => CellValue::Text(pain_points(lead).join(", ")),
        ExportField::VerificationStatus => CellValue::Text(
            lead.verification_status()
                .map(|s| s.label())
                .unwrap_or("Pending")
                .to_string(),
        ),
        ExportField::VerificationDate => {
            text(lead.verification.as_ref().and_then(|v| v.date.as_deref()))
        }
        ExportField::VerificationNotes => {
            text(lead.verification.as_ref().map(|v| v.notes.as_str()))
        }
    }
}

/// JSON向けの値（値が無い項目はNone）
pub fn json_value(lead: &Lead, field: ExportField) -> Option<Value> {
    let contact = lead.primary_contact();
    let string = |s: Option<&str>| s.map(|s| Value::String(s.to_string()));

    match field {
        ExportField::CompanyName => string(Some(&lead.company_name)),
        ExportField::Website => string(Some(&lead.url)),
        ExportField::CompanySize => string(lead.company_size_indicator.as_deref()),
        ExportField::Industry => string(industry(lead)),
        ExportField::Location => string(location(lead)),
        ExportField::ContactName => string(contact.map(|c| c.name.as_str())),
        ExportField::ContactTitle => string(contact.map(|c| c.title.as_str())),
        ExportField::ContactEmail => string(contact.and_then(|c| c.email.as_deref())),
        ExportField::ContactPhone => string(contact.and_then(|c| c.phone.as_deref())),
        ExportField::AiScore => lead.ai_readiness_score.map(Value::from),
        ExportField::LeadScore => lead.lead_score().map(Value::from),
        ExportField::LeadTier => string(lead.tier().map(|t| t.label())),
        ExportField::TechIndicators => Some(Value::from(tech_indicator_names(lead))),
        ExportField::Approach => string(approach_focus(lead)),
        ExportField::PainPoints => Some(Value::from(pain_points(lead))),
        ExportField::VerificationStatus => string(Some(
            lead.verification_status()
                .map(|s| s.label())
                .unwrap_or("Pending"),
        )),
        ExportField::VerificationDate => string(lead.verification.as_ref().and_then(|v| v.date.as_deref())),
        ExportField::VerificationNotes => string(lead.verification.as_ref().map(|v| v.notes.as_str())),
    }
}

/// 全カテゴリの検出キーワード名
pub fn tech_indicator_names(lead: &Lead) -> Vec<String> {
    lead.tech_indicators
        .iter()
        .flat_map(|categories| categories.values())
        .flat_map(|category| category.indicators.keys().cloned())
        .collect()
}

fn pain_points(lead: &Lead) -> Vec<String> {
    lead.sales_insights
        .as_ref()
        .map(|s| s.pain_points.clone())
        .unwrap_or_default()
}

fn approach_focus(lead: &Lead) -> Option<&str> {
    lead.sales_insights
        .as_ref()
        .and_then(|s| s.outreach_recommendation.as_ref())
        .and_then(|r| r.approach.as_ref())
        .and_then(|a| a.focus.as_deref())
}

fn industry(lead: &Lead) -> Option<&str> {
    lead.industry_details
        .as_ref()
        .and_then(|d| d.get("industry").or_else(|| d.get("sector")))
        .and_then(Value::as_str)
}

fn location(lead: &Lead) -> Option<&str> {
    lead.business_details
        .as_ref()
        .and_then(|d| d.get("location").or_else(|| d.get("headquarters")))
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_from_keys_group_and_field() {
        let selection = FieldSelection::from_keys(&["contact", "assessment.aiScore"]).unwrap();
        assert!(selection.contains(ExportField::ContactPhone));
        assert!(selection.contains(ExportField::AiScore));
        assert!(!selection.contains(ExportField::CompanyName));

        // 定義順で並ぶ
        let labels: Vec<&str> = selection.definitions().map(|d| d.label).collect();
        assert_eq!(labels.first(), Some(&"Contact Name"));
        assert_eq!(labels.last(), Some(&"AI Readiness Score"));
    }

    #[test]
    fn test_from_keys_unknown() {
        assert!(FieldSelection::from_keys(&["company.revenue"]).is_err());
    }

    #[test]
    fn test_verification_status_defaults_to_pending() {
        let lead = Lead::new("lead_1", "Acme", Utc::now());
        assert_eq!(
            cell_value(&lead, ExportField::VerificationStatus),
            CellValue::Text("Pending".into())
        );
        assert_eq!(json_value(&lead, ExportField::ContactName), None);
        assert_eq!(json_value(&lead, ExportField::AiScore), None);
        assert_eq!(cell_value(&lead, ExportField::AiScore), CellValue::Number(0.0));
    }

    #[test]
    fn test_industry_from_details() {
        let mut lead = Lead::new("lead_1", "Acme", Utc::now());
        lead.industry_details = Some(serde_json::json!({"industry": "Logistics"}));
        assert_eq!(cell_value(&lead, ExportField::Industry), CellValue::Text("Logistics".into()));
    }
}
