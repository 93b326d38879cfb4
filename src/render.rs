//! 端末への表示

use crate::analysis::display_url;
use crate::controller::DashboardView;
use crate::notice::Notice;
use indicatif::{ProgressBar, ProgressStyle};
use lead_ai_common::report::{component_max, format_category_name, score_description};
use lead_ai_common::row::LeadRow;
use lead_ai_common::{AnalysisReport, Lead};
use std::time::Duration;

const COMPANY_WIDTH: usize = 28;

/// 待機中スピナー
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

pub fn print_notices(notices: &[Notice]) {
    for notice in notices {
        println!("{}", notice);
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn badge_text(badge: &lead_ai_common::Badge) -> String {
    badge.label.clone()
}

fn format_row(row: &LeadRow) -> String {
    let contact = row
        .contact
        .as_ref()
        .map(|c| format!("{} ({})", c.name, c.initials))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:<22} {:<width$} {:>5.1} {:<8} {:<9} {:<11} {}",
        row.id,
        truncate(&row.company, COMPANY_WIDTH),
        row.score,
        badge_text(&row.tier),
        badge_text(&row.verification),
        badge_text(&row.crm),
        contact,
        width = COMPANY_WIDTH
    )
}

/// ダッシュボードを表として描画
pub fn render_dashboard(view: &DashboardView) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{:<22} {:<width$} {:>5} {:<8} {:<9} {:<11} {}",
        "ID",
        "Company",
        "Score",
        "Tier",
        "Verified",
        "CRM",
        "Contact",
        width = COMPANY_WIDTH
    ));
    lines.push("-".repeat(100));

    if view.is_empty() {
        lines.push("No leads match the current filters.".to_string());
    } else {
        lines.extend(view.rows.iter().map(format_row));
    }

    lines.push(String::new());
    lines.push(format!(
        "{}  ({} shown / {} saved, sort: {} {})",
        view.page_info.indicator(),
        view.page_info.total_items,
        view.total_saved,
        view.sort.field,
        view.sort.direction
    ));
    lines.join("\n")
}

/// 解析結果の要約
pub fn render_report(url: &str, report: &AnalysisReport) -> String {
    let mut lines = Vec::new();
    let name = report
        .company_name
        .clone()
        .unwrap_or_else(|| display_url(url));
    lines.push(format!("🏢 {}  ({})", name, display_url(url)));

    if let Some(score) = report.ai_readiness_score {
        lines.push(format!("AI Readiness: {:.1}/10", score));
        lines.push(format!("  {}", score_description(score)));
    }

    for (component, value) in &report.score_components {
        match component_max(component) {
            Some(max) => lines.push(format!("  {:<18} {:.1}/{}", component, value, max)),
            None => lines.push(format!("  {:<18} {:.1}", component, value)),
        }
    }

    if let Some(size) = &report.company_size_indicator {
        lines.push(format!("Company size: {}", size));
    }

    if let Some(categories) = &report.tech_indicators {
        lines.push("Technology indicators:".to_string());
        for (key, category) in categories {
            let names: Vec<&str> = category.indicators.keys().map(String::as_str).collect();
            lines.push(format!(
                "  {:<24} {:>3}  {}",
                format_category_name(key),
                category.total,
                names.join(", ")
            ));
        }
    }

    if let Some(insights) = &report.sales_insights {
        let tier = insights.lead_tier.map(|t| t.label()).unwrap_or("-");
        let score = insights
            .lead_score
            .map(|s| format!("{:.0}", s))
            .unwrap_or_else(|| "-".into());
        lines.push(format!("Lead: {} (score {})", tier, score));
        if let Some(contact) = &insights.primary_contact {
            lines.push(format!("  Contact: {}, {}", contact.name, contact.title));
        }
        for pain in &insights.pain_points {
            lines.push(format!("  • {}", pain));
        }
    }

    if !report.transformation_opportunities.is_empty() {
        lines.push("Opportunities:".to_string());
        for opportunity in &report.transformation_opportunities {
            lines.push(format!("  - {}: {}", opportunity.title, opportunity.description));
        }
    }

    lines.join("\n")
}

/// リード詳細
pub fn render_lead(lead: &Lead) -> String {
    let row = LeadRow::from_lead(lead);
    let mut lines = vec![
        format!("{} [{}]", lead.company_name, lead.id),
        format!("  URL:          {}", lead.url),
        format!("  Added:        {}", lead.date_added.format("%Y-%m-%d %H:%M")),
        format!("  AI score:     {:.1}", row.score),
        format!("  Tier:         {}", row.tier.label),
        format!("  Verification: {}", row.verification.label),
        format!("  CRM:          {}", row.crm.label),
    ];
    if let Some(verification) = &lead.verification {
        if !verification.notes.is_empty() {
            lines.push(format!("  Notes:        {}", verification.notes));
        }
    }
    if let Some(tier) = lead.investment_tier() {
        lines.push(format!("  Investment:   {}", tier));
    }
    lines.join("\n")
}
