//! CSV生成
//!
//! 文字列セルはすべてダブルクォートで囲み、内部の `"` は二重化する。
//! 数値セルはクォートしない。

use super::fields::{cell_value, CellValue, FieldSelection};
use crate::types::Lead;

/// 数値セルの表記（整数値なら小数点なし）
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

fn format_cell(value: &CellValue) -> String {
    match value {
        CellValue::Text(text) => quote(text),
        CellValue::Number(n) => format_number(*n),
    }
}

/// ヘッダー行 + 1リード1行
pub fn generate_csv(leads: &[Lead], selection: &FieldSelection) -> String {
    let mut lines = Vec::with_capacity(leads.len() + 1);

    let header: Vec<String> = selection.definitions().map(|d| quote(d.label)).collect();
    lines.push(header.join(","));

    for lead in leads {
        let row: Vec<String> = selection
            .definitions()
            .map(|d| format_cell(&cell_value(lead, d.field)))
            .collect();
        lines.push(row.join(","));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fields::ExportField;
    use chrono::Utc;

    #[test]
    fn test_quotes_are_doubled() {
        let mut lead = Lead::new("lead_1", "Acme \"Rockets\", Inc", Utc::now());
        lead.ai_readiness_score = Some(7.0);
        let mut selection = FieldSelection::none();
        selection.enable(ExportField::CompanyName);
        selection.enable(ExportField::AiScore);

        let csv = generate_csv(&[lead], &selection);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "\"Company Name\",\"AI Readiness Score\"");
        assert_eq!(lines[1], "\"Acme \"\"Rockets\"\", Inc\",7");
    }

    #[test]
    fn test_header_only_for_no_leads() {
        let csv = generate_csv(&[], &FieldSelection::all());
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("\"Company Name\",\"Website\""));
        assert!(csv.ends_with("\"Verification Notes\""));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(7.0), "7");
        assert_eq!(format_number(6.5), "6.5");
    }
}
