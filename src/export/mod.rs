//! ローカルエクスポート（CSV / JSON / Excel）

use crate::error::{LeadAiError, Result};
use clap::ValueEnum;
use lead_ai_common::export::{csv_core, json_core, FieldSelection};
use lead_ai_common::Lead;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Excel,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Excel => write!(f, "excel"),
            ExportFormat::Pdf => write!(f, "pdf"),
        }
    }
}

/// 出力先がディレクトリ（または拡張子なし）なら `<title>.<ext>` を付ける
pub fn output_path_for_format(output: &Path, title: &str, format: ExportFormat) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", title, format.extension()))
    } else {
        output.to_path_buf()
    }
}

/// 形式ごとのバイト列を生成
pub fn render_leads(leads: &[Lead], format: ExportFormat, selection: &FieldSelection) -> Result<Vec<u8>> {
    if selection.is_empty() {
        return Err(LeadAiError::Export("出力項目が選択されていません".into()));
    }
    match format {
        ExportFormat::Csv => Ok(csv_core::generate_csv(leads, selection).into_bytes()),
        ExportFormat::Json => Ok(json_core::generate_json(leads, selection)?.into_bytes()),
        ExportFormat::Excel => {
            Ok(lead_ai_common::export::excel_core::generate_excel_buffer(leads, selection)?)
        }
        ExportFormat::Pdf => Err(LeadAiError::Export(
            "PDF出力はローカルでは未対応です。csv / json / excel を指定してください".into(),
        )),
    }
}

/// リードをファイルに書き出し、出力パスを返す
pub fn export_leads(
    leads: &[Lead],
    format: ExportFormat,
    selection: &FieldSelection,
    output: &Path,
    title: &str,
) -> Result<PathBuf> {
    let bytes = render_leads(leads, format, selection)?;
    let output_path = output_path_for_format(output, title, format);
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&output_path, bytes)?;
    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    #[test]
    fn test_output_path_for_dir() {
        let dir = tempdir().unwrap();
        let path = output_path_for_format(dir.path(), "leads", ExportFormat::Excel);
        assert_eq!(path, dir.path().join("leads.xlsx"));

        let explicit = dir.path().join("out.csv");
        assert_eq!(output_path_for_format(&explicit, "leads", ExportFormat::Csv), explicit);
    }

    #[test]
    fn test_pdf_is_rejected() {
        let leads = vec![Lead::new("lead_1", "Acme", Utc::now())];
        let err = render_leads(&leads, ExportFormat::Pdf, &FieldSelection::all()).unwrap_err();
        assert!(matches!(err, LeadAiError::Export(_)));
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let leads = vec![Lead::new("lead_1", "Acme", Utc::now())];
        assert!(render_leads(&leads, ExportFormat::Csv, &FieldSelection::none()).is_err());
    }
}
