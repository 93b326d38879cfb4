//! エクスポートのコア（CLIと将来のフロントエンドで共有）

pub mod csv_core;
pub mod fields;
pub mod json_core;

#[cfg(feature = "excel")]
pub mod excel_core;

pub use fields::{CellValue, ExportField, FieldSelection, EXPORT_FIELDS};
