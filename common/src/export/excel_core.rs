//! Excel生成（共通ライブラリ）
//!
//! fields.rs の定義順で1シートのリード一覧を生成

use super::fields::{cell_value, CellValue, FieldSelection};
use crate::error::{Error, Result};
use crate::types::Lead;
use rust_xlsxwriter::*;

const SHEET_NAME: &str = "Leads";
const DEFAULT_COL_WIDTH: f64 = 18.0;
const WIDE_COL_WIDTH: f64 = 40.0;

fn xlsx_err(context: &str) -> impl Fn(XlsxError) -> Error + '_ {
    move |e| Error::Export(format!("{}: {}", context, e))
}

/// Excelをバッファに生成
pub fn generate_excel_buffer(leads: &[Lead], selection: &FieldSelection) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0x333333))
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xAAAAAA));

    let text_format = Format::new()
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    let number_format = Format::new()
        .set_align(FormatAlign::Right)
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(SHEET_NAME)
        .map_err(xlsx_err("シート名設定エラー"))?;

    for (col, def) in selection.definitions().enumerate() {
        let col = col as u16;
        let width = match def.label {
            "Technology Indicators" | "Recommended Approach" | "Pain Points" | "Verification Notes" => WIDE_COL_WIDTH,
            _ => DEFAULT_COL_WIDTH,
        };
        worksheet
            .set_column_width(col, width)
            .map_err(xlsx_err("列幅設定エラー"))?;
        worksheet
            .write_string_with_format(0, col, def.label, &header_format)
            .map_err(xlsx_err("ヘッダー書き込みエラー"))?;
    }

    for (index, lead) in leads.iter().enumerate() {
        let row = index as u32 + 1;
        for (col, def) in selection.definitions().enumerate() {
            let col = col as u16;
            match cell_value(lead, def.field) {
                CellValue::Text(text) => worksheet
                    .write_string_with_format(row, col, &text, &text_format)
                    .map_err(xlsx_err("値書き込みエラー"))?,
                CellValue::Number(n) => worksheet
                    .write_number_with_format(row, col, n, &number_format)
                    .map_err(xlsx_err("値書き込みエラー"))?,
            };
        }
    }

    worksheet
        .set_freeze_panes(1, 0)
        .map_err(xlsx_err("ウィンドウ枠固定エラー"))?;

    workbook
        .save_to_buffer()
        .map_err(xlsx_err("Excel保存エラー"))
}
