//! Workbook Parser
//!
//! calamineのラッパーとして、ワークブックを開き、シートを選択し、
//! セル文字列をグリッドに読み込む。

use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets, Xlsx};
use std::io::{Cursor, Read};

use crate::api::SheetSelector;
use crate::error::GridScheduleError;
use crate::grid::CellGrid;
use crate::security::{check_archive, check_input_size, SecurityConfig};

/// ワークブックパーサー
pub(crate) struct WorkbookParser {
    /// calamineのワークブック（XLSX形式のみサポート）
    workbook: Xlsx<Cursor<Vec<u8>>>,
}

impl WorkbookParser {
    /// ワークブックを開く
    ///
    /// 入力全体をメモリに読み込み、サイズとアーカイブの事前検査を行ってから
    /// calamineで開きます。
    ///
    /// # 発生し得るエラー
    ///
    /// * `GridScheduleError::Io` - 読み込みに失敗した場合
    /// * `GridScheduleError::SecurityViolation` - 入力やアーカイブが制限を超えた場合
    /// * `GridScheduleError::Zip` / `GridScheduleError::Parse` - XLSXとして読めない場合
    /// * `GridScheduleError::Config` - XLSX以外の形式の場合
    pub fn open<R: Read>(mut reader: R, security: &SecurityConfig) -> Result<Self, GridScheduleError> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        check_input_size(buffer.len(), security)?;
        check_archive(Cursor::new(buffer.as_slice()), security)?;

        let sheets = open_workbook_auto_from_rs(Cursor::new(buffer)).map_err(GridScheduleError::Parse)?;
        match sheets {
            Sheets::Xlsx(workbook) => Ok(Self { workbook }),
            _ => Err(GridScheduleError::Config(
                "Only XLSX format is supported".to_string(),
            )),
        }
    }

    /// すべてのシート名を取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// シート選択方式に基づいてシートを1つ選択
    ///
    /// # 発生し得るエラー
    ///
    /// * `GridScheduleError::Config` - シートが見つからない、またはインデックスが範囲外の場合
    pub fn select_sheet(&self, selector: &SheetSelector) -> Result<String, GridScheduleError> {
        let names = self.sheet_names();

        match selector {
            SheetSelector::First => names
                .first()
                .cloned()
                .ok_or_else(|| GridScheduleError::Config("Workbook has no worksheets".to_string())),

            SheetSelector::Index(index) => names.get(*index).cloned().ok_or_else(|| {
                GridScheduleError::Config(format!(
                    "Sheet index {} is out of range (total: {})",
                    index,
                    names.len()
                ))
            }),

            SheetSelector::Name(name) => {
                if !names.contains(name) {
                    return Err(GridScheduleError::Config(format!("Sheet '{}' not found", name)));
                }
                Ok(name.clone())
            }
        }
    }

    /// シートを読み込んでグリッドに変換する
    ///
    /// 行番号・列番号はシート上の絶対位置（1始まり）です。
    /// 空のセルとエラー値のセルは読み込みません。
    pub fn read_grid(&mut self, sheet_name: &str) -> Result<CellGrid, GridScheduleError> {
        let range = self
            .workbook
            .worksheet_range(sheet_name)
            .map_err(|e| GridScheduleError::Parse(e.into()))?;

        let (row_offset, col_offset) = range.start().unwrap_or((0, 0));
        let mut grid = CellGrid::new();

        for (row, col, cell) in range.cells() {
            let value = match cell {
                Data::Empty | Data::Error(_) => continue,
                Data::String(s) => s.clone(),
                other => other.to_string(),
            };
            grid.insert_at(row_offset + row as u32 + 1, col_offset + col as u32 + 1, &value);
        }

        log::debug!("sheet '{}': {} used rows", sheet_name, grid.row_count());
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn workbook_bytes() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let programme = workbook.add_worksheet();
        programme.set_name("Programme").unwrap();
        programme.write_string(3, 1, "  Science, Technology and Society ").unwrap();
        programme.write_string(9, 0, "Wednesday 8 April 2026").unwrap();
        programme.write_number(10, 2, 42.0).unwrap();
        programme.write_string(10, 3, "   ").unwrap();

        let notes = workbook.add_worksheet();
        notes.set_name("Notes").unwrap();
        notes.write_string(0, 0, "Second sheet").unwrap();

        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_read_first_sheet() {
        let mut parser = WorkbookParser::open(Cursor::new(workbook_bytes()), &SecurityConfig::default()).unwrap();
        assert_eq!(parser.sheet_names(), vec!["Programme", "Notes"]);

        let sheet = parser.select_sheet(&SheetSelector::First).unwrap();
        let grid = parser.read_grid(&sheet).unwrap();

        assert_eq!(grid.get(4, "B"), Some("Science, Technology and Society"));
        assert_eq!(grid.get(10, "A"), Some("Wednesday 8 April 2026"));
        assert_eq!(grid.get(11, "C"), Some("42"));
        assert_eq!(grid.get(11, "D"), None);
        assert_eq!(grid.first_row(), Some(4));
    }

    #[test]
    fn test_select_sheet() {
        let parser = WorkbookParser::open(Cursor::new(workbook_bytes()), &SecurityConfig::default()).unwrap();
        assert_eq!(parser.select_sheet(&SheetSelector::Index(1)).unwrap(), "Notes");
        assert_eq!(
            parser.select_sheet(&SheetSelector::Name("Notes".to_string())).unwrap(),
            "Notes"
        );
        assert!(matches!(
            parser.select_sheet(&SheetSelector::Index(2)),
            Err(GridScheduleError::Config(_))
        ));
        assert!(matches!(
            parser.select_sheet(&SheetSelector::Name("Missing".to_string())),
            Err(GridScheduleError::Config(_))
        ));
    }

    #[test]
    fn test_open_rejects_oversized_input() {
        let config = SecurityConfig {
            max_input_file_size: 16,
            ..SecurityConfig::default()
        };
        let result = WorkbookParser::open(Cursor::new(workbook_bytes()), &config);
        assert!(matches!(result, Err(GridScheduleError::SecurityViolation(_))));
    }
}
