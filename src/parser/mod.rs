//! Parser Module
//!
//! calamineを使用したワークシートの読み込み。
//! 選択したシートの空でないセルを`CellGrid`に変換します。

mod workbook;

pub(crate) use workbook::WorkbookParser;
