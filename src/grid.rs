//! Grid Module
//!
//! ワークシートから読み取ったセル文字列を、行番号 → 列 → 文字列の
//! スパースな構造として保持するモジュール。
//! 抽出エンジンはこのグリッドを読み取り専用で借用します。

use std::collections::BTreeMap;

use crate::types::{column_letters, column_number};

/// セルグリッド
///
/// 行番号（1始まり）と列番号（1始まり、"A" = 1）をキーとし、
/// 前後の空白を取り除いた空でない文字列だけを保持します。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellGrid {
    rows: BTreeMap<u32, BTreeMap<u32, String>>,
}

impl CellGrid {
    /// 空のグリッドを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// セルを追加する
    ///
    /// 値はtrimされ、空になった場合や列文字が不正な場合は無視されます。
    /// 同じ座標に再度追加した場合は上書きします。
    pub fn insert(&mut self, row: u32, column: &str, value: &str) {
        if let Some(col) = column_number(column) {
            self.insert_at(row, col, value);
        }
    }

    /// 列番号でセルを追加する（内部用）
    pub(crate) fn insert_at(&mut self, row: u32, col: u32, value: &str) {
        let trimmed = value.trim();
        if row == 0 || col == 0 || trimmed.is_empty() {
            return;
        }
        self.rows
            .entry(row)
            .or_default()
            .insert(col, trimmed.to_string());
    }

    /// 行とセルの組からグリッドを構築する
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use gridsched::CellGrid;
    ///
    /// let grid = CellGrid::from_cells([(1, "A", "Wednesday 8 April 2026"), (2, "B", "09:00-10:30")]);
    /// assert_eq!(grid.get(2, "B"), Some("09:00-10:30"));
    /// ```
    pub fn from_cells<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = (u32, &'a str, &'a str)>,
    {
        let mut grid = Self::new();
        for (row, column, value) in cells {
            grid.insert(row, column, value);
        }
        grid
    }

    /// 列文字でセルを取得
    pub fn get(&self, row: u32, column: &str) -> Option<&str> {
        column_number(column).and_then(|col| self.get_at(row, col))
    }

    /// 列番号でセルを取得（内部用）
    pub(crate) fn get_at(&self, row: u32, col: u32) -> Option<&str> {
        self.rows
            .get(&row)
            .and_then(|cells| cells.get(&col))
            .map(|s| s.as_str())
    }

    /// 使用行が1つもないか
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 使用行の数
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// 最初の使用行
    pub fn first_row(&self) -> Option<u32> {
        self.rows.keys().next().copied()
    }

    /// 最後の使用行
    pub fn last_row(&self) -> Option<u32> {
        self.rows.keys().next_back().copied()
    }

    /// 使用行を昇順に走査する（行番号と、列文字→値の組）
    pub fn rows(&self) -> impl Iterator<Item = (u32, Vec<(String, &str)>)> + '_ {
        self.rows.iter().map(|(row, cells)| {
            let values = cells
                .iter()
                .map(|(col, value)| (column_letters(*col), value.as_str()))
                .collect();
            (*row, values)
        })
    }

    /// 指定された列の使用行を昇順に走査する（内部用）
    pub(crate) fn column_cells(&self, col: u32) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.rows
            .iter()
            .filter_map(move |(row, cells)| cells.get(&col).map(|v| (*row, v.as_str())))
    }
}
