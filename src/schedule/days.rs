//! Day Segmentation
//!
//! 日付見出し列を上から走査し、グリッドの使用行範囲を日ごとの区間に分割する。

use chrono::NaiveDate;
use regex::Regex;

use crate::error::GridScheduleError;
use crate::grid::CellGrid;
use crate::layout::{ColumnPlan, GridLayout};
use crate::types::DaySection;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

const MONTH_NAMES: [&str; 13] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "sept", "october", "november", "december",
];

/// 日付見出しの判定と解析に使う正規表現
pub(crate) struct DayLabelMatcher {
    weekday: Regex,
    shape: Regex,
    month_year: Regex,
    fields: Regex,
}

impl DayLabelMatcher {
    pub fn new(layout: &GridLayout) -> Result<Self, GridScheduleError> {
        let names: Vec<String> = layout
            .weekdays
            .iter()
            .map(|w| w.trim())
            .filter(|w| !w.is_empty())
            .map(regex::escape)
            .collect();
        let alternation = names.join("|");

        let build = |pattern: String| {
            Regex::new(&pattern).map_err(|e| {
                GridScheduleError::Config(format!("Invalid weekday pattern: {}", e))
            })
        };

        Ok(Self {
            weekday: build(format!(r"(?i)\b(?:{})\b", alternation))?,
            shape: build(r"(?i)\b\d{1,2}\s+[A-Za-z]+\s+\d{4}\b".to_string())?,
            month_year: build(format!(
                r"(?i)\b(?:{}|{})\.?\s+\d{{4}}\b",
                MONTH_NAMES.join("|"),
                MONTHS.join("|")
            ))?,
            fields: build(format!(
                r"(?i)\b(?:{})\s+(\d{{1,2}})\s+([A-Za-z]+)\s+(\d{{4}})",
                alternation
            ))?,
        })
    }

    /// 日付見出しの候補か
    ///
    /// 曜日名に加えて、「日 月名 年」の形か「月名 年」のどちらかを含む行です。
    /// 候補になった見出しは`parse`で解決できなければ致命的なエラーになります。
    pub fn is_candidate(&self, label: &str) -> bool {
        self.weekday.is_match(label)
            && (self.shape.is_match(label) || self.month_year.is_match(label))
    }

    /// 見出しから暦日を解決する
    ///
    /// 月名は先頭3文字の略称で照合します。
    pub fn parse(&self, label: &str) -> Option<NaiveDate> {
        let caps = self.fields.captures(label)?;
        let day: u32 = caps[1].parse().ok()?;
        let month_name = caps[2].to_lowercase();
        let year: i32 = caps[3].parse().ok()?;

        let abbrev: String = month_name.chars().take(3).collect();
        let month = MONTHS.iter().position(|m| *m == abbrev)? as u32 + 1;
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// グリッドを日付区間に分割する
///
/// 最初の区間はグリッドの最初の使用行から、最後の区間は最後の使用行までを覆います。
/// 日付見出しが1つもない場合は空のリストを返します。
///
/// # 発生し得るエラー
///
/// * `GridScheduleError::EmptyGrid` - 使用行が1つもない場合
/// * `GridScheduleError::MalformedDayLabel` - 見出し候補の日付を解決できない場合
pub(crate) fn build_day_sections(
    grid: &CellGrid,
    layout: &GridLayout,
    plan: &ColumnPlan,
) -> Result<Vec<DaySection>, GridScheduleError> {
    let (first_row, last_row) = match (grid.first_row(), grid.last_row()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(GridScheduleError::EmptyGrid),
    };

    let matcher = DayLabelMatcher::new(layout)?;
    let mut headers: Vec<(u32, NaiveDate, String)> = Vec::new();

    for (row, label) in grid.column_cells(plan.label) {
        if !matcher.is_candidate(label) {
            continue;
        }
        let date = matcher
            .parse(label)
            .ok_or_else(|| GridScheduleError::MalformedDayLabel {
                row,
                label: label.to_string(),
            })?;
        headers.push((row, date, label.to_string()));
    }

    let mut sections = Vec::with_capacity(headers.len());
    for (idx, (header_row, date, label)) in headers.iter().enumerate() {
        let row_start = if idx == 0 { first_row } else { *header_row };
        let row_end = match headers.get(idx + 1) {
            Some((next_row, _, _)) => next_row - 1,
            None => last_row,
        };

        sections.push(DaySection {
            row_start,
            row_end,
            date: *date,
            header_row: *header_row,
            label: label.clone(),
            room_row: find_room_row(grid, plan, *header_row),
        });
    }

    log::debug!("day sections: {}", sections.len());
    Ok(sections)
}

/// 部屋名の行を探す
///
/// 通常は日付見出し行そのもの。見出し行の最初の部屋列が空の場合は、
/// 上下2行以内で最初の2列がともに埋まっている行を探します。
fn find_room_row(grid: &CellGrid, plan: &ColumnPlan, header_row: u32) -> u32 {
    let (first, second) = match (plan.grid.first(), plan.grid.get(1)) {
        (Some(first), Some(second)) => (*first, *second),
        _ => return header_row,
    };

    if grid.get_at(header_row, first).is_some() {
        return header_row;
    }

    let probe_start = header_row.saturating_sub(2).max(1);
    (probe_start..=header_row + 2)
        .find(|&row| grid.get_at(row, first).is_some() && grid.get_at(row, second).is_some())
        .unwrap_or(header_row)
}
