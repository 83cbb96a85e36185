//! Time-Slot Scanner
//!
//! 日付区間内で時刻列に「HH:MM-HH:MM」を持つ行をスロット見出しとして検出し、
//! 次のスロット見出しまでの行範囲を割り当てる。

use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::grid::CellGrid;
use crate::layout::ColumnPlan;
use crate::text::normalize_space;
use crate::types::{DaySection, TimeSlot};

static TIME_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*(\d{1,2}:\d{2})\s*-\s*(\d{1,2}:\d{2})(.*)$").expect("valid time range regex")
});
static TIME_RANGE_SEARCH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}:\d{2})\s*-\s*(\d{1,2}:\d{2})").expect("valid time search regex")
});

/// 時刻範囲セルの解析結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TimeBlock {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub session_block: Option<String>,
}

/// "H:MM" / "HH:MM" を時刻に変換する
pub(crate) fn parse_clock(value: &str) -> Option<NaiveTime> {
    let (hour, minute) = value.split_once(':')?;
    NaiveTime::from_hms_opt(hour.parse().ok()?, minute.parse().ok()?, 0)
}

/// セル全体が時刻範囲で始まる場合に解析する
///
/// 形が一致しても時刻として不正な場合（"25:00"など）は`None`を返します。
pub(crate) fn parse_time_block(cell: &str) -> Option<TimeBlock> {
    let caps = TIME_RANGE_RE.captures(cell)?;
    let start = parse_clock(&caps[1]);
    let end = parse_clock(&caps[2]);
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            log::warn!("ignoring time range with invalid clock values: '{}'", &caps[0]);
            return None;
        }
    };

    let remainder = normalize_space(caps.get(3).map(|m| m.as_str()).unwrap_or_default());
    Some(TimeBlock {
        start,
        end,
        session_block: (!remainder.is_empty()).then_some(remainder),
    })
}

/// セルが時刻範囲の形で始まるか（時刻として正しいかは問わない）
pub(crate) fn is_time_header(cell: &str) -> bool {
    TIME_RANGE_RE.is_match(cell)
}

/// 文字列中のどこかにある時刻範囲を探す（補遺の注記セル用）
pub(crate) fn find_time_range(text: &str) -> Option<(NaiveTime, NaiveTime)> {
    let caps = TIME_RANGE_SEARCH_RE.captures(text)?;
    Some((parse_clock(&caps[1])?, parse_clock(&caps[2])?))
}

/// 全区間のタイムスロットを検出する
///
/// 各スロットの終端は同じ区間内の次のスロット見出し行、最後のスロットは区間の終端の次の行です。
/// 時刻の値が不正な見出し行もスロットの境界として扱いますが、その行からはスロットを作りません。
pub(crate) fn scan_time_slots(
    grid: &CellGrid,
    plan: &ColumnPlan,
    sections: &[DaySection],
) -> Vec<TimeSlot> {
    let mut slots = Vec::new();

    for (index, section) in sections.iter().enumerate() {
        let headers: Vec<(u32, Option<TimeBlock>)> = grid
            .column_cells(plan.time)
            .filter(|(row, value)| section.contains(*row) && is_time_header(value))
            .map(|(row, value)| (row, parse_time_block(value)))
            .collect();

        for (pos, (row, block)) in headers.iter().enumerate() {
            let Some(block) = block else {
                log::warn!("row {}: dropping slot with invalid clock values", row);
                continue;
            };
            let end_row = headers
                .get(pos + 1)
                .map(|(next, _)| *next)
                .unwrap_or(section.row_end + 1);
            slots.push(TimeSlot {
                start: block.start,
                end: block.end,
                session_block: block.session_block.clone(),
                section: index,
                header_row: *row,
                end_row,
            });
        }
    }

    slots
}
