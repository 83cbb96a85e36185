//! Schedule Extraction Module
//!
//! セルグリッドからスケジュールエントリ列を抽出するエンジン本体。
//! テーマ一覧 → 日付区間 → タイムスロット → 列の役割 → セル分類 → 重複除去 の順に処理し、
//! 最後にラウンドテーブル補遺を加える。処理はグリッドの純粋関数で、I/Oを行わない。

mod classify;
mod columns;
mod days;
mod dedup;
mod names;
mod slots;

use crate::api::{Category, ExtractionMode};
use crate::error::GridScheduleError;
use crate::grid::CellGrid;
use crate::layout::{GridLayout, RoundtableAddendum};
use crate::text::{dedupe_preserving_order, normalize_space};
use crate::themes::ThemeDirectory;
use crate::types::{DaySection, ScheduleEntry};

use classify::{CellContext, EntryClassifier};
use columns::ColumnRoles;

/// 抽出結果
///
/// エントリは (日, 開始, 終了, 並び順キー, 部屋名) の順に並び、重複は取り除かれています。
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    /// スケジュールエントリ
    pub entries: Vec<ScheduleEntry>,
    /// グリッドから構築したテーマ一覧
    pub themes: ThemeDirectory,
    /// 日付区間（上から順）
    pub days: Vec<DaySection>,
}

impl Schedule {
    /// エントリが1件もないか
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 指定された区分のエントリを走査する
    pub fn entries_in(&self, category: Category) -> impl Iterator<Item = &ScheduleEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }
}

/// グリッドからスケジュールを抽出する
///
/// # 発生し得るエラー
///
/// * `GridScheduleError::Config` - レイアウトの列指定が不正
/// * `GridScheduleError::EmptyGrid` - グリッドに使用行がない
/// * `GridScheduleError::MalformedDayLabel` - 日付見出しを解決できない
pub(crate) fn extract(
    grid: &CellGrid,
    layout: &GridLayout,
    mode: ExtractionMode,
) -> Result<Schedule, GridScheduleError> {
    let plan = layout.column_plan()?;
    let themes = ThemeDirectory::build(grid, layout);
    let sections = days::build_day_sections(grid, layout, &plan)?;
    let slots = slots::scan_time_slots(grid, &plan, &sections);
    let roles = ColumnRoles::resolve(grid, &plan, &sections, &slots, &themes);
    let classifier = EntryClassifier::new(layout, &themes, mode);

    let mut entries = Vec::new();
    for slot in &slots {
        let section = &sections[slot.section];

        for (position, &col) in plan.grid.iter().enumerate() {
            let Some(base) = grid.get_at(slot.header_row, col) else {
                continue;
            };
            let Some(room) = roles.room(slot.section, col) else {
                log::debug!(
                    "row {}: dropping cell without a room mapping: '{}'",
                    slot.header_row,
                    normalize_space(base)
                );
                continue;
            };

            let cell = CellContext {
                day: section.date,
                slot,
                room,
                base,
                details: slot
                    .detail_rows()
                    .map(|row| grid.get_at(row, col).unwrap_or_default())
                    .collect(),
                hint: roles.hint(col),
                sort_key: (position as u32 + 1) * 10,
            };
            if let Some(entry) = classifier.classify(&cell) {
                entries.push(entry);
            }
        }
    }

    if let Some(addendum) = &layout.roundtable {
        entries.extend(roundtable_entries(
            grid,
            layout,
            addendum,
            &sections,
            &classifier,
            &themes,
            mode,
        ));
    }

    let extracted = entries.len();
    let entries = dedup::dedupe_entries(entries);
    log::info!(
        "extracted {} entries ({} before dedup) from {} days, {} slots, {} themes",
        entries.len(),
        extracted,
        sections.len(),
        slots.len(),
        themes.len()
    );

    Ok(Schedule {
        entries,
        themes,
        days: sections,
    })
}

/// ラウンドテーブル補遺からエントリを生成する
///
/// 注記セルに時刻範囲がない場合、テーブル名行かストリーム行が空の場合は何も生成しません。
fn roundtable_entries(
    grid: &CellGrid,
    layout: &GridLayout,
    addendum: &RoundtableAddendum,
    sections: &[DaySection],
    classifier: &EntryClassifier<'_>,
    themes: &ThemeDirectory,
    mode: ExtractionMode,
) -> Vec<ScheduleEntry> {
    let Some((start, end)) = grid
        .get(addendum.note_row, &addendum.note_column)
        .and_then(slots::find_time_range)
    else {
        return Vec::new();
    };

    let day = match (addendum.day, sections.last()) {
        (Some(day), _) if sections.iter().any(|s| s.date == day) => day,
        (Some(day), _) => {
            log::warn!("roundtable day {} is not a day in the grid; skipping addendum", day);
            return Vec::new();
        }
        (None, Some(last)) => last.date,
        (None, None) => return Vec::new(),
    };

    let label = layout.roundtable_label.as_str();
    let mut entries = Vec::new();

    for (i, col) in addendum.columns.iter().enumerate() {
        let table = normalize_space(grid.get(addendum.table_row, col).unwrap_or_default());
        let stream = normalize_space(grid.get(addendum.stream_row, col).unwrap_or_default()).to_uppercase();
        if table.is_empty() || stream.is_empty() {
            continue;
        }

        let found = themes.resolve(&stream);
        let (category, title_display) = match (mode, &found) {
            (ExtractionMode::Directory, Some(found)) => {
                (Category::Theme, themes.label(&found.code).to_string())
            }
            _ => (Category::Session, label.to_string()),
        };

        let mut names = Vec::new();
        for &row in &addendum.people_rows {
            if let Some(cell) = grid.get(row, col) {
                names.extend(classifier.names().extract_names(cell));
            }
        }

        let (theme_code, track) = match found {
            Some(found) => (Some(found.code), found.track),
            None => (None, None),
        };

        entries.push(ScheduleEntry {
            day,
            start,
            end,
            session_block: Some(label.to_string()),
            category,
            theme_code,
            track,
            room: format!("{}{}", addendum.room_prefix, table),
            title_raw: label.to_string(),
            title_display,
            participants: dedupe_preserving_order(names),
            sort_key: addendum
                .sort_base
                .saturating_add((i as u32).saturating_mul(10)),
        });
    }

    log::debug!("roundtable addendum: {} tables", entries.len());
    entries
}
