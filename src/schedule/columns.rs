//! Column Role Resolver
//!
//! 列ごとの役割（日ごとの部屋名と、ペーパーセッションで優勢なテーマコード）を解決する。

use std::collections::BTreeMap;

use crate::grid::CellGrid;
use crate::layout::ColumnPlan;
use crate::text::normalize_space;
use crate::themes::ThemeDirectory;
use crate::types::{DaySection, TimeSlot};

/// 列の役割
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ColumnRoles {
    /// 日付区間ごとの 列番号 → 部屋名
    rooms: Vec<BTreeMap<u32, String>>,
    /// 列番号 → 優勢なテーマコード
    hints: BTreeMap<u32, String>,
}

impl ColumnRoles {
    pub fn resolve(
        grid: &CellGrid,
        plan: &ColumnPlan,
        sections: &[DaySection],
        slots: &[TimeSlot],
        themes: &ThemeDirectory,
    ) -> Self {
        let rooms = sections
            .iter()
            .map(|section| room_map(grid, plan, section.room_row))
            .collect();

        Self {
            rooms,
            hints: theme_hints(grid, plan, slots, themes),
        }
    }

    /// 指定された日付区間・列の部屋名
    pub fn room(&self, section: usize, col: u32) -> Option<&str> {
        self.rooms
            .get(section)
            .and_then(|rooms| rooms.get(&col))
            .map(|s| s.as_str())
    }

    /// 列の優勢なテーマコード
    pub fn hint(&self, col: u32) -> Option<&str> {
        self.hints.get(&col).map(|s| s.as_str())
    }
}

fn room_map(grid: &CellGrid, plan: &ColumnPlan, room_row: u32) -> BTreeMap<u32, String> {
    plan.grid
        .iter()
        .filter_map(|&col| {
            let room = normalize_space(grid.get_at(room_row, col)?);
            (!room.is_empty()).then(|| (col, room))
        })
        .collect()
}

/// ペーパーセッションのスロット見出し行で、列ごとに解決できたテーマコードを数える
///
/// 最多のコードを列のヒントとし、同数の場合はアルファベット順で最初のコードを選びます。
fn theme_hints(
    grid: &CellGrid,
    plan: &ColumnPlan,
    slots: &[TimeSlot],
    themes: &ThemeDirectory,
) -> BTreeMap<u32, String> {
    let mut counters: BTreeMap<u32, BTreeMap<String, usize>> = BTreeMap::new();

    for slot in slots.iter().filter(|slot| slot.is_paper_session()) {
        for &col in &plan.grid {
            let Some(cell) = grid.get_at(slot.header_row, col) else {
                continue;
            };
            if let Some(code) = themes.resolve_code(cell) {
                *counters.entry(col).or_default().entry(code).or_insert(0) += 1;
            }
        }
    }

    counters
        .into_iter()
        .filter_map(|(col, counts)| {
            // BTreeMapはコード順なので、同数なら先に現れたものを残す
            let mut best: Option<(String, usize)> = None;
            for (code, count) in counts {
                if best.as_ref().map(|(_, c)| count > *c).unwrap_or(true) {
                    best = Some((code, count));
                }
            }
            best.map(|(code, _)| (col, code))
        })
        .collect()
}
