//! Entry Classifier
//!
//! 占有セル1つ（スロット見出し行のセルと、その下の詳細行）から
//! スケジュールエントリを生成するモジュール。
//! トピック一覧用（Directory）とシード用（Seed）の2通りの規則を持つ。

use chrono::NaiveDate;

use crate::api::{Category, ExtractionMode};
use crate::layout::GridLayout;
use crate::schedule::names::NameHeuristic;
use crate::text::{dedupe_preserving_order, normalize_space, split_lines};
use crate::themes::ThemeDirectory;
use crate::types::{ScheduleEntry, TimeSlot};

/// 分類対象のセルとその文脈
#[derive(Debug, Clone)]
pub(crate) struct CellContext<'a> {
    pub day: NaiveDate,
    pub slot: &'a TimeSlot,
    pub room: &'a str,
    /// スロット見出し行のセル
    pub base: &'a str,
    /// 詳細行のセル（空のセルは空文字列）
    pub details: Vec<&'a str>,
    /// 列の優勢なテーマコード
    pub hint: Option<&'a str>,
    pub sort_key: u32,
}

impl CellContext<'_> {
    fn session_block(&self) -> Option<&str> {
        self.slot.session_block.as_deref()
    }
}

/// 分類結果（エントリのうちセル内容から決まる部分）
struct Classification {
    category: Category,
    theme_code: Option<String>,
    track: Option<u32>,
    title_raw: String,
    title_display: String,
}

/// エントリ分類器
pub(crate) struct EntryClassifier<'a> {
    layout: &'a GridLayout,
    themes: &'a ThemeDirectory,
    names: NameHeuristic<'a>,
    mode: ExtractionMode,
}

impl<'a> EntryClassifier<'a> {
    pub fn new(layout: &'a GridLayout, themes: &'a ThemeDirectory, mode: ExtractionMode) -> Self {
        Self {
            layout,
            themes,
            names: NameHeuristic::new(layout),
            mode,
        }
    }

    pub fn names(&self) -> &NameHeuristic<'a> {
        &self.names
    }

    /// セルを分類してエントリを生成する
    ///
    /// プレースホルダのセルや、どの規則にも一致しないセルは`None`です。
    pub fn classify(&self, cell: &CellContext<'_>) -> Option<ScheduleEntry> {
        let base = normalize_space(cell.base);
        if base.is_empty() || base.eq_ignore_ascii_case(self.layout.placeholder.trim()) {
            return None;
        }

        let classification = match self.mode {
            ExtractionMode::Directory => self.classify_topic(&base, cell)?,
            ExtractionMode::Seed => self.classify_seed(&base, cell),
        };

        let mut participants = self.names.extract_names(cell.base);
        for detail in &cell.details {
            participants.extend(self.names.extract_names(detail));
        }

        Some(ScheduleEntry {
            day: cell.day,
            start: cell.slot.start,
            end: cell.slot.end,
            session_block: cell.slot.session_block.clone(),
            category: classification.category,
            theme_code: classification.theme_code,
            track: classification.track,
            room: cell.room.to_string(),
            title_raw: classification.title_raw,
            title_display: classification.title_display,
            participants: dedupe_preserving_order(participants),
            sort_key: cell.sort_key,
        })
    }

    fn classify_topic(&self, base: &str, cell: &CellContext<'_>) -> Option<Classification> {
        let labelled = |category, theme: Option<(String, Option<u32>)>, label: String| {
            let (theme_code, track) = match theme {
                Some((code, track)) => (Some(code), track),
                None => (None, None),
            };
            Classification {
                category,
                theme_code,
                track,
                title_raw: base.to_string(),
                title_display: label,
            }
        };

        if let Some(found) = self.themes.resolve(base) {
            let label = self.themes.label(&found.code).to_string();
            return Some(labelled(Category::Theme, Some((found.code, found.track)), label));
        }

        let upper = base.to_uppercase();
        if upper.starts_with("SPECIAL EVENT") {
            return Some(labelled(
                Category::Special,
                None,
                self.layout.special_event_label.clone(),
            ));
        }
        if let Some(label) = self.layout.override_label(base) {
            return Some(labelled(Category::Special, None, label.to_string()));
        }

        let block = cell.session_block()?;
        let lowered = block.to_lowercase();
        if self.layout.session_vocabulary.iter().any(|v| *v == lowered) {
            return Some(labelled(Category::Session, None, block.to_string()));
        }
        if lowered.contains(&self.layout.roundtable_marker) {
            return Some(labelled(
                Category::Session,
                None,
                self.layout.roundtable_label.clone(),
            ));
        }

        let first_line = split_lines(cell.base).into_iter().next()?;
        let head = first_line
            .split_once(',')
            .map(|(head, _)| normalize_space(head))
            .unwrap_or(first_line);
        if !self.names.looks_like_person_name(&head) {
            log::debug!("unclassified cell '{}' at {} {}", base, cell.day, cell.slot.start);
            return None;
        }

        match cell.hint {
            Some(code) if cell.slot.is_paper_session() => {
                let label = self.themes.label(code).to_string();
                Some(labelled(Category::Theme, Some((code.to_string(), None)), label))
            }
            _ => Some(labelled(Category::Session, None, block.to_string())),
        }
    }

    fn classify_seed(&self, base: &str, cell: &CellContext<'_>) -> Classification {
        let chosen = self.names.choose_title_raw(cell.base, &cell.details);

        let mut title_display = self.names.clean_title_display(&chosen);
        if title_display.is_empty() {
            if let Some(block) = cell.session_block() {
                title_display = self.names.clean_title_display(block);
            }
        }
        if title_display.is_empty() {
            title_display = self.layout.title_fallback.clone();
        }

        let (theme_code, track) = match self
            .themes
            .resolve(base)
            .or_else(|| self.themes.resolve(&chosen))
        {
            Some(found) => (Some(found.code), found.track),
            None if cell.slot.is_paper_session() => (cell.hint.map(str::to_string), None),
            None => (None, None),
        };

        let category = self.keyword_category(cell.session_block(), &title_display, &chosen);

        Classification {
            category,
            theme_code,
            track,
            title_raw: normalize_space(&chosen),
            title_display,
        }
    }

    /// キーワードによる区分判定（休憩 → 特別 → セッションの順）
    pub fn keyword_category(&self, block: Option<&str>, title: &str, raw: &str) -> Category {
        let text = format!("{} {} {}", block.unwrap_or_default(), title, raw).to_lowercase();

        if self.layout.break_keywords.iter().any(|k| text.contains(k.as_str())) {
            Category::Break
        } else if self.layout.special_keywords.iter().any(|k| text.contains(k.as_str())) {
            Category::Special
        } else {
            Category::Session
        }
    }
}
