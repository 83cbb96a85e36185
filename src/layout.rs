//! Grid Layout Module
//!
//! プログラムグリッドの配置規約（列の役割、テーマ見出し行、固定ラベル表、
//! 人名判定のストップリストなど）を設定データとして保持するモジュール。
//! グリッドの版が変わっても、このデータを差し替えるだけで対応できるようにします。

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::GridScheduleError;
use crate::types::column_number;

/// 人名ではないと判断する語（大文字）
const DEFAULT_STOPLIST: &[&str] = &[
    "ROUND", "TABLE", "PRESENTATION", "PRESENTATIONS", "PAPER", "SESSION", "SPECIAL", "EVENT",
    "STREAM", "PLENARY", "PLENARIES", "PRESIDENTIAL", "ADDRESS", "REGISTRATION", "REFRESHMENTS",
    "LUNCH", "RECEPTION", "PUBLISHERS", "FORUM", "SOCIOLOGY", "JOURNAL", "SOCIAL", "ENVIRONMENT",
    "SOCIETY", "FAMILIES", "RELATIONSHIPS", "RACE", "ETHNICITY", "MIGRATION", "SCIENCE",
    "TECHNOLOGY", "DIGITAL", "STUDIES", "THEORY", "CULTURE", "MEDIA", "SPORT", "FOOD", "WORK",
    "EMPLOYMENT", "ECONOMIC", "LIFE", "RIGHTS", "VIOLENCE", "CRIME", "METHODOLOGICAL",
    "INNOVATIONS", "CITY", "CITIES", "MOBILITIES", "PLACE", "SPACE", "EMERGING", "THEMES",
    "MEDICINE", "HEALTH", "ILLNESS", "DIVISIONS", "IDENTITIES", "LIFECOURSE", "MONOGRAPH",
    "PUBLISHING", "PANEL", "EXPLORING", "GLOBAL", "CHALLENGES", "SOLIDARITIES", "COMMONALITIES",
    "INTERNATIONAL", "UNIVERSITY",
];

const DEFAULT_OVERRIDES: &[(&str, &str)] = &[
    ("BSA SPECIAL ACTIVITY", "BSA Special Activity"),
    ("EARLY CAREER FORUM EVENT", "Early Career Forum Event"),
    ("MID-CAREER FORUM EVENT", "Mid-Career Forum Event"),
    ("SOCIOLOGY JOURNAL EVENT", "Sociology Journal Event"),
    ("SPECIAL EVENT", "Special Event"),
];

const DEFAULT_GENERIC_LABELS: &[&str] = &[
    "BSA SPECIAL ACTIVITY",
    "EARLY CAREER FORUM EVENT",
    "MID-CAREER FORUM EVENT",
    "SOCIOLOGY JOURNAL EVENT",
];

const DEFAULT_WEEKDAYS: &[&str] = &[
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];

const DEFAULT_SPECIAL_KEYWORDS: &[&str] = &[
    "registration",
    "plenary",
    "presidential address",
    "reception",
    "social",
    "special activity",
    "special event",
    "forum event",
    "journal event",
    "publishers",
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// グリッドの配置規約
///
/// すべての項目にデフォルト値があり、TOMLから一部だけを上書きできます。
///
/// # 使用例
///
/// ```rust
/// use gridsched::GridLayout;
///
/// # fn main() -> Result<(), gridsched::GridScheduleError> {
/// let layout = GridLayout::from_toml_str(r#"
///     last_column = "P"
///     theme_header_rows = [3, 4]
/// "#)?;
/// assert_eq!(layout.last_column, "P");
/// assert_eq!(layout.time_column, "B");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    /// 日付見出しを探す列
    pub label_column: String,
    /// 時刻範囲を読む列
    pub time_column: String,
    /// 部屋・セッションが並ぶ最初の列
    pub first_column: String,
    /// 部屋・セッションが並ぶ最後の列（この列を含む）
    pub last_column: String,
    /// テーマ一覧の見出し行
    pub theme_header_rows: Vec<u32>,
    /// テーマ一覧の（名前列, コード列）の組
    pub theme_column_pairs: Vec<(String, String)>,
    /// 日付見出しとして認める曜日名
    pub weekdays: Vec<String>,
    /// 特別イベントの固定ラベル（大文字キー → 表示ラベル）
    pub override_labels: BTreeMap<String, String>,
    /// 詳細行から実際のタイトルを拾う汎用ラベル（大文字）
    pub generic_labels: Vec<String>,
    /// そのままセッション名として採用するセッション区分（小文字）
    pub session_vocabulary: Vec<String>,
    /// ラウンドテーブルを示す語（小文字）
    pub roundtable_marker: String,
    /// ラウンドテーブルの正規ラベル
    pub roundtable_label: String,
    /// `SPECIAL EVENT`で始まるセルのラベル
    pub special_event_label: String,
    /// 空欄扱いにするプレースホルダ（小文字）
    pub placeholder: String,
    /// 表示用タイトルが何も残らなかった場合の代替
    pub title_fallback: String,
    /// 人名判定のストップリスト（大文字）
    pub stoplist: BTreeSet<String>,
    /// 休憩と判断するキーワード（小文字）
    pub break_keywords: Vec<String>,
    /// 特別イベントと判断するキーワード（小文字）
    pub special_keywords: Vec<String>,
    /// ラウンドテーブル補遺（`None`の場合は読まない）
    pub roundtable: Option<RoundtableAddendum>,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            label_column: "A".to_string(),
            time_column: "B".to_string(),
            first_column: "C".to_string(),
            last_column: "Y".to_string(),
            theme_header_rows: vec![4, 5, 6, 7],
            theme_column_pairs: vec![
                ("B".to_string(), "C".to_string()),
                ("D".to_string(), "E".to_string()),
                ("F".to_string(), "G".to_string()),
                ("H".to_string(), "I".to_string()),
            ],
            weekdays: strings(DEFAULT_WEEKDAYS),
            override_labels: DEFAULT_OVERRIDES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            generic_labels: strings(DEFAULT_GENERIC_LABELS),
            session_vocabulary: strings(&["plenary", "stream plenaries", "presidential address"]),
            roundtable_marker: "round table".to_string(),
            roundtable_label: "Roundtable Presentations".to_string(),
            special_event_label: "Special Event".to_string(),
            placeholder: "leave empty".to_string(),
            title_fallback: "Conference Session".to_string(),
            stoplist: DEFAULT_STOPLIST.iter().map(|s| s.to_string()).collect(),
            break_keywords: strings(&["refreshment", "lunch", "coffee", "break"]),
            special_keywords: strings(DEFAULT_SPECIAL_KEYWORDS),
            roundtable: Some(RoundtableAddendum::default()),
        }
    }
}

/// ラウンドテーブル補遺
///
/// メイングリッドの外にある小さな固定表です。構造からは検出できないため、
/// 行番号を直接指定します。シートの配置が変わった場合はここを更新してください。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RoundtableAddendum {
    /// 時刻範囲を含む注記セルの行
    pub note_row: u32,
    /// 注記セルの列
    pub note_column: String,
    /// テーブル名の行
    pub table_row: u32,
    /// ストリームコードの行
    pub stream_row: u32,
    /// 参加者名の行
    pub people_rows: Vec<u32>,
    /// 各テーブルの列
    pub columns: Vec<String>,
    /// 部屋名の接頭辞（テーブル名が続く）
    pub room_prefix: String,
    /// 並び順キーの基点
    pub sort_base: u32,
    /// 開催日（`None`の場合は最後の日付区間）
    pub day: Option<NaiveDate>,
}

impl Default for RoundtableAddendum {
    fn default() -> Self {
        Self {
            note_row: 125,
            note_column: "B".to_string(),
            table_row: 126,
            stream_row: 127,
            people_rows: vec![128, 129, 130, 131],
            columns: strings(&["D", "E", "F", "G"]),
            room_prefix: "Market Place Restaurant - ".to_string(),
            sort_base: 400,
            day: None,
        }
    }
}

/// 列文字を解決済みの列番号にまとめたもの
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ColumnPlan {
    pub label: u32,
    pub time: u32,
    /// 部屋・セッション列（左から順）
    pub grid: Vec<u32>,
}

fn parse_column(name: &str, value: &str) -> Result<u32, GridScheduleError> {
    column_number(value).ok_or_else(|| {
        GridScheduleError::Config(format!("Invalid column letters for {}: '{}'", name, value))
    })
}

impl GridLayout {
    /// TOML文字列からレイアウトを読み込み、検証する
    ///
    /// 指定されなかった項目はデフォルト値になります。
    pub fn from_toml_str(source: &str) -> Result<Self, GridScheduleError> {
        let layout: GridLayout = toml::from_str(source)?;
        layout.validate()?;
        Ok(layout)
    }

    /// 設定を検証する
    ///
    /// # 発生し得るエラー
    ///
    /// * `GridScheduleError::Config(String)`
    ///   * 列文字が不正
    ///   * 最初の列が最後の列より右にある
    ///   * 日付見出し列と時刻列が同じ
    ///   * 曜日が1つも指定されていない
    pub fn validate(&self) -> Result<(), GridScheduleError> {
        let plan = self.column_plan()?;
        if plan.label == plan.time {
            return Err(GridScheduleError::Config(format!(
                "Label column and time column must differ (both '{}')",
                self.label_column
            )));
        }
        if self.weekdays.iter().all(|w| w.trim().is_empty()) {
            return Err(GridScheduleError::Config(
                "At least one weekday name is required".to_string(),
            ));
        }
        for (name_col, code_col) in &self.theme_column_pairs {
            parse_column("theme name column", name_col)?;
            parse_column("theme code column", code_col)?;
        }
        if let Some(addendum) = &self.roundtable {
            parse_column("roundtable note column", &addendum.note_column)?;
            for col in &addendum.columns {
                parse_column("roundtable column", col)?;
            }
        }
        Ok(())
    }

    pub(crate) fn column_plan(&self) -> Result<ColumnPlan, GridScheduleError> {
        let label = parse_column("label column", &self.label_column)?;
        let time = parse_column("time column", &self.time_column)?;
        let first = parse_column("first column", &self.first_column)?;
        let last = parse_column("last column", &self.last_column)?;
        if first > last {
            return Err(GridScheduleError::Config(format!(
                "Invalid column range: first column ({}) is after last column ({})",
                self.first_column, self.last_column
            )));
        }
        Ok(ColumnPlan {
            label,
            time,
            grid: (first..=last).collect(),
        })
    }

    /// 大文字化したトークンがストップリストに含まれるか
    pub(crate) fn is_stopword(&self, token: &str) -> bool {
        self.stoplist.contains(&token.to_uppercase())
    }

    /// 固定ラベル表を引く（大文字小文字を無視した完全一致）
    pub(crate) fn override_label(&self, text: &str) -> Option<&str> {
        self.override_labels
            .get(&text.to_uppercase())
            .map(|s| s.as_str())
    }

    pub(crate) fn is_generic_label(&self, text: &str) -> bool {
        let upper = text.to_uppercase();
        self.generic_labels.iter().any(|label| *label == upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_valid() {
        let layout = GridLayout::default();
        assert!(layout.validate().is_ok());

        let plan = layout.column_plan().unwrap();
        assert_eq!(plan.label, 1);
        assert_eq!(plan.time, 2);
        assert_eq!(plan.grid.first(), Some(&3));
        assert_eq!(plan.grid.last(), Some(&25));
        assert_eq!(plan.grid.len(), 23);
    }

    #[test]
    fn test_default_stoplist() {
        let layout = GridLayout::default();
        assert!(layout.stoplist.len() >= 70);
        assert!(layout.is_stopword("session"));
        assert!(layout.is_stopword("Plenary"));
        assert!(!layout.is_stopword("Smith"));
    }

    #[test]
    fn test_override_label_is_case_insensitive() {
        let layout = GridLayout::default();
        assert_eq!(
            layout.override_label("early career forum event"),
            Some("Early Career Forum Event")
        );
        assert_eq!(layout.override_label("Keynote"), None);
        assert!(layout.is_generic_label("Sociology Journal Event"));
        assert!(!layout.is_generic_label("SPECIAL EVENT"));
    }

    #[test]
    fn test_invalid_column_range() {
        let layout = GridLayout {
            first_column: "Z".to_string(),
            last_column: "C".to_string(),
            ..GridLayout::default()
        };
        match layout.validate() {
            Err(GridScheduleError::Config(msg)) => assert!(msg.contains("Invalid column range")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_column_letters() {
        let layout = GridLayout {
            time_column: "b".to_string(),
            ..GridLayout::default()
        };
        assert!(matches!(layout.validate(), Err(GridScheduleError::Config(_))));
    }

    #[test]
    fn test_same_label_and_time_column() {
        let layout = GridLayout {
            time_column: "A".to_string(),
            ..GridLayout::default()
        };
        match layout.validate() {
            Err(GridScheduleError::Config(msg)) => assert!(msg.contains("must differ")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_weekdays() {
        let layout = GridLayout {
            weekdays: vec![],
            ..GridLayout::default()
        };
        assert!(matches!(layout.validate(), Err(GridScheduleError::Config(_))));
    }

    #[test]
    fn test_from_toml_partial_override() {
        let layout = GridLayout::from_toml_str(
            r#"
            last_column = "M"
            weekdays = ["Wednesday", "Thursday", "Friday"]

            [roundtable]
            note_row = 90
            day = "2026-04-10"
            "#,
        )
        .unwrap();

        assert_eq!(layout.last_column, "M");
        assert_eq!(layout.weekdays.len(), 3);
        assert_eq!(layout.first_column, "C");
        let addendum = layout.roundtable.unwrap();
        assert_eq!(addendum.note_row, 90);
        assert_eq!(addendum.table_row, 126);
        assert_eq!(addendum.day, NaiveDate::from_ymd_opt(2026, 4, 10));
    }

    #[test]
    fn test_from_toml_rejects_invalid_layout() {
        let result = GridLayout::from_toml_str("first_column = \"1\"");
        assert!(matches!(result, Err(GridScheduleError::Config(_))));

        let result = GridLayout::from_toml_str("theme_header_rows = \"four\"");
        assert!(matches!(result, Err(GridScheduleError::Toml(_))));
    }
}
