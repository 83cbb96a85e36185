//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::api::Category;

/// 列文字を1始まりの列番号に変換（"A" -> 1, "Z" -> 26, "AA" -> 27）
///
/// 英大文字以外を含む場合や空文字列の場合は`None`を返します。
pub(crate) fn column_number(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut total: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_uppercase() {
            return None;
        }
        total = total.checked_mul(26)?.checked_add(ch as u32 - 'A' as u32 + 1)?;
    }
    Some(total)
}

/// 1始まりの列番号を列文字に変換（1 -> "A", 26 -> "Z", 27 -> "AA"）
pub(crate) fn column_letters(mut number: u32) -> String {
    let mut result = String::new();
    while number > 0 {
        let remainder = (number - 1) % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        number = (number - 1) / 26;
    }
    result
}

/// 日付区間
///
/// 日付見出し行から次の日付見出し行の直前までの行範囲です。
/// すべての区間を合わせると、グリッドの使用行範囲を隙間なく覆います。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySection {
    /// 開始行（日付見出し行。最初の区間はグリッドの最初の使用行）
    pub row_start: u32,
    /// 終了行（この行を含む）
    pub row_end: u32,
    /// 暦日
    pub date: NaiveDate,
    /// 日付見出しが見つかった行
    pub header_row: u32,
    /// 見出しセルの元の文字列
    pub label: String,
    /// 部屋名を読む行
    pub room_row: u32,
}

impl DaySection {
    /// 指定された行が区間内にあるかを判定
    pub fn contains(&self, row: u32) -> bool {
        row >= self.row_start && row <= self.row_end
    }

    /// シード出力用の日付ラベル（例: "Wed 8 Apr"）
    pub fn short_label(&self) -> String {
        self.date.format("%a %-d %b").to_string()
    }
}

/// タイムスロット
///
/// 時刻範囲セルを起点とした、日付区間内の行範囲です。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TimeSlot {
    /// 開始時刻
    pub start: NaiveTime,
    /// 終了時刻
    pub end: NaiveTime,
    /// 時刻範囲に続く自由記述（例: "Paper Session"）
    pub session_block: Option<String>,
    /// 所属する日付区間のインデックス
    pub section: usize,
    /// スロット見出し行
    pub header_row: u32,
    /// 終端行（この行を含まない）
    pub end_row: u32,
}

impl TimeSlot {
    /// 見出し行より下の詳細行
    pub fn detail_rows(&self) -> std::ops::Range<u32> {
        (self.header_row + 1)..self.end_row
    }

    /// セッション区分に「paper session」が含まれるか
    pub fn is_paper_session(&self) -> bool {
        self.session_block
            .as_deref()
            .map(|block| block.to_lowercase().contains("paper session"))
            .unwrap_or(false)
    }
}

/// 抽出されたスケジュールエントリ
///
/// (スロット, 列) の組ごと、またはラウンドテーブル補遺から1つ生成され、
/// 生成後に変更されることはありません。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEntry {
    /// 暦日
    pub day: NaiveDate,
    /// 開始時刻
    #[serde(serialize_with = "serialize_hhmm")]
    pub start: NaiveTime,
    /// 終了時刻
    #[serde(serialize_with = "serialize_hhmm")]
    pub end: NaiveTime,
    /// セッション区分
    pub session_block: Option<String>,
    /// 区分
    pub category: Category,
    /// テーマコード（英大文字2〜6文字）
    pub theme_code: Option<String>,
    /// トラック番号（"STS2" の 2）
    pub track: Option<u32>,
    /// 部屋名
    pub room: String,
    /// 元のタイトル文字列（空白正規化済み）
    pub title_raw: String,
    /// 表示用タイトル
    pub title_display: String,
    /// 参加者名（出現順、重複なし）
    pub participants: Vec<String>,
    /// 並び順キー（列番号 × 10）
    pub sort_key: u32,
}

impl ScheduleEntry {
    /// 重複判定に使う署名
    pub(crate) fn signature(&self) -> EntrySignature {
        EntrySignature {
            day: self.day,
            start: self.start,
            end: self.end,
            session_block: self.session_block.clone().unwrap_or_default(),
            title_display: self.title_display.clone(),
            category: self.category,
            theme_code: self.theme_code.clone().unwrap_or_default(),
        }
    }
}

/// 重複判定の署名（部屋名は含まない）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct EntrySignature {
    day: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    session_block: String,
    title_display: String,
    category: Category,
    theme_code: String,
}

fn serialize_hhmm<S: serde::Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.format("%H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_number() {
        assert_eq!(column_number("A"), Some(1));
        assert_eq!(column_number("C"), Some(3));
        assert_eq!(column_number("Z"), Some(26));
        assert_eq!(column_number("AA"), Some(27));
        assert_eq!(column_number("AZ"), Some(52));
        assert_eq!(column_number(""), None);
        assert_eq!(column_number("a"), None);
        assert_eq!(column_number("A1"), None);
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(1), "A");
        assert_eq!(column_letters(25), "Y");
        assert_eq!(column_letters(26), "Z");
        assert_eq!(column_letters(27), "AA");
        assert_eq!(column_letters(702), "ZZ");
        assert_eq!(column_letters(0), "");
    }

    #[test]
    fn test_day_section_short_label() {
        let section = DaySection {
            row_start: 10,
            row_end: 40,
            date: NaiveDate::from_ymd_opt(2026, 4, 8).unwrap(),
            header_row: 10,
            label: "Wednesday 8 April 2026".to_string(),
            room_row: 10,
        };
        assert_eq!(section.short_label(), "Wed 8 Apr");
        assert!(section.contains(10));
        assert!(section.contains(40));
        assert!(!section.contains(41));
    }

    #[test]
    fn test_time_slot_paper_session() {
        let slot = TimeSlot {
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            session_block: Some("Paper Session 1".to_string()),
            section: 0,
            header_row: 12,
            end_row: 16,
        };
        assert!(slot.is_paper_session());
        assert_eq!(slot.detail_rows(), 13..16);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_column_letters_round_trip(number in 1u32..20000) {
                let letters = column_letters(number);
                prop_assert!(letters.chars().all(|c| c.is_ascii_uppercase()));
                prop_assert_eq!(column_number(&letters), Some(number));
            }
        }
    }
}
