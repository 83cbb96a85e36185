//! Theme Directory Module
//!
//! グリッド上部のテーマ一覧から、テーマコード ⇔ テーマ名の対応表を構築し、
//! 自由記述のセル文字列をテーマコードとトラック番号に解決するモジュール。

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::grid::CellGrid;
use crate::layout::GridLayout;
use crate::text::{normalize_space, normalize_theme_key};

static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{2,6}$").expect("valid code regex"));
static CODE_TRACK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]{2,6})(\d{0,2})$").expect("valid code/track regex"));

/// テーマ解決の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ThemeMatch {
    /// 英大文字のテーマコード
    pub code: String,
    /// 数字の接尾辞（"STS2" の 2）
    pub track: Option<u32>,
}

/// テーマ一覧
///
/// 各コードはちょうど1つの正規名に対応します。名前からの逆引きは
/// [`normalize_theme_key`]による正規化キーで行うため、大文字小文字や句読点の
/// 違いを吸収します。見出しが欠けている場合は空の一覧になり、
/// その場合はコードそのものしか認識しません。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeDirectory {
    code_to_name: BTreeMap<String, String>,
    name_to_code: BTreeMap<String, String>,
}

impl ThemeDirectory {
    /// グリッドの見出し行からテーマ一覧を構築する
    ///
    /// 各見出し行の（名前, コード）列の組を読み、コードが`[A-Z]{2,6}`に
    /// 一致する組だけを採用します。同じコードが複数回現れた場合は後の名前が残ります。
    pub fn build(grid: &CellGrid, layout: &GridLayout) -> Self {
        let mut directory = Self::default();

        for &row in &layout.theme_header_rows {
            for (name_col, code_col) in &layout.theme_column_pairs {
                let name = normalize_space(grid.get(row, name_col).unwrap_or_default());
                let code = normalize_space(grid.get(row, code_col).unwrap_or_default()).to_uppercase();
                if name.is_empty() || code.is_empty() {
                    continue;
                }
                if !CODE_RE.is_match(&code) {
                    log::debug!("row {}: skipping theme pair with non-code '{}'", row, code);
                    continue;
                }
                directory.insert(&code, &name);
            }
        }

        log::debug!("theme directory: {} codes", directory.len());
        directory
    }

    /// テーマを追加する（既存のコードは名前を置き換える）
    pub fn insert(&mut self, code: &str, name: &str) {
        if let Some(previous) = self.code_to_name.insert(code.to_string(), name.to_string()) {
            let key = normalize_theme_key(&previous);
            if self.name_to_code.get(&key).map(|c| c == code).unwrap_or(false) {
                self.name_to_code.remove(&key);
            }
        }
        self.name_to_code
            .insert(normalize_theme_key(name), code.to_string());
    }

    /// コードから正規名を取得
    pub fn name(&self, code: &str) -> Option<&str> {
        self.code_to_name.get(code).map(|s| s.as_str())
    }

    /// 表示ラベル（正規名、なければコードそのもの）
    pub fn label<'a>(&'a self, code: &'a str) -> &'a str {
        self.name(code).unwrap_or(code)
    }

    /// 既知のコードか
    pub fn contains_code(&self, code: &str) -> bool {
        self.code_to_name.contains_key(code)
    }

    /// コードと正規名の組を、コード順に走査する
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.code_to_name
            .iter()
            .map(|(code, name)| (code.as_str(), name.as_str()))
    }

    /// 登録されているコードの数
    pub fn len(&self) -> usize {
        self.code_to_name.len()
    }

    /// 空か
    pub fn is_empty(&self) -> bool {
        self.code_to_name.is_empty()
    }

    /// テーマ名またはコードでテーマを解決し、コードを返す
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use gridsched::ThemeDirectory;
    ///
    /// let mut themes = ThemeDirectory::default();
    /// themes.insert("STS", "Science, Technology and Society");
    ///
    /// assert_eq!(themes.resolve_code("science, technology & society"), Some("STS".to_string()));
    /// assert_eq!(themes.resolve_code("STS2"), Some("STS".to_string()));
    /// assert_eq!(themes.resolve_code("LUNCH"), None);
    /// ```
    pub fn resolve_code(&self, text: &str) -> Option<String> {
        self.resolve(text).map(|m| m.code)
    }

    /// テーマ名またはコードでテーマとトラックを解決する
    ///
    /// 1. 英大文字2〜6文字＋数字0〜2桁の形で、英字部分が既知のコードなら採用
    /// 2. テーマ名として正規化キーで逆引き
    /// 3. 既知でなくても、数字を含むか英字部分が4文字以下ならコードとして採用
    ///
    /// 3の長さ・数字の条件は、`LUNCH`のような一般語をコードと誤認しないためのものです。
    pub(crate) fn resolve(&self, text: &str) -> Option<ThemeMatch> {
        let value = normalize_space(text);
        if value.is_empty() {
            return None;
        }

        let upper = value.to_uppercase();
        let code_shape = CODE_TRACK_RE.captures(&upper).map(|caps| {
            let prefix = caps[1].to_string();
            let digits = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            (prefix, digits.parse::<u32>().ok())
        });

        if let Some((prefix, track)) = &code_shape {
            if self.contains_code(prefix) {
                return Some(ThemeMatch {
                    code: prefix.clone(),
                    track: *track,
                });
            }
        }

        if let Some(code) = self.name_to_code.get(&normalize_theme_key(&value)) {
            return Some(ThemeMatch {
                code: code.clone(),
                track: None,
            });
        }

        match code_shape {
            Some((prefix, track)) if track.is_some() || prefix.len() <= 4 => {
                Some(ThemeMatch { code: prefix, track })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_grid() -> CellGrid {
        CellGrid::from_cells([
            (4, "B", "Science, Technology and Society"),
            (4, "C", "STS"),
            (4, "D", "Medicine, Health & Illness"),
            (4, "E", "med"),
            (5, "B", "Work, Employment and Economic Life"),
            (5, "C", "WEEL"),
            (5, "D", "Not a theme"),
            (5, "E", "12"),
            (6, "F", "Families and Relationships"),
            (6, "G", "FAMREL"),
            (7, "H", "Orphan name"),
            (9, "B", "Below the header region"),
            (9, "C", "XYZ"),
        ])
    }

    #[test]
    fn test_build_from_header_rows() {
        let themes = ThemeDirectory::build(&header_grid(), &GridLayout::default());

        assert_eq!(themes.len(), 4);
        assert_eq!(themes.name("STS"), Some("Science, Technology and Society"));
        assert_eq!(themes.name("MED"), Some("Medicine, Health & Illness"));
        assert_eq!(themes.name("FAMREL"), Some("Families and Relationships"));
        assert!(!themes.contains_code("XYZ"));
    }

    #[test]
    fn test_build_from_empty_grid() {
        let themes = ThemeDirectory::build(&CellGrid::new(), &GridLayout::default());
        assert!(themes.is_empty());
        // 一覧が空でも短いコードは認識する
        assert_eq!(themes.resolve_code("STS"), Some("STS".to_string()));
        assert_eq!(themes.resolve_code("Science, Technology and Society"), None);
    }

    #[test]
    fn test_resolve_code_with_track() {
        let themes = ThemeDirectory::build(&header_grid(), &GridLayout::default());
        assert_eq!(
            themes.resolve("sts2"),
            Some(ThemeMatch {
                code: "STS".to_string(),
                track: Some(2)
            })
        );
        assert_eq!(
            themes.resolve("FAMREL"),
            Some(ThemeMatch {
                code: "FAMREL".to_string(),
                track: None
            })
        );
    }

    #[test]
    fn test_resolve_by_name_is_punctuation_insensitive() {
        let themes = ThemeDirectory::build(&header_grid(), &GridLayout::default());
        assert_eq!(
            themes.resolve_code("medicine health and illness"),
            Some("MED".to_string())
        );
        assert_eq!(
            themes.resolve_code("  WORK,  EMPLOYMENT & ECONOMIC LIFE "),
            Some("WEEL".to_string())
        );
    }

    #[test]
    fn test_length_guard_rejects_generic_words() {
        let themes = ThemeDirectory::build(&header_grid(), &GridLayout::default());
        assert_eq!(themes.resolve("LUNCH"), None);
        assert_eq!(themes.resolve("PLENARY"), None);
        // 未知でも数字付きなら採用
        assert_eq!(
            themes.resolve("ABCDE1"),
            Some(ThemeMatch {
                code: "ABCDE".to_string(),
                track: Some(1)
            })
        );
        // 4文字以下の未知コードは採用
        assert_eq!(themes.resolve_code("SOC"), Some("SOC".to_string()));
        assert_eq!(themes.resolve(""), None);
        assert_eq!(themes.resolve("Jane Smith"), None);
    }

    #[test]
    fn test_short_theme_name_prefers_directory() {
        let mut themes = ThemeDirectory::default();
        themes.insert("WEEL", "Work");
        assert_eq!(themes.resolve_code("Work"), Some("WEEL".to_string()));
        assert_eq!(themes.resolve_code("WEEL"), Some("WEEL".to_string()));
    }

    #[test]
    fn test_insert_replaces_name() {
        let mut themes = ThemeDirectory::default();
        themes.insert("STS", "Old Name");
        themes.insert("STS", "Science, Technology and Society");
        assert_eq!(themes.len(), 1);
        assert_eq!(themes.resolve_code("Old Name"), None);
        assert_eq!(themes.label("STS"), "Science, Technology and Society");
        assert_eq!(themes.label("ZZZ"), "ZZZ");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_name_and_code_round_trip(
                code in "[A-Z]{2,6}",
                name in "[A-Z][a-z]{2,10}( [A-Z][a-z]{2,10}){1,3}",
            ) {
                let mut themes = ThemeDirectory::default();
                themes.insert(&code, &name);
                prop_assert_eq!(themes.resolve_code(&name), Some(code.clone()));
                prop_assert_eq!(themes.resolve_code(&code), Some(code.clone()));
            }
        }
    }
}
