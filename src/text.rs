//! Text Normalization Module
//!
//! セル文字列の空白正規化、テーマ名キー、スラッグ生成など、
//! 抽出処理の各段で共有する文字列ユーティリティ。

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));
static NON_ALNUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid non-alnum regex"));

/// 改行を含む連続した空白を1つの半角スペースにまとめ、前後を取り除く
pub(crate) fn normalize_space(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// テーマ名の照合キー
///
/// 小文字化し、`&`を`and`に置き換え、英数字以外の連続を1つのスペースにまとめます。
pub(crate) fn normalize_theme_key(text: &str) -> String {
    let base = normalize_space(text).to_lowercase().replace('&', " and ");
    normalize_space(&NON_ALNUM_RE.replace_all(&base, " "))
}

/// トピックIDのスラッグ（小文字化し、スペースを`-`に置き換える）
pub(crate) fn slugify(label: &str) -> String {
    label.to_lowercase().replace(' ', "-")
}

/// セルを行に分割し、各行の空白を正規化して空行を除く
pub(crate) fn split_lines(text: &str) -> Vec<String> {
    text.replace('\r', "")
        .split('\n')
        .map(normalize_space)
        .filter(|line| !line.is_empty())
        .collect()
}

/// 出現順を保ったまま重複を取り除く（大文字小文字を区別）
pub(crate) fn dedupe_preserving_order(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
