//! Person Names
//!
//! セル文字列の行が人名らしいかを判定し、参加者名の抽出と表示用タイトルの整形を行う。
//! 判定は適合率重視のヒューリスティックです。実在の名前を落とすことは許容し、
//! セッション区分の語を名前として拾わないことを優先します。

use once_cell::sync::Lazy;
use regex::Regex;

use crate::layout::GridLayout;
use crate::text::{dedupe_preserving_order, normalize_space, split_lines};

static NON_NAME_CHAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z'\-\s]").expect("valid name charset regex"));
static NAME_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z'\-]*").expect("valid name token regex"));
static HONORIFIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(dr|prof|mr|mrs|ms)\.?\s+").expect("valid honorific regex"));
static SPECIAL_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^SPECIAL EVENT\*?\s*(.*)$").expect("valid special prefix regex"));
static SPECIAL_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(SPECIAL EVENT\*?)(?:\b.*)?$").expect("valid special marker regex"));

const ROLE_PREFIXES: &[&str] = &[
    "chair:",
    "speaker:",
    "speakers:",
    "presenter:",
    "presenters:",
    "moderator:",
    "discussant:",
];

fn is_chair_line(line: &str) -> bool {
    line.to_lowercase().starts_with("chair:")
}

fn first_segment(line: &str) -> Option<String> {
    line.split_once(',').map(|(head, _)| normalize_space(head))
}

/// 人名判定器
///
/// ストップリストはレイアウトから借用します。
pub(crate) struct NameHeuristic<'a> {
    layout: &'a GridLayout,
}

impl<'a> NameHeuristic<'a> {
    pub fn new(layout: &'a GridLayout) -> Self {
        Self { layout }
    }

    /// 文字列が人名らしいか
    ///
    /// 英字・アポストロフィ・ハイフン・空白のみで構成され、2〜5語で、
    /// ストップリストの語を含まず、すべての語が大文字で始まる場合に真。
    pub fn looks_like_person_name(&self, text: &str) -> bool {
        let cleaned = normalize_space(text);
        if cleaned.is_empty() || NON_NAME_CHAR_RE.is_match(&cleaned) {
            return false;
        }

        let tokens: Vec<&str> = NAME_TOKEN_RE
            .find_iter(&cleaned)
            .map(|m| m.as_str())
            .collect();
        if !(2..=5).contains(&tokens.len()) {
            return false;
        }
        if tokens.iter().any(|token| self.layout.is_stopword(token)) {
            return false;
        }

        tokens
            .iter()
            .all(|token| token.chars().next().map(char::is_uppercase).unwrap_or(false))
    }

    /// 登壇者・司会者の行か
    ///
    /// 役割の接頭辞（"Chair:"など）や敬称で始まる行は、名前の判定を行わずに真を返します。
    pub fn is_speaker_line(&self, line: &str) -> bool {
        let raw = normalize_space(line);
        if raw.is_empty() {
            return false;
        }

        let lowered = raw.to_lowercase();
        if ROLE_PREFIXES.iter().any(|prefix| lowered.starts_with(prefix)) {
            return true;
        }
        if HONORIFIC_RE.is_match(&raw) {
            return true;
        }
        if let Some(head) = first_segment(&raw) {
            if self.looks_like_person_name(&head) {
                return true;
            }
        }
        self.looks_like_person_name(&raw)
    }

    /// セルから参加者名を抽出する（出現順、重複なし）
    ///
    /// * "Chair:"で始まる行は除外
    /// * "SPECIAL EVENT"で始まる行は残りの部分だけを判定
    /// * カンマを含む行は最初の区切りを優先して判定（所属を除くため）
    pub fn extract_names(&self, cell: &str) -> Vec<String> {
        let mut names = Vec::new();

        for line in split_lines(cell) {
            if is_chair_line(&line) {
                continue;
            }

            let line = match SPECIAL_PREFIX_RE.captures(&line) {
                Some(caps) => {
                    let remainder = normalize_space(&caps[1]);
                    if remainder.is_empty() {
                        continue;
                    }
                    remainder
                }
                None => line,
            };

            if let Some(head) = first_segment(&line) {
                if self.looks_like_person_name(&head) {
                    names.push(head);
                    continue;
                }
            }
            if self.looks_like_person_name(&line) {
                names.push(line);
            }
        }

        dedupe_preserving_order(names)
    }

    /// 表示用タイトルを整形する
    ///
    /// 登壇者・司会者の行を除き、"SPECIAL EVENT"の行は大文字のマーカーだけを残して、
    /// 残った行を" / "で連結します。何も残らない場合は空文字列です。
    pub fn clean_title_display(&self, text: &str) -> String {
        let mut kept = Vec::new();

        for line in split_lines(text) {
            if let Some(caps) = SPECIAL_MARKER_RE.captures(&line) {
                kept.push(caps[1].to_uppercase());
                continue;
            }
            if is_chair_line(&line) || self.is_speaker_line(&line) {
                continue;
            }
            kept.push(line);
        }

        kept.join(" / ")
    }

    /// シード用に元のタイトル文字列を選ぶ
    ///
    /// 1. 詳細行に"SPECIAL EVENT"を含む行があればそれ
    /// 2. 汎用ラベルのセルなら、登壇者・司会者でない最初の詳細行
    /// 3. ストリームコードのセルなら、登壇者でなく特別な催しを示す最初の詳細行
    /// 4. それ以外はセルの文字列そのもの
    pub fn choose_title_raw(&self, base: &str, details: &[&str]) -> String {
        let details: Vec<String> = details
            .iter()
            .map(|detail| normalize_space(detail))
            .filter(|detail| !detail.is_empty())
            .collect();

        if let Some(detail) = details
            .iter()
            .find(|detail| detail.to_uppercase().contains("SPECIAL EVENT"))
        {
            return detail.clone();
        }

        let normalized = normalize_space(base);
        if self.layout.is_generic_label(&normalized) {
            if let Some(detail) = details
                .iter()
                .find(|detail| !self.is_speaker_line(detail) && !is_chair_line(detail))
            {
                return detail.clone();
            }
        }

        if is_code_shaped(&normalized) {
            if let Some(detail) = details.iter().find(|detail| {
                let lower = detail.to_lowercase();
                !self.is_speaker_line(detail)
                    && ["special event", "forum", "publishing", "panel"]
                        .iter()
                        .any(|token| lower.contains(token))
            }) {
                return detail.clone();
            }
        }

        base.to_string()
    }
}

fn is_code_shaped(text: &str) -> bool {
    static CODE_SHAPE_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[A-Z]{2,6}\d{0,2}$").expect("valid code shape regex"));
    CODE_SHAPE_RE.is_match(&text.to_uppercase())
}
