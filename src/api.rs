//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

use serde::Serialize;

/// 抽出モード
///
/// 同じグリッドから、出力先（射影）に合わせて2種類の分類規則でエントリを生成します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum ExtractionMode {
    /// トピック集約向けの分類（デフォルト）
    ///
    /// テーマコード・特別イベント・セッション区分のいずれかに分類できたセルだけを
    /// エントリとし、分類できないセル（例: `LUNCH`）は捨てます。
    #[default]
    Directory,

    /// リレーショナルシード向けの分類
    ///
    /// 部屋が分かるすべてのセルをエントリとし、キーワード走査で
    /// `session` / `break` / `special` に分類します。表示用タイトルも整形します。
    Seed,
}

/// エントリの区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// 一般セッション
    Session,
    /// テーマ（ストリームコード）付きセッション（トピック集約モードのみ）
    Theme,
    /// 休憩（昼食・コーヒーなど、シードモードのみ）
    Break,
    /// 特別イベント
    Special,
}

impl Category {
    /// 出力に使う小文字の名前
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Session => "session",
            Category::Theme => "theme",
            Category::Break => "break",
            Category::Special => "special",
        }
    }
}

/// シート選択方式
///
/// 読み込み対象のワークシートを選択する方法を指定します。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum SheetSelector {
    /// 最初のワークシート（デフォルト）
    #[default]
    First,

    /// インデックス指定（0始まり）
    Index(usize),

    /// シート名指定
    Name(String),
}

/// 出力する射影
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum Projection {
    /// トピック→参加者の一覧（JSON）
    ///
    /// # 出力例
    ///
    /// ```json
    /// {
    ///   "timezone": "Europe/London",
    ///   "topics": [
    ///     {"id": "theme:STS", "label": "Science, Technology and Society",
    ///      "kind": "theme", "people": ["Jane Smith"], "count": 1, "code": "STS"}
    ///   ],
    ///   "total_people": 1
    /// }
    /// ```
    #[default]
    TopicDirectory,

    /// 日・テーマ・部屋・イベントのシードSQL
    ///
    /// 参照テーブルは自然キーでupsertし、イベントテーブルは対象日の範囲を
    /// 削除してから挿入します。
    SeedSql,
}

impl Projection {
    /// 射影が前提とする抽出モード
    pub fn mode(&self) -> ExtractionMode {
        match self {
            Projection::TopicDirectory => ExtractionMode::Directory,
            Projection::SeedSql => ExtractionMode::Seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(ExtractionMode::default(), ExtractionMode::Directory);
        assert_eq!(SheetSelector::default(), SheetSelector::First);
        assert_eq!(Projection::default(), Projection::TopicDirectory);
    }

    #[test]
    fn test_projection_mode() {
        assert_eq!(Projection::TopicDirectory.mode(), ExtractionMode::Directory);
        assert_eq!(Projection::SeedSql.mode(), ExtractionMode::Seed);
    }

    #[test]
    fn test_category_serialization() {
        assert_eq!(serde_json::to_string(&Category::Break).unwrap(), "\"break\"");
        assert_eq!(Category::Special.as_str(), "special");
    }
}
