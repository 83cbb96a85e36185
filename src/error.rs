//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// gridschedクレート全体で使用するエラー型
///
/// プログラムグリッドの読み込み、スケジュール抽出、出力処理中に発生する
/// すべてのエラーを統一的に扱うために使用されます。
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー
/// - `Parse`: ワークブックの解析中に発生したエラー（calamine由来）
/// - `Config`: レイアウト設定・ビルダー設定の検証に失敗したエラー
/// - `MalformedDayLabel`: 日付見出し行の日付を解決できなかったエラー（致命的）
/// - `EmptyGrid`: 使用行が1つもないグリッド（致命的）
///
/// # 使用例
///
/// ```rust,no_run
/// use gridsched::GridScheduleError;
/// use std::fs::File;
///
/// fn open_grid(path: &str) -> Result<(), GridScheduleError> {
///     let file = File::open(path)?;  // Ioエラーが自動的に変換される
///     // ... 処理 ...
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum GridScheduleError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ワークブックの解析中に発生したエラー
    ///
    /// calamineクレートがXLSXファイルを解析する際に発生したエラーです。
    #[error("Failed to parse workbook: {0}")]
    Parse(#[from] calamine::Error),

    /// ZIPアーカイブの解析エラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// トピック一覧のJSONシリアライズエラー
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// レイアウト設定ファイル（TOML）の解析エラー
    #[error("Layout file error: {0}")]
    Toml(#[from] toml::de::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `ExtractorBuilder::build()`時、または`GridLayout::validate()`で
    /// 無効な設定が検出された場合に発生します。
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use gridsched::{ExtractorBuilder, GridLayout, GridScheduleError};
    ///
    /// let mut layout = GridLayout::default();
    /// layout.time_column = layout.label_column.clone();  // 無効なレイアウト
    ///
    /// match ExtractorBuilder::new().with_layout(layout).build() {
    ///     Err(GridScheduleError::Config(msg)) => println!("設定エラー: {}", msg),
    ///     _ => {}
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// 日付見出し行の日付フィールドを解決できなかったエラー
    ///
    /// 曜日と「日 月名 年」の形をした見出しが見つかったにもかかわらず、
    /// 日・月・年から暦日を組み立てられなかった場合に発生します。
    /// 日付はすべてのエントリの帰属先となるため、この時点で抽出全体を中断します。
    #[error("Malformed day label at row {row}: '{label}'")]
    MalformedDayLabel {
        /// 見出しが見つかった行番号（1始まり）
        row: u32,
        /// 見出しセルの文字列
        label: String,
    },

    /// 使用行が1つもないグリッド
    ///
    /// 日付区間の起点がないため、抽出を開始できません。
    #[error("Grid has no used rows")]
    EmptyGrid,

    /// セキュリティ制限に違反したエラー
    ///
    /// ZIP bomb攻撃、パストラバーサル攻撃、ファイルサイズ制限などの
    /// セキュリティ制限に違反した場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}
