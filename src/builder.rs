//! Builder Module
//!
//! Fluent Builder APIを提供し、`Extractor`インスタンスを段階的に構築する。

use std::io::{Read, Write};

use crate::api::{ExtractionMode, Projection, SheetSelector};
use crate::error::GridScheduleError;
use crate::grid::CellGrid;
use crate::layout::GridLayout;
use crate::output::{ProjectionContext, ProjectionRenderer, TopicDirectory};
use crate::parser::WorkbookParser;
use crate::schedule::{self, Schedule};
use crate::security::SecurityConfig;

/// 抽出処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct ExtractionConfig {
    /// グリッドのレイアウト
    pub layout: GridLayout,

    /// シート選択方式
    pub sheet_selector: SheetSelector,

    /// 抽出モード（Noneの場合は射影から決まる）
    pub mode: Option<ExtractionMode>,

    /// 出力する射影
    pub projection: Projection,

    /// IANAタイムゾーン名
    pub timezone: String,

    /// 開催地
    pub location: String,

    /// 入力の説明（Noneの場合はシート名から生成）
    pub source_label: Option<String>,

    /// アーカイブ検査の制限値
    pub security: SecurityConfig,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            layout: GridLayout::default(),
            sheet_selector: SheetSelector::First,
            mode: None,
            projection: Projection::TopicDirectory,
            timezone: "Europe/London".to_string(),
            location: "Manchester".to_string(),
            source_label: None,
            security: SecurityConfig::default(),
        }
    }
}

impl ExtractionConfig {
    fn effective_mode(&self) -> ExtractionMode {
        self.mode.unwrap_or_else(|| self.projection.mode())
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `Extractor`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use gridsched::{ExtractorBuilder, Projection, SheetSelector};
///
/// # fn main() -> Result<(), gridsched::GridScheduleError> {
/// let extractor = ExtractorBuilder::new()
///     .with_sheet_selector(SheetSelector::Name("Programme".to_string()))
///     .with_projection(Projection::SeedSql)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ExtractorBuilder {
    /// 内部設定（構築中）
    config: ExtractionConfig,
}

impl Default for ExtractorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractorBuilder {
    /// デフォルト設定でビルダーを初期化
    ///
    /// # デフォルト値
    ///
    /// - レイアウト: `GridLayout::default()`
    /// - シート選択: `SheetSelector::First`
    /// - 射影: `Projection::TopicDirectory`（抽出モードは射影から決まる）
    /// - タイムゾーン: `Europe/London`
    /// - 開催地: `Manchester`
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
        }
    }

    /// グリッドのレイアウトを指定
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use gridsched::{ExtractorBuilder, GridLayout};
    ///
    /// # fn main() -> Result<(), gridsched::GridScheduleError> {
    /// let layout = GridLayout::from_toml_str("last_column = \"M\"")?;
    /// let extractor = ExtractorBuilder::new().with_layout(layout).build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_layout(mut self, layout: GridLayout) -> Self {
        self.config.layout = layout;
        self
    }

    /// 読み込むシートを指定
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// 抽出モードを明示的に指定
    ///
    /// `Extractor::extract`などで使われます。指定しない場合は`with_projection`で選んだ
    /// 射影に合うモードが使われます。射影の出力（`convert`）は常に射影に合うモードで抽出します。
    pub fn with_mode(mut self, mode: ExtractionMode) -> Self {
        self.config.mode = Some(mode);
        self
    }

    /// 出力する射影を指定
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.config.projection = projection;
        self
    }

    /// 出力に付けるタイムゾーン名を指定
    ///
    /// 抽出結果は現地時刻のみを保持し、タイムゾーンは射影の段階で付与されます。
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.config.timezone = timezone.into();
        self
    }

    /// 開催地を指定
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.config.location = location.into();
        self
    }

    /// 出力のヘッダーに記録する入力の説明を指定
    pub fn with_source_label(mut self, label: impl Into<String>) -> Self {
        self.config.source_label = Some(label.into());
        self
    }

    /// 設定を検証し、`Extractor`インスタンスを構築
    ///
    /// # 発生し得るエラー
    ///
    /// * `GridScheduleError::Config(String)`: 設定の検証に失敗した場合
    ///   * レイアウトの列指定が不正（`GridLayout::validate`）
    ///   * タイムゾーン名が空、または空白を含む
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use gridsched::ExtractorBuilder;
    ///
    /// # fn main() -> Result<(), gridsched::GridScheduleError> {
    /// let extractor = ExtractorBuilder::new().with_timezone("Europe/Dublin").build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> Result<Extractor, GridScheduleError> {
        // 1. レイアウトの検証
        self.config.layout.validate()?;

        // 2. タイムゾーン名の検証
        let timezone = self.config.timezone.trim();
        if timezone.is_empty() || timezone.chars().any(char::is_whitespace) {
            return Err(GridScheduleError::Config(format!(
                "Invalid timezone name: '{}'",
                self.config.timezone
            )));
        }

        Ok(Extractor::new(self.config))
    }
}

/// 抽出処理のファサード
///
/// プログラムグリッドのワークブックからスケジュールを抽出し、
/// 選択された射影で出力するためのメインエントリーポイントです。
///
/// # 使用例
///
/// ```rust,no_run
/// use gridsched::ExtractorBuilder;
/// use std::fs::File;
///
/// # fn main() -> Result<(), gridsched::GridScheduleError> {
/// let extractor = ExtractorBuilder::new().build()?;
/// let input = File::open("programme.xlsx")?;
/// let mut output = Vec::new();
/// extractor.convert(input, &mut output)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Extractor {
    config: ExtractionConfig,
}

impl Extractor {
    pub(crate) fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// 実際に使われる抽出モード
    pub fn mode(&self) -> ExtractionMode {
        self.config.effective_mode()
    }

    /// 使用するレイアウト
    pub fn layout(&self) -> &GridLayout {
        &self.config.layout
    }

    /// グリッドからスケジュールを抽出する
    ///
    /// I/Oを行わない純粋な処理で、同じグリッドからは常に同じ結果が得られます。
    ///
    /// # 発生し得るエラー
    ///
    /// * `GridScheduleError::EmptyGrid` - グリッドに使用行がない
    /// * `GridScheduleError::MalformedDayLabel` - 日付見出しを解決できない
    pub fn extract(&self, grid: &CellGrid) -> Result<Schedule, GridScheduleError> {
        schedule::extract(grid, &self.config.layout, self.mode())
    }

    /// ワークブックを読み込み、選択されたシートをグリッドに変換する
    pub fn read_grid<R: Read>(&self, input: R) -> Result<CellGrid, GridScheduleError> {
        self.read_sheet(input).map(|(_, grid)| grid)
    }

    /// ワークブックを読み込んでスケジュールを抽出する
    pub fn extract_from_reader<R: Read>(&self, input: R) -> Result<Schedule, GridScheduleError> {
        let grid = self.read_grid(input)?;
        self.extract(&grid)
    }

    /// ワークブックを読み込み、選択された射影で出力する
    ///
    /// # 処理フロー
    ///
    /// 1. WorkbookParserの初期化（サイズ・アーカイブ検査を含む）
    /// 2. シート選択とグリッドへの読み込み
    /// 3. スケジュール抽出
    /// 4. 射影の出力
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use gridsched::{ExtractorBuilder, Projection};
    /// use std::fs::File;
    ///
    /// # fn main() -> Result<(), gridsched::GridScheduleError> {
    /// let extractor = ExtractorBuilder::new()
    ///     .with_projection(Projection::SeedSql)
    ///     .build()?;
    /// let input = File::open("programme.xlsx")?;
    /// let output = File::create("seed.sql")?;
    /// extractor.convert(input, output)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn convert<R: Read, W: Write>(&self, input: R, output: W) -> Result<(), GridScheduleError> {
        use std::io::BufWriter;

        let (sheet, grid) = self.read_sheet(input)?;
        let mut writer = BufWriter::new(output);
        self.render_grid(&grid, Some(&sheet), &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// 射影が前提とする抽出モードで抽出し、出力する
    ///
    /// `with_mode`の指定はここでは使いません（シードSQLの区分は session / break / special のみ）。
    fn render_grid<W: Write>(
        &self,
        grid: &CellGrid,
        sheet: Option<&str>,
        writer: &mut W,
    ) -> Result<(), GridScheduleError> {
        let projection = self.config.projection;
        let schedule = schedule::extract(grid, &self.config.layout, projection.mode())?;
        ProjectionRenderer::from_projection(projection).render(&schedule, &self.context(sheet), writer)
    }

    /// ワークブックを読み込み、射影を文字列として返す
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use std::fs::File;
    /// use gridsched::ExtractorBuilder;
    ///
    /// # fn main() -> Result<(), gridsched::GridScheduleError> {
    /// let extractor = ExtractorBuilder::new().build()?;
    /// let input = File::open("programme.xlsx")?;
    /// let json = extractor.convert_to_string(input)?;
    /// println!("{}", json);
    /// # Ok(())
    /// # }
    /// ```
    pub fn convert_to_string<R: Read>(&self, input: R) -> Result<String, GridScheduleError> {
        let mut buffer = Vec::new();
        self.convert(input, &mut buffer)?;

        let result = String::from_utf8(buffer).map_err(|e| {
            GridScheduleError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;

        Ok(result)
    }

    /// グリッドからトピック一覧を構築する
    ///
    /// 射影の設定に関係なく、抽出モードは`Directory`で行います。
    pub fn topic_directory(&self, grid: &CellGrid) -> Result<TopicDirectory, GridScheduleError> {
        let schedule = schedule::extract(grid, &self.config.layout, ExtractionMode::Directory)?;
        Ok(TopicDirectory::build(
            &schedule,
            &self.context(None),
            chrono::Utc::now(),
        ))
    }

    /// グリッドからシードSQLを生成する
    ///
    /// 射影の設定に関係なく、抽出モードは`Seed`で行います。
    pub fn seed_sql(&self, grid: &CellGrid) -> Result<String, GridScheduleError> {
        let schedule = schedule::extract(grid, &self.config.layout, ExtractionMode::Seed)?;
        Ok(crate::output::render_seed_sql(&schedule, &self.context(None)))
    }

    fn read_sheet<R: Read>(&self, input: R) -> Result<(String, CellGrid), GridScheduleError> {
        let mut parser = WorkbookParser::open(input, &self.config.security)?;
        let sheet = parser.select_sheet(&self.config.sheet_selector)?;
        let grid = parser.read_grid(&sheet)?;
        Ok((sheet, grid))
    }

    fn context(&self, sheet: Option<&str>) -> ProjectionContext {
        let source_label = match (&self.config.source_label, sheet) {
            (Some(label), _) => label.clone(),
            (None, Some(sheet)) => format!("programme grid (worksheet '{}')", sheet),
            (None, None) => "programme grid".to_string(),
        };
        ProjectionContext {
            timezone: self.config.timezone.clone(),
            location: self.config.location.clone(),
            source_label,
        }
    }
}
