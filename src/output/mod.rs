//! Output Projection Module
//!
//! Strategy Patternにより、抽出したスケジュールを2種類の射影
//! （トピック一覧JSON、シードSQL）に変換するモジュール。

mod sql;
mod topics;

use std::io::Write;

use chrono::Utc;

use crate::api::Projection;
use crate::error::GridScheduleError;
use crate::schedule::Schedule;

pub(crate) use sql::render_seed_sql;
pub use topics::{Topic, TopicDirectory};

/// 射影の付帯情報（出力のヘッダーやメタデータに使う）
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ProjectionContext {
    /// IANAタイムゾーン名（例: "Europe/London"）
    pub timezone: String,
    /// 開催地（例: "Manchester"）
    pub location: String,
    /// 入力の説明
    pub source_label: String,
}

/// 射影レンダラー（Strategy Pattern）
#[derive(Debug, Clone, Copy)]
pub(crate) enum ProjectionRenderer {
    TopicDirectory,
    SeedSql,
}

impl ProjectionRenderer {
    pub fn from_projection(projection: Projection) -> Self {
        match projection {
            Projection::TopicDirectory => ProjectionRenderer::TopicDirectory,
            Projection::SeedSql => ProjectionRenderer::SeedSql,
        }
    }

    /// スケジュールを出力する
    pub fn render<W: Write>(
        &self,
        schedule: &Schedule,
        context: &ProjectionContext,
        writer: &mut W,
    ) -> Result<(), GridScheduleError> {
        match self {
            ProjectionRenderer::TopicDirectory => {
                let directory = TopicDirectory::build(schedule, context, Utc::now());
                serde_json::to_writer_pretty(&mut *writer, &directory)?;
                writeln!(writer)?;
            }
            ProjectionRenderer::SeedSql => {
                writeln!(writer, "{}", render_seed_sql(schedule, context))?;
            }
        }
        Ok(())
    }
}
