//! Topic Directory Projection
//!
//! エントリの参加者名をトピック（テーマ・セッション・特別イベント）ごとに集約する。

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::Category;
use crate::output::ProjectionContext;
use crate::schedule::Schedule;
use crate::text::slugify;

/// トピック
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topic {
    /// `theme:<CODE>` / `session:<slug>` / `special:<slug>`
    pub id: String,
    /// 表示ラベル
    pub label: String,
    /// 区分（`theme` / `session` / `special`）
    pub kind: Category,
    /// 参加者名（大文字小文字を無視した昇順）
    pub people: Vec<String>,
    /// 参加者数
    pub count: usize,
    /// テーマコード（テーマのみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// トピック一覧
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicDirectory {
    pub timezone: String,
    pub location: String,
    pub generated_from: String,
    /// 生成時刻（UTC、"%Y-%m-%dT%H:%M:%SZ"）
    pub generated_at: String,
    pub topics: Vec<Topic>,
    pub topic_count: usize,
    /// 重複を除いた参加者の総数
    pub total_people: usize,
}

struct TopicAccumulator {
    label: String,
    kind: Category,
    code: Option<String>,
    people: BTreeSet<String>,
}

impl TopicDirectory {
    /// スケジュールからトピック一覧を構築する
    ///
    /// 休憩のエントリと、参加者が1人もいないトピックは含めません。
    /// トピックはラベル（大文字小文字を無視）、IDの順に並びます。
    pub(crate) fn build(
        schedule: &Schedule,
        context: &ProjectionContext,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let mut accumulators: BTreeMap<String, TopicAccumulator> = BTreeMap::new();

        for entry in &schedule.entries {
            let (id, label, code) = match (entry.category, &entry.theme_code) {
                (Category::Break, _) => continue,
                (Category::Theme, Some(code)) => (
                    format!("theme:{}", code),
                    schedule.themes.label(code).to_string(),
                    Some(code.clone()),
                ),
                (category, _) => (
                    format!("{}:{}", topic_prefix(category), slugify(&entry.title_display)),
                    entry.title_display.clone(),
                    None,
                ),
            };
            let kind = if code.is_some() { Category::Theme } else { topic_kind(entry.category) };

            let accumulator = accumulators.entry(id).or_insert_with(|| TopicAccumulator {
                label,
                kind,
                code,
                people: BTreeSet::new(),
            });
            accumulator.people.extend(entry.participants.iter().cloned());
        }

        let mut everyone = BTreeSet::new();
        let mut topics: Vec<Topic> = accumulators
            .into_iter()
            .filter(|(_, acc)| !acc.people.is_empty())
            .map(|(id, acc)| {
                let mut people: Vec<String> = acc.people.into_iter().collect();
                people.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
                everyone.extend(people.iter().cloned());
                Topic {
                    id,
                    label: acc.label,
                    kind: acc.kind,
                    count: people.len(),
                    people,
                    code: acc.code,
                }
            })
            .collect();
        topics.sort_by(|a, b| {
            a.label
                .to_lowercase()
                .cmp(&b.label.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });

        Self {
            timezone: context.timezone.clone(),
            location: context.location.clone(),
            generated_from: context.source_label.clone(),
            generated_at: generated_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            topic_count: topics.len(),
            total_people: everyone.len(),
            topics,
        }
    }
}

fn topic_kind(category: Category) -> Category {
    match category {
        Category::Special => Category::Special,
        _ => Category::Session,
    }
}

fn topic_prefix(category: Category) -> &'static str {
    topic_kind(category).as_str()
}
