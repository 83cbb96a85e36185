//! Relational Seed Projection
//!
//! エントリを日・テーマ・部屋・イベントの各テーブルへの挿入文に変換する。
//! 参照テーブルは自然キーでupsertし、イベントテーブルは対象日の行を削除してから挿入する。

use std::collections::BTreeSet;
use std::fmt::Write;

use chrono::{NaiveDate, NaiveTime};

use crate::output::ProjectionContext;
use crate::schedule::Schedule;

/// SQLの文字列リテラル内の単一引用符をエスケープする
fn escape_sql(value: &str) -> String {
    value.replace('\'', "''")
}

fn quoted(value: &str) -> String {
    format!("'{}'", escape_sql(value))
}

fn quoted_or_null(value: Option<&str>) -> String {
    value.map(quoted).unwrap_or_else(|| "null".to_string())
}

fn timestamptz(day: NaiveDate, time: NaiveTime, timezone: &str) -> String {
    format!(
        "'{} {}:00 {}'::timestamptz",
        day.format("%Y-%m-%d"),
        time.format("%H:%M"),
        escape_sql(timezone)
    )
}

/// シードSQLを生成する
///
/// エントリが参照するものだけを挿入し、行がないブロックは出力しません。
pub(crate) fn render_seed_sql(schedule: &Schedule, context: &ProjectionContext) -> String {
    let entries = &schedule.entries;
    let used_days: BTreeSet<NaiveDate> = entries.iter().map(|e| e.day).collect();
    let used_themes: BTreeSet<&str> = entries.iter().filter_map(|e| e.theme_code.as_deref()).collect();
    let used_rooms: BTreeSet<&str> = entries.iter().map(|e| e.room.as_str()).collect();

    let mut sql = String::new();
    // Stringへの書き込みは失敗しない
    let _ = writeln!(sql, "-- Generated from: {}", context.source_label);
    let _ = writeln!(sql, "-- Timezone: {} ({})", context.location, context.timezone);
    sql.push('\n');
    sql.push_str("begin;\n\n");

    if !used_days.is_empty() {
        let values: Vec<String> = used_days
            .iter()
            .map(|day| {
                let label = schedule
                    .days
                    .iter()
                    .find(|section| section.date == *day)
                    .map(|section| section.short_label())
                    .unwrap_or_else(|| day.format("%a %-d %b").to_string());
                format!("  ('{}', {})", day.format("%Y-%m-%d"), quoted(&label))
            })
            .collect();
        sql.push_str("insert into public.conference_days (day, label)\nvalues\n");
        sql.push_str(&values.join(",\n"));
        sql.push_str("\non conflict (day) do update\nset label = excluded.label;\n\n");
    }

    if !used_themes.is_empty() {
        let values: Vec<String> = used_themes
            .iter()
            .map(|code| format!("  ({}, {})", quoted(code), quoted(schedule.themes.label(code))))
            .collect();
        sql.push_str("insert into public.themes (code, name)\nvalues\n");
        sql.push_str(&values.join(",\n"));
        sql.push_str("\non conflict (code) do update\nset name = excluded.name;\n\n");
    }

    if !used_rooms.is_empty() {
        let values: Vec<String> = used_rooms.iter().map(|room| format!("  ({})", quoted(room))).collect();
        sql.push_str("insert into public.rooms (name)\nvalues\n");
        sql.push_str(&values.join(",\n"));
        sql.push_str("\non conflict (name) do nothing;\n\n");
    }

    if !entries.is_empty() {
        let day_list: Vec<String> = used_days
            .iter()
            .map(|day| format!("'{}'", day.format("%Y-%m-%d")))
            .collect();
        let _ = writeln!(sql, "delete from public.events where day in ({});", day_list.join(", "));
        sql.push('\n');

        sql.push_str(
            "insert into public.events (day, start_at, end_at, session_block, kind, theme_code, track, room_id, title_raw, title_display, sort_order)\nvalues\n",
        );
        let values: Vec<String> = entries
            .iter()
            .map(|entry| {
                let fields = [
                    format!("'{}'", entry.day.format("%Y-%m-%d")),
                    timestamptz(entry.day, entry.start, &context.timezone),
                    timestamptz(entry.day, entry.end, &context.timezone),
                    quoted_or_null(entry.session_block.as_deref()),
                    quoted(entry.category.as_str()),
                    quoted_or_null(entry.theme_code.as_deref()),
                    entry
                        .track
                        .map(|track| track.to_string())
                        .unwrap_or_else(|| "null".to_string()),
                    format!("(select id from public.rooms where name = {})", quoted(&entry.room)),
                    quoted(&entry.title_raw),
                    quoted(&entry.title_display),
                    entry.sort_key.to_string(),
                ];
                format!("  (\n    {}\n  )", fields.join(",\n    "))
            })
            .collect();
        sql.push_str(&values.join(",\n"));
        sql.push_str("\n;\n\n");
    }

    sql.push_str("commit;");
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Category;
    use crate::themes::ThemeDirectory;
    use crate::types::{DaySection, ScheduleEntry};

    fn context() -> ProjectionContext {
        ProjectionContext {
            timezone: "Europe/London".to_string(),
            location: "Manchester".to_string(),
            source_label: "programme.xlsx (first worksheet)".to_string(),
        }
    }

    fn schedule() -> Schedule {
        let day = NaiveDate::from_ymd_opt(2026, 4, 8).unwrap();
        let mut themes = ThemeDirectory::default();
        themes.insert("STS", "Science, Technology and Society");

        let entry = |category, theme: Option<&str>, room: &str, title: &str, sort_key| ScheduleEntry {
            day,
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            session_block: theme.map(|_| "Paper Session".to_string()),
            category,
            theme_code: theme.map(str::to_string),
            track: theme.map(|_| 2),
            room: room.to_string(),
            title_raw: title.to_string(),
            title_display: title.to_string(),
            participants: Vec::new(),
            sort_key,
        };

        Schedule {
            entries: vec![
                entry(Category::Session, Some("STS"), "Room 1", "STS2", 10),
                entry(Category::Break, None, "Bistro", "Chef's LUNCH", 20),
            ],
            themes,
            days: vec![DaySection {
                row_start: 1,
                row_end: 40,
                date: day,
                header_row: 10,
                label: "Wednesday 8 April 2026".to_string(),
                room_row: 10,
            }],
        }
    }

    #[test]
    fn test_escape_sql() {
        assert_eq!(escape_sql("O'Neill's"), "O''Neill''s");
        assert_eq!(quoted_or_null(None), "null");
    }

    #[test]
    fn test_render_seed_sql() {
        let sql = render_seed_sql(&schedule(), &context());

        assert!(sql.starts_with("-- Generated from: programme.xlsx (first worksheet)\n-- Timezone: Manchester (Europe/London)\n"));
        assert!(sql.contains("  ('2026-04-08', 'Wed 8 Apr')\non conflict (day) do update"));
        assert!(sql.contains("  ('STS', 'Science, Technology and Society')"));
        assert!(sql.contains("  ('Bistro'),\n  ('Room 1')\non conflict (name) do nothing;"));
        assert!(sql.contains("delete from public.events where day in ('2026-04-08');"));
        assert!(sql.contains("'2026-04-08 09:00:00 Europe/London'::timestamptz"));
        assert!(sql.contains("'2026-04-08 10:30:00 Europe/London'::timestamptz"));
        assert!(sql.contains("(select id from public.rooms where name = 'Room 1')"));
        assert!(sql.contains("'Chef''s LUNCH'"));
        assert!(sql.contains("    'break',\n    null,\n    null,"));
        assert!(sql.contains("    'session',\n    'STS',\n    2,"));
        assert!(sql.ends_with("commit;"));
    }

    #[test]
    fn test_empty_schedule_omits_blocks() {
        let mut empty = schedule();
        empty.entries.clear();
        let sql = render_seed_sql(&empty, &context());

        assert!(sql.contains("begin;"));
        assert!(sql.ends_with("commit;"));
        assert!(!sql.contains("insert into"));
        assert!(!sql.contains("delete from"));
    }
}
