//! Deduplicator & Sequencer
//!
//! 結合セルの印刷レイアウトで重複したエントリを取り除き、安定した順序に並べる。

use std::collections::HashMap;

use crate::text::dedupe_preserving_order;
use crate::types::ScheduleEntry;

/// エントリを並べ替え、署名ごとに最初の1件だけを残す
///
/// 並び順は (日, 開始, 終了, 並び順キー, 部屋名) です。
/// 後から現れた重複の参加者名は、残ったエントリに出現順を保って追加されます。
/// 出力に再度適用しても変化しません。
pub(crate) fn dedupe_entries(mut entries: Vec<ScheduleEntry>) -> Vec<ScheduleEntry> {
    entries.sort_by(|a, b| {
        (a.day, a.start, a.end, a.sort_key, &a.room).cmp(&(b.day, b.start, b.end, b.sort_key, &b.room))
    });

    let mut kept: Vec<ScheduleEntry> = Vec::with_capacity(entries.len());
    let mut index = HashMap::new();

    for entry in entries {
        let signature = entry.signature();
        match index.get(&signature).copied() {
            Some(position) => {
                let survivor: &mut ScheduleEntry = &mut kept[position];
                let merged = survivor
                    .participants
                    .drain(..)
                    .chain(entry.participants)
                    .collect::<Vec<_>>();
                survivor.participants = dedupe_preserving_order(merged);
            }
            None => {
                index.insert(signature, kept.len());
                kept.push(entry);
            }
        }
    }

    kept
}
