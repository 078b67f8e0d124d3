use std::collections::HashMap;

use super::rows::FileRow;
use super::weights::Phase;
use crate::view::KeyedTable;

/// Relabel every queued row "Queued (i of N)" in table order; clear all other labels.
///
/// Full pass over the table. Runs once per flush, so the cost is bounded by the
/// frame rate rather than the event rate. Returns N.
/// Rows match on their bare status: a duplicate still waits in the queue.
pub fn recompute_queue_labels(rows: &mut KeyedTable<FileRow>, phase: Phase) -> usize {
    let queued = phase.queued_state();
    let queued_keys: Vec<String> = rows
        .iter()
        .filter(|r| r.row.latest.status == queued)
        .map(|r| r.key.clone())
        .collect();
    let total = queued_keys.len();

    let mut position: HashMap<&str, usize> = HashMap::with_capacity(total);
    for (i, key) in queued_keys.iter().enumerate() {
        position.insert(key.as_str(), i + 1);
    }

    let all_keys: Vec<String> = rows.keys().map(|k| k.to_string()).collect();
    for key in &all_keys {
        let label = position.get(key.as_str()).map(|i| format!("Queued ({} of {})", i, total));
        rows.update_in_place(key, |row| {
            if row.queue_label != label {
                row.queue_label = label;
                true
            } else {
                false
            }
        });
    }
    total
}
