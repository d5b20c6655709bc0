// src/results/grouping.rs

//! Session grouping of submitted results.
//!
//! Repeated submissions of the same test by the same student inside the
//! cooldown window are dropped, then the remaining results are split into
//! sessions wherever two consecutive submissions are further apart than the
//! session gap.

use std::collections::HashMap;

use crate::models::result::ResultRecord;

/// A second submission of the same (student, test) pair closer than this is a duplicate.
pub const COOLDOWN_MS: i64 = 10 * 60 * 1000;

/// Consecutive submissions further apart than this belong to different sessions.
pub const SESSION_GAP_MS: i64 = 10 * 60 * 1000;

/// Groups results into sessions, newest session first.
///
/// Records inside a group are in ascending time order. Pending timestamps
/// count as the epoch, so such records sort first.
pub fn group_sessions(records: &[ResultRecord]) -> Vec<Vec<ResultRecord>> {
    let mut items: Vec<(i64, &ResultRecord)> =
        records.iter().map(|r| (r.time.millis(), r)).collect();
    // Stable: equal timestamps keep their input order.
    items.sort_by_key(|(ms, _)| *ms);

    let mut last_accepted: HashMap<(&str, &str), i64> = HashMap::new();
    let mut accepted = Vec::with_capacity(items.len());
    for (ms, record) in items {
        let key = (record.student_name.as_str(), record.test_id.as_str());
        if let Some(last) = last_accepted.get(&key) {
            if ms - last < COOLDOWN_MS {
                continue;
            }
        }
        last_accepted.insert(key, ms);
        accepted.push((ms, record));
    }

    let mut groups: Vec<Vec<ResultRecord>> = Vec::new();
    let mut current: Vec<ResultRecord> = Vec::new();
    let mut prev_ms: Option<i64> = None;
    for (ms, record) in accepted {
        if let Some(prev) = prev_ms {
            if ms - prev > SESSION_GAP_MS && !current.is_empty() {
                groups.push(std::mem::take(&mut current));
            }
        }
        current.push(record.clone());
        prev_ms = Some(ms);
    }
    if !current.is_empty() {
        groups.push(current);
    }

    groups.reverse();
    groups
}

/// Same as [`group_sessions`], pairing each group with its session number
/// (1 for the oldest session).
pub fn numbered_sessions(records: &[ResultRecord]) -> Vec<(usize, Vec<ResultRecord>)> {
    let groups = group_sessions(records);
    let count = groups.len();
    groups
        .into_iter()
        .enumerate()
        .map(|(index, group)| (count - index, group))
        .collect()
}
