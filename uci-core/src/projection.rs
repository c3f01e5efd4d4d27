use crate::Record;

/// The last `limit` records of the collection, most recently added first.
pub fn recent_records(records: &[Record], limit: usize) -> impl Iterator<Item = &Record> {
    let start = records.len().saturating_sub(limit);
    records[start..].iter().rev()
}

/// Owned table slice for a snapshot. Records pass through untouched.
pub fn project_recent(records: &[Record], limit: usize) -> Vec<Record> {
    recent_records(records, limit).cloned().collect()
}
