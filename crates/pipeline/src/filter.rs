use crate::model::LogicalRecord;

/// Keep records whose supplier name or normalized tax id contains `query`.
///
/// Case-insensitive; an empty (or whitespace-only) query keeps everything.
/// Punctuation in the query is not stripped, so `"tin-00"` never matches a
/// normalized tax id.
pub fn filter(records: &[LogicalRecord], query: &str) -> Vec<LogicalRecord> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|r| r.supplier_name.to_lowercase().contains(&q) || r.normalized_tax_id.contains(&q))
        .cloned()
        .collect()
}
