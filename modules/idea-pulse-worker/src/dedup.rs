use std::collections::HashMap;

use idea_pulse_common::SearchRecord;

/// Collapse records to one per `source_id`; a later record replaces an earlier one.
/// Output order follows the map, not the input.
pub fn dedupe(records: Vec<SearchRecord>) -> Vec<SearchRecord> {
    let mut unique: HashMap<String, SearchRecord> = HashMap::with_capacity(records.len());
    for record in records {
        unique.insert(record.source_id.clone(), record);
    }
    unique.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn record(id: &str, score: i64) -> SearchRecord {
        SearchRecord {
            source_id: id.to_string(),
            community: "startups".to_string(),
            title: String::new(),
            body: String::new(),
            author: "someone".to_string(),
            score,
            comment_count: 0,
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            url: String::new(),
            permalink: String::new(),
            combined_redacted_text: String::new(),
            compliance_note: String::new(),
        }
    }

    #[test]
    fn last_write_wins_per_key() {
        let out = dedupe(vec![record("x", 1), record("x", 2), record("y", 3)]);
        let by_id: HashMap<_, _> = out.iter().map(|r| (r.source_id.as_str(), r.score)).collect();

        assert_eq!(out.len(), 2);
        assert_eq!(by_id["x"], 2);
        assert_eq!(by_id["y"], 3);
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(dedupe(Vec::new()).is_empty());
    }

    #[test]
    fn distinct_records_all_survive() {
        let out = dedupe((0..20).map(|i| record(&format!("id{i}"), i)).collect());
        assert_eq!(out.len(), 20);
    }
}
