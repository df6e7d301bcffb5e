//! Topic relevance: hashtag membership against the configured campaign tags,
//! or phrase containment in the lowercased text.

use crate::model::NormalizedRow;
use crate::topic::TopicConfig;

/// Any of the row's hashtags is a configured topic hashtag (exact, case-insensitive).
pub fn matches_hashtags(row: &NormalizedRow, topic: &TopicConfig) -> bool {
    row.hashtags
        .iter()
        .any(|tag| topic.has_hashtag(&tag.to_lowercase()))
}

/// The lowercased text contains any configured phrase as a substring.
pub fn matches_phrases(row: &NormalizedRow, topic: &TopicConfig) -> bool {
    if topic.phrases.is_empty() || row.text.is_empty() {
        return false;
    }
    let hay = row.text.to_lowercase();
    topic.phrases.iter().any(|p| hay.contains(p.as_str()))
}

pub fn is_relevant(row: &NormalizedRow, topic: &TopicConfig) -> bool {
    matches_hashtags(row, topic) || matches_phrases(row, topic)
}

/// Label every row; the input order is preserved.
pub fn classify(rows: Vec<NormalizedRow>, topic: &TopicConfig) -> Vec<NormalizedRow> {
    rows.into_iter()
        .map(|row| {
            let relevant = is_relevant(&row, topic);
            row.with_relevance(relevant)
        })
        .collect()
}

/// Borrowing view over the relevant subset, in input order.
pub fn relevant_rows(rows: &[NormalizedRow]) -> Vec<&NormalizedRow> {
    rows.iter().filter(|r| r.relevant).collect()
}
