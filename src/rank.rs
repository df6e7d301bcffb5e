use crate::aggregate::AuthorTable;
use crate::model::RankedAuthor;

/// Sort by total engagement, descending. The sort is stable, so equal totals keep the
/// order the aggregates were produced in, and every author gets its own 1-based rank.
pub fn rank(table: &AuthorTable) -> Vec<RankedAuthor> {
    let mut aggs: Vec<_> = table.iter().cloned().collect();
    aggs.sort_by(|a, b| b.total_engagement().cmp(&a.total_engagement()));
    aggs.into_iter()
        .enumerate()
        .map(|(i, author)| RankedAuthor { rank: i + 1, author })
        .collect()
}

/// Keep the first `n` ranked authors (`None` keeps all).
pub fn top(mut ranked: Vec<RankedAuthor>, n: Option<usize>) -> Vec<RankedAuthor> {
    if let Some(n) = n {
        ranked.truncate(n);
    }
    ranked
}
