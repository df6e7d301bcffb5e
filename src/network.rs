use crate::model::RankedAuthor;
use serde::Serialize;

/// Undirected edge between two ranked authors with similar engagement.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuthorEdge {
    pub source: String,
    pub target: String,
    pub source_engagement: u64,
    pub target_engagement: u64,
}

/// Pairwise threshold rule over the first `top_n` ranked authors: for each i < j,
/// connect a and b when |e_a - e_b| < e_a * ratio. Edges come out in (i, j) order.
pub fn similarity_edges(ranked: &[RankedAuthor], top_n: usize, ratio: f64) -> Vec<AuthorEdge> {
    let nodes = &ranked[..ranked.len().min(top_n)];
    let mut edges = Vec::new();
    for (i, a) in nodes.iter().enumerate() {
        let ea = a.author.total_engagement();
        for b in &nodes[i + 1..] {
            let eb = b.author.total_engagement();
            let diff = ea.abs_diff(eb) as f64;
            if diff < ea as f64 * ratio {
                edges.push(AuthorEdge {
                    source: a.author.author.clone(),
                    target: b.author.author.clone(),
                    source_engagement: ea,
                    target_engagement: eb,
                });
            }
        }
    }
    tracing::debug!(nodes = nodes.len(), edges = edges.len(), "built similarity network");
    edges
}
