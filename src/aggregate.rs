//! Per-author aggregation over normalized rows.
//! Groups keep first-encounter order so downstream ranking ties are deterministic.

use crate::config::Platform;
use crate::date::whole_days_between;
use crate::model::{AuthorAggregate, MetricSummary, NormalizedRow};
use ahash::AHashMap;
use time::OffsetDateTime;

/// Insertion-ordered author -> aggregate mapping.
#[derive(Clone, Debug, Default)]
pub struct AuthorTable {
    aggregates: Vec<AuthorAggregate>,
    index: AHashMap<String, usize>,
}

impl AuthorTable {
    pub fn get(&self, author: &str) -> Option<&AuthorAggregate> {
        self.index.get(author).map(|&i| &self.aggregates[i])
    }

    pub fn len(&self) -> usize {
        self.aggregates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregates.is_empty()
    }

    /// Aggregates in the order their authors were first seen.
    pub fn iter(&self) -> impl Iterator<Item = &AuthorAggregate> {
        self.aggregates.iter()
    }

    pub fn into_vec(self) -> Vec<AuthorAggregate> {
        self.aggregates
    }
}

/// Running state for one author before the derived fields are computed.
struct Acc {
    first: AuthorAggregate,
    likes: Metric,
    shares: Metric,
    comments: Metric,
    quotes: Metric,
    views: Metric,
    engagement: Metric,
    min_ts: Option<OffsetDateTime>,
    max_ts: Option<OffsetDateTime>,
}

#[derive(Default)]
struct Metric {
    total: u64,
    max: u64,
}

impl Metric {
    fn add(&mut self, v: u64) {
        self.total = self.total.saturating_add(v);
        self.max = self.max.max(v);
    }

    fn summary(&self, count: u64) -> MetricSummary {
        MetricSummary {
            total: self.total,
            mean: if count == 0 { 0.0 } else { self.total as f64 / count as f64 },
            max: self.max,
        }
    }
}

impl Acc {
    fn new(row: &NormalizedRow) -> Self {
        Self {
            first: AuthorAggregate {
                author: row.author.clone(),
                display_name: row.author_display_name.clone(),
                followers: row.author_followers,
                following: row.author_following,
                verified: row.author_verified,
                location: row.author_location.clone(),
                account_created_at: row.author_created_at,
                row_count: 0,
                likes: MetricSummary::default(),
                shares: MetricSummary::default(),
                comments: MetricSummary::default(),
                quotes: MetricSummary::default(),
                views: MetricSummary::default(),
                engagement: MetricSummary::default(),
                engagement_rate: 0.0,
                first_seen: None,
                last_seen: None,
                activity_span_days: None,
            },
            likes: Metric::default(),
            shares: Metric::default(),
            comments: Metric::default(),
            quotes: Metric::default(),
            views: Metric::default(),
            engagement: Metric::default(),
            min_ts: None,
            max_ts: None,
        }
    }

    fn ingest(&mut self, row: &NormalizedRow, platform: Platform) {
        self.first.row_count += 1;
        self.likes.add(row.likes);
        self.shares.add(row.shares);
        self.comments.add(row.comments);
        self.quotes.add(row.quotes);
        self.views.add(row.views);
        self.engagement.add(row.engagement(platform));
        if let Some(ts) = row.created_at {
            self.min_ts = Some(self.min_ts.map_or(ts, |m| m.min(ts)));
            self.max_ts = Some(self.max_ts.map_or(ts, |m| m.max(ts)));
        }
    }

    fn finish(self) -> AuthorAggregate {
        let mut agg = self.first;
        let n = agg.row_count;
        agg.likes = self.likes.summary(n);
        agg.shares = self.shares.summary(n);
        agg.comments = self.comments.summary(n);
        agg.quotes = self.quotes.summary(n);
        agg.views = self.views.summary(n);
        agg.engagement = self.engagement.summary(n);
        agg.engagement_rate = engagement_rate(agg.engagement.total, agg.followers);
        agg.first_seen = self.min_ts;
        agg.last_seen = self.max_ts;
        agg.activity_span_days = match (self.min_ts, self.max_ts) {
            (Some(lo), Some(hi)) => Some(whole_days_between(lo, hi)),
            _ => None,
        };
        agg
    }
}

/// engagement / followers * 100, or 0 when there are no followers.
pub fn engagement_rate(engagement: u64, followers: u64) -> f64 {
    if followers == 0 {
        return 0.0;
    }
    let rate = engagement as f64 / followers as f64 * 100.0;
    if rate.is_finite() { rate } else { 0.0 }
}

/// Group rows by author (string equality). Callers pass the topic-relevant subset.
/// Follower counts and other profile fields come from each author's first row.
pub fn aggregate<'a, I>(rows: I, platform: Platform) -> AuthorTable
where
    I: IntoIterator<Item = &'a NormalizedRow>,
{
    let mut accs: Vec<Acc> = Vec::new();
    let mut index: AHashMap<String, usize> = AHashMap::new();

    for row in rows {
        let slot = match index.get(row.author.as_str()) {
            Some(&i) => i,
            None => {
                index.insert(row.author.clone(), accs.len());
                accs.push(Acc::new(row));
                accs.len() - 1
            }
        };
        accs[slot].ingest(row, platform);
    }

    tracing::debug!(authors = accs.len(), "aggregated authors");
    AuthorTable { aggregates: accs.into_iter().map(Acc::finish).collect(), index }
}
