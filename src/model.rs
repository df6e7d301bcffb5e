//! Pipeline row types: one normalized row per raw record, one aggregate per author.

use crate::config::Platform;
use serde::Serialize;
use std::collections::BTreeSet;
use time::OffsetDateTime;

/// Fixed-schema record produced from exactly one raw record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NormalizedRow {
    pub id: String,
    pub url: String,
    pub text: String,

    /// Grouping key: the author's handle (screen name / unique id).
    pub author: String,
    pub author_user_id: String,
    pub author_display_name: String,
    pub author_followers: u64,
    pub author_following: u64,
    pub author_verified: bool,
    pub author_location: String,
    /// When the author's account was created; only read from a nested author object.
    #[serde(with = "time::serde::rfc3339::option")]
    pub author_created_at: Option<OffsetDateTime>,

    pub likes: u64,
    pub shares: u64,   // retweets on X
    pub comments: u64, // replies on X
    pub quotes: u64,
    pub views: u64,
    pub bookmarks: u64,

    #[serde(with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    pub created_raw: String,

    pub hashtags: BTreeSet<String>,
    pub mentions: BTreeSet<String>,
    /// Expanded link targets, first-seen order, duplicates dropped.
    pub urls: Vec<String>,
    pub language: String,
    pub source: String,

    pub is_retweet: bool,
    pub is_reply: bool,
    pub is_quote: bool,
    pub media_count: u64,
    pub possibly_sensitive: bool,
    pub is_thread: bool,

    pub relevant: bool,
}

impl NormalizedRow {
    /// Platform-specific engagement of this single row.
    /// X: likes + retweets + replies + quotes. TikTok: likes + comments + shares.
    pub fn engagement(&self, platform: Platform) -> u64 {
        match platform {
            Platform::X => self
                .likes
                .saturating_add(self.shares)
                .saturating_add(self.comments)
                .saturating_add(self.quotes),
            Platform::TikTok => self.likes.saturating_add(self.comments).saturating_add(self.shares),
        }
    }

    /// Row engagement relative to the author's followers, as a percentage.
    pub fn engagement_rate(&self, platform: Platform) -> f64 {
        crate::aggregate::engagement_rate(self.engagement(platform), self.author_followers)
    }

    pub fn url_count(&self) -> usize {
        self.urls.len()
    }

    pub fn with_relevance(mut self, relevant: bool) -> Self {
        self.relevant = relevant;
        self
    }

    pub fn text_length(&self) -> usize {
        self.text.chars().count()
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    pub fn kind(&self) -> PostKind {
        if self.is_retweet {
            PostKind::Retweet
        } else if self.is_reply {
            PostKind::Reply
        } else if self.is_quote {
            PostKind::Quote
        } else {
            PostKind::Original
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PostKind {
    Original,
    Retweet,
    Reply,
    Quote,
}

/// Sum / mean / max of one metric over an author's rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct MetricSummary {
    pub total: u64,
    pub mean: f64,
    pub max: u64,
}

/// Per-author statistics over the topic-relevant rows.
/// Profile fields (followers, display name, ...) are taken from the first row seen.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuthorAggregate {
    pub author: String,
    pub display_name: String,
    pub followers: u64,
    pub following: u64,
    pub verified: bool,
    pub location: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub account_created_at: Option<OffsetDateTime>,

    pub row_count: u64,
    pub likes: MetricSummary,
    pub shares: MetricSummary,
    pub comments: MetricSummary,
    pub quotes: MetricSummary,
    pub views: MetricSummary,
    pub engagement: MetricSummary,

    /// total engagement / followers * 100; 0 when followers is 0.
    pub engagement_rate: f64,

    #[serde(with = "time::serde::rfc3339::option")]
    pub first_seen: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_seen: Option<OffsetDateTime>,
    pub activity_span_days: Option<i64>,
}

impl AuthorAggregate {
    pub fn total_engagement(&self) -> u64 {
        self.engagement.total
    }

    pub fn avg_engagement(&self) -> f64 {
        self.engagement.mean
    }
}

/// An aggregate with its 1-based position in the ranked table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedAuthor {
    pub rank: usize,
    #[serde(flatten)]
    pub author: AuthorAggregate,
}
