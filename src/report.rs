//! Run summary: dataset totals, hashtag frequencies, activity timeline and post types.
//! Everything is computed from the finished tables; nothing here feeds back into them.

use crate::date::{utc_date, utc_hour};
use crate::model::{NormalizedRow, PostKind, RankedAuthor};
use crate::pipeline::SkipReport;
use crate::topic::TopicConfig;
use ahash::AHashMap;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u64,
}

/// Relevant rows and their engagement on one UTC calendar day.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DayActivity {
    pub date: String, // YYYY-MM-DD (UTC)
    pub count: u64,
    pub likes: u64,
    pub shares: u64,
    pub comments: u64,
    pub views: u64,
}

/// Uses of one hashtag on one day.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DayTagCount {
    pub date: String,
    pub tag: String,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TopAuthor {
    pub rank: usize,
    pub author: String,
    pub verified: bool,
    pub row_count: u64,
    pub total_engagement: u64,
    pub followers: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ViralPost {
    pub id: String,
    pub author: String,
    pub url: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
}

/// Posts at or above the 90th percentile of views or likes among the relevant rows.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ViralSummary {
    pub views_threshold: f64,
    pub likes_threshold: f64,
    pub count: usize,
    /// Up to ten viral posts, most viewed first.
    pub top: Vec<ViralPost>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EngagementTotals {
    pub likes: u64,
    pub shares: u64,
    pub comments: u64,
    pub quotes: u64,
    pub views: u64,
    pub max_likes: u64,
    pub max_shares: u64,
    pub max_comments: u64,
    pub avg_likes: f64,
    pub avg_shares: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    pub total_rows: usize,
    pub relevant_rows: usize,
    pub relevant_pct: f64,
    pub skipped_records: u64,
    pub unique_authors: usize,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    pub engagement: EngagementTotals,
    pub hashtags: Vec<TagCount>,
    pub topic_hashtags: Vec<TagCount>,
    pub hashtag_daily: Vec<DayTagCount>,
    pub daily_activity: Vec<DayActivity>,
    pub hourly_activity: BTreeMap<u8, u64>,
    pub peak_day: Option<DayActivity>,
    pub highest_engagement_day: Option<DayActivity>,
    pub peak_hour: Option<u8>,
    pub post_types: BTreeMap<PostKind, u64>,
    pub languages: Vec<TagCount>,
    pub locations: Vec<TagCount>,
    pub viral: ViralSummary,
    pub top_authors: Vec<TopAuthor>,
}

const TOP_TAGS: usize = 20;
const TOP_LANGUAGES: usize = 5;
const TOP_LOCATIONS: usize = 20;
const TOP_AUTHORS: usize = 10;
const TOP_VIRAL: usize = 10;
const VIRAL_QUANTILE: f64 = 0.9;

/// Hashtag frequencies across rows, one count per row carrying the tag.
/// Sorted by count descending, then tag ascending.
pub fn hashtag_counts<'a, I>(rows: I) -> Vec<TagCount>
where
    I: IntoIterator<Item = &'a NormalizedRow>,
{
    let mut counts: AHashMap<&str, u64> = AHashMap::new();
    for row in rows {
        for tag in &row.hashtags {
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }
    }
    sorted_counts(counts)
}

/// Date x hashtag usage table, ascending by date then tag. Rows without a timestamp are ignored.
pub fn hashtag_daily<'a, I>(rows: I) -> Vec<DayTagCount>
where
    I: IntoIterator<Item = &'a NormalizedRow>,
{
    let mut cells: BTreeMap<(time::Date, &str), u64> = BTreeMap::new();
    for row in rows {
        let Some(ts) = row.created_at else { continue };
        let day = utc_date(&ts);
        for tag in &row.hashtags {
            *cells.entry((day, tag.as_str())).or_insert(0) += 1;
        }
    }
    cells
        .into_iter()
        .map(|((d, tag), count)| DayTagCount { date: format_date(d), tag: tag.to_string(), count })
        .collect()
}

/// Rows and engagement per UTC calendar day, ascending by date. Rows without a timestamp are ignored.
pub fn daily_activity<'a, I>(rows: I) -> Vec<DayActivity>
where
    I: IntoIterator<Item = &'a NormalizedRow>,
{
    let mut days: BTreeMap<time::Date, DayActivity> = BTreeMap::new();
    for row in rows {
        let Some(ts) = row.created_at else { continue };
        let day = days.entry(utc_date(&ts)).or_default();
        day.count += 1;
        day.likes = day.likes.saturating_add(row.likes);
        day.shares = day.shares.saturating_add(row.shares);
        day.comments = day.comments.saturating_add(row.comments);
        day.views = day.views.saturating_add(row.views);
    }
    days.into_iter()
        .map(|(d, mut a)| {
            a.date = format_date(d);
            a
        })
        .collect()
}

pub fn hourly_activity<'a, I>(rows: I) -> BTreeMap<u8, u64>
where
    I: IntoIterator<Item = &'a NormalizedRow>,
{
    let mut hours = BTreeMap::new();
    for ts in rows.into_iter().filter_map(|r| r.created_at) {
        *hours.entry(utc_hour(&ts)).or_insert(0) += 1;
    }
    hours
}

/// Author locations (non-empty), one count per row, top 20.
pub fn location_counts<'a, I>(rows: I) -> Vec<TagCount>
where
    I: IntoIterator<Item = &'a NormalizedRow>,
{
    let mut counts: AHashMap<&str, u64> = AHashMap::new();
    for row in rows {
        let loc = row.author_location.trim();
        if !loc.is_empty() {
            *counts.entry(loc).or_insert(0) += 1;
        }
    }
    let mut v = sorted_counts(counts);
    v.truncate(TOP_LOCATIONS);
    v
}

/// Linear-interpolated quantile (`q` in 0..=1) of `values`; 0 for an empty slice.
pub fn quantile(values: &[u64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let (a, b) = (sorted[lo] as f64, sorted[hi] as f64);
    a + (b - a) * (pos - lo as f64)
}

pub fn viral_content(rows: &[&NormalizedRow]) -> ViralSummary {
    if rows.is_empty() {
        return ViralSummary::default();
    }
    let views: Vec<u64> = rows.iter().map(|r| r.views).collect();
    let likes: Vec<u64> = rows.iter().map(|r| r.likes).collect();
    let views_threshold = quantile(&views, VIRAL_QUANTILE);
    let likes_threshold = quantile(&likes, VIRAL_QUANTILE);

    let mut viral: Vec<&NormalizedRow> = rows
        .iter()
        .copied()
        .filter(|r| r.views as f64 >= views_threshold || r.likes as f64 >= likes_threshold)
        .collect();
    let count = viral.len();
    // stable, so equal view counts keep input order
    viral.sort_by(|a, b| b.views.cmp(&a.views));
    viral.truncate(TOP_VIRAL);

    ViralSummary {
        views_threshold,
        likes_threshold,
        count,
        top: viral
            .into_iter()
            .map(|r| ViralPost {
                id: r.id.clone(),
                author: r.author.clone(),
                url: r.url.clone(),
                views: r.views,
                likes: r.likes,
                comments: r.comments,
                shares: r.shares,
            })
            .collect(),
    }
}

pub fn summarize(
    rows: &[NormalizedRow],
    ranked: &[RankedAuthor],
    topic: &TopicConfig,
    skipped: &SkipReport,
) -> RunSummary {
    let relevant: Vec<&NormalizedRow> = rows.iter().filter(|r| r.relevant).collect();

    let mut dates: Vec<time::Date> = rows.iter().filter_map(|r| r.created_at).map(|t| utc_date(&t)).collect();
    dates.sort();

    let hashtags = hashtag_counts(relevant.iter().copied());
    let topic_hashtags: Vec<TagCount> = hashtags
        .iter()
        .filter(|t| topic.has_hashtag(&t.tag))
        .cloned()
        .collect();

    let daily = daily_activity(relevant.iter().copied());
    // first maximum wins so the earliest day is reported
    let peak_day = first_max_by(&daily, |d| d.count).cloned();
    let highest_engagement_day = first_max_by(&daily, |d| d.likes).cloned();
    let hourly = hourly_activity(relevant.iter().copied());
    let peak_hour = hourly.iter().fold(None::<(u8, u64)>, |best, (&h, &c)| match best {
        Some((_, bc)) if bc >= c => best,
        _ => Some((h, c)),
    }).map(|(h, _)| h);

    let mut post_types = BTreeMap::new();
    for row in &relevant {
        *post_types.entry(row.kind()).or_insert(0) += 1;
    }

    let mut langs: AHashMap<&str, u64> = AHashMap::new();
    for row in relevant.iter().filter(|r| !r.language.is_empty()) {
        *langs.entry(row.language.as_str()).or_insert(0) += 1;
    }
    let mut languages = sorted_counts(langs);
    languages.truncate(TOP_LANGUAGES);

    let mut hashtags = hashtags;
    hashtags.truncate(TOP_TAGS);

    RunSummary {
        total_rows: rows.len(),
        relevant_rows: relevant.len(),
        relevant_pct: if rows.is_empty() { 0.0 } else { relevant.len() as f64 / rows.len() as f64 * 100.0 },
        skipped_records: skipped.total(),
        unique_authors: ranked.len(),
        first_date: dates.first().map(|d| format_date(*d)),
        last_date: dates.last().map(|d| format_date(*d)),
        engagement: engagement_totals(&relevant),
        hashtags,
        topic_hashtags,
        hashtag_daily: hashtag_daily(relevant.iter().copied()),
        daily_activity: daily,
        hourly_activity: hourly,
        peak_day,
        highest_engagement_day,
        peak_hour,
        post_types,
        languages,
        locations: location_counts(relevant.iter().copied()),
        viral: viral_content(&relevant),
        top_authors: ranked
            .iter()
            .take(TOP_AUTHORS)
            .map(|r| TopAuthor {
                rank: r.rank,
                author: r.author.author.clone(),
                verified: r.author.verified,
                row_count: r.author.row_count,
                total_engagement: r.author.total_engagement(),
                followers: r.author.followers,
            })
            .collect(),
    }
}

fn first_max_by<T>(items: &[T], key: impl Fn(&T) -> u64) -> Option<&T> {
    items.iter().fold(None, |best, x| match best {
        Some(b) if key(b) >= key(x) => Some(b),
        _ => Some(x),
    })
}

fn engagement_totals(rows: &[&NormalizedRow]) -> EngagementTotals {
    let mut t = EngagementTotals::default();
    for r in rows {
        t.likes = t.likes.saturating_add(r.likes);
        t.shares = t.shares.saturating_add(r.shares);
        t.comments = t.comments.saturating_add(r.comments);
        t.quotes = t.quotes.saturating_add(r.quotes);
        t.views = t.views.saturating_add(r.views);
        t.max_likes = t.max_likes.max(r.likes);
        t.max_shares = t.max_shares.max(r.shares);
        t.max_comments = t.max_comments.max(r.comments);
    }
    if !rows.is_empty() {
        t.avg_likes = t.likes as f64 / rows.len() as f64;
        t.avg_shares = t.shares as f64 / rows.len() as f64;
    }
    t
}

fn sorted_counts(counts: AHashMap<&str, u64>) -> Vec<TagCount> {
    let mut v: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount { tag: tag.to_string(), count })
        .collect();
    v.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    v
}

fn format_date(d: time::Date) -> String {
    format!("{:04}-{:02}-{:02}", d.year(), u8::from(d.month()), d.day())
}
