//! Flat-table exports (CSV, TSV, JSONL) and the JSON run summary.
//!
//! Every file is written to a `.tmp` sibling first and promoted with an atomic rename,
//! so a failed run never leaves a half-written table under the final name.

use crate::config::{Platform, TableFormat};
use crate::date::format_rfc3339;
use crate::model::{NormalizedRow, RankedAuthor};
use crate::network::AuthorEdge;
use crate::report::RunSummary;
use crate::util::{create_with_backoff, replace_file_atomic_backoff};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// A type that can be laid out as one row of a flat table with a fixed column order.
pub trait TableRow: Serialize {
    fn header() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

impl TableRow for NormalizedRow {
    fn header() -> &'static [&'static str] {
        &[
            "id", "url", "text", "author", "author_user_id", "author_display_name",
            "author_followers", "author_following", "author_verified", "author_location",
            "author_created_at", "likes", "shares", "comments", "quotes", "views", "bookmarks",
            "engagement", "engagement_rate", "created_at", "created_raw", "hashtags", "mentions",
            "urls", "url_count", "language", "source", "is_retweet", "is_reply", "is_quote",
            "media_count", "possibly_sensitive", "is_thread", "text_length", "word_count",
            "relevant",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.url.clone(),
            self.text.clone(),
            self.author.clone(),
            self.author_user_id.clone(),
            self.author_display_name.clone(),
            self.author_followers.to_string(),
            self.author_following.to_string(),
            self.author_verified.to_string(),
            self.author_location.clone(),
            ts_cell(self.author_created_at),
            self.likes.to_string(),
            self.shares.to_string(),
            self.comments.to_string(),
            self.quotes.to_string(),
            self.views.to_string(),
            self.bookmarks.to_string(),
            // quotes is always 0 on TikTok, so this matches both platform formulas
            self.engagement(Platform::X).to_string(),
            float_cell(self.engagement_rate(Platform::X)),
            ts_cell(self.created_at),
            self.created_raw.clone(),
            join_set(&self.hashtags),
            join_set(&self.mentions),
            self.urls.join(" "),
            self.url_count().to_string(),
            self.language.clone(),
            self.source.clone(),
            self.is_retweet.to_string(),
            self.is_reply.to_string(),
            self.is_quote.to_string(),
            self.media_count.to_string(),
            self.possibly_sensitive.to_string(),
            self.is_thread.to_string(),
            self.text_length().to_string(),
            self.word_count().to_string(),
            self.relevant.to_string(),
        ]
    }
}

impl TableRow for RankedAuthor {
    fn header() -> &'static [&'static str] {
        &[
            "rank", "author", "display_name", "followers", "following", "verified", "location",
            "account_created_at", "row_count", "total_likes", "avg_likes", "max_likes",
            "total_shares", "avg_shares", "max_shares", "total_comments", "avg_comments",
            "max_comments", "total_quotes", "avg_quotes", "max_quotes", "total_views",
            "total_engagement", "avg_engagement", "max_engagement", "engagement_rate",
            "first_seen", "last_seen", "activity_span_days",
        ]
    }

    fn cells(&self) -> Vec<String> {
        let a = &self.author;
        vec![
            self.rank.to_string(),
            a.author.clone(),
            a.display_name.clone(),
            a.followers.to_string(),
            a.following.to_string(),
            a.verified.to_string(),
            a.location.clone(),
            ts_cell(a.account_created_at),
            a.row_count.to_string(),
            a.likes.total.to_string(),
            float_cell(a.likes.mean),
            a.likes.max.to_string(),
            a.shares.total.to_string(),
            float_cell(a.shares.mean),
            a.shares.max.to_string(),
            a.comments.total.to_string(),
            float_cell(a.comments.mean),
            a.comments.max.to_string(),
            a.quotes.total.to_string(),
            float_cell(a.quotes.mean),
            a.quotes.max.to_string(),
            a.views.total.to_string(),
            a.engagement.total.to_string(),
            float_cell(a.engagement.mean),
            a.engagement.max.to_string(),
            float_cell(a.engagement_rate),
            ts_cell(a.first_seen),
            ts_cell(a.last_seen),
            a.activity_span_days.map(|d| d.to_string()).unwrap_or_default(),
        ]
    }
}

impl TableRow for AuthorEdge {
    fn header() -> &'static [&'static str] {
        &["source", "target", "source_engagement", "target_engagement"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.source.clone(),
            self.target.clone(),
            self.source_engagement.to_string(),
            self.target_engagement.to_string(),
        ]
    }
}

fn ts_cell(ts: Option<OffsetDateTime>) -> String {
    ts.map(|t| format_rfc3339(&t)).unwrap_or_default()
}

fn float_cell(v: f64) -> String {
    format!("{v:.2}")
}

fn join_set(set: &BTreeSet<String>) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
}

/// RFC 4180: quote when the cell holds a comma, quote, CR or LF; double embedded quotes.
pub fn csv_cell(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// TSV has no quoting; tabs and line breaks inside a cell become spaces.
pub fn tsv_cell(s: &str) -> String {
    s.replace(['\t', '\n', '\r'], " ")
}

/// Buffered writer on a temp sibling of the destination.
struct TableWriter {
    tmp: PathBuf,
    w: BufWriter<File>,
}

impl TableWriter {
    fn create(dest: &Path, buf_bytes: usize) -> Result<Self> {
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
        }
        let tmp = tmp_sibling(dest);
        let f = create_with_backoff(&tmp, 16, 50).with_context(|| format!("create {}", tmp.display()))?;
        Ok(Self { tmp, w: BufWriter::with_capacity(buf_bytes.max(8 * 1024), f) })
    }

    fn line(&mut self, s: &str) -> Result<()> {
        self.w.write_all(s.as_bytes())?;
        self.w.write_all(b"\n")?;
        Ok(())
    }

    fn finish_atomic(mut self, dest: &Path) -> Result<()> {
        self.w.flush().with_context(|| format!("flush {}", self.tmp.display()))?;
        drop(self.w);
        replace_file_atomic_backoff(&self.tmp, dest)
    }
}

fn tmp_sibling(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    dest.with_file_name(name)
}

/// Write `items` as a table at `path`. Returns the number of data rows written.
pub fn write_table<T: TableRow>(path: &Path, items: &[T], format: TableFormat, buf_bytes: usize) -> Result<usize> {
    let mut w = TableWriter::create(path, buf_bytes)?;
    match format {
        TableFormat::Csv | TableFormat::Tsv => {
            let csv = format == TableFormat::Csv;
            let sep = if csv { "," } else { "\t" };
            let cell: fn(&str) -> String = if csv { csv_cell } else { tsv_cell };
            let header: Vec<String> = T::header().iter().map(|h| cell(h)).collect();
            w.line(&header.join(sep))?;
            for item in items {
                let cells: Vec<String> = item.cells().iter().map(|c| cell(c)).collect();
                w.line(&cells.join(sep))?;
            }
        }
        TableFormat::Jsonl => {
            for item in items {
                let s = serde_json::to_string(item).context("serialize row")?;
                w.line(&s)?;
            }
        }
    }
    w.finish_atomic(path)?;
    tracing::debug!(path = %path.display(), rows = items.len(), "wrote table");
    Ok(items.len())
}

pub fn write_rows(path: &Path, rows: &[NormalizedRow], format: TableFormat, buf_bytes: usize) -> Result<usize> {
    write_table(path, rows, format, buf_bytes)
}

pub fn write_ranked(path: &Path, ranked: &[RankedAuthor], format: TableFormat, buf_bytes: usize) -> Result<usize> {
    write_table(path, ranked, format, buf_bytes)
}

pub fn write_edges(path: &Path, edges: &[AuthorEdge], format: TableFormat, buf_bytes: usize) -> Result<usize> {
    write_table(path, edges, format, buf_bytes)
}

/// Pretty-printed JSON summary.
pub fn write_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    let mut w = TableWriter::create(path, 64 * 1024)?;
    serde_json::to_writer_pretty(&mut w.w, summary).context("serialize summary")?;
    w.line("")?;
    w.finish_atomic(path)
}
