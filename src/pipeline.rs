use crate::aggregate::{aggregate, AuthorTable};
use crate::config::{ETLOptions, Platform, TableFormat};
use crate::export::{write_edges, write_ranked, write_rows, write_summary};
use crate::fields::try_extract;
use crate::filters::{classify, relevant_rows};
use crate::model::{NormalizedRow, RankedAuthor};
use crate::network::{similarity_edges, AuthorEdge};
use crate::progress::ProgressScope;
use crate::rank::{rank, top};
use crate::report::{summarize, RunSummary};
use crate::source::{discover_inputs, load_records};
use crate::topic::TopicConfig;
use crate::util::init_tracing_once;
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Records dropped before they became rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SkipReport {
    /// Array elements / lines that decoded to something other than a JSON object.
    pub not_object: u64,
    /// Records without text, only counted when text is required.
    pub empty_text: u64,
    /// NDJSON lines that were not valid JSON.
    pub bad_lines: u64,
}

impl SkipReport {
    pub fn total(&self) -> u64 {
        self.not_object.saturating_add(self.empty_text).saturating_add(self.bad_lines)
    }
}

/// Everything one run produced, before anything is written.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub platform: Platform,
    pub topic: TopicConfig,
    /// Every normalized row, relevance flag set, in input order.
    pub rows: Vec<NormalizedRow>,
    /// Aggregates over the relevant rows, in first-seen order.
    pub authors: AuthorTable,
    /// All authors ranked by total engagement.
    pub ranked: Vec<RankedAuthor>,
    pub skipped: SkipReport,
}

impl RunOutcome {
    pub fn relevant(&self) -> Vec<&NormalizedRow> {
        relevant_rows(&self.rows)
    }

    pub fn summary(&self) -> RunSummary {
        summarize(&self.rows, &self.ranked, &self.topic, &self.skipped)
    }

    pub fn edges(&self, top_n: usize, ratio: f64) -> Vec<AuthorEdge> {
        similarity_edges(&self.ranked, top_n, ratio)
    }
}

#[derive(Clone, Default)]
pub struct DiscourseETL {
    pub(crate) opts: ETLOptions,
}

impl DiscourseETL {
    pub fn new() -> Self {
        Self { opts: ETLOptions::default() }
    }

    pub fn from_options(opts: ETLOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &ETLOptions {
        &self.opts
    }

    // -------- Builder methods --------
    pub fn platform(mut self, platform: Platform) -> Self { self.opts = self.opts.with_platform(platform); self }
    pub fn input(mut self, path: impl AsRef<Path>) -> Self { self.opts = self.opts.with_input(path); self }
    pub fn inputs<I, P>(mut self, paths: I) -> Self where I: IntoIterator<Item = P>, P: AsRef<Path> { self.opts = self.opts.with_inputs(paths); self }
    pub fn out_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_out_dir(dir); self }
    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self { self.opts = self.opts.with_file_prefix(prefix); self }
    pub fn topic(mut self, topic: TopicConfig) -> Self { self.opts = self.opts.with_topic(topic); self }
    pub fn table_format(mut self, format: TableFormat) -> Self { self.opts = self.opts.with_table_format(format); self }
    pub fn top_n(mut self, n: Option<usize>) -> Self { self.opts = self.opts.with_top_n(n); self }
    pub fn require_text(mut self, yes: bool) -> Self { self.opts = self.opts.with_require_text(yes); self }
    pub fn network(mut self, top_n: usize, ratio: f64) -> Self { self.opts = self.opts.with_network(top_n, ratio); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }
    pub fn io_buffers(mut self, read_bytes: usize, write_bytes: usize) -> Self { self.opts = self.opts.with_io_buffers(read_bytes, write_bytes); self }

    /// discover -> load -> extract -> classify -> aggregate (relevant rows) -> rank.
    /// Input I/O and malformed JSON documents are fatal; bad records are skipped and counted.
    pub fn run(&self) -> Result<RunOutcome> {
        init_tracing_once();
        let opts = &self.opts;
        if opts.inputs.is_empty() {
            bail!("no inputs given");
        }
        if opts.topic.is_empty() {
            tracing::warn!("topic has no hashtags or phrases; no row will be relevant");
        }

        let files = discover_inputs(&opts.inputs)?;
        if files.is_empty() {
            tracing::warn!("No input files found. Check the given paths.");
        } else {
            tracing::info!("Planned {} input files for platform {}.", files.len(), opts.platform);
        }

        let mut skipped = SkipReport::default();
        let mut loaded = Vec::with_capacity(files.len());
        for path in &files {
            let input = load_records(path, opts.read_buffer_bytes)
                .with_context(|| format!("loading {}", path.display()))?;
            skipped.bad_lines += input.bad_lines;
            loaded.push(input);
        }

        let total: u64 = loaded.iter().map(|l| l.records.len() as u64).sum();
        let label = opts.progress_label.clone().unwrap_or_else(|| format!("Normalizing {} records", opts.platform));
        let pb = ProgressScope::count(opts.progress, &label, total);

        let rules = opts.platform.rules();
        let mut rows = Vec::with_capacity(total as usize);
        for input in &loaded {
            for (idx, raw) in input.records.iter().enumerate() {
                pb.inc(1);
                let row = match try_extract(raw, rules) {
                    Ok(row) => row,
                    Err(e) => {
                        tracing::warn!(path = %input.path.display(), index = idx, error = %e, "skipping record");
                        skipped.not_object += 1;
                        continue;
                    }
                };
                if opts.require_text && row.text.trim().is_empty() {
                    tracing::debug!(path = %input.path.display(), index = idx, id = %row.id, "skipping record without text");
                    skipped.empty_text += 1;
                    continue;
                }
                rows.push(row);
            }
        }
        pb.finish(format!("{} rows", rows.len()));

        let rows = classify(rows, &opts.topic);
        let authors = aggregate(relevant_rows(&rows), opts.platform);
        let ranked = rank(&authors);

        tracing::info!(
            rows = rows.len(),
            relevant = rows.iter().filter(|r| r.relevant).count(),
            authors = authors.len(),
            skipped = skipped.total(),
            "run complete"
        );

        Ok(RunOutcome { platform: opts.platform, topic: opts.topic.clone(), rows, authors, ranked, skipped })
    }

    /// Write the processed, topic, influencer and network tables plus the JSON summary
    /// under `out_dir`. Returns the written paths in that order.
    pub fn export_all(&self, outcome: &RunOutcome) -> Result<Vec<PathBuf>> {
        init_tracing_once();
        let opts = &self.opts;
        fs::create_dir_all(&opts.out_dir).with_context(|| format!("create {}", opts.out_dir.display()))?;

        let ext = opts.table_format.extension();
        let prefix = opts.prefix();
        let path_for = |name: &str, ext: &str| opts.out_dir.join(format!("{prefix}_{name}.{ext}"));
        let buf = opts.write_buffer_bytes;

        let processed = path_for("processed", ext);
        write_rows(&processed, &outcome.rows, opts.table_format, buf)?;

        let topic_rows: Vec<NormalizedRow> = outcome.relevant().into_iter().cloned().collect();
        let topic = path_for("topic", ext);
        write_rows(&topic, &topic_rows, opts.table_format, buf)?;

        let influencers = path_for("influencers", ext);
        let ranked = top(outcome.ranked.clone(), opts.top_n);
        write_ranked(&influencers, &ranked, opts.table_format, buf)?;

        let network = path_for("network", ext);
        let edges = outcome.edges(opts.network_top_n, opts.network_ratio);
        write_edges(&network, &edges, opts.table_format, buf)?;

        let summary = path_for("summary", "json");
        write_summary(&summary, &outcome.summary())?;

        let written = vec![processed, topic, influencers, network, summary];
        for p in &written {
            tracing::info!(path = %p.display(), "wrote");
        }
        Ok(written)
    }

    pub fn run_and_export(&self) -> Result<(RunOutcome, Vec<PathBuf>)> {
        let outcome = self.run()?;
        let written = self.export_all(&outcome)?;
        Ok((outcome, written))
    }
}
