use crate::fields::FieldRules;
use crate::topic::TopicConfig;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Source platform of the export being processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Platform {
    /// X / Twitter (v1.1 style objects, flattened scraper output, or v2 `public_metrics`).
    X,
    /// TikTok (Apify-style video objects).
    TikTok,
}

impl Platform {
    /// Field fallback table used to normalize this platform's records.
    pub fn rules(self) -> &'static FieldRules {
        match self {
            Platform::X => FieldRules::x(),
            Platform::TikTok => FieldRules::tiktok(),
        }
    }

    /// Short name used as the default prefix of exported files.
    pub fn file_prefix(self) -> &'static str {
        match self {
            Platform::X => "x",
            Platform::TikTok => "tiktok",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_prefix())
    }
}

impl FromStr for Platform {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "x" | "twitter" => Ok(Platform::X),
            "tiktok" | "tt" => Ok(Platform::TikTok),
            other => Err(format!("unknown platform '{other}' (expected x or tiktok)")),
        }
    }
}

/// Flat-table serialization for exports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
    Jsonl,
}

impl TableFormat {
    pub fn extension(self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Tsv => "tsv",
            TableFormat::Jsonl => "jsonl",
        }
    }
}

impl FromStr for TableFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(TableFormat::Csv),
            "tsv" => Ok(TableFormat::Tsv),
            "jsonl" | "ndjson" => Ok(TableFormat::Jsonl),
            other => Err(format!("unknown table format '{other}' (expected csv, tsv or jsonl)")),
        }
    }
}

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct ETLOptions {
    pub platform: Platform,
    pub inputs: Vec<PathBuf>,         // files or directories (depth 1)
    pub out_dir: PathBuf,
    pub file_prefix: Option<String>,  // None = platform prefix
    pub topic: TopicConfig,
    pub table_format: TableFormat,
    pub top_n: Option<usize>,         // truncate ranked export
    pub require_text: bool,           // skip records without any text
    pub network_top_n: usize,
    pub network_ratio: f64,
    pub progress: bool,
    pub progress_label: Option<String>,

    // IO tuning
    pub read_buffer_bytes: usize,
    pub write_buffer_bytes: usize,
}

impl Default for ETLOptions {
    fn default() -> Self {
        Self {
            platform: Platform::X,
            inputs: Vec::new(),
            out_dir: PathBuf::from("data/processed_data"),
            file_prefix: None,
            topic: TopicConfig::default(),
            table_format: TableFormat::Csv,
            top_n: None,
            require_text: false,
            network_top_n: 30,
            network_ratio: 0.5,
            progress: true,
            progress_label: None,

            read_buffer_bytes: 256 * 1024,
            write_buffer_bytes: 256 * 1024,
        }
    }
}

impl ETLOptions {
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }
    pub fn with_input(mut self, path: impl AsRef<Path>) -> Self {
        self.inputs.push(path.as_ref().to_path_buf());
        self
    }
    pub fn with_inputs<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.inputs.extend(paths.into_iter().map(|p| p.as_ref().to_path_buf()));
        self
    }
    pub fn with_out_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.out_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = Some(prefix.into());
        self
    }
    pub fn with_topic(mut self, topic: TopicConfig) -> Self {
        self.topic = topic.normalize();
        self
    }
    pub fn with_table_format(mut self, format: TableFormat) -> Self {
        self.table_format = format;
        self
    }
    pub fn with_top_n(mut self, n: Option<usize>) -> Self {
        self.top_n = n;
        self
    }
    pub fn with_require_text(mut self, yes: bool) -> Self {
        self.require_text = yes;
        self
    }
    pub fn with_network(mut self, top_n: usize, ratio: f64) -> Self {
        self.network_top_n = top_n;
        self.network_ratio = if ratio.is_finite() { ratio.max(0.0) } else { 0.0 };
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }

    // IO buffers tuning
    pub fn with_io_buffers(mut self, read_bytes: usize, write_bytes: usize) -> Self {
        self.read_buffer_bytes = read_bytes.max(8 * 1024);
        self.write_buffer_bytes = write_bytes.max(8 * 1024);
        self
    }

    pub fn prefix(&self) -> &str {
        self.file_prefix.as_deref().unwrap_or_else(|| self.platform.file_prefix())
    }
}
