//! Input discovery and loading: JSON documents, NDJSON, and either one zstd-compressed.
//!
//! A JSON document is a top-level array of records, or an object wrapping the array under
//! one of the usual envelope keys, or a single record object. NDJSON lines that fail to
//! decode are skipped and counted; a malformed JSON document is fatal.

use crate::json_utils::kind_name;
use crate::util::open_with_backoff;
use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zstd::stream::read::Decoder;

/// Envelope keys tried, in order, when the document is an object.
pub const ENVELOPE_KEYS: &[&str] = &["tweets", "data", "results", "items", "posts"];

/// How a file's records are laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Document,
    Lines,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputFormat {
    pub kind: InputKind,
    pub compressed: bool,
}

impl InputFormat {
    /// `x.json`, `x.jsonl`, `x.ndjson`, each optionally with `.zst`. None for anything else.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        let (stem, compressed) = match name.strip_suffix(".zst") {
            Some(rest) => (rest.to_string(), true),
            None => (name, false),
        };
        let kind = if stem.ends_with(".jsonl") || stem.ends_with(".ndjson") {
            InputKind::Lines
        } else if stem.ends_with(".json") {
            InputKind::Document
        } else {
            return None;
        };
        Some(Self { kind, compressed })
    }
}

/// Records read from one input file.
#[derive(Debug)]
pub struct LoadedInput {
    pub path: PathBuf,
    pub records: Vec<Value>,
    /// NDJSON lines that were not valid JSON.
    pub bad_lines: u64,
}

/// Expand inputs: files pass through as given; directories contribute their
/// recognised files (depth 1), sorted by path.
pub fn discover_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for p in paths {
        if p.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(p)
                .min_depth(1)
                .max_depth(1)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| InputFormat::from_path(p).is_some())
                .collect();
            found.sort();
            if found.is_empty() {
                tracing::warn!(dir = %p.display(), "no JSON exports found in directory");
            }
            out.extend(found);
        } else if p.exists() {
            out.push(p.clone());
        } else {
            bail!("input not found: {}", p.display());
        }
    }
    Ok(out)
}

pub fn load_records(path: &Path, read_buf_bytes: usize) -> Result<LoadedInput> {
    // unknown extensions are read as a plain JSON document
    let fmt = InputFormat::from_path(path).unwrap_or(InputFormat { kind: InputKind::Document, compressed: false });
    let file = open_with_backoff(path, 16, 50).with_context(|| format!("open {}", path.display()))?;
    let cap = read_buf_bytes.max(8 * 1024);

    let reader: Box<dyn Read> = if fmt.compressed {
        let mut decoder = Decoder::new(file).with_context(|| format!("zstd init {}", path.display()))?;
        decoder
            .window_log_max(31)
            .with_context(|| format!("zstd window {}", path.display()))?;
        Box::new(decoder)
    } else {
        Box::new(file)
    };
    let reader = BufReader::with_capacity(cap, reader);

    let (records, bad_lines) = match fmt.kind {
        InputKind::Document => {
            let doc: Value = serde_json::from_reader(reader)
                .with_context(|| format!("invalid JSON document {}", path.display()))?;
            let records = records_from_document(doc).with_context(|| format!("no records in {}", path.display()))?;
            (records, 0)
        }
        InputKind::Lines => read_lines(reader).with_context(|| format!("read {}", path.display()))?,
    };

    tracing::info!(path = %path.display(), records = records.len(), bad_lines, "loaded input");
    Ok(LoadedInput { path: path.to_path_buf(), records, bad_lines })
}

/// Unwrap a parsed document into its record list.
pub fn records_from_document(doc: Value) -> Result<Vec<Value>> {
    match doc {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => {
            if let Some(key) = ENVELOPE_KEYS.iter().find(|k| map.get(**k).is_some_and(|v| v.is_array())) {
                tracing::debug!(key, "records found under envelope key");
                return match map.remove(*key) {
                    Some(Value::Array(items)) => Ok(items),
                    _ => Err(anyhow!("envelope key '{key}' vanished")),
                };
            }
            if map.contains_key("id") || map.contains_key("text") {
                return Ok(vec![Value::Object(map)]);
            }
            bail!("object has no record array ({}) and does not look like a single record", ENVELOPE_KEYS.join(", "))
        }
        other => bail!("expected an array or object at top level, found {}", kind_name(&other)),
    }
}

fn read_lines<R: BufRead>(mut reader: R) -> Result<(Vec<Value>, u64)> {
    let mut records = Vec::new();
    let mut bad = 0u64;
    let mut buf = String::with_capacity(16 * 1024);
    let mut line_no = 0u64;
    loop {
        buf.clear();
        let n = reader.read_line(&mut buf)?;
        if n == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(v) => records.push(v),
            Err(e) => {
                tracing::warn!(line = line_no, error = %e, "skipping undecodable NDJSON line");
                bad += 1;
            }
        }
    }
    Ok((records, bad))
}
