//! Topic configuration: the campaign hashtags and phrases a row is matched against.
//! Lists are supplied by the caller (file or preset) and normalized once up front.

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Campaign-specific keyword lists.
/// Hashtags are stored lowercase with a leading `#`; phrases lowercase. Both sorted + deduped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicConfig {
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub phrases: Vec<String>,
}

impl TopicConfig {
    pub fn new<H, P, S, T>(hashtags: H, phrases: P) -> Self
    where
        H: IntoIterator<Item = S>,
        P: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            hashtags: hashtags.into_iter().map(|s| s.as_ref().to_string()).collect(),
            phrases: phrases.into_iter().map(|s| s.as_ref().to_string()).collect(),
        }
        .normalize()
    }

    /// Normalize to lowercase (hashtags gain `#`), then sort + dedup for binary_search lookups.
    pub fn normalize(mut self) -> Self {
        self.hashtags = self
            .hashtags
            .iter()
            .filter_map(|s| normalize_hashtag(s))
            .collect();
        self.hashtags.sort();
        self.hashtags.dedup();

        self.phrases = self
            .phrases
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        self.phrases.sort();
        self.phrases.dedup();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.hashtags.is_empty() && self.phrases.is_empty()
    }

    /// Exact (already-normalized) hashtag membership.
    pub fn has_hashtag(&self, tag: &str) -> bool {
        self.hashtags.binary_search_by(|h| h.as_str().cmp(tag)).is_ok()
    }

    /// Load `{"hashtags": [...], "phrases": [...]}`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let cfg: TopicConfig =
            serde_json::from_str(&raw).with_context(|| format!("parse topic config {}", path.display()))?;
        Ok(cfg.normalize())
    }

    /// Load a plain list: lines starting with `#` are hashtags, other non-empty lines are phrases.
    /// Lines starting with `//` are comments.
    pub fn from_list_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let mut cfg = TopicConfig::default();
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            if line.starts_with('#') {
                cfg.hashtags.push(line.to_string());
            } else {
                cfg.phrases.push(line.to_string());
            }
        }
        Ok(cfg.normalize())
    }

    /// Pick the loader from the file extension (`.json` vs anything else).
    pub fn from_file(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_file(path),
            _ => Self::from_list_file(path),
        }
    }

    /// Preset for the Kenya Finance Bill 2024 protest discourse.
    pub fn finance_bill_2024() -> Self {
        Self::new(
            [
                "#rejectfinancebill2024", "#rutomustgo", "#occupyparliament",
                "#genzkenya", "#kenyaprotests", "#genzrevolution", "#totalshutdown",
                "#kenyangenz", "#financebill2024", "#youth4change", "#rutoamustgo",
                "#parliamentoccupied", "#kenyageneration", "#kenyanprotest", "#genzparliament",
                "#rejectfinancebill", "#financebill", "#kenyagenx", "#genxkenya",
            ],
            [
                "finance bill", "ruto must go", "occupy parliament", "gen z", "genz",
                "kenya protest", "reject finance", "total shutdown", "parliament occupied",
                "zakayo", "finance act", "tax bill", "taxation", "kenyan youth",
            ],
        )
    }
}

fn tag_body_re() -> &'static Regex {
    static TAG_BODY_RE: OnceLock<Regex> = OnceLock::new();
    TAG_BODY_RE.get_or_init(|| Regex::new(r"^\w+").expect("valid tag regex"))
}

/// `"RejectFinanceBill"` / `"#RejectFinanceBill "` -> `"#rejectfinancebill"`.
/// Only the leading run of word characters is kept, so `"#finance bill"` -> `"#finance"`.
/// None when no word character follows the `#`.
pub fn normalize_hashtag(s: &str) -> Option<String> {
    let body = s.trim().trim_start_matches('#');
    let word = tag_body_re().find(body)?.as_str();
    Some(format!("#{}", word.to_lowercase()))
}
