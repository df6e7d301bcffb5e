//! Hashtag and mention extraction from free text and structured entity fields.

use crate::fields::FieldRules;
use crate::json_utils::{lookup, scalar_string};
use crate::topic::normalize_hashtag;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::OnceLock;

fn hashtag_re() -> &'static Regex {
    static HASHTAG_RE: OnceLock<Regex> = OnceLock::new();
    HASHTAG_RE.get_or_init(|| Regex::new(r"#\w+").expect("valid hashtag regex"))
}

fn mention_re() -> &'static Regex {
    static MENTION_RE: OnceLock<Regex> = OnceLock::new();
    MENTION_RE.get_or_init(|| Regex::new(r"@\w+").expect("valid mention regex"))
}

/// `#` followed by word characters, lowercased, duplicates collapsed.
pub fn extract_hashtags(text: &str) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    hashtag_re().find_iter(&lower).map(|m| m.as_str().to_string()).collect()
}

pub fn extract_mentions(text: &str) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    mention_re().find_iter(&lower).map(|m| m.as_str().to_string()).collect()
}

/// Hashtags listed in structured entity arrays (e.g. `entities.hashtags[].text`).
/// Entries may be objects (read via the rule's inner key) or bare strings.
pub fn entity_hashtags(raw: &Value, rules: &FieldRules) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    for (path, key) in rules.hashtag_entities {
        let Some(items) = lookup(raw, path).and_then(|v| v.as_array()) else { continue };
        for item in items {
            let tag = match item {
                Value::Object(_) => lookup(item, key).and_then(scalar_string),
                other => scalar_string(other),
            };
            if let Some(tag) = tag.as_deref().and_then(normalize_hashtag) {
                out.insert(tag);
            }
        }
    }
    out
}

/// Mentions listed in structured entity arrays, normalized to `@lower`.
pub fn entity_mentions(raw: &Value, rules: &FieldRules) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    for (path, key) in rules.mention_entities {
        let Some(items) = lookup(raw, path).and_then(|v| v.as_array()) else { continue };
        for item in items {
            let name = match item {
                Value::Object(_) => lookup(item, key).and_then(scalar_string),
                other => scalar_string(other),
            };
            if let Some(name) = name {
                let name = name.trim().trim_start_matches('@').to_lowercase();
                if !name.is_empty() {
                    out.insert(format!("@{name}"));
                }
            }
        }
    }
    out
}

/// Union of text-scanned and entity-listed hashtags; either source alone may be incomplete.
pub fn merged_hashtags(text: &str, raw: &Value, rules: &FieldRules) -> BTreeSet<String> {
    let mut tags = extract_hashtags(text);
    tags.extend(entity_hashtags(raw, rules));
    tags
}

pub fn merged_mentions(text: &str, raw: &Value, rules: &FieldRules) -> BTreeSet<String> {
    let mut names = extract_mentions(text);
    names.extend(entity_mentions(raw, rules));
    names
}
