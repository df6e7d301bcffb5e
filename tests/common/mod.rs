use discourse_etl::{extract, NormalizedRow, Platform};
use serde_json::{json, Value};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Fresh temp directory that outlives the test (kept for post-mortem inspection).
pub fn temp_base() -> PathBuf {
    tempfile::tempdir().unwrap().into_path()
}

/// Write a JSON document (array, envelope object, or single record).
pub fn write_json(path: &Path, doc: &Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(doc).unwrap()).unwrap();
}

/// Write raw NDJSON lines as given (invalid lines allowed).
pub fn write_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut f = File::create(path).unwrap();
    for l in lines {
        writeln!(&mut f, "{}", l).unwrap();
    }
}

/// Write a compressed `.zst` file containing the provided lines.
pub fn write_zst_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let f = File::create(path).unwrap();
    let mut enc = zstd::stream::write::Encoder::new(f, 3).unwrap();
    for l in lines {
        writeln!(&mut enc, "{}", l).unwrap();
    }
    enc.finish().unwrap();
}

/// Read a text file line-by-line into strings (skips empty lines).
pub fn read_lines(path: &Path) -> Vec<String> {
    let f = File::open(path).unwrap();
    let r = BufReader::new(f);
    r.lines().map(|l| l.unwrap()).filter(|s| !s.is_empty()).collect()
}

/// Minimal X record: author handle, text, likes, retweets, follower count.
pub fn tweet(id: &str, author: &str, text: &str, likes: u64, retweets: u64, followers: u64) -> Value {
    json!({
        "id_str": id,
        "text": text,
        "user": { "screen_name": author, "name": author.to_uppercase(), "followers_count": followers },
        "favorite_count": likes,
        "retweet_count": retweets,
        "created_at": "Tue Jun 25 14:00:00 +0000 2024",
    })
}

pub fn x_row(raw: &Value) -> NormalizedRow {
    extract(raw, Platform::X.rules())
}

/// A small X export:
/// - t1 by "alice": campaign hashtag, 10 likes + 5 retweets, 100 followers
/// - t2 by "bob": campaign phrase in text, 40 likes, 0 followers
/// - t3 by "carol": off-topic
/// - t4 by "alice": campaign hashtag via `entities`, 3 likes
pub fn x_export() -> Value {
    json!([
        tweet("t1", "alice", "#RejectFinanceBill2024 stop the bill", 10, 5, 100),
        tweet("t2", "bob", "Ruto must go, says the street", 40, 0, 0),
        tweet("t3", "carol", "lunch was great", 99, 99, 5000),
        {
            "id_str": "t4",
            "full_text": "see you at parliament",
            "user": { "screen_name": "alice", "followers_count": 250 },
            "favorite_count": 3,
            "entities": { "hashtags": [ { "text": "OccupyParliament" } ] },
            "created_at": "2024-06-20T09:30:00Z"
        }
    ])
}
