#[path = "common/mod.rs"]
mod common;

use common::*;
use discourse_etl::{DiscourseETL, Platform, TableFormat, TopicConfig};
use serde_json::{json, Value};
use std::fs;

fn etl_for(base: &std::path::Path) -> DiscourseETL {
    DiscourseETL::new()
        .platform(Platform::X)
        .topic(TopicConfig::finance_bill_2024())
        .out_dir(base.join("out"))
        .progress(false)
}

#[test]
fn end_to_end_run_skips_bad_records_and_ranks_relevant_authors() {
    let base = temp_base();
    let input = base.join("raw").join("tweets.json");
    let mut records = x_export().as_array().unwrap().clone();
    records.push(json!(42));
    records.push(json!(null));
    write_json(&input, &Value::Array(records));

    let outcome = etl_for(&base).input(&input).run().unwrap();

    assert_eq!(outcome.rows.len(), 4);
    assert_eq!(outcome.skipped.not_object, 2);
    assert_eq!(outcome.skipped.total(), 2);
    assert_eq!(outcome.relevant().len(), 3);

    // alice: (10 + 5) + 3 = 18, bob: 40; carol is off-topic
    let ranked: Vec<(&str, u64)> = outcome
        .ranked
        .iter()
        .map(|r| (r.author.author.as_str(), r.author.total_engagement()))
        .collect();
    assert_eq!(ranked, vec![("bob", 40), ("alice", 18)]);

    let alice = outcome.authors.get("alice").unwrap();
    assert_eq!(alice.row_count, 2);
    assert_eq!(alice.followers, 100);
    assert_eq!(alice.activity_span_days, Some(5));
}

#[test]
fn run_is_idempotent() {
    let base = temp_base();
    let input = base.join("tweets.json");
    write_json(&input, &x_export());
    let etl = etl_for(&base).input(&input);
    let a = etl.run().unwrap();
    let b = etl.run().unwrap();
    assert_eq!(a.rows, b.rows);
    assert_eq!(a.ranked, b.ranked);
}

#[test]
fn require_text_drops_textless_records() {
    let base = temp_base();
    let input = base.join("tweets.jsonl");
    write_lines(
        &input,
        &[
            json!({ "id": "1", "text": "finance bill", "user": { "screen_name": "a" } }).to_string(),
            json!({ "id": "2", "user": { "screen_name": "b" } }).to_string(),
            "oops".to_string(),
        ],
    );

    let kept = etl_for(&base).input(&input).run().unwrap();
    assert_eq!(kept.rows.len(), 2);
    assert_eq!(kept.skipped.bad_lines, 1);

    let strict = etl_for(&base).input(&input).require_text(true).run().unwrap();
    assert_eq!(strict.rows.len(), 1);
    assert_eq!(strict.skipped.empty_text, 1);
    assert_eq!(strict.skipped.total(), 2);
}

#[test]
fn malformed_document_and_missing_inputs_fail_the_run() {
    let base = temp_base();
    let bad = base.join("bad.json");
    fs::write(&bad, "{{{").unwrap();
    assert!(etl_for(&base).input(&bad).run().is_err());
    assert!(etl_for(&base).input(base.join("nope.json")).run().is_err());
    assert!(etl_for(&base).run().is_err());
}

#[test]
fn export_all_writes_every_table() {
    let base = temp_base();
    let input = base.join("tweets.json");
    write_json(&input, &x_export());

    let (outcome, written) = etl_for(&base).input(&input).run_and_export().unwrap();
    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec!["x_processed.csv", "x_topic.csv", "x_influencers.csv", "x_network.csv", "x_summary.json"]
    );
    for p in &written {
        assert!(p.exists(), "{} missing", p.display());
    }
    // no temp files left behind
    let leftovers = fs::read_dir(base.join("out"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .count();
    assert_eq!(leftovers, 0);

    let processed = read_lines(&written[0]);
    assert!(processed[0].starts_with("id,url,text,author,"));
    assert_eq!(processed.len(), 1 + outcome.rows.len());

    let topic = read_lines(&written[1]);
    assert_eq!(topic.len(), 1 + 3);

    let influencers = read_lines(&written[2]);
    assert!(influencers[0].starts_with("rank,author,"));
    assert!(influencers[1].starts_with("1,bob,"));
    assert!(influencers[2].starts_with("2,alice,"));

    let summary: Value = serde_json::from_str(&fs::read_to_string(&written[4]).unwrap()).unwrap();
    assert_eq!(summary["total_rows"], 4);
    assert_eq!(summary["relevant_rows"], 3);
    assert_eq!(summary["unique_authors"], 2);
    assert_eq!(summary["top_authors"][0]["author"], "bob");
}

#[test]
fn export_respects_format_prefix_and_top_n() {
    let base = temp_base();
    let input = base.join("tweets.json");
    write_json(&input, &x_export());

    let (_, written) = etl_for(&base)
        .input(&input)
        .file_prefix("kenya")
        .table_format(TableFormat::Jsonl)
        .top_n(Some(1))
        .run_and_export()
        .unwrap();

    assert!(written[2].ends_with("kenya_influencers.jsonl"));
    let influencers = read_lines(&written[2]);
    assert_eq!(influencers.len(), 1);
    let top: Value = serde_json::from_str(&influencers[0]).unwrap();
    assert_eq!(top["rank"], 1);
    assert_eq!(top["author"], "bob");
    assert_eq!(top["engagement"]["total"], 40);
}

#[test]
fn tiktok_directory_input() {
    let base = temp_base();
    let dir = base.join("tiktok");
    write_json(
        &dir.join("videos.json"),
        &json!({ "items": [
            {
                "id": "v1",
                "text": "Gen Z will not be silenced #RutoMustGo",
                "authorMeta": { "name": "nairobi_voice", "fans": 500 },
                "diggCount": 90, "commentCount": 6, "shareCount": 4,
                "createTimeISO": "2024-06-25T10:00:00.000Z"
            },
            {
                "id": "v2",
                "text": "cooking video",
                "authorMeta": { "name": "chef", "fans": 10 },
                "diggCount": 1000
            }
        ] }),
    );

    let outcome = DiscourseETL::new()
        .platform(Platform::TikTok)
        .topic(TopicConfig::finance_bill_2024())
        .input(&dir)
        .progress(false)
        .run()
        .unwrap();

    assert_eq!(outcome.rows.len(), 2);
    assert_eq!(outcome.ranked.len(), 1);
    let top = &outcome.ranked[0].author;
    assert_eq!(top.author, "nairobi_voice");
    assert_eq!(top.total_engagement(), 100);
    assert_eq!(top.engagement_rate, 20.0);
}
