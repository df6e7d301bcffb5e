#[path = "common/mod.rs"]
mod common;

use common::*;
use discourse_etl::{
    classify, entity_hashtags, extract_hashtags, extract_mentions, is_relevant, merged_hashtags, normalize_hashtag,
    relevant_rows, FieldRules, TopicConfig,
};
use serde_json::json;
use std::collections::BTreeSet;

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn hashtags_from_text_are_lowercased_and_deduped() {
    let tags = extract_hashtags("Stop #RejectFinanceBill2024 now! #rejectfinancebill2024 #GenZ_Kenya");
    assert_eq!(tags, set(&["#genz_kenya", "#rejectfinancebill2024"]));
    assert!(extract_hashtags("no tags here # alone").is_empty());
}

#[test]
fn mentions_from_text() {
    assert_eq!(extract_mentions("cc @Alice and @bob_2"), set(&["@alice", "@bob_2"]));
}

#[test]
fn entity_hashtags_are_unioned_with_text() {
    let raw = json!({
        "text": "#GenZ",
        "entities": { "hashtags": [ { "text": "OccupyParliament" }, { "text": "genz" } ] }
    });
    assert_eq!(entity_hashtags(&raw, FieldRules::x()), set(&["#genz", "#occupyparliament"]));
    assert_eq!(merged_hashtags("#GenZ", &raw, FieldRules::x()), set(&["#genz", "#occupyparliament"]));

    // bare-string entries are accepted too
    let bare = json!({ "hashtags": ["FinanceBill"] });
    assert_eq!(entity_hashtags(&bare, FieldRules::tiktok()), set(&["#financebill"]));
}

#[test]
fn topic_normalization() {
    let topic = TopicConfig::new(["RejectFinanceBill2024", "#rejectfinancebill2024", " "], ["  Ruto Must Go "]);
    assert_eq!(topic.hashtags, vec!["#rejectfinancebill2024".to_string()]);
    assert_eq!(topic.phrases, vec!["ruto must go".to_string()]);
    assert_eq!(normalize_hashtag("#"), None);
}

#[test]
fn hashtags_stop_at_the_first_non_word_character() {
    assert_eq!(normalize_hashtag("#finance bill"), Some("#finance".to_string()));
    assert_eq!(normalize_hashtag(" #GenZ!! "), Some("#genz".to_string()));
    assert_eq!(normalize_hashtag("#-genz"), None);
    assert_eq!(normalize_hashtag("#   "), None);

    let raw = json!({ "entities": { "hashtags": [ { "text": "RejectFinanceBill, now" }, { "text": "..." } ] } });
    assert_eq!(entity_hashtags(&raw, FieldRules::x()), set(&["#rejectfinancebill"]));

    let topic = TopicConfig::new(["#Occupy Parliament"], Vec::<String>::new());
    assert_eq!(topic.hashtags, vec!["#occupy".to_string()]);
}

#[test]
fn relevance_by_hashtag_or_phrase() {
    let topic = TopicConfig::new(["#RejectFinanceBill2024"], ["Ruto Must Go"]);

    let by_tag = x_row(&tweet("1", "a", "#REJECTFINANCEBILL2024", 0, 0, 0));
    let by_phrase = x_row(&tweet("2", "b", "They chant RUTO MUST GO tonight", 0, 0, 0));
    let partial_tag = x_row(&tweet("3", "c", "#rejectfinancebill is trending", 0, 0, 0));
    let off_topic = x_row(&tweet("4", "d", "nice weather", 0, 0, 0));

    assert!(is_relevant(&by_tag, &topic));
    assert!(is_relevant(&by_phrase, &topic));
    assert!(!is_relevant(&partial_tag, &topic), "hashtags match exactly, never by prefix");
    assert!(!is_relevant(&off_topic, &topic));
}

#[test]
fn empty_topic_matches_nothing() {
    let row = x_row(&tweet("1", "a", "#RejectFinanceBill2024 finance bill", 0, 0, 0));
    assert!(!is_relevant(&row, &TopicConfig::default()));
}

#[test]
fn classify_labels_every_row_in_order() {
    let export = x_export();
    let rows: Vec<_> = export.as_array().unwrap().iter().map(x_row).collect();
    let rows = classify(rows, &TopicConfig::finance_bill_2024());

    let flags: Vec<bool> = rows.iter().map(|r| r.relevant).collect();
    assert_eq!(flags, vec![true, true, false, true]);

    let ids: Vec<&str> = relevant_rows(&rows).into_iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t2", "t4"]);
}
