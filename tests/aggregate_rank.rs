#[path = "common/mod.rs"]
mod common;

use common::*;
use discourse_etl::{aggregate, classify, engagement_rate, rank, top, Platform, TopicConfig};
use serde_json::json;

#[test]
fn documented_example_aggregate() {
    let raw = json!({
        "text": "#rejectfinancebill2024 stop the bill",
        "user": { "screen_name": "a", "followers_count": 100 },
        "favorite_count": 10,
        "retweet_count": 5
    });
    let rows = classify(vec![x_row(&raw)], &TopicConfig::finance_bill_2024());
    assert!(rows[0].relevant);

    let table = aggregate(&rows, Platform::X);
    let a = table.get("a").unwrap();
    assert_eq!(a.total_engagement(), 15);
    assert_eq!(a.engagement_rate, 15.0);
    assert_eq!(a.row_count, 1);
    assert_eq!(a.activity_span_days, None);
}

#[test]
fn groups_sum_and_take_first_profile() {
    let rows = vec![
        x_row(&tweet("1", "alice", "x", 10, 2, 100)),
        x_row(&tweet("2", "bob", "x", 1, 0, 50)),
        x_row(&tweet("3", "alice", "x", 4, 0, 999)),
    ];
    let table = aggregate(&rows, Platform::X);
    assert_eq!(table.len(), 2);

    let alice = table.get("alice").unwrap();
    assert_eq!(alice.row_count, 2);
    assert_eq!(alice.likes.total, 14);
    assert_eq!(alice.likes.max, 10);
    assert_eq!(alice.likes.mean, 7.0);
    assert_eq!(alice.total_engagement(), 16);
    assert_eq!(alice.avg_engagement(), 8.0);
    // first-observed follower count, not the latest
    assert_eq!(alice.followers, 100);
    assert_eq!(alice.display_name, "ALICE");

    let order: Vec<&str> = table.iter().map(|a| a.author.as_str()).collect();
    assert_eq!(order, vec!["alice", "bob"]);
}

#[test]
fn row_count_matches_rows_per_author() {
    let export = x_export();
    let rows = classify(
        export.as_array().unwrap().iter().map(x_row).collect(),
        &TopicConfig::finance_bill_2024(),
    );
    let relevant: Vec<_> = rows.iter().filter(|r| r.relevant).collect();
    let table = aggregate(relevant.iter().copied(), Platform::X);
    for agg in table.iter() {
        let n = relevant.iter().filter(|r| r.author == agg.author).count() as u64;
        assert_eq!(agg.row_count, n);
    }
    assert!(table.get("carol").is_none());
}

#[test]
fn zero_followers_gives_zero_rate() {
    let rows = vec![x_row(&tweet("1", "bob", "x", 40, 0, 0))];
    let table = aggregate(&rows, Platform::X);
    let bob = table.get("bob").unwrap();
    assert_eq!(bob.engagement_rate, 0.0);
    assert_eq!(engagement_rate(0, 0), 0.0);
    assert!(engagement_rate(u64::MAX, 1).is_finite());
}

#[test]
fn activity_span_ignores_missing_timestamps() {
    let rows = vec![
        x_row(&json!({ "user": { "screen_name": "a" }, "favorite_count": 1, "created_at": "2024-06-18T10:00:00Z" })),
        x_row(&json!({ "user": { "screen_name": "a" }, "favorite_count": 1, "created_at": "garbage" })),
        x_row(&json!({ "user": { "screen_name": "a" }, "favorite_count": 1, "created_at": "2024-06-25T09:00:00Z" })),
        x_row(&json!({ "user": { "screen_name": "solo" }, "created_at": "2024-06-25T09:00:00Z" })),
        x_row(&json!({ "user": { "screen_name": "none" } })),
    ];
    let table = aggregate(&rows, Platform::X);

    let a = table.get("a").unwrap();
    assert_eq!(a.row_count, 3);
    assert_eq!(a.likes.total, 3);
    assert_eq!(a.first_seen.unwrap().unix_timestamp(), 1_718_704_800);
    // 6 days 23 hours truncates to 6
    assert_eq!(a.activity_span_days, Some(6));

    assert_eq!(table.get("solo").unwrap().activity_span_days, Some(0));
    let none = table.get("none").unwrap();
    assert_eq!(none.activity_span_days, None);
    assert!(none.first_seen.is_none());
}

#[test]
fn tiktok_engagement_formula() {
    let raw = json!({
        "authorMeta": { "name": "tt", "fans": 200 },
        "diggCount": 10, "commentCount": 6, "shareCount": 4
    });
    let rows = vec![discourse_etl::extract(&raw, Platform::TikTok.rules())];
    let table = aggregate(&rows, Platform::TikTok);
    let tt = table.get("tt").unwrap();
    assert_eq!(tt.total_engagement(), 20);
    assert_eq!(tt.engagement_rate, 10.0);
}

#[test]
fn ties_keep_input_order_with_distinct_ranks() {
    let rows = vec![
        x_row(&tweet("1", "X", "x", 50, 0, 1)),
        x_row(&tweet("2", "Y", "x", 25, 25, 1)),
    ];
    let ranked = rank(&aggregate(&rows, Platform::X));
    let got: Vec<(&str, usize)> = ranked.iter().map(|r| (r.author.author.as_str(), r.rank)).collect();
    assert_eq!(got, vec![("X", 1), ("Y", 2)]);
}

#[test]
fn ranking_is_descending_and_idempotent() {
    let rows = vec![
        x_row(&tweet("1", "low", "x", 1, 0, 1)),
        x_row(&tweet("2", "high", "x", 100, 0, 1)),
        x_row(&tweet("3", "mid", "x", 30, 3, 1)),
        x_row(&tweet("4", "low", "x", 2, 0, 1)),
    ];
    let first = rank(&aggregate(&rows, Platform::X));
    let second = rank(&aggregate(&rows, Platform::X));
    assert_eq!(first, second);

    let names: Vec<&str> = first.iter().map(|r| r.author.author.as_str()).collect();
    assert_eq!(names, vec!["high", "mid", "low"]);
    for pair in first.windows(2) {
        assert!(pair[0].author.total_engagement() >= pair[1].author.total_engagement());
        assert_eq!(pair[0].rank + 1, pair[1].rank);
    }

    let top2 = top(first.clone(), Some(2));
    assert_eq!(top2.len(), 2);
    assert_eq!(top(first.clone(), None).len(), 3);
    assert_eq!(top(first, Some(10)).len(), 3);
}
