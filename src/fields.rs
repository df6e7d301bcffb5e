//! Field extraction: turns one heterogeneous raw record into a `NormalizedRow`.
//!
//! Each target field has an ordered list of candidate paths (dotted, into nested objects).
//! The first candidate that yields a usable value wins; anything missing falls back to the
//! schema default. Author attributes are resolved inside the first nested author object
//! found, or the record root when the export flattens author fields.

use crate::date::parse_timestamp;
use crate::entities::{merged_hashtags, merged_mentions};
use crate::json_utils::{
    any_present, first_array_len, first_count, first_flag, first_object, first_string, kind_name,
    lookup, scalar_string,
};
use crate::model::NormalizedRow;
use anyhow::{bail, Result};
use serde_json::Value;

/// Ordered candidate paths for every normalized field of one platform.
#[derive(Debug)]
pub struct FieldRules {
    pub id: &'static [&'static str],
    pub url: &'static [&'static str],
    /// `{id}` / `{author}` template used when no URL field is present.
    pub url_template: Option<&'static str>,
    pub text: &'static [&'static str],

    /// Where the author object may live; the record root is the final fallback.
    pub author_objects: &'static [&'static str],
    pub username: &'static [&'static str],
    pub display_name: &'static [&'static str],
    pub user_id: &'static [&'static str],
    pub followers: &'static [&'static str],
    pub following: &'static [&'static str],
    pub verified: &'static [&'static str],
    pub location: &'static [&'static str],
    /// Account creation time; read only inside a nested author object.
    pub account_created_at: &'static [&'static str],

    pub likes: &'static [&'static str],
    pub shares: &'static [&'static str],
    pub comments: &'static [&'static str],
    pub quotes: &'static [&'static str],
    pub views: &'static [&'static str],
    pub bookmarks: &'static [&'static str],

    pub created_at: &'static [&'static str],
    pub language: &'static [&'static str],
    pub source: &'static [&'static str],

    /// Non-null presence of any marker, or a true flag, sets the post-type bit.
    pub retweet_markers: &'static [&'static str],
    pub retweet_flags: &'static [&'static str],
    pub reply_markers: &'static [&'static str],
    pub reply_flags: &'static [&'static str],
    pub quote_markers: &'static [&'static str],
    pub quote_flags: &'static [&'static str],
    pub sensitive_flags: &'static [&'static str],
    pub thread_flags: &'static [&'static str],

    pub media_arrays: &'static [&'static str],
    /// (array path, key inside each entry)
    pub hashtag_entities: &'static [(&'static str, &'static str)],
    pub mention_entities: &'static [(&'static str, &'static str)],
    pub url_entities: &'static [(&'static str, &'static str)],
}

static X_RULES: FieldRules = FieldRules {
    id: &["id", "id_str", "rest_id", "tweet_id"],
    url: &["tweet_url", "url", "twitterUrl"],
    url_template: Some("https://twitter.com/i/web/status/{id}"),
    text: &["text", "full_text", "content", "tweet_text", "message", "desc"],

    author_objects: &["user", "author"],
    username: &["screen_name", "username", "userName", "handle"],
    display_name: &["name", "display_name", "displayName"],
    user_id: &["id_str", "id"],
    followers: &["followers_count", "followers", "followersCount", "public_metrics.followers_count"],
    following: &["friends_count", "following", "followingCount", "public_metrics.following_count"],
    verified: &["verified", "is_blue_verified", "isVerified", "isBlueVerified"],
    location: &["location"],
    account_created_at: &["created_at", "createdAt"],

    likes: &["favorite_count", "favourites_count", "likes", "like_count", "likeCount", "public_metrics.like_count"],
    shares: &["retweet_count", "retweets", "retweetCount", "public_metrics.retweet_count"],
    comments: &["reply_count", "replies", "replyCount", "public_metrics.reply_count"],
    quotes: &["quote_count", "quotes", "quoteCount", "public_metrics.quote_count"],
    views: &["view_count", "viewCount", "views", "views.count", "public_metrics.impression_count"],
    bookmarks: &["bookmark_count", "bookmarks", "bookmarkCount", "public_metrics.bookmark_count"],

    created_at: &["created_at", "createdAt", "date", "timestamp"],
    language: &["lang", "language"],
    source: &["source"],

    retweet_markers: &["retweeted_status", "retweeted_tweet"],
    retweet_flags: &["retweeted", "isRetweet"],
    reply_markers: &["in_reply_to_status_id", "in_reply_to_status_id_str", "in_reply_to_user_id", "inReplyToId"],
    reply_flags: &["isReply"],
    quote_markers: &["quoted_status", "quoted_tweet"],
    quote_flags: &["is_quote_status", "isQuote"],
    sensitive_flags: &["possibly_sensitive", "possiblySensitive"],
    thread_flags: &["is_thread", "isThread"],

    media_arrays: &["extended_entities.media", "entities.media", "media"],
    hashtag_entities: &[("entities.hashtags", "text"), ("entities.hashtags", "tag"), ("hashtags", "text")],
    mention_entities: &[("entities.user_mentions", "screen_name"), ("entities.mentions", "username")],
    url_entities: &[("entities.urls", "expanded_url"), ("entities.urls", "expandedUrl")],
};

static TIKTOK_RULES: FieldRules = FieldRules {
    id: &["id", "video_id", "aweme_id"],
    url: &["webVideoUrl", "url", "video_url", "shareUrl"],
    url_template: Some("https://www.tiktok.com/@{author}/video/{id}"),
    text: &["text", "desc", "description", "content", "title"],

    author_objects: &["author", "authorMeta"],
    username: &["uniqueId", "unique_id", "name", "username"],
    display_name: &["nickname", "nickName", "displayName"],
    user_id: &["id", "uid", "authorId"],
    followers: &["followerCount", "fans", "followers", "follower_count"],
    following: &["followingCount", "following", "following_count"],
    verified: &["verified"],
    location: &["location", "region"],
    account_created_at: &[],

    likes: &["stats.diggCount", "diggCount", "likes", "likeCount"],
    shares: &["stats.shareCount", "shareCount", "shares"],
    comments: &["stats.commentCount", "commentCount", "comments"],
    quotes: &[],
    views: &["stats.playCount", "playCount", "views"],
    bookmarks: &["stats.collectCount", "collectCount"],

    created_at: &["createTimeISO", "createTime", "create_time", "created_at"],
    language: &["textLanguage", "language", "lang"],
    source: &[],

    retweet_markers: &[],
    retweet_flags: &[],
    reply_markers: &[],
    reply_flags: &[],
    quote_markers: &[],
    quote_flags: &[],
    sensitive_flags: &[],
    thread_flags: &[],

    media_arrays: &["mediaUrls"],
    hashtag_entities: &[("challenges", "title"), ("hashtags", "name"), ("textExtra", "hashtagName")],
    mention_entities: &[("mentions", "uniqueId")],
    url_entities: &[],
};

impl FieldRules {
    pub fn x() -> &'static FieldRules {
        &X_RULES
    }

    pub fn tiktok() -> &'static FieldRules {
        &TIKTOK_RULES
    }

    /// The nested author object, if the record has one.
    pub fn nested_author<'a>(&self, raw: &'a Value) -> Option<&'a Value> {
        first_object(raw, self.author_objects)
    }

    /// The object author attributes are read from.
    pub fn author_object<'a>(&self, raw: &'a Value) -> &'a Value {
        self.nested_author(raw).unwrap_or(raw)
    }
}

/// Normalize one raw record. Total: missing or malformed fields become defaults,
/// unparseable timestamps become `None`. `relevant` starts false.
pub fn extract(raw: &Value, rules: &FieldRules) -> NormalizedRow {
    let text = first_string(raw, rules.text).unwrap_or_default();
    let id = first_string(raw, rules.id).unwrap_or_default();

    let author_obj = rules.author_object(raw);
    let author = first_string(author_obj, rules.username)
        .map(|s| s.trim().trim_start_matches('@').to_string())
        .unwrap_or_default();

    let url = first_string(raw, rules.url)
        .or_else(|| build_url(rules.url_template, &id, &author))
        .unwrap_or_default();

    // first candidate that parses; the raw text of the first present candidate is kept
    let created_raw = first_string(raw, rules.created_at).unwrap_or_default();
    let created_at = first_timestamp(raw, rules.created_at);
    // a flattened record's created_at is the post's, not the account's
    let author_created_at = rules
        .nested_author(raw)
        .and_then(|obj| first_timestamp(obj, rules.account_created_at));

    let hashtags = merged_hashtags(&text, raw, rules);
    let mentions = merged_mentions(&text, raw, rules);

    NormalizedRow {
        id,
        url,
        author_user_id: first_string(author_obj, rules.user_id).unwrap_or_default(),
        author_display_name: first_string(author_obj, rules.display_name).unwrap_or_default(),
        author_followers: first_count(author_obj, rules.followers).unwrap_or(0),
        author_following: first_count(author_obj, rules.following).unwrap_or(0),
        author_verified: first_flag(author_obj, rules.verified).unwrap_or(false),
        author_location: first_string(author_obj, rules.location).unwrap_or_default(),
        author_created_at,
        author,

        likes: first_count(raw, rules.likes).unwrap_or(0),
        shares: first_count(raw, rules.shares).unwrap_or(0),
        comments: first_count(raw, rules.comments).unwrap_or(0),
        quotes: first_count(raw, rules.quotes).unwrap_or(0),
        views: first_count(raw, rules.views).unwrap_or(0),
        bookmarks: first_count(raw, rules.bookmarks).unwrap_or(0),

        created_at,
        created_raw,

        hashtags,
        mentions,
        urls: entity_urls(raw, rules),
        language: first_string(raw, rules.language).unwrap_or_default(),
        source: first_string(raw, rules.source).unwrap_or_default(),

        is_retweet: any_present(raw, rules.retweet_markers)
            || first_flag(raw, rules.retweet_flags).unwrap_or(false),
        is_reply: any_present(raw, rules.reply_markers)
            || first_flag(raw, rules.reply_flags).unwrap_or(false),
        is_quote: any_present(raw, rules.quote_markers)
            || first_flag(raw, rules.quote_flags).unwrap_or(false),
        media_count: first_array_len(raw, rules.media_arrays),
        possibly_sensitive: first_flag(raw, rules.sensitive_flags).unwrap_or(false),
        is_thread: first_flag(raw, rules.thread_flags).unwrap_or(false),

        text,
        relevant: false,
    }
}

/// `extract` for values that must be records; non-objects are rejected so the caller
/// can skip and count them.
pub fn try_extract(raw: &Value, rules: &FieldRules) -> Result<NormalizedRow> {
    if !raw.is_object() {
        bail!("record is a JSON {} rather than an object", kind_name(raw));
    }
    Ok(extract(raw, rules))
}

fn first_timestamp(v: &Value, candidates: &[&str]) -> Option<time::OffsetDateTime> {
    candidates.iter().find_map(|p| lookup(v, p).and_then(parse_timestamp))
}

/// Link targets from entity arrays; entries may be objects or bare strings.
fn entity_urls(raw: &Value, rules: &FieldRules) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for (path, key) in rules.url_entities {
        let Some(items) = lookup(raw, path).and_then(|v| v.as_array()) else { continue };
        for item in items {
            let url = match item {
                Value::Object(_) => lookup(item, key).and_then(scalar_string),
                other => scalar_string(other),
            };
            let Some(url) = url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) else { continue };
            if !out.contains(&url) {
                out.push(url);
            }
        }
    }
    out
}

fn build_url(template: Option<&str>, id: &str, author: &str) -> Option<String> {
    let template = template?;
    if id.is_empty() || (template.contains("{author}") && author.is_empty()) {
        return None;
    }
    Some(template.replace("{id}", id).replace("{author}", author))
}
