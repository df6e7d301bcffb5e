mod config;
mod date;
mod topic;
mod json_utils;
mod model;

mod source;
mod fields;
mod entities;
mod filters;
mod aggregate;
mod rank;

mod report;
mod network;
mod export;
mod progress;
mod util;
mod pipeline;

pub use crate::config::{ETLOptions, Platform, TableFormat};
pub use crate::topic::{normalize_hashtag, TopicConfig};
pub use crate::pipeline::{DiscourseETL, RunOutcome, SkipReport};
pub use crate::model::{AuthorAggregate, MetricSummary, NormalizedRow, PostKind, RankedAuthor};

// input loading
pub use crate::source::{discover_inputs, load_records, records_from_document, InputFormat, InputKind, LoadedInput, ENVELOPE_KEYS};

// per-record stages
pub use crate::fields::{extract, try_extract, FieldRules};
pub use crate::date::{format_rfc3339, parse_timestamp, parse_timestamp_str};
pub use crate::entities::{entity_hashtags, entity_mentions, extract_hashtags, extract_mentions, merged_hashtags, merged_mentions};
pub use crate::filters::{classify, is_relevant, matches_hashtags, matches_phrases, relevant_rows};

// per-author stages
pub use crate::aggregate::{aggregate, engagement_rate, AuthorTable};
pub use crate::rank::{rank, top};
pub use crate::network::{similarity_edges, AuthorEdge};
pub use crate::report::{
    daily_activity, hashtag_counts, hashtag_daily, hourly_activity, location_counts, quantile, summarize, viral_content,
    DayActivity, DayTagCount, EngagementTotals, RunSummary, TagCount, TopAuthor, ViralPost, ViralSummary,
};

// writers
pub use crate::export::{csv_cell, tsv_cell, write_edges, write_ranked, write_rows, write_summary, write_table, TableRow};

//export progress + robust file ops so binaries can import from crate root.
pub use crate::progress::{make_count_progress, ProgressScope};
pub use crate::util::{create_with_backoff, init_tracing_once, open_with_backoff, replace_file_atomic_backoff};
