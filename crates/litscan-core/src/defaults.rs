//! Tunable constants with sane defaults, overridden by the env vars the
//! matching `*Config::from_env` reads.

/// Europe PMC rate-limit budget: never exceed this between full-text fetches.
pub const RATE_LIMIT_SLEEP_MS: u64 = 600;

/// Page size used for both literature search and classifier batches.
pub const SEARCH_PAGE_SIZE: u32 = 500;

/// Default `search_limit` when a job doesn't specify one.
pub const DEFAULT_SEARCH_LIMIT: i64 = 1_000_000;

/// Number of oldest pending jobs considered for dispatch each producer tick.
pub const PRODUCER_DISPATCH_PREFIX: i64 = 8;

/// Producer scheduling period, within the 3-4s window named by the design.
pub const PRODUCER_POLL_INTERVAL_MS: u64 = 3_500;

/// Per-call timeout for the producer's dispatch RPC to a consumer.
pub const DISPATCH_TIMEOUT_SECS: u64 = 10;

/// How often a consumer refreshes its registration row.
pub const CONSUMER_REGISTRATION_REFRESH_SECS: u64 = 30;

/// Classifier fetch retry budget.
pub const CLASSIFIER_FETCH_MAX_ATTEMPTS: u32 = 3;
pub const CLASSIFIER_FETCH_BACKOFF_SECS: u64 = 2;
pub const CLASSIFIER_DEFAULT_BATCH_SIZE: i64 = 100;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;
