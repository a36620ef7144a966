use thiserror::Error;

/// Fatal errors that abort a sync run. Transient fetch failures are retried
/// inside the fetcher and only surface here once the retry bound is exceeded.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("transient failure persisted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: FetchError },

    #[error("upstream rejected request with status {status}")]
    PermanentClient { status: u16 },

    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Classified outcome of a single page request. `Throttled` and `Malformed`
/// are transient; everything else aborts the run without retry.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("rate limited or temporarily unavailable (status {0})")]
    Throttled(u16),

    #[error("response body did not decode: {0}")]
    Malformed(String),

    #[error("client error (status {0})")]
    Rejected(u16),

    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Throttled(_) | FetchError::Malformed(_))
    }
}
