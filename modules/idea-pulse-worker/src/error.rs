use reddit_client::RedditError;
use supabase_client::SupabaseError;
use thiserror::Error;

/// Failure of one community search. Isolated to that community.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("community unavailable: {0}")]
    Unavailable(String),

    #[error("search source rejected credentials: {0}")]
    Auth(String),

    #[error("search API error: {0}")]
    Api(String),

    #[error("network error: {0}")]
    Network(String),
}

impl From<RedditError> for FetchError {
    fn from(err: RedditError) -> Self {
        match err {
            RedditError::NotFound(_) | RedditError::Forbidden(_) => {
                FetchError::Unavailable(err.to_string())
            }
            RedditError::Auth { .. } => FetchError::Auth(err.to_string()),
            RedditError::Network(msg) => FetchError::Network(msg),
            RedditError::Api { .. } | RedditError::Parse(_) => FetchError::Api(err.to_string()),
        }
    }
}

/// Failure of one batch insert. Isolated to that batch.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("storage rejected batch: {0}")]
    Rejected(String),

    #[error("network error: {0}")]
    Network(String),
}

impl From<SupabaseError> for PersistError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::Network(msg) => PersistError::Network(msg),
            other => PersistError::Rejected(other.to_string()),
        }
    }
}

/// Anything that ends a whole job early. Caught at the scheduler boundary.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("preflight failed: {0}")]
    Preflight(#[source] FetchError),

    #[error("job panicked: {0}")]
    Panicked(String),

    #[error("job task was cancelled: {0}")]
    Cancelled(String),
}
