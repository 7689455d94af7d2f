use thiserror::Error;

/// Startup configuration problems. Always fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// A single search hit that cannot be turned into a record.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("post {source_id} has an unrepresentable creation time {value}")]
    InvalidTimestamp { source_id: String, value: f64 },
}
