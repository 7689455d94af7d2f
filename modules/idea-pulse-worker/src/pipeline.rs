use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::dedup::dedupe;
use crate::error::JobError;
use crate::fetcher::fetch;
use crate::persister::{persist, PersistStats};
use crate::targets::Targets;
use crate::traits::{Clock, Job, RecordSink, SearchSource};

/// Flat delay after each query, independent of success.
pub const QUERY_PACING: Duration = Duration::from_secs(2);

/// Outcome of one harvest job, for logging.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct JobStats {
    pub queries: usize,
    pub fetched: usize,
    pub unique: usize,
    pub persisted: PersistStats,
}

impl fmt::Display for JobStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} queries, {} fetched, {} unique, {}",
            self.queries, self.fetched, self.unique, self.persisted
        )
    }
}

/// fetch → redact → dedupe → batch insert over the whole query × community grid.
pub struct HarvestJob {
    source: Arc<dyn SearchSource>,
    sink: Arc<dyn RecordSink>,
    clock: Arc<dyn Clock>,
    targets: Targets,
    table: String,
    result_limit: u32,
}

impl HarvestJob {
    pub fn new(
        source: Arc<dyn SearchSource>,
        sink: Arc<dyn RecordSink>,
        clock: Arc<dyn Clock>,
        targets: Targets,
        table: &str,
        result_limit: u32,
    ) -> Self {
        Self {
            source,
            sink,
            clock,
            targets,
            table: table.to_string(),
            result_limit,
        }
    }

    pub async fn harvest(&self) -> Result<JobStats, JobError> {
        info!(
            queries = self.targets.queries.len(),
            communities = self.targets.communities.len(),
            searches = self.targets.search_count(),
            "Starting Reddit harvest"
        );

        self.source.authenticate().await.map_err(JobError::Preflight)?;

        let mut all_records = Vec::new();
        for query in &self.targets.queries {
            info!(query = query.as_str(), "Searching for: {query}");
            let records = fetch(
                self.source.as_ref(),
                self.clock.as_ref(),
                query,
                &self.targets.communities,
                self.result_limit,
            )
            .await;
            all_records.extend(records);

            self.clock.sleep(QUERY_PACING).await;
        }

        let fetched = all_records.len();
        let unique_records = dedupe(all_records);
        info!(fetched, unique = unique_records.len(), "Found {} unique posts", unique_records.len());

        let persisted = persist(self.sink.as_ref(), &self.table, &unique_records).await;

        Ok(JobStats {
            queries: self.targets.queries.len(),
            fetched,
            unique: unique_records.len(),
            persisted,
        })
    }
}

#[async_trait]
impl Job for HarvestJob {
    async fn run(&self) -> Result<JobStats, JobError> {
        self.harvest().await
    }
}
