// Trait seams for the harvest pipeline.
//
// SearchSource: the platform search capability (RedditClient in production).
// RecordSink: the storage capability (SupabaseClient in production).
// Clock: monotonic time plus sleeping; every pacing delay and the
//   inter-job wait go through it.
// Job: one unit of scheduled work.
//
// The mocks in `testing` implement all four, so the pipeline and scheduler
// run in tests without network, database or real sleeps.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use idea_pulse_common::{RawPost, SearchRecord};
use reddit_client::{RedditClient, SearchParams, Submission};
use supabase_client::SupabaseClient;

use crate::error::{FetchError, JobError, PersistError};
use crate::pipeline::JobStats;

// ---------------------------------------------------------------------------
// SearchSource
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SearchSource: Send + Sync {
    /// Check credentials before a job starts searching.
    async fn authenticate(&self) -> Result<(), FetchError> {
        Ok(())
    }

    /// Relevance-ranked, all-time search of one community.
    async fn search(
        &self,
        community: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<RawPost>, FetchError>;
}

#[async_trait]
impl SearchSource for RedditClient {
    async fn authenticate(&self) -> Result<(), FetchError> {
        self.access_token().await?;
        Ok(())
    }

    async fn search(
        &self,
        community: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<RawPost>, FetchError> {
        let params = SearchParams::all_time(query, limit);
        let submissions = self.search_subreddit(community, &params).await?;
        Ok(submissions.into_iter().map(raw_post).collect())
    }
}

fn raw_post(s: Submission) -> RawPost {
    RawPost {
        author: s.author_name().map(str::to_string),
        id: s.id,
        title: s.title,
        body: s.selftext,
        score: s.score,
        comment_count: s.num_comments,
        created_utc: s.created_utc,
        url: s.url,
        permalink: s.permalink,
    }
}

// ---------------------------------------------------------------------------
// RecordSink
// ---------------------------------------------------------------------------

#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Append `batch` to `table` in one call. All-or-nothing per call.
    async fn insert_batch(&self, table: &str, batch: &[SearchRecord]) -> Result<(), PersistError>;
}

#[async_trait]
impl RecordSink for SupabaseClient {
    async fn insert_batch(&self, table: &str, batch: &[SearchRecord]) -> Result<(), PersistError> {
        Ok(self.insert(table, batch).await?)
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation backed by the tokio timer.
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

#[async_trait]
pub trait Job: Send + Sync {
    async fn run(&self) -> Result<JobStats, JobError>;
}
