// Test doubles for the harvest pipeline.
//
// One per trait seam:
// - MockSearch (SearchSource): (community, query) → canned posts or error
// - RecordingSink (RecordSink): remembers every insert call, can fail chosen calls
// - ManualClock (Clock): virtual time; sleeping advances it instantly
// - ScriptedJob (Job): plays back a fixed list of outcomes
//
// Plus builders for RawPost and SearchRecord.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use tokio::time::Instant;

use idea_pulse_common::{RawPost, SearchRecord};

use crate::error::{FetchError, JobError, PersistError};
use crate::pipeline::JobStats;
use crate::traits::{Clock, Job, RecordSink, SearchSource};

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn raw_post(id: &str, title: &str, body: &str) -> RawPost {
    RawPost {
        id: id.to_string(),
        title: title.to_string(),
        body: body.to_string(),
        author: Some("test_author".to_string()),
        score: 10,
        comment_count: 2,
        created_utc: 1_700_000_000.0,
        url: format!("https://www.reddit.com/comments/{id}/"),
        permalink: format!("/r/test/comments/{id}/post/"),
    }
}

pub fn record(id: &str, community: &str) -> SearchRecord {
    SearchRecord {
        source_id: id.to_string(),
        community: community.to_string(),
        title: format!("title {id}"),
        body: String::new(),
        author: "test_author".to_string(),
        score: 1,
        comment_count: 0,
        created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default(),
        url: String::new(),
        permalink: String::new(),
        combined_redacted_text: format!("title {id} "),
        compliance_note: idea_pulse_common::COMPLIANCE_NOTE.to_string(),
    }
}

// ---------------------------------------------------------------------------
// MockSearch
// ---------------------------------------------------------------------------

/// Canned search results. Unregistered searches return no posts.
/// Builder pattern: `.on_search()`, `.on_community()`, `.fail_community()`, `.fail_auth()`.
pub struct MockSearch {
    by_search: HashMap<(String, String), Vec<RawPost>>,
    by_community: HashMap<String, Vec<RawPost>>,
    failures: HashMap<String, FetchError>,
    auth_failure: Option<FetchError>,
    calls: Mutex<Vec<(String, String, u32)>>,
}

impl MockSearch {
    pub fn new() -> Self {
        Self {
            by_search: HashMap::new(),
            by_community: HashMap::new(),
            failures: HashMap::new(),
            auth_failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Posts for one (community, query) pair.
    pub fn on_search(mut self, community: &str, query: &str, posts: Vec<RawPost>) -> Self {
        self.by_search
            .insert((community.to_string(), query.to_string()), posts);
        self
    }

    /// Posts for every query in `community`.
    pub fn on_community(mut self, community: &str, posts: Vec<RawPost>) -> Self {
        self.by_community.insert(community.to_string(), posts);
        self
    }

    pub fn fail_community(mut self, community: &str, error: FetchError) -> Self {
        self.failures.insert(community.to_string(), error);
        self
    }

    pub fn fail_auth(mut self, error: FetchError) -> Self {
        self.auth_failure = Some(error);
        self
    }

    /// Every search call so far as (community, query, limit).
    pub fn calls(&self) -> Vec<(String, String, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockSearch {
    fn default() -> Self {
        Self::new()
    }
}

fn clone_fetch_error(e: &FetchError) -> FetchError {
    match e {
        FetchError::Unavailable(m) => FetchError::Unavailable(m.clone()),
        FetchError::Auth(m) => FetchError::Auth(m.clone()),
        FetchError::Api(m) => FetchError::Api(m.clone()),
        FetchError::Network(m) => FetchError::Network(m.clone()),
    }
}

#[async_trait]
impl SearchSource for MockSearch {
    async fn authenticate(&self) -> Result<(), FetchError> {
        match &self.auth_failure {
            Some(e) => Err(clone_fetch_error(e)),
            None => Ok(()),
        }
    }

    async fn search(
        &self,
        community: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<RawPost>, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((community.to_string(), query.to_string(), limit));

        if let Some(e) = self.failures.get(community) {
            return Err(clone_fetch_error(e));
        }
        let posts = self
            .by_search
            .get(&(community.to_string(), query.to_string()))
            .or_else(|| self.by_community.get(community))
            .cloned()
            .unwrap_or_default();
        Ok(posts.into_iter().take(limit as usize).collect())
    }
}

// ---------------------------------------------------------------------------
// RecordingSink
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SinkCall {
    pub table: String,
    pub ids: Vec<String>,
    pub succeeded: bool,
}

/// Records every insert call; calls listed with `.fail_call(n)` return an error.
pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
    stored: Mutex<Vec<SearchRecord>>,
    failing_calls: HashSet<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            stored: Mutex::new(Vec::new()),
            failing_calls: HashSet::new(),
        }
    }

    /// Make the `n`th insert call (0-based) fail.
    pub fn fail_call(mut self, n: usize) -> Self {
        self.failing_calls.insert(n);
        self
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.calls().iter().map(|c| c.ids.len()).collect()
    }

    /// Rows from successful calls only.
    pub fn records(&self) -> Vec<SearchRecord> {
        self.stored.lock().unwrap().clone()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordSink for RecordingSink {
    async fn insert_batch(&self, table: &str, batch: &[SearchRecord]) -> Result<(), PersistError> {
        let mut calls = self.calls.lock().unwrap();
        let succeeded = !self.failing_calls.contains(&calls.len());
        calls.push(SinkCall {
            table: table.to_string(),
            ids: batch.iter().map(|r| r.source_id.clone()).collect(),
            succeeded,
        });

        if !succeeded {
            return Err(PersistError::Rejected("RecordingSink: scripted failure".to_string()));
        }
        self.stored.lock().unwrap().extend_from_slice(batch);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ManualClock
// ---------------------------------------------------------------------------

/// Virtual clock: `sleep` records the duration and advances time immediately.
pub struct ManualClock {
    origin: Instant,
    elapsed: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Move time forward without recording a sleep.
    pub fn advance(&self, by: Duration) {
        *self.elapsed.lock().unwrap() += by;
    }

    /// Virtual time since the clock was created.
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        self.advance(duration);
    }
}

// ---------------------------------------------------------------------------
// ScriptedJob
// ---------------------------------------------------------------------------

enum Step {
    Ok { takes: Duration },
    Fail(String),
    Panic(String),
}

/// Plays back scripted outcomes in order; once the script runs out every
/// further run succeeds. Records the virtual time at which each run started.
pub struct ScriptedJob {
    clock: Arc<ManualClock>,
    steps: Mutex<VecDeque<Step>>,
    started_at: Mutex<Vec<Duration>>,
}

impl ScriptedJob {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            clock,
            steps: Mutex::new(VecDeque::new()),
            started_at: Mutex::new(Vec::new()),
        }
    }

    pub fn then_ok(self) -> Self {
        self.then_ok_after(Duration::ZERO)
    }

    /// Succeed after `takes` of virtual time.
    pub fn then_ok_after(self, takes: Duration) -> Self {
        self.steps.lock().unwrap().push_back(Step::Ok { takes });
        self
    }

    /// Fail with a preflight error carrying `message`.
    pub fn then_fail(self, message: &str) -> Self {
        self.steps
            .lock()
            .unwrap()
            .push_back(Step::Fail(message.to_string()));
        self
    }

    pub fn then_panic(self, message: &str) -> Self {
        self.steps
            .lock()
            .unwrap()
            .push_back(Step::Panic(message.to_string()));
        self
    }

    pub fn started_at(&self) -> Vec<Duration> {
        self.started_at.lock().unwrap().clone()
    }
}

#[async_trait]
impl Job for ScriptedJob {
    async fn run(&self) -> Result<JobStats, JobError> {
        self.started_at.lock().unwrap().push(self.clock.elapsed());
        let step = self.steps.lock().unwrap().pop_front();

        match step {
            None => Ok(JobStats::default()),
            Some(Step::Ok { takes }) => {
                self.clock.advance(takes);
                Ok(JobStats::default())
            }
            Some(Step::Fail(message)) => Err(JobError::Preflight(FetchError::Network(message))),
            Some(Step::Panic(message)) => panic!("{message}"),
        }
    }
}
