//! Scheduler behavior over virtual time: immediate first run, fixed interval
//! from job start, and survival of failed or panicking jobs.

use std::sync::Arc;
use std::time::Duration;

use idea_pulse_worker::fetcher::RESULT_PACING;
use idea_pulse_worker::pipeline::QUERY_PACING;
use idea_pulse_worker::scheduler::DEFAULT_INTERVAL;
use idea_pulse_worker::testing::{raw_post, ManualClock, MockSearch, RecordingSink, ScriptedJob};
use idea_pulse_worker::{HarvestJob, JobError, Scheduler, SchedulerState, Targets};

#[tokio::test]
async fn failed_job_still_gets_the_next_run() {
    let clock = Arc::new(ManualClock::new());
    let job = Arc::new(
        ScriptedJob::new(clock.clone())
            .then_fail("reddit is down")
            .then_ok(),
    );
    let mut scheduler = Scheduler::new(job.clone(), clock.clone(), DEFAULT_INTERVAL);

    assert!(matches!(scheduler.tick().await, Err(JobError::Preflight(_))));
    assert_eq!(scheduler.state(), SchedulerState::Idle);

    assert!(scheduler.tick().await.is_ok());
    assert_eq!(job.started_at(), vec![Duration::ZERO, DEFAULT_INTERVAL]);
    assert_eq!(clock.sleeps(), vec![DEFAULT_INTERVAL]);
}

#[tokio::test]
async fn panicking_job_still_gets_the_next_run() {
    let clock = Arc::new(ManualClock::new());
    let job = Arc::new(
        ScriptedJob::new(clock.clone())
            .then_panic("unexpected listing shape")
            .then_ok(),
    );
    let mut scheduler = Scheduler::new(job.clone(), clock.clone(), DEFAULT_INTERVAL);

    assert!(matches!(scheduler.tick().await, Err(JobError::Panicked(_))));
    assert!(scheduler.tick().await.is_ok());

    assert_eq!(scheduler.completed_runs(), 2);
    assert_eq!(job.started_at(), vec![Duration::ZERO, DEFAULT_INTERVAL]);
}

#[tokio::test]
async fn runs_keep_a_fixed_cadence() {
    let clock = Arc::new(ManualClock::new());
    let job = Arc::new(ScriptedJob::new(clock.clone()));
    let mut scheduler = Scheduler::new(job.clone(), clock.clone(), DEFAULT_INTERVAL);

    for _ in 0..4 {
        scheduler.tick().await.unwrap();
    }

    let expected: Vec<Duration> = (0..4).map(|i| DEFAULT_INTERVAL * i).collect();
    assert_eq!(job.started_at(), expected);
}

#[tokio::test]
async fn harvest_time_counts_against_the_interval() {
    let clock = Arc::new(ManualClock::new());
    let source = MockSearch::new().on_search("startups", "q1", vec![raw_post("a", "t", ""), raw_post("b", "t", "")]);
    let sink = Arc::new(RecordingSink::new());
    let job = HarvestJob::new(
        Arc::new(source),
        sink.clone(),
        clock.clone(),
        Targets::new(&["q1", "q2"], &["startups"]),
        "reddit_posts",
        50,
    );
    let mut scheduler = Scheduler::new(Arc::new(job), clock.clone(), DEFAULT_INTERVAL);

    scheduler.tick().await.unwrap();
    let spent = QUERY_PACING * 2 + RESULT_PACING * 2;
    assert_eq!(clock.elapsed(), spent);
    assert_eq!(scheduler.time_until_next(), DEFAULT_INTERVAL - spent);

    scheduler.tick().await.unwrap();
    // Duplicate rows across runs are expected; nothing dedupes against storage.
    assert_eq!(sink.records().len(), 4);
}
