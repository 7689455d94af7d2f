use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{error, info, Instrument};
use uuid::Uuid;

use crate::error::JobError;
use crate::pipeline::JobStats;
use crate::traits::{Clock, Job};

/// Time between the starts of two consecutive jobs.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(6 * 3600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    RunningJob,
}

/// Runs a job immediately, then once per `interval` measured from the start
/// of the previous run. A failed or panicking job is logged and the schedule
/// carries on.
pub struct Scheduler {
    job: Arc<dyn Job>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    state: SchedulerState,
    last_started: Option<Instant>,
    completed_runs: u64,
}

impl Scheduler {
    pub fn new(job: Arc<dyn Job>, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self {
            job,
            clock,
            interval,
            state: SchedulerState::Idle,
            last_started: None,
            completed_runs: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn completed_runs(&self) -> u64 {
        self.completed_runs
    }

    /// How long the scheduler would wait right now before the next run.
    pub fn time_until_next(&self) -> Duration {
        match self.last_started {
            None => Duration::ZERO,
            Some(started) => (started + self.interval).saturating_duration_since(self.clock.now()),
        }
    }

    /// Run forever. Only external termination stops the loop.
    pub async fn run(mut self) {
        info!(interval_hours = self.interval.as_secs() / 3600, "Harvest scheduler started");
        loop {
            let _ = self.tick().await;
        }
    }

    /// Wait until the next run is due, then run the job once.
    pub async fn tick(&mut self) -> Result<JobStats, JobError> {
        let wait = self.time_until_next();
        if !wait.is_zero() {
            info!(wait_minutes = wait.as_secs() / 60, "Next run scheduled");
            self.clock.sleep(wait).await;
        }

        self.state = SchedulerState::RunningJob;
        self.last_started = Some(self.clock.now());

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("harvest_job", %run_id);
        let outcome = self.run_contained().instrument(span).await;

        self.state = SchedulerState::Idle;
        self.completed_runs += 1;

        match &outcome {
            Ok(stats) => info!(%run_id, "Scheduled job completed successfully. {stats}"),
            Err(e) => error!(%run_id, error = %e, "Scheduled job failed"),
        }
        outcome
    }

    /// Run the job on its own task so a panic comes back as an error.
    async fn run_contained(&self) -> Result<JobStats, JobError> {
        let job = Arc::clone(&self.job);
        let task = async move { job.run().await }.in_current_span();
        match tokio::spawn(task).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => Err(JobError::Panicked(panic_message(e.into_panic()))),
            Err(e) => Err(JobError::Cancelled(e.to_string())),
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ManualClock, ScriptedJob};

    #[tokio::test]
    async fn first_run_starts_immediately() {
        let clock = Arc::new(ManualClock::new());
        let job = Arc::new(ScriptedJob::new(clock.clone()).then_ok());
        let mut scheduler = Scheduler::new(job.clone(), clock.clone(), DEFAULT_INTERVAL);

        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(scheduler.tick().await.is_ok());

        assert!(clock.sleeps().is_empty());
        assert_eq!(job.started_at(), vec![Duration::ZERO]);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[tokio::test]
    async fn interval_is_measured_from_job_start() {
        let clock = Arc::new(ManualClock::new());
        let job = Arc::new(
            ScriptedJob::new(clock.clone())
                .then_ok_after(Duration::from_secs(600))
                .then_ok(),
        );
        let mut scheduler = Scheduler::new(job.clone(), clock.clone(), DEFAULT_INTERVAL);

        scheduler.tick().await.unwrap();
        assert_eq!(scheduler.time_until_next(), DEFAULT_INTERVAL - Duration::from_secs(600));
        scheduler.tick().await.unwrap();

        assert_eq!(job.started_at(), vec![Duration::ZERO, DEFAULT_INTERVAL]);
    }

    #[tokio::test]
    async fn panic_is_contained_as_job_error() {
        let clock = Arc::new(ManualClock::new());
        let job = Arc::new(ScriptedJob::new(clock.clone()).then_panic("boom"));
        let mut scheduler = Scheduler::new(job, clock, DEFAULT_INTERVAL);

        match scheduler.tick().await {
            Err(JobError::Panicked(msg)) => assert_eq!(msg, "boom"),
            other => panic!("expected Panicked, got {other:?}"),
        }
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(scheduler.completed_runs(), 1);
    }

    #[test]
    fn panic_message_handles_owned_strings() {
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload), "owned");
        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload), "non-string panic payload");
    }
}
