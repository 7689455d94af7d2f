pub mod dedup;
pub mod error;
pub mod fetcher;
pub mod persister;
pub mod pipeline;
pub mod scheduler;
pub mod targets;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use error::{FetchError, JobError, PersistError};
pub use pipeline::{HarvestJob, JobStats};
pub use scheduler::{Scheduler, SchedulerState};
pub use targets::Targets;
