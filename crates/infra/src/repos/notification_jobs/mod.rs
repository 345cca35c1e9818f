mod inmemory;
mod postgres;

use agenda_domain::{JobId, NewNotificationJob, NotificationJob};
pub use inmemory::InMemoryDelayedJobStore;
pub use postgres::PostgresDelayedJobStore;

/// Deferred execution facility for `NotificationJob`s.
///
/// Due jobs are delivered at least once: a claimed job is leased to the
/// consumer and handed out again if it is neither completed nor failed
/// before the lease runs out.
#[async_trait::async_trait]
pub trait IDelayedJobStore: Send + Sync {
    /// Stores `job` to become due `job.delay` millis from now. If a job with
    /// the same id is already stored that one is kept and returned instead.
    async fn add(&self, job: NewNotificationJob) -> anyhow::Result<NotificationJob>;
    async fn find(&self, job_id: &JobId) -> anyhow::Result<Option<NotificationJob>>;
    /// Removes the job and returns it in the `Cancelled` state.
    /// Removing a job that does not exist is not an error.
    async fn remove(&self, job_id: &JobId) -> anyhow::Result<Option<NotificationJob>>;
    /// Claims at most `limit` jobs that are due at `now` and leases them for `lease_millis`
    async fn claim_due(
        &self,
        now: i64,
        lease_millis: i64,
        limit: usize,
    ) -> anyhow::Result<Vec<NotificationJob>>;
    /// Marks a claimed job as consumed, removing it if the job requested that
    async fn complete(&self, job: &NotificationJob) -> anyhow::Result<()>;
    /// Marks a claimed job as failed, removing it if the job requested that
    async fn fail(&self, job: &NotificationJob, reason: &str) -> anyhow::Result<()>;
}
