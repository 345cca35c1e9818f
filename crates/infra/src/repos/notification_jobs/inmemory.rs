use super::IDelayedJobStore;
use crate::ISys;
use agenda_domain::{JobId, JobState, NewNotificationJob, NotificationJob};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

pub struct InMemoryDelayedJobStore {
    jobs: Mutex<HashMap<JobId, NotificationJob>>,
    sys: Arc<dyn ISys>,
}

impl InMemoryDelayedJobStore {
    pub fn new(sys: Arc<dyn ISys>) -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
            sys,
        }
    }

    fn jobs(&self) -> anyhow::Result<MutexGuard<'_, HashMap<JobId, NotificationJob>>> {
        self.jobs
            .lock()
            .map_err(|_| anyhow::anyhow!("Inmemory job store lock was poisoned"))
    }

    /// Applies `finish` to the stored job if it still is the same enqueued instance as `job`
    fn finish(
        &self,
        job: &NotificationJob,
        remove: bool,
        finish: impl FnOnce(&mut NotificationJob),
    ) -> anyhow::Result<()> {
        let mut jobs = self.jobs()?;
        let is_same_instance = jobs
            .get(&job.id)
            .map(|stored| stored.instance_id == job.instance_id)
            .unwrap_or(false);
        if !is_same_instance {
            return Ok(());
        }
        if remove {
            jobs.remove(&job.id);
        } else if let Some(stored) = jobs.get_mut(&job.id) {
            stored.leased_until = None;
            finish(stored);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl IDelayedJobStore for InMemoryDelayedJobStore {
    async fn add(&self, job: NewNotificationJob) -> anyhow::Result<NotificationJob> {
        let now = self.sys.get_timestamp_millis();
        let mut jobs = self.jobs()?;
        let stored = jobs
            .entry(job.id.clone())
            .or_insert_with(|| NotificationJob::enqueue(job, now));
        Ok(stored.clone())
    }

    async fn find(&self, job_id: &JobId) -> anyhow::Result<Option<NotificationJob>> {
        Ok(self.jobs()?.get(job_id).cloned())
    }

    async fn remove(&self, job_id: &JobId) -> anyhow::Result<Option<NotificationJob>> {
        Ok(self.jobs()?.remove(job_id).map(|job| NotificationJob {
            state: JobState::Cancelled,
            ..job
        }))
    }

    async fn claim_due(
        &self,
        now: i64,
        lease_millis: i64,
        limit: usize,
    ) -> anyhow::Result<Vec<NotificationJob>> {
        let mut jobs = self.jobs()?;
        let mut due = jobs
            .values_mut()
            .filter(|job| job.is_claimable(now))
            .collect::<Vec<_>>();
        due.sort_by_key(|job| job.run_at);

        Ok(due
            .into_iter()
            .take(limit)
            .map(|job| {
                job.leased_until = Some(now.saturating_add(lease_millis));
                job.attempts += 1;
                job.clone()
            })
            .collect())
    }

    async fn complete(&self, job: &NotificationJob) -> anyhow::Result<()> {
        self.finish(job, job.options.remove_on_complete, |stored| {
            stored.state = JobState::Consumed;
        })
    }

    async fn fail(&self, job: &NotificationJob, reason: &str) -> anyhow::Result<()> {
        self.finish(job, job.options.remove_on_fail, |stored| {
            stored.state = JobState::Failed;
            stored.failure_reason = Some(reason.to_string());
        })
    }
}
