use agenda_domain::{JobId, NewNotificationJob, NotificationJob, NotificationPayload};
use agenda_infra::{IDelayedJobStore, INotificationDelivery, ISys, InMemoryDelayedJobStore};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoreOperation {
    Add,
    Finish,
    Any,
}

/// Inmemory job store where operations on matching job ids fail
pub struct FailingJobStore {
    inner: InMemoryDelayedJobStore,
    operation: StoreOperation,
    fails_for: Box<dyn Fn(&JobId) -> bool + Send + Sync>,
}

impl FailingJobStore {
    pub fn new<F>(sys: Arc<dyn ISys>, operation: StoreOperation, fails_for: F) -> Self
    where
        F: Fn(&JobId) -> bool + Send + Sync + 'static,
    {
        Self {
            inner: InMemoryDelayedJobStore::new(sys),
            operation,
            fails_for: Box::new(fails_for),
        }
    }

    fn check(&self, operation: StoreOperation, job_id: &JobId) -> anyhow::Result<()> {
        let applies = self.operation == StoreOperation::Any || self.operation == operation;
        if applies && (self.fails_for)(job_id) {
            anyhow::bail!("Job store is unavailable");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl IDelayedJobStore for FailingJobStore {
    async fn add(&self, job: NewNotificationJob) -> anyhow::Result<NotificationJob> {
        self.check(StoreOperation::Add, &job.id)?;
        self.inner.add(job).await
    }

    async fn find(&self, job_id: &JobId) -> anyhow::Result<Option<NotificationJob>> {
        self.check(StoreOperation::Any, job_id)?;
        self.inner.find(job_id).await
    }

    async fn remove(&self, job_id: &JobId) -> anyhow::Result<Option<NotificationJob>> {
        self.check(StoreOperation::Any, job_id)?;
        self.inner.remove(job_id).await
    }

    async fn claim_due(
        &self,
        now: i64,
        lease_millis: i64,
        limit: usize,
    ) -> anyhow::Result<Vec<NotificationJob>> {
        self.inner.claim_due(now, lease_millis, limit).await
    }

    async fn complete(&self, job: &NotificationJob) -> anyhow::Result<()> {
        self.check(StoreOperation::Finish, &job.id)?;
        self.inner.complete(job).await
    }

    async fn fail(&self, job: &NotificationJob, reason: &str) -> anyhow::Result<()> {
        self.check(StoreOperation::Finish, &job.id)?;
        self.inner.fail(job, reason).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeliveryOutcome {
    Succeed,
    Fail,
    Panic,
}

/// Records every payload it is asked to deliver
pub struct RecordingDelivery {
    delivered: Mutex<Vec<NotificationPayload>>,
    outcome_for: Box<dyn Fn(&NotificationPayload) -> DeliveryOutcome + Send + Sync>,
}

impl RecordingDelivery {
    pub fn new() -> Self {
        Self::with_outcome(|_| DeliveryOutcome::Succeed)
    }

    pub fn with_outcome<F>(outcome_for: F) -> Self
    where
        F: Fn(&NotificationPayload) -> DeliveryOutcome + Send + Sync + 'static,
    {
        Self {
            delivered: Mutex::new(Vec::new()),
            outcome_for: Box::new(outcome_for),
        }
    }

    pub fn delivered(&self) -> Vec<NotificationPayload> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl INotificationDelivery for RecordingDelivery {
    async fn deliver(&self, payload: &NotificationPayload) -> anyhow::Result<()> {
        self.delivered.lock().unwrap().push(payload.clone());
        match (self.outcome_for)(payload) {
            DeliveryOutcome::Succeed => Ok(()),
            DeliveryOutcome::Fail => anyhow::bail!("Receiver rejected the notification"),
            DeliveryOutcome::Panic => panic!("Delivery panicked"),
        }
    }
}
