use agenda_domain::NotificationJob;
use agenda_infra::{AgendaContext, IDelayedJobStore, INotificationDelivery, ISys};
use futures::{future::join_all, FutureExt};
use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};
use tracing::{error, info};

/// Consumes due `NotificationJob`s and hands their payload to the
/// `INotificationDelivery`. A job that could not be delivered is failed
/// and not retried.
pub struct NotificationWorker {
    jobs: Arc<dyn IDelayedJobStore>,
    delivery: Arc<dyn INotificationDelivery>,
    sys: Arc<dyn ISys>,
    lease_millis: i64,
    batch_size: usize,
}

impl NotificationWorker {
    pub fn new(
        jobs: Arc<dyn IDelayedJobStore>,
        delivery: Arc<dyn INotificationDelivery>,
        sys: Arc<dyn ISys>,
        lease_millis: i64,
        batch_size: usize,
    ) -> Self {
        Self {
            jobs,
            delivery,
            sys,
            lease_millis,
            batch_size,
        }
    }

    pub fn from_context(ctx: &AgendaContext) -> Self {
        Self::new(
            ctx.repos.notification_jobs.clone(),
            ctx.delivery.clone(),
            ctx.sys.clone(),
            ctx.config.worker_lease_millis,
            ctx.config.worker_batch_size,
        )
    }

    /// Claims the jobs that are due now and processes them.
    /// Returns how many jobs were claimed.
    pub async fn process_due_jobs(&self) -> usize {
        let now = self.sys.get_timestamp_millis();
        let jobs = match self
            .jobs
            .claim_due(now, self.lease_millis, self.batch_size)
            .await
        {
            Ok(jobs) => jobs,
            Err(e) => {
                error!("Unable to claim due notification jobs: {:?}", e);
                return 0;
            }
        };

        join_all(jobs.iter().map(|job| self.process(job))).await;
        jobs.len()
    }

    async fn process(&self, job: &NotificationJob) {
        let delivered = AssertUnwindSafe(self.delivery.deliver(&job.payload))
            .catch_unwind()
            .await;

        let failure = match delivered {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(panic) => Some(panic_message(panic)),
        };

        let finished = match failure {
            None => {
                info!(
                    job_id = %job.id,
                    attempts = job.attempts,
                    "Appointment notification was delivered"
                );
                self.jobs.complete(job).await
            }
            Some(reason) => {
                error!(
                    job_id = %job.id,
                    attempts = job.attempts,
                    "Appointment notification delivery failed: {}",
                    reason
                );
                self.jobs.fail(job, &reason).await
            }
        };

        if let Err(e) = finished {
            error!(
                job_id = %job.id,
                "Unable to mark notification job as finished. It will be delivered again once its lease runs out: {:?}",
                e
            );
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "Delivery panicked".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::test_utils::{
        DeliveryOutcome, FailingJobStore, RecordingDelivery, StoreOperation,
    };
    use agenda_domain::{JobId, JobOptions, NewNotificationJob, NotificationPayload, ID};
    use agenda_infra::{InMemoryDelayedJobStore, MockSys};

    const NOW: i64 = 1_700_000_000_000;

    fn new_job(label: &str, delay: i64, options: JobOptions) -> NewNotificationJob {
        let appointment_id = ID::default();
        NewNotificationJob {
            id: JobId::for_window(&appointment_id, label),
            payload: NotificationPayload {
                appointment_id,
                window_label: label.into(),
                start_ts: NOW + delay,
            },
            delay,
            options,
        }
    }

    struct TestContext {
        sys: Arc<MockSys>,
        jobs: Arc<dyn IDelayedJobStore>,
        delivery: Arc<RecordingDelivery>,
        worker: NotificationWorker,
    }

    fn setup_with(
        jobs: impl FnOnce(Arc<dyn ISys>) -> Arc<dyn IDelayedJobStore>,
        delivery: RecordingDelivery,
    ) -> TestContext {
        let sys = Arc::new(MockSys::new(NOW));
        let jobs = jobs(sys.clone() as Arc<dyn ISys>);
        let delivery = Arc::new(delivery);
        let worker =
            NotificationWorker::new(jobs.clone(), delivery.clone(), sys.clone(), 60_000, 10);
        TestContext {
            sys,
            jobs,
            delivery,
            worker,
        }
    }

    fn setup(delivery: RecordingDelivery) -> TestContext {
        setup_with(
            |sys| Arc::new(InMemoryDelayedJobStore::new(sys)) as Arc<dyn IDelayedJobStore>,
            delivery,
        )
    }

    #[actix_web::test]
    async fn delivers_due_jobs_and_removes_them() {
        let TestContext {
            sys,
            jobs,
            delivery,
            worker,
        } = setup(RecordingDelivery::new());
        let due = jobs
            .add(new_job("1h", 500, JobOptions::remove_when_done()))
            .await
            .unwrap();
        let later = jobs
            .add(new_job("24h", 5000, JobOptions::remove_when_done()))
            .await
            .unwrap();

        assert_eq!(worker.process_due_jobs().await, 0);
        assert!(delivery.delivered().is_empty());

        sys.advance_millis(500);
        assert_eq!(worker.process_due_jobs().await, 1);
        assert_eq!(delivery.delivered(), vec![due.payload.clone()]);
        assert!(jobs.find(&due.id).await.unwrap().is_none());
        assert!(jobs.find(&later.id).await.unwrap().is_some());

        // Consumed jobs are not delivered twice
        assert_eq!(worker.process_due_jobs().await, 0);
        assert_eq!(delivery.delivered().len(), 1);
    }

    #[actix_web::test]
    async fn failed_deliveries_are_not_retried() {
        let TestContext {
            sys,
            jobs,
            delivery,
            worker,
        } = setup(RecordingDelivery::with_outcome(|payload| {
            if payload.window_label == "1h" {
                DeliveryOutcome::Fail
            } else {
                DeliveryOutcome::Panic
            }
        }));
        let failing = jobs
            .add(new_job("1h", 100, JobOptions::remove_when_done()))
            .await
            .unwrap();
        let panicking = jobs
            .add(new_job("24h", 100, JobOptions::remove_when_done()))
            .await
            .unwrap();

        sys.advance_millis(100);
        assert_eq!(worker.process_due_jobs().await, 2);
        assert_eq!(delivery.delivered().len(), 2);
        assert!(jobs.find(&failing.id).await.unwrap().is_none());
        assert!(jobs.find(&panicking.id).await.unwrap().is_none());

        sys.advance_millis(120_000);
        assert_eq!(worker.process_due_jobs().await, 0);
        assert_eq!(delivery.delivered().len(), 2);
    }

    #[actix_web::test]
    async fn keeps_failure_reason_for_retained_jobs() {
        let TestContext { jobs, worker, .. } =
            setup(RecordingDelivery::with_outcome(|_| DeliveryOutcome::Fail));
        let job = jobs.add(new_job("1h", 0, Default::default())).await.unwrap();

        assert_eq!(worker.process_due_jobs().await, 1);

        let failed = jobs.find(&job.id).await.unwrap().unwrap();
        assert_eq!(failed.state, agenda_domain::JobState::Failed);
        assert_eq!(
            failed.failure_reason.as_deref(),
            Some("Receiver rejected the notification")
        );
    }

    #[actix_web::test]
    async fn unfinished_jobs_are_delivered_again_after_lease() {
        let TestContext {
            sys,
            jobs,
            delivery,
            worker,
        } = setup_with(
            |sys| {
                Arc::new(FailingJobStore::new(sys, StoreOperation::Finish, |_| true))
                    as Arc<dyn IDelayedJobStore>
            },
            RecordingDelivery::new(),
        );
        let job = jobs
            .add(new_job("1h", 0, JobOptions::remove_when_done()))
            .await
            .unwrap();

        assert_eq!(worker.process_due_jobs().await, 1);
        assert!(jobs.find(&job.id).await.unwrap().is_some());

        // Still leased
        sys.advance_millis(59_999);
        assert_eq!(worker.process_due_jobs().await, 0);

        sys.advance_millis(1);
        assert_eq!(worker.process_due_jobs().await, 1);
        assert_eq!(delivery.delivered(), vec![job.payload.clone(), job.payload]);
        assert_eq!(jobs.find(&job.id).await.unwrap().unwrap().attempts, 2);
    }
}
