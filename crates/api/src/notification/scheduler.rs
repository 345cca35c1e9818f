use agenda_domain::{
    Appointment, JobId, JobOptions, NewNotificationJob, NotificationPayload, NotificationWindow,
    NotificationWindows, ID,
};
use agenda_infra::{AgendaContext, IDelayedJobStore, ISys};
use futures::future::join_all;
use std::{fmt::Display, sync::Arc};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchedulingOperation {
    Schedule,
    Reschedule,
    Clear,
}

impl Display for SchedulingOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verb = match self {
            Self::Schedule => "schedule",
            Self::Reschedule => "reschedule",
            Self::Clear => "clear",
        };
        write!(f, "{}", verb)
    }
}

/// The job store failed for one or more notification windows of an `Appointment`.
/// Windows that did not fail are still applied.
#[derive(Error, Debug, PartialEq)]
#[error("Failed to {operation} appointment notifications: {message}")]
pub struct SchedulingError {
    pub operation: SchedulingOperation,
    pub message: String,
}

/// Keeps exactly one pending `NotificationJob` per `NotificationWindow` for
/// every `Appointment` whose window is still ahead.
///
/// Jobs are only ever addressed through `JobId::for_window`, so every
/// operation is idempotent and no record of which jobs belong to which
/// `Appointment` is kept.
pub struct NotificationScheduler {
    jobs: Arc<dyn IDelayedJobStore>,
    sys: Arc<dyn ISys>,
    windows: NotificationWindows,
}

impl NotificationScheduler {
    pub fn new(
        jobs: Arc<dyn IDelayedJobStore>,
        sys: Arc<dyn ISys>,
        windows: NotificationWindows,
    ) -> Self {
        Self { jobs, sys, windows }
    }

    pub fn from_context(ctx: &AgendaContext) -> Self {
        Self::new(
            ctx.repos.notification_jobs.clone(),
            ctx.sys.clone(),
            ctx.config.notification_windows.clone(),
        )
    }

    pub async fn schedule_for_appointment(
        &self,
        appointment: &Appointment,
    ) -> Result<(), SchedulingError> {
        self.upsert_jobs(appointment)
            .await
            .map_err(|message| SchedulingError {
                operation: SchedulingOperation::Schedule,
                message,
            })
    }

    /// Same as scheduling: every window job is replaced with one
    /// computed from the current `start_ts`
    pub async fn reschedule_for_appointment(
        &self,
        appointment: &Appointment,
    ) -> Result<(), SchedulingError> {
        self.upsert_jobs(appointment)
            .await
            .map_err(|message| SchedulingError {
                operation: SchedulingOperation::Reschedule,
                message,
            })
    }

    pub async fn clear_for_appointment(&self, appointment_id: &ID) -> Result<(), SchedulingError> {
        let removals = self.windows.iter().map(|window| async move {
            let job_id = JobId::for_window(appointment_id, window.label());
            self.jobs
                .remove(&job_id)
                .await
                .map(|_| ())
                .map_err(|e| format!("{}: {}", job_id, e))
        });

        collect_failures(join_all(removals).await).map_err(|message| SchedulingError {
            operation: SchedulingOperation::Clear,
            message,
        })
    }

    async fn upsert_jobs(&self, appointment: &Appointment) -> Result<(), String> {
        let now = self.sys.get_timestamp_millis();
        let upserts = self
            .windows
            .iter()
            .map(|window| self.upsert_job(appointment, window, now));

        collect_failures(join_all(upserts).await)
    }

    /// Lookup, removal and insert have to happen in this order for one window,
    /// otherwise the freshly inserted job could be the one that gets removed.
    async fn upsert_job(
        &self,
        appointment: &Appointment,
        window: &NotificationWindow,
        now: i64,
    ) -> Result<(), String> {
        let job_id = JobId::for_window(&appointment.id, window.label());
        let to_message = |e: anyhow::Error| format!("{}: {}", job_id, e);

        if self.jobs.find(&job_id).await.map_err(to_message)?.is_some() {
            self.jobs.remove(&job_id).await.map_err(to_message)?;
        }

        let delay = window.delay_until(appointment.start_ts, now);
        if delay <= 0 {
            warn!(
                appointment_id = %appointment.id,
                window = window.label(),
                "Skipping scheduling notification because it's in the past"
            );
            return Ok(());
        }

        debug!(
            appointment_id = %appointment.id,
            window = window.label(),
            start_ts = appointment.start_ts,
            "Scheduling notification to be sent in {} seconds",
            delay / 1000
        );

        self.jobs
            .add(NewNotificationJob {
                id: job_id.clone(),
                payload: NotificationPayload {
                    appointment_id: appointment.id.clone(),
                    window_label: window.label().to_string(),
                    start_ts: appointment.start_ts,
                },
                delay,
                options: JobOptions::remove_when_done(),
            })
            .await
            .map(|_| ())
            .map_err(to_message)
    }
}

fn collect_failures(results: Vec<Result<(), String>>) -> Result<(), String> {
    let failures = results
        .into_iter()
        .filter_map(Result::err)
        .collect::<Vec<_>>();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures.join("; "))
    }
}
