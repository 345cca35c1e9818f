use crate::shared::entity::ID;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt::Display, str::FromStr};
use thiserror::Error;

const HOUR_IN_MILLIS: i64 = 1000 * 60 * 60;

/// Separates the appointment id from the window label in a `JobId`.
/// Uuids never contain it and window labels are restricted to ascii alphanumerics.
pub const JOB_ID_SEPARATOR: char = '_';

#[derive(Error, Debug, PartialEq)]
pub enum InvalidNotificationWindowError {
    #[error("Notification window label: `{0}` must be non empty and only contain ascii alphanumeric characters")]
    InvalidLabel(String),
    #[error("Notification window: `{0}` must have a non negative offset")]
    NegativeOffset(String),
    #[error("Notification window label: `{0}` is used more than once")]
    DuplicateLabel(String),
    #[error("Notification window definition: `{0}` is malformed, expected `label=millis`")]
    Malformed(String),
}

/// A named offset before the start of an `Appointment` at which
/// one reminder notification should be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationWindow {
    label: String,
    offset_before_start: i64,
}

impl NotificationWindow {
    pub fn new(
        label: impl Into<String>,
        offset_before_start: i64,
    ) -> Result<Self, InvalidNotificationWindowError> {
        let label = label.into();
        if label.is_empty() || !label.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(InvalidNotificationWindowError::InvalidLabel(label));
        }
        if offset_before_start < 0 {
            return Err(InvalidNotificationWindowError::NegativeOffset(label));
        }
        Ok(Self {
            label,
            offset_before_start,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Offset in millis before the start of the `Appointment`
    pub fn offset_before_start(&self) -> i64 {
        self.offset_before_start
    }

    /// Millis from `now` until this window fires for an appointment starting at `start_ts`.
    /// A non positive value means the window has already passed.
    /// Saturates at the bounds of `i64` for timestamps far from `now`.
    pub fn delay_until(&self, start_ts: i64, now: i64) -> i64 {
        start_ts
            .saturating_sub(now)
            .saturating_sub(self.offset_before_start)
    }
}

/// The ordered table of `NotificationWindow`s every `Appointment` gets reminders for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationWindows(Vec<NotificationWindow>);

impl NotificationWindows {
    pub fn new(windows: Vec<NotificationWindow>) -> Result<Self, InvalidNotificationWindowError> {
        let mut labels = HashSet::new();
        for window in &windows {
            if !labels.insert(window.label()) {
                return Err(InvalidNotificationWindowError::DuplicateLabel(
                    window.label().to_string(),
                ));
            }
        }
        Ok(Self(windows))
    }

    pub fn iter(&self) -> impl Iterator<Item = &NotificationWindow> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for NotificationWindows {
    fn default() -> Self {
        Self(vec![
            NotificationWindow {
                label: "1h".into(),
                offset_before_start: HOUR_IN_MILLIS,
            },
            NotificationWindow {
                label: "24h".into(),
                offset_before_start: 24 * HOUR_IN_MILLIS,
            },
        ])
    }
}

/// Parses `label=millis` pairs separated by commas, e.g. `1h=3600000,24h=86400000`
impl FromStr for NotificationWindows {
    type Err = InvalidNotificationWindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let windows = s
            .split(',')
            .map(str::trim)
            .filter(|definition| !definition.is_empty())
            .map(|definition| {
                let mut parts = definition.splitn(2, '=');
                let label = parts.next().unwrap_or_default().trim();
                let offset = parts
                    .next()
                    .and_then(|offset| offset.trim().parse::<i64>().ok())
                    .ok_or_else(|| InvalidNotificationWindowError::Malformed(definition.into()))?;
                NotificationWindow::new(label, offset)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(windows)
    }
}

/// Identifier of a `NotificationJob`, derived only from the `Appointment` id
/// and the window label. Computing it twice for the same pair always gives
/// the same id, which is what makes scheduling and clearing idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn for_window(appointment_id: &ID, window_label: &str) -> Self {
        Self(format!(
            "{}{}{}",
            appointment_id, JOB_ID_SEPARATOR, window_label
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What gets handed to the delivery channel when a `NotificationJob` is due
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub appointment_id: ID,
    pub window_label: String,
    pub start_ts: i64,
}

/// Controls whether the job store keeps a `NotificationJob` around after it was consumed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobOptions {
    pub remove_on_complete: bool,
    pub remove_on_fail: bool,
}

impl JobOptions {
    pub fn remove_when_done() -> Self {
        Self {
            remove_on_complete: true,
            remove_on_fail: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Consumed,
    Failed,
    /// The job was removed from the store before it was consumed
    Cancelled,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Consumed => "consumed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "consumed" => Ok(Self::Consumed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Unknown job state: {}", s)),
        }
    }
}

/// A request to the job store to run `payload` after `delay` millis
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotificationJob {
    pub id: JobId,
    pub payload: NotificationPayload,
    pub delay: i64,
    pub options: JobOptions,
}

/// A deferred reminder notification as stored by the job store
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationJob {
    pub id: JobId,
    /// Unique per enqueue, so that a consumer finishing a job that has since
    /// been replaced under the same `JobId` does not touch the replacement
    pub instance_id: ID,
    pub payload: NotificationPayload,
    pub enqueued_at: i64,
    pub delay: i64,
    pub run_at: i64,
    pub state: JobState,
    pub options: JobOptions,
    /// How many times the job has been handed to a consumer
    pub attempts: i64,
    /// A claimed job is not handed out again before this timestamp
    pub leased_until: Option<i64>,
    pub failure_reason: Option<String>,
}

impl NotificationJob {
    pub fn enqueue(job: NewNotificationJob, enqueued_at: i64) -> Self {
        Self {
            id: job.id,
            instance_id: Default::default(),
            payload: job.payload,
            enqueued_at,
            delay: job.delay,
            run_at: enqueued_at.saturating_add(job.delay),
            state: JobState::Pending,
            options: job.options,
            attempts: 0,
            leased_until: None,
            failure_reason: None,
        }
    }

    pub fn appointment_id(&self) -> &ID {
        &self.payload.appointment_id
    }

    pub fn window_label(&self) -> &str {
        &self.payload.window_label
    }

    /// Whether a consumer may claim this job at `now`
    pub fn is_claimable(&self, now: i64) -> bool {
        self.state == JobState::Pending
            && self.run_at <= now
            && self.leased_until.map(|until| until <= now).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_job(delay: i64) -> NewNotificationJob {
        let appointment_id = ID::default();
        NewNotificationJob {
            id: JobId::for_window(&appointment_id, "1h"),
            payload: NotificationPayload {
                appointment_id,
                window_label: "1h".into(),
                start_ts: 0,
            },
            delay,
            options: JobOptions::remove_when_done(),
        }
    }

    #[test]
    fn job_id_is_deterministic() {
        let appointment_id: ID = "7b1e1f5e-7f0b-4bd4-9f1b-8c8e4d2f5a10".parse().unwrap();
        assert_eq!(
            JobId::for_window(&appointment_id, "24h"),
            JobId::for_window(&appointment_id, "24h")
        );
        assert_eq!(
            JobId::for_window(&appointment_id, "24h").as_str(),
            "7b1e1f5e-7f0b-4bd4-9f1b-8c8e4d2f5a10_24h"
        );
        assert_ne!(
            JobId::for_window(&appointment_id, "1h"),
            JobId::for_window(&appointment_id, "24h")
        );
    }

    #[test]
    fn default_windows() {
        let windows = NotificationWindows::default();
        let windows = windows
            .iter()
            .map(|w| (w.label(), w.offset_before_start()))
            .collect::<Vec<_>>();
        assert_eq!(windows, vec![("1h", 3_600_000), ("24h", 86_400_000)]);
    }

    #[test]
    fn delay_until_window() {
        let window = NotificationWindow::new("1h", HOUR_IN_MILLIS).unwrap();
        let now = 1_000_000;
        assert_eq!(window.delay_until(now + 2 * HOUR_IN_MILLIS, now), HOUR_IN_MILLIS);
        assert_eq!(window.delay_until(now + HOUR_IN_MILLIS, now), 0);
        assert!(window.delay_until(now, now) < 0);
    }

    #[test]
    fn delay_until_saturates_for_extreme_timestamps() {
        let window = NotificationWindow::new("1h", HOUR_IN_MILLIS).unwrap();
        assert_eq!(window.delay_until(i64::MIN, 1_000_000), i64::MIN);
        assert_eq!(window.delay_until(i64::MAX, -1_000_000), i64::MAX - HOUR_IN_MILLIS);
        assert_eq!(
            NotificationJob::enqueue(new_job(i64::MAX), 1000).run_at,
            i64::MAX
        );
    }

    #[test]
    fn rejects_invalid_windows() {
        assert_eq!(
            NotificationWindow::new("1_h", 1),
            Err(InvalidNotificationWindowError::InvalidLabel("1_h".into()))
        );
        assert_eq!(
            NotificationWindow::new("", 1),
            Err(InvalidNotificationWindowError::InvalidLabel("".into()))
        );
        assert_eq!(
            NotificationWindow::new("1h", -1),
            Err(InvalidNotificationWindowError::NegativeOffset("1h".into()))
        );
        let dup = vec![
            NotificationWindow::new("1h", 1).unwrap(),
            NotificationWindow::new("1h", 2).unwrap(),
        ];
        assert_eq!(
            NotificationWindows::new(dup),
            Err(InvalidNotificationWindowError::DuplicateLabel("1h".into()))
        );
    }

    #[test]
    fn parses_window_table() {
        let windows = "15m=900000, 2d=172800000".parse::<NotificationWindows>().unwrap();
        assert_eq!(windows.len(), 2);
        let labels = windows.iter().map(|w| w.label()).collect::<Vec<_>>();
        assert_eq!(labels, vec!["15m", "2d"]);

        assert_eq!(
            "15m".parse::<NotificationWindows>(),
            Err(InvalidNotificationWindowError::Malformed("15m".into()))
        );
        assert_eq!(
            "15m=soon".parse::<NotificationWindows>(),
            Err(InvalidNotificationWindowError::Malformed("15m=soon".into()))
        );
    }

    #[test]
    fn enqueued_job_runs_after_delay() {
        let job = NotificationJob::enqueue(new_job(500), 1000);
        assert_eq!(job.run_at, 1500);
        assert_eq!(job.state, JobState::Pending);
        assert!(!job.is_claimable(1499));
        assert!(job.is_claimable(1500));

        let leased = NotificationJob {
            leased_until: Some(2000),
            ..job.clone()
        };
        assert!(!leased.is_claimable(1999));
        assert!(leased.is_claimable(2000));

        let consumed = NotificationJob {
            state: JobState::Consumed,
            ..job
        };
        assert!(!consumed.is_claimable(5000));
    }

    #[test]
    fn payload_is_camel_case() {
        let job = new_job(1);
        let json = serde_json::to_value(&job.payload).unwrap();
        assert_eq!(json["windowLabel"], "1h");
        assert_eq!(json["startTs"], 0);
        assert!(json["appointmentId"].is_string());
    }
}
