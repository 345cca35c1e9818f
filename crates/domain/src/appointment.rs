use crate::shared::{
    entity::{Entity, ID},
    patch::FieldPatch,
};
use thiserror::Error;

/// An `Appointment` booked by a `User`. Reminder notifications are
/// scheduled relative to its `start_ts`.
#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub id: ID,
    pub user_id: ID,
    pub title: String,
    /// Start of the appointment in millis since epoch
    pub start_ts: i64,
    /// End of the appointment in millis since epoch
    pub end_ts: i64,
    pub observation: Option<String>,
    pub created: i64,
    pub updated: i64,
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidAppointmentError {
    #[error("Title cannot be empty")]
    EmptyTitle,
    #[error("startDate must be before endDate")]
    InvalidTimespan,
}

impl Appointment {
    pub fn validate_title(title: &str) -> Result<(), InvalidAppointmentError> {
        if title.trim().is_empty() {
            return Err(InvalidAppointmentError::EmptyTitle);
        }
        Ok(())
    }

    pub fn validate_timespan(start_ts: i64, end_ts: i64) -> Result<(), InvalidAppointmentError> {
        if start_ts >= end_ts {
            return Err(InvalidAppointmentError::InvalidTimespan);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), InvalidAppointmentError> {
        Self::validate_title(&self.title)?;
        Self::validate_timespan(self.start_ts, self.end_ts)
    }

    /// Merges the set fields of `patch` into this `Appointment`
    pub fn apply_patch(&mut self, patch: AppointmentPatch, updated: i64) {
        patch.title.apply_to(&mut self.title);
        patch.start_ts.apply_to(&mut self.start_ts);
        patch.end_ts.apply_to(&mut self.end_ts);
        patch.observation.apply_to(&mut self.observation);
        self.updated = updated;
    }
}

impl Entity for Appointment {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// Partial update of an `Appointment`. `observation` is nullable, so
/// `FieldPatch::Set(None)` removes it while `FieldPatch::Unchanged` keeps it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentPatch {
    pub title: FieldPatch<String>,
    pub start_ts: FieldPatch<i64>,
    pub end_ts: FieldPatch<i64>,
    pub observation: FieldPatch<Option<String>>,
}

impl AppointmentPatch {
    /// Validates the patch on its own, before the `Appointment` it targets is loaded
    pub fn validate(&self) -> Result<(), InvalidAppointmentError> {
        if let Some(title) = self.title.as_set() {
            Appointment::validate_title(title)?;
        }
        if let (Some(start_ts), Some(end_ts)) = (self.start_ts.as_set(), self.end_ts.as_set()) {
            Appointment::validate_timespan(*start_ts, *end_ts)?;
        }
        Ok(())
    }
}
