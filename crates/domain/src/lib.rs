mod appointment;
mod lifecycle;
mod notification;
mod shared;

pub use appointment::{Appointment, AppointmentPatch, InvalidAppointmentError};
pub use lifecycle::AppointmentLifecycleEvent;
pub use notification::{
    InvalidNotificationWindowError, JobId, JobOptions, JobState, NewNotificationJob,
    NotificationJob, NotificationPayload, NotificationWindow, NotificationWindows,
    JOB_ID_SEPARATOR,
};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use shared::patch::FieldPatch;
