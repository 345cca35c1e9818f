use crate::{appointment::Appointment, shared::entity::ID};

/// Something happened to an `Appointment` that its reminder
/// notifications have to be synchronized with
#[derive(Debug, Clone, PartialEq)]
pub enum AppointmentLifecycleEvent {
    Created(Appointment),
    Updated(Appointment),
    Deleted(ID),
}

impl AppointmentLifecycleEvent {
    pub fn appointment_id(&self) -> &ID {
        match self {
            Self::Created(appointment) | Self::Updated(appointment) => &appointment.id,
            Self::Deleted(appointment_id) => appointment_id,
        }
    }
}
