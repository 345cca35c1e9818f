use agenda_domain::{Appointment, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDTO {
    pub id: ID,
    pub user_id: ID,
    pub title: String,
    pub start_ts: i64,
    pub end_ts: i64,
    pub observation: Option<String>,
    pub created: i64,
    pub updated: i64,
}

impl AppointmentDTO {
    pub fn new(appointment: Appointment) -> Self {
        Self {
            id: appointment.id,
            user_id: appointment.user_id,
            title: appointment.title,
            start_ts: appointment.start_ts,
            end_ts: appointment.end_ts,
            observation: appointment.observation,
            created: appointment.created,
            updated: appointment.updated,
        }
    }
}
