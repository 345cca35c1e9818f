use crate::dtos::AppointmentDTO;
use agenda_domain::{Appointment, AppointmentPatch, FieldPatch, ID};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResponse {
    pub appointment: AppointmentDTO,
}

impl AppointmentResponse {
    pub fn new(appointment: Appointment) -> Self {
        Self {
            appointment: AppointmentDTO::new(appointment),
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentsResponse {
    pub appointments: Vec<AppointmentDTO>,
}

impl AppointmentsResponse {
    pub fn new(appointments: Vec<Appointment>) -> Self {
        Self {
            appointments: appointments.into_iter().map(AppointmentDTO::new).collect(),
        }
    }
}

pub mod create_appointment {
    use super::*;

    #[derive(Serialize, Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub user_id: ID,
        pub title: String,
        pub start_ts: i64,
        pub end_ts: i64,
        pub observation: Option<String>,
    }

    pub type APIResponse = AppointmentResponse;
}

pub mod get_appointment {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub appointment_id: ID,
    }

    pub type APIResponse = AppointmentResponse;
}

pub mod get_appointments {
    use super::*;

    #[derive(Serialize, Deserialize, Debug, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct QueryParams {
        pub from: Option<i64>,
        pub to: Option<i64>,
    }

    pub type APIResponse = AppointmentsResponse;
}

pub mod get_user_appointments {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub user_id: ID,
    }

    #[derive(Serialize, Deserialize, Debug, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct QueryParams {
        pub page: Option<i64>,
        pub limit: Option<i64>,
    }

    #[derive(Serialize, Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub appointments: Vec<AppointmentDTO>,
        pub total: i64,
        pub page: i64,
        pub limit: i64,
        pub total_pages: i64,
    }
}

pub mod update_appointment {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub appointment_id: ID,
    }

    /// Fields left out of the request body are not modified.
    /// `observation: null` removes the observation.
    #[derive(Serialize, Deserialize, Debug, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        #[serde(default, skip_serializing_if = "FieldPatch::is_unchanged")]
        pub title: FieldPatch<String>,
        #[serde(default, skip_serializing_if = "FieldPatch::is_unchanged")]
        pub start_ts: FieldPatch<i64>,
        #[serde(default, skip_serializing_if = "FieldPatch::is_unchanged")]
        pub end_ts: FieldPatch<i64>,
        #[serde(default, skip_serializing_if = "FieldPatch::is_unchanged")]
        pub observation: FieldPatch<Option<String>>,
    }

    impl From<RequestBody> for AppointmentPatch {
        fn from(body: RequestBody) -> Self {
            Self {
                title: body.title,
                start_ts: body.start_ts,
                end_ts: body.end_ts,
                observation: body.observation,
            }
        }
    }

    pub type APIResponse = AppointmentResponse;
}

pub mod delete_appointment {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub appointment_id: ID,
    }

    pub type APIResponse = AppointmentResponse;
}

#[cfg(test)]
mod tests {
    use super::update_appointment::RequestBody;
    use super::*;

    #[test]
    fn update_body_maps_to_patch() {
        let body: RequestBody =
            serde_json::from_str(r#"{ "startTs": 10, "observation": null }"#).unwrap();
        let patch: AppointmentPatch = body.into();
        assert_eq!(
            patch,
            AppointmentPatch {
                start_ts: FieldPatch::Set(10),
                observation: FieldPatch::Set(None),
                ..Default::default()
            }
        );
    }
}
