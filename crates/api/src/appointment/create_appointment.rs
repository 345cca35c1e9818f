use super::subscribers::ScheduleNotificationsOnAppointmentCreated;
use crate::error::AgendaError;
use crate::shared::usecase::{execute, Subscriber, UseCase};
use actix_web::{web, HttpResponse};
use agenda_api_structs::create_appointment::*;
use agenda_domain::{Appointment, InvalidAppointmentError, ID};
use agenda_infra::AgendaContext;

pub async fn create_appointment_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<AgendaContext>,
) -> Result<HttpResponse, AgendaError> {
    let body = body.0;
    let usecase = CreateAppointmentUseCase {
        user_id: body.user_id,
        title: body.title,
        start_ts: body.start_ts,
        end_ts: body.end_ts,
        observation: body.observation,
    };

    execute(usecase, &ctx)
        .await
        .map(|appointment| HttpResponse::Created().json(APIResponse::new(appointment)))
        .map_err(AgendaError::from)
}

#[derive(Debug)]
pub struct CreateAppointmentUseCase {
    pub user_id: ID,
    pub title: String,
    pub start_ts: i64,
    pub end_ts: i64,
    pub observation: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    InvalidAppointment(InvalidAppointmentError),
    StorageError,
}

impl From<UseCaseError> for AgendaError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidAppointment(e) => Self::BadClientData(e.to_string()),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateAppointmentUseCase {
    type Response = Appointment;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateAppointment";

    async fn execute(&mut self, ctx: &AgendaContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();
        let appointment = Appointment {
            id: Default::default(),
            user_id: self.user_id.clone(),
            title: self.title.clone(),
            start_ts: self.start_ts,
            end_ts: self.end_ts,
            observation: self.observation.clone(),
            created: now,
            updated: now,
        };
        appointment
            .validate()
            .map_err(UseCaseError::InvalidAppointment)?;

        ctx.repos
            .appointments
            .insert(&appointment)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(appointment)
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(ScheduleNotificationsOnAppointmentCreated)]
    }
}
