use super::subscribers::RescheduleNotificationsOnAppointmentUpdated;
use crate::error::AgendaError;
use crate::shared::usecase::{execute, Subscriber, UseCase};
use actix_web::{web, HttpResponse};
use agenda_api_structs::update_appointment::*;
use agenda_domain::{Appointment, AppointmentPatch, InvalidAppointmentError, ID};
use agenda_infra::AgendaContext;

pub async fn update_appointment_controller(
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<AgendaContext>,
) -> Result<HttpResponse, AgendaError> {
    let usecase = UpdateAppointmentUseCase {
        appointment_id: path_params.appointment_id.clone(),
        patch: body.0.into(),
    };

    execute(usecase, &ctx)
        .await
        .map(|appointment| HttpResponse::Ok().json(APIResponse::new(appointment)))
        .map_err(AgendaError::from)
}

#[derive(Debug)]
pub struct UpdateAppointmentUseCase {
    pub appointment_id: ID,
    pub patch: AppointmentPatch,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    InvalidAppointment(InvalidAppointmentError),
    NotFound(ID),
    StorageError,
}

impl From<UseCaseError> for AgendaError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidAppointment(e) => Self::BadClientData(e.to_string()),
            UseCaseError::NotFound(appointment_id) => Self::NotFound(format!(
                "The appointment with id: {}, was not found.",
                appointment_id
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateAppointmentUseCase {
    type Response = Appointment;

    type Error = UseCaseError;

    const NAME: &'static str = "UpdateAppointment";

    async fn execute(&mut self, ctx: &AgendaContext) -> Result<Self::Response, Self::Error> {
        self.patch
            .validate()
            .map_err(UseCaseError::InvalidAppointment)?;

        let mut appointment = ctx
            .repos
            .appointments
            .find(&self.appointment_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?
            .ok_or_else(|| UseCaseError::NotFound(self.appointment_id.clone()))?;

        appointment.apply_patch(self.patch.clone(), ctx.sys.get_timestamp_millis());
        // Only one of the dates might have been patched
        appointment
            .validate()
            .map_err(UseCaseError::InvalidAppointment)?;

        // The appointment may have been deleted since it was read
        ctx.repos
            .appointments
            .save(&appointment)
            .await
            .map_err(|_| UseCaseError::StorageError)?
            .ok_or_else(|| UseCaseError::NotFound(self.appointment_id.clone()))
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(RescheduleNotificationsOnAppointmentUpdated)]
    }
}
