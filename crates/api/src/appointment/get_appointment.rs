use crate::error::AgendaError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use agenda_api_structs::get_appointment::*;
use agenda_domain::{Appointment, ID};
use agenda_infra::AgendaContext;

pub async fn get_appointment_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<AgendaContext>,
) -> Result<HttpResponse, AgendaError> {
    let usecase = GetAppointmentUseCase {
        appointment_id: path_params.appointment_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|appointment| HttpResponse::Ok().json(APIResponse::new(appointment)))
        .map_err(AgendaError::from)
}

#[derive(Debug)]
pub struct GetAppointmentUseCase {
    pub appointment_id: ID,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
    StorageError,
}

impl From<UseCaseError> for AgendaError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(appointment_id) => Self::NotFound(format!(
                "The appointment with id: {}, was not found.",
                appointment_id
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetAppointmentUseCase {
    type Response = Appointment;

    type Error = UseCaseError;

    const NAME: &'static str = "GetAppointment";

    async fn execute(&mut self, ctx: &AgendaContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .appointments
            .find(&self.appointment_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?
            .ok_or_else(|| UseCaseError::NotFound(self.appointment_id.clone()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[actix_web::test]
    async fn gets_existing_appointment() {
        let ctx = AgendaContext::create_inmemory();
        let appointment = Appointment {
            id: Default::default(),
            user_id: Default::default(),
            title: "Checkup".into(),
            start_ts: 1000,
            end_ts: 2000,
            observation: None,
            created: 0,
            updated: 0,
        };
        ctx.repos.appointments.insert(&appointment).await.unwrap();

        let mut usecase = GetAppointmentUseCase {
            appointment_id: appointment.id.clone(),
        };
        assert_eq!(usecase.execute(&ctx).await, Ok(appointment));
    }

    #[actix_web::test]
    async fn missing_appointment_is_not_found() {
        let ctx = AgendaContext::create_inmemory();
        let mut usecase = GetAppointmentUseCase {
            appointment_id: ID::default(),
        };
        assert_eq!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::NotFound(usecase.appointment_id.clone()))
        );
    }
}
