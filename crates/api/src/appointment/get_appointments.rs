use crate::error::AgendaError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use agenda_api_structs::get_appointments::*;
use agenda_domain::Appointment;
use agenda_infra::AgendaContext;

pub async fn get_appointments_controller(
    query_params: web::Query<QueryParams>,
    ctx: web::Data<AgendaContext>,
) -> Result<HttpResponse, AgendaError> {
    let usecase = GetAppointmentsUseCase {
        from: query_params.from,
        to: query_params.to,
    };

    execute(usecase, &ctx)
        .await
        .map(|appointments| HttpResponse::Ok().json(APIResponse::new(appointments)))
        .map_err(AgendaError::from)
}

/// Lists the `Appointment`s starting within the optional bounds
#[derive(Debug)]
pub struct GetAppointmentsUseCase {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    StorageError,
}

impl From<UseCaseError> for AgendaError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetAppointmentsUseCase {
    type Response = Vec<Appointment>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetAppointments";

    async fn execute(&mut self, ctx: &AgendaContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .appointments
            .find_by_date_range(self.from, self.to)
            .await
            .map_err(|_| UseCaseError::StorageError)
    }
}
