use super::subscribers::ClearNotificationsOnAppointmentDeleted;
use crate::error::AgendaError;
use crate::shared::usecase::{execute, Subscriber, UseCase};
use actix_web::{web, HttpResponse};
use agenda_api_structs::delete_appointment::*;
use agenda_domain::{Appointment, ID};
use agenda_infra::AgendaContext;

pub async fn delete_appointment_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<AgendaContext>,
) -> Result<HttpResponse, AgendaError> {
    let usecase = DeleteAppointmentUseCase {
        appointment_id: path_params.appointment_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|appointment| HttpResponse::Ok().json(APIResponse::new(appointment)))
        .map_err(AgendaError::from)
}

#[derive(Debug)]
pub struct DeleteAppointmentUseCase {
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
impl UseCase for DeleteAppointmentUseCase {
    type Response = Appointment;

    type Error = UseCaseError;

    const NAME: &'static str = "DeleteAppointment";

    async fn execute(&mut self, ctx: &AgendaContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .appointments
            .delete(&self.appointment_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?
            .ok_or_else(|| UseCaseError::NotFound(self.appointment_id.clone()))
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(ClearNotificationsOnAppointmentDeleted)]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use agenda_domain::AppointmentLifecycleEvent;

    #[actix_web::test]
    async fn deletes_appointment_and_publishes_event() {
        let ctx = AgendaContext::create_inmemory();
        let mut receiver = ctx.lifecycle.take_receiver().unwrap();
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

        let usecase = DeleteAppointmentUseCase {
            appointment_id: appointment.id.clone(),
        };
        assert_eq!(execute(usecase, &ctx).await, Ok(appointment.clone()));
        assert_eq!(ctx.repos.appointments.find(&appointment.id).await.unwrap(), None);
        assert_eq!(
            receiver.try_recv().unwrap(),
            AppointmentLifecycleEvent::Deleted(appointment.id)
        );
    }

    #[actix_web::test]
    async fn missing_appointment_is_not_found() {
        let ctx = AgendaContext::create_inmemory();
        let mut receiver = ctx.lifecycle.take_receiver().unwrap();
        let appointment_id = ID::default();

        let usecase = DeleteAppointmentUseCase {
            appointment_id: appointment_id.clone(),
        };
        assert_eq!(
            execute(usecase, &ctx).await,
            Err(UseCaseError::NotFound(appointment_id))
        );
        assert!(receiver.try_recv().is_err());
    }
}
