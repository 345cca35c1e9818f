use super::{
    create_appointment::CreateAppointmentUseCase, delete_appointment::DeleteAppointmentUseCase,
    update_appointment::UpdateAppointmentUseCase,
};
use crate::shared::usecase::Subscriber;
use agenda_domain::{Appointment, AppointmentLifecycleEvent};
use agenda_infra::AgendaContext;

pub struct ScheduleNotificationsOnAppointmentCreated;

#[async_trait::async_trait(?Send)]
impl Subscriber<CreateAppointmentUseCase> for ScheduleNotificationsOnAppointmentCreated {
    async fn notify(&self, e: &Appointment, ctx: &AgendaContext) {
        ctx.lifecycle
            .publish(AppointmentLifecycleEvent::Created(e.clone()));
    }
}

pub struct RescheduleNotificationsOnAppointmentUpdated;

#[async_trait::async_trait(?Send)]
impl Subscriber<UpdateAppointmentUseCase> for RescheduleNotificationsOnAppointmentUpdated {
    async fn notify(&self, e: &Appointment, ctx: &AgendaContext) {
        ctx.lifecycle
            .publish(AppointmentLifecycleEvent::Updated(e.clone()));
    }
}

pub struct ClearNotificationsOnAppointmentDeleted;

#[async_trait::async_trait(?Send)]
impl Subscriber<DeleteAppointmentUseCase> for ClearNotificationsOnAppointmentDeleted {
    async fn notify(&self, e: &Appointment, ctx: &AgendaContext) {
        ctx.lifecycle
            .publish(AppointmentLifecycleEvent::Deleted(e.id.clone()));
    }
}
