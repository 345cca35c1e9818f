use super::scheduler::NotificationScheduler;
use agenda_domain::AppointmentLifecycleEvent;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

/// Synchronizes the notification jobs of an `Appointment` with something
/// that happened to it. Scheduling failures are logged and not propagated
/// because the change to the `Appointment` itself has already been stored.
pub async fn dispatch_lifecycle_event(
    scheduler: &NotificationScheduler,
    event: &AppointmentLifecycleEvent,
) {
    let res = match event {
        AppointmentLifecycleEvent::Created(appointment) => {
            scheduler.schedule_for_appointment(appointment).await
        }
        AppointmentLifecycleEvent::Updated(appointment) => {
            scheduler.reschedule_for_appointment(appointment).await
        }
        AppointmentLifecycleEvent::Deleted(appointment_id) => {
            scheduler.clear_for_appointment(appointment_id).await
        }
    };

    if let Err(e) = res {
        warn!(
            appointment_id = %event.appointment_id(),
            "{}",
            e
        );
    }
}

/// Consumes lifecycle events one at a time until every publisher is dropped,
/// so the jobs of an `Appointment` follow its events in publishing order.
pub async fn run_lifecycle_dispatcher(
    scheduler: NotificationScheduler,
    mut receiver: UnboundedReceiver<AppointmentLifecycleEvent>,
) {
    while let Some(event) = receiver.recv().await {
        dispatch_lifecycle_event(&scheduler, &event).await;
    }
    info!("Appointment lifecycle event channel was closed");
}
