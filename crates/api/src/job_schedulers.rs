use crate::notification::{run_lifecycle_dispatcher, NotificationScheduler, NotificationWorker};
use actix_web::rt::time::interval;
use agenda_infra::AgendaContext;
use std::time::Duration;
use tracing::{error, info};

/// Polls the job store for due notification jobs until the server stops
pub fn start_notification_worker(ctx: AgendaContext) {
    actix_web::rt::spawn(async move {
        let worker = NotificationWorker::from_context(&ctx);
        let mut poll_interval =
            interval(Duration::from_millis(ctx.config.worker_poll_interval_millis.max(1)));
        loop {
            poll_interval.tick().await;
            worker.process_due_jobs().await;
        }
    });
}

/// Keeps the notification jobs in sync with the appointment lifecycle events
pub fn start_lifecycle_dispatcher(ctx: AgendaContext) {
    let receiver = match ctx.lifecycle.take_receiver() {
        Some(receiver) => receiver,
        None => {
            error!("Appointment lifecycle events are already being consumed");
            return;
        }
    };
    let scheduler = NotificationScheduler::from_context(&ctx);
    info!(
        "Scheduling appointment notifications for {} windows",
        ctx.config.notification_windows.len()
    );

    actix_web::rt::spawn(run_lifecycle_dispatcher(scheduler, receiver));
}
