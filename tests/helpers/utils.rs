use actix_web::rt::time::sleep;
use agenda_domain::NotificationPayload;
use agenda_infra::INotificationDelivery;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

/// Polls `condition` until it holds. Notifications are scheduled in the background
/// so their effects only show up eventually.
pub async fn eventually<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if condition().await {
            return true;
        }
        sleep(Duration::from_millis(10)).await;
    }
    false
}

#[derive(Default)]
pub struct RecordingDelivery {
    delivered: Mutex<Vec<NotificationPayload>>,
}

impl RecordingDelivery {
    pub fn delivered(&self) -> Vec<NotificationPayload> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl INotificationDelivery for RecordingDelivery {
    async fn deliver(&self, payload: &NotificationPayload) -> anyhow::Result<()> {
        self.delivered.lock().unwrap().push(payload.clone());
        Ok(())
    }
}
