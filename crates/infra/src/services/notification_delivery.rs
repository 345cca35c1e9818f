use agenda_domain::NotificationPayload;
use reqwest::Client;
use tracing::info;

/// The outward channel a due reminder notification is sent through
#[async_trait::async_trait]
pub trait INotificationDelivery: Send + Sync {
    async fn deliver(&self, payload: &NotificationPayload) -> anyhow::Result<()>;
}

/// Posts the notification to the configured webhook
pub struct WebhookDelivery {
    client: Client,
    url: String,
    key: String,
}

impl WebhookDelivery {
    pub const KEY_HEADER: &'static str = "agenda-webhook-key";

    pub fn new(url: String, key: String) -> Self {
        Self {
            client: Client::new(),
            url,
            key,
        }
    }
}

#[async_trait::async_trait]
impl INotificationDelivery for WebhookDelivery {
    async fn deliver(&self, payload: &NotificationPayload) -> anyhow::Result<()> {
        self.client
            .post(&self.url)
            .header(Self::KEY_HEADER, &self.key)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Used when no webhook is configured
pub struct LogDelivery;

#[async_trait::async_trait]
impl INotificationDelivery for LogDelivery {
    async fn deliver(&self, payload: &NotificationPayload) -> anyhow::Result<()> {
        info!(
            appointment_id = %payload.appointment_id,
            window_label = %payload.window_label,
            start_ts = payload.start_ts,
            "Appointment notification is due"
        );
        Ok(())
    }
}
