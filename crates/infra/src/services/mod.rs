mod notification_delivery;

pub use notification_delivery::{INotificationDelivery, LogDelivery, WebhookDelivery};
