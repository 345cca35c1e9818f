use agenda_domain::NotificationWindows;
use agenda_utils::create_random_secret;
use std::{fmt::Display, str::FromStr};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// The windows before the start of an `Appointment` at which
    /// reminder notifications are sent
    pub notification_windows: NotificationWindows,
    /// Where due reminder notifications are posted. When this is not
    /// set the notifications are only logged.
    pub notification_webhook_url: Option<String>,
    /// Sent along with every webhook request so that the receiver
    /// can verify that the request came from this service
    pub notification_webhook_key: String,
    /// How often the notification worker looks for due jobs
    pub worker_poll_interval_millis: u64,
    /// How long a claimed job is hidden from other claims. If the worker
    /// has not finished the job within that time it will be delivered again.
    pub worker_lease_millis: i64,
    /// Maximum amount of jobs claimed in one poll
    pub worker_batch_size: usize,
}

impl Config {
    pub fn new() -> Self {
        let notification_webhook_key = match std::env::var("NOTIFICATION_WEBHOOK_KEY") {
            Ok(key) => key,
            Err(_) => {
                info!("Did not find NOTIFICATION_WEBHOOK_KEY environment variable. Going to create one.");
                let key = create_random_secret(32);
                info!("Webhook key for notifications was generated and set to: {}", key);
                key
            }
        };
        let notification_webhook_url = std::env::var("NOTIFICATION_WEBHOOK_URL").ok();
        if notification_webhook_url.is_none() {
            info!("Did not find NOTIFICATION_WEBHOOK_URL environment variable. Due notifications will only be logged.");
        }

        Self {
            port: parse_env_or("PORT", 5000),
            notification_windows: parse_env_or("NOTIFICATION_WINDOWS", Default::default()),
            notification_webhook_url,
            notification_webhook_key,
            worker_poll_interval_millis: parse_env_or("WORKER_POLL_INTERVAL_MILLIS", 1000),
            worker_lease_millis: parse_env_or("WORKER_LEASE_MILLIS", 1000 * 60),
            worker_batch_size: parse_env_or("WORKER_BATCH_SIZE", 100),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_env_or<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
    T::Err: Display,
{
    let value = match std::env::var(name) {
        Ok(value) => value,
        Err(_) => return default,
    };
    match value.parse::<T>() {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(
                "The given {}: {} is not valid ({}), falling back to the default: {:?}.",
                name, value, e, default
            );
            default
        }
    }
}
