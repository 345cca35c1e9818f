use agenda_domain::AppointmentLifecycleEvent;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::warn;

/// Channel between the appointment use cases and the consumer synchronizing
/// reminder notifications. Publishing never waits for the consumer.
#[derive(Clone)]
pub struct LifecycleEventBus {
    sender: UnboundedSender<AppointmentLifecycleEvent>,
    receiver: Arc<Mutex<Option<UnboundedReceiver<AppointmentLifecycleEvent>>>>,
}

impl LifecycleEventBus {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded_channel();
        Self {
            sender,
            receiver: Arc::new(Mutex::new(Some(receiver))),
        }
    }

    pub fn publish(&self, event: AppointmentLifecycleEvent) {
        if let Err(e) = self.sender.send(event) {
            warn!(
                appointment_id = %e.0.appointment_id(),
                "No consumer is listening for appointment lifecycle events"
            );
        }
    }

    /// Hands out the receiving end of the channel. There is only one,
    /// so every call after the first returns `None`.
    pub fn take_receiver(&self) -> Option<UnboundedReceiver<AppointmentLifecycleEvent>> {
        match self.receiver.lock() {
            Ok(mut receiver) => receiver.take(),
            Err(_) => None,
        }
    }
}

impl Default for LifecycleEventBus {
    fn default() -> Self {
        Self::new()
    }
}
