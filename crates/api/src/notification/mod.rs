mod dispatcher;
mod scheduler;
#[cfg(test)]
pub(crate) mod test_utils;
mod worker;

pub use dispatcher::{dispatch_lifecycle_event, run_lifecycle_dispatcher};
pub use scheduler::{NotificationScheduler, SchedulingError, SchedulingOperation};
pub use worker::NotificationWorker;
