mod inmemory;
mod postgres;

use agenda_domain::{Appointment, ID};
pub use inmemory::InMemoryAppointmentRepo;
pub use postgres::PostgresAppointmentRepo;

/// One page of the `Appointment`s of a `User` together with
/// how many `Appointment`s the `User` has in total
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentPage {
    pub items: Vec<Appointment>,
    pub total: i64,
}

#[async_trait::async_trait]
pub trait IAppointmentRepo: Send + Sync {
    async fn insert(&self, appointment: &Appointment) -> anyhow::Result<()>;
    /// Overwrites the stored `Appointment` and returns it,
    /// or `None` if it no longer exists
    async fn save(&self, appointment: &Appointment) -> anyhow::Result<Option<Appointment>>;
    async fn find(&self, appointment_id: &ID) -> anyhow::Result<Option<Appointment>>;
    /// Finds the `Appointment`s starting within `from` and `to` (both inclusive and optional),
    /// ordered by start
    async fn find_by_date_range(
        &self,
        from: Option<i64>,
        to: Option<i64>,
    ) -> anyhow::Result<Vec<Appointment>>;
    async fn find_by_user(
        &self,
        user_id: &ID,
        skip: i64,
        limit: i64,
    ) -> anyhow::Result<AppointmentPage>;
    async fn delete(&self, appointment_id: &ID) -> anyhow::Result<Option<Appointment>>;
}
