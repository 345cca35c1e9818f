use super::{AppointmentPage, IAppointmentRepo};
use crate::repos::shared::inmemory_repo::*;
use agenda_domain::{Appointment, ID};
use std::sync::Mutex;

pub struct InMemoryAppointmentRepo {
    appointments: Mutex<Vec<Appointment>>,
}

impl InMemoryAppointmentRepo {
    pub fn new() -> Self {
        Self {
            appointments: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IAppointmentRepo for InMemoryAppointmentRepo {
    async fn insert(&self, appointment: &Appointment) -> anyhow::Result<()> {
        insert(appointment, &self.appointments)
    }

    async fn save(&self, appointment: &Appointment) -> anyhow::Result<Option<Appointment>> {
        save(appointment, &self.appointments)
    }

    async fn find(&self, appointment_id: &ID) -> anyhow::Result<Option<Appointment>> {
        find(appointment_id, &self.appointments)
    }

    async fn find_by_date_range(
        &self,
        from: Option<i64>,
        to: Option<i64>,
    ) -> anyhow::Result<Vec<Appointment>> {
        let mut appointments = find_by(&self.appointments, |a| {
            from.map(|from| a.start_ts >= from).unwrap_or(true)
                && to.map(|to| a.start_ts <= to).unwrap_or(true)
        })?;
        appointments.sort_by_key(|a| a.start_ts);
        Ok(appointments)
    }

    async fn find_by_user(
        &self,
        user_id: &ID,
        skip: i64,
        limit: i64,
    ) -> anyhow::Result<AppointmentPage> {
        let mut appointments = find_by(&self.appointments, |a| a.user_id == *user_id)?;
        appointments.sort_by_key(|a| a.start_ts);
        let total = appointments.len() as i64;
        let items = appointments
            .into_iter()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();

        Ok(AppointmentPage { items, total })
    }

    async fn delete(&self, appointment_id: &ID) -> anyhow::Result<Option<Appointment>> {
        delete(appointment_id, &self.appointments)
    }
}
