use super::{AppointmentPage, IAppointmentRepo};
use agenda_domain::{Appointment, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresAppointmentRepo {
    pool: PgPool,
}

impl PostgresAppointmentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AppointmentRaw {
    appointment_uid: Uuid,
    user_uid: Uuid,
    title: String,
    start_ts: i64,
    end_ts: i64,
    observation: Option<String>,
    created: i64,
    updated: i64,
}

impl From<AppointmentRaw> for Appointment {
    fn from(raw: AppointmentRaw) -> Self {
        Self {
            id: raw.appointment_uid.into(),
            user_id: raw.user_uid.into(),
            title: raw.title,
            start_ts: raw.start_ts,
            end_ts: raw.end_ts,
            observation: raw.observation,
            created: raw.created,
            updated: raw.updated,
        }
    }
}

#[async_trait::async_trait]
impl IAppointmentRepo for PostgresAppointmentRepo {
    async fn insert(&self, appointment: &Appointment) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO appointments(
                appointment_uid,
                user_uid,
                title,
                start_ts,
                end_ts,
                observation,
                created,
                updated
            )
            VALUES($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(appointment.id.inner())
        .bind(appointment.user_id.inner())
        .bind(&appointment.title)
        .bind(appointment.start_ts)
        .bind(appointment.end_ts)
        .bind(&appointment.observation)
        .bind(appointment.created)
        .bind(appointment.updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save(&self, appointment: &Appointment) -> anyhow::Result<Option<Appointment>> {
        let saved = sqlx::query_as::<_, AppointmentRaw>(
            r#"
            UPDATE appointments SET
                user_uid = $2,
                title = $3,
                start_ts = $4,
                end_ts = $5,
                observation = $6,
                updated = $7
            WHERE appointment_uid = $1
            RETURNING *
            "#,
        )
        .bind(appointment.id.inner())
        .bind(appointment.user_id.inner())
        .bind(&appointment.title)
        .bind(appointment.start_ts)
        .bind(appointment.end_ts)
        .bind(&appointment.observation)
        .bind(appointment.updated)
        .fetch_optional(&self.pool)
        .await?;

        Ok(saved.map(Into::into))
    }

    async fn find(&self, appointment_id: &ID) -> anyhow::Result<Option<Appointment>> {
        let appointment = sqlx::query_as::<_, AppointmentRaw>(
            r#"
            SELECT * FROM appointments AS a
            WHERE a.appointment_uid = $1
            "#,
        )
        .bind(appointment_id.inner())
        .fetch_optional(&self.pool)
        .await?;

        Ok(appointment.map(Into::into))
    }

    async fn find_by_date_range(
        &self,
        from: Option<i64>,
        to: Option<i64>,
    ) -> anyhow::Result<Vec<Appointment>> {
        let appointments = sqlx::query_as::<_, AppointmentRaw>(
            r#"
            SELECT * FROM appointments AS a
            WHERE ($1::BIGINT IS NULL OR a.start_ts >= $1)
            AND ($2::BIGINT IS NULL OR a.start_ts <= $2)
            ORDER BY a.start_ts
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(appointments.into_iter().map(Into::into).collect())
    }

    async fn find_by_user(
        &self,
        user_id: &ID,
        skip: i64,
        limit: i64,
    ) -> anyhow::Result<AppointmentPage> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM appointments AS a
            WHERE a.user_uid = $1
            "#,
        )
        .bind(user_id.inner())
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, AppointmentRaw>(
            r#"
            SELECT * FROM appointments AS a
            WHERE a.user_uid = $1
            ORDER BY a.start_ts
            OFFSET $2
            LIMIT $3
            "#,
        )
        .bind(user_id.inner())
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(AppointmentPage {
            items: items.into_iter().map(Into::into).collect(),
            total,
        })
    }

    async fn delete(&self, appointment_id: &ID) -> anyhow::Result<Option<Appointment>> {
        let appointment = sqlx::query_as::<_, AppointmentRaw>(
            r#"
            DELETE FROM appointments AS a
            WHERE a.appointment_uid = $1
            RETURNING *
            "#,
        )
        .bind(appointment_id.inner())
        .fetch_optional(&self.pool)
        .await?;

        Ok(appointment.map(Into::into))
    }
}
