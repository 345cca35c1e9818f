use super::IDelayedJobStore;
use crate::ISys;
use agenda_domain::{
    JobId, JobOptions, JobState, NewNotificationJob, NotificationJob, NotificationPayload,
};
use sqlx::{
    types::{Json, Uuid},
    FromRow, PgPool,
};
use std::{convert::TryFrom, sync::Arc};

pub struct PostgresDelayedJobStore {
    pool: PgPool,
    sys: Arc<dyn ISys>,
}

impl PostgresDelayedJobStore {
    pub fn new(pool: PgPool, sys: Arc<dyn ISys>) -> Self {
        Self { pool, sys }
    }

    async fn finish(
        &self,
        job: &NotificationJob,
        remove: bool,
        state: JobState,
        failure_reason: Option<&str>,
    ) -> anyhow::Result<()> {
        if remove {
            sqlx::query(
                r#"
                DELETE FROM notification_jobs AS j
                WHERE j.job_id = $1 AND j.instance_uid = $2
                "#,
            )
            .bind(job.id.as_str())
            .bind(job.instance_id.inner())
            .execute(&self.pool)
            .await?;
        } else {
            sqlx::query(
                r#"
                UPDATE notification_jobs SET
                    state = $3,
                    failure_reason = $4,
                    leased_until = NULL
                WHERE job_id = $1 AND instance_uid = $2
                "#,
            )
            .bind(job.id.as_str())
            .bind(job.instance_id.inner())
            .bind(state.as_str())
            .bind(failure_reason)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct NotificationJobRaw {
    job_id: String,
    instance_uid: Uuid,
    payload: Json<NotificationPayload>,
    enqueued_at: i64,
    delay: i64,
    run_at: i64,
    state: String,
    remove_on_complete: bool,
    remove_on_fail: bool,
    attempts: i64,
    leased_until: Option<i64>,
    failure_reason: Option<String>,
}

impl TryFrom<NotificationJobRaw> for NotificationJob {
    type Error = anyhow::Error;

    fn try_from(raw: NotificationJobRaw) -> Result<Self, Self::Error> {
        let state = raw.state.parse::<JobState>().map_err(anyhow::Error::msg)?;
        Ok(Self {
            id: raw.job_id.into(),
            instance_id: raw.instance_uid.into(),
            payload: raw.payload.0,
            enqueued_at: raw.enqueued_at,
            delay: raw.delay,
            run_at: raw.run_at,
            state,
            options: JobOptions {
                remove_on_complete: raw.remove_on_complete,
                remove_on_fail: raw.remove_on_fail,
            },
            attempts: raw.attempts,
            leased_until: raw.leased_until,
            failure_reason: raw.failure_reason,
        })
    }
}

#[async_trait::async_trait]
impl IDelayedJobStore for PostgresDelayedJobStore {
    async fn add(&self, job: NewNotificationJob) -> anyhow::Result<NotificationJob> {
        let job = NotificationJob::enqueue(job, self.sys.get_timestamp_millis());
        let inserted = sqlx::query_as::<_, NotificationJobRaw>(
            r#"
            INSERT INTO notification_jobs(
                job_id,
                instance_uid,
                appointment_uid,
                payload,
                enqueued_at,
                delay,
                run_at,
                state,
                remove_on_complete,
                remove_on_fail,
                attempts
            )
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (job_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(job.id.as_str())
        .bind(job.instance_id.inner())
        .bind(job.appointment_id().inner())
        .bind(Json(&job.payload))
        .bind(job.enqueued_at)
        .bind(job.delay)
        .bind(job.run_at)
        .bind(job.state.as_str())
        .bind(job.options.remove_on_complete)
        .bind(job.options.remove_on_fail)
        .bind(job.attempts)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(raw) => NotificationJob::try_from(raw),
            None => self
                .find(&job.id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Job: {} conflicted but was not found", job.id)),
        }
    }

    async fn find(&self, job_id: &JobId) -> anyhow::Result<Option<NotificationJob>> {
        sqlx::query_as::<_, NotificationJobRaw>(
            r#"
            SELECT * FROM notification_jobs AS j
            WHERE j.job_id = $1
            "#,
        )
        .bind(job_id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(NotificationJob::try_from)
        .transpose()
    }

    async fn remove(&self, job_id: &JobId) -> anyhow::Result<Option<NotificationJob>> {
        let removed = sqlx::query_as::<_, NotificationJobRaw>(
            r#"
            DELETE FROM notification_jobs AS j
            WHERE j.job_id = $1
            RETURNING *
            "#,
        )
        .bind(job_id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(NotificationJob::try_from)
        .transpose()?;

        Ok(removed.map(|job| NotificationJob {
            state: JobState::Cancelled,
            ..job
        }))
    }

    async fn claim_due(
        &self,
        now: i64,
        lease_millis: i64,
        limit: usize,
    ) -> anyhow::Result<Vec<NotificationJob>> {
        let mut claimed = sqlx::query_as::<_, NotificationJobRaw>(
            r#"
            UPDATE notification_jobs SET
                leased_until = $2,
                attempts = attempts + 1
            WHERE job_id IN (
                SELECT j.job_id FROM notification_jobs AS j
                WHERE j.state = 'pending'
                AND j.run_at <= $1
                AND (j.leased_until IS NULL OR j.leased_until <= $1)
                ORDER BY j.run_at
                LIMIT $3
                FOR UPDATE SKIP LOCKED
            )
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(now.saturating_add(lease_millis))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(NotificationJob::try_from)
        .collect::<anyhow::Result<Vec<_>>>()?;

        // RETURNING does not keep the order of the sub select
        claimed.sort_by_key(|job| job.run_at);
        Ok(claimed)
    }

    async fn complete(&self, job: &NotificationJob) -> anyhow::Result<()> {
        self.finish(job, job.options.remove_on_complete, JobState::Consumed, None)
            .await
    }

    async fn fail(&self, job: &NotificationJob, reason: &str) -> anyhow::Result<()> {
        self.finish(job, job.options.remove_on_fail, JobState::Failed, Some(reason))
            .await
    }
}
