use super::IHealthRepo;
use sqlx::PgPool;
use std::time::Instant;

pub struct PostgresHealthRepo {
    pool: PgPool,
}

impl PostgresHealthRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl IHealthRepo for PostgresHealthRepo {
    async fn check_database_connection(&self) -> anyhow::Result<i64> {
        let started = Instant::now();
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(started.elapsed().as_millis() as i64)
    }
}
