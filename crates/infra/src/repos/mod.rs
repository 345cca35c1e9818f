mod appointment;
mod health;
mod notification_jobs;
mod shared;

use crate::ISys;
pub use appointment::{AppointmentPage, IAppointmentRepo};
use appointment::{InMemoryAppointmentRepo, PostgresAppointmentRepo};
pub use health::IHealthRepo;
use health::{InMemoryHealthRepo, PostgresHealthRepo};
use notification_jobs::PostgresDelayedJobStore;
pub use notification_jobs::{IDelayedJobStore, InMemoryDelayedJobStore};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct Repos {
    pub appointments: Arc<dyn IAppointmentRepo>,
    pub notification_jobs: Arc<dyn IDelayedJobStore>,
    pub health: Arc<dyn IHealthRepo>,
}

impl Repos {
    pub fn create_postgres(pool: PgPool, sys: Arc<dyn ISys>) -> Self {
        Self {
            appointments: Arc::new(PostgresAppointmentRepo::new(pool.clone())),
            notification_jobs: Arc::new(PostgresDelayedJobStore::new(pool.clone(), sys)),
            health: Arc::new(PostgresHealthRepo::new(pool)),
        }
    }

    pub fn create_inmemory(sys: Arc<dyn ISys>) -> Self {
        Self {
            appointments: Arc::new(InMemoryAppointmentRepo::new()),
            notification_jobs: Arc::new(InMemoryDelayedJobStore::new(sys)),
            health: Arc::new(InMemoryHealthRepo),
        }
    }
}

#[cfg(test)]
impl Repos {
    /// Inmemory repos, followed by postgres repos in a freshly migrated schema
    /// of their own when `DATABASE_URL` is set. Each variant gets its own clock.
    pub async fn create_for_tests<S: ISys + 'static>(
        create_sys: impl Fn() -> Arc<S>,
    ) -> Vec<(Arc<S>, Self)> {
        use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
        use std::str::FromStr;

        let sys = create_sys();
        let mut variants = vec![(sys.clone(), Self::create_inmemory(sys))];

        if let Ok(connection_string) = std::env::var("DATABASE_URL") {
            let schema = format!("test_{}", agenda_domain::ID::default().inner().simple());
            let pool = PgPool::connect(&connection_string)
                .await
                .expect("Expected to connect to postgres");
            let create_schema = format!("CREATE SCHEMA {}", schema);
            sqlx::query(&create_schema)
                .execute(&pool)
                .await
                .expect("Expected to create test schema");

            let options = PgConnectOptions::from_str(&connection_string)
                .expect("Expected valid DATABASE_URL")
                .options([("search_path", schema.as_str())]);
            let pool = PgPoolOptions::new()
                .max_connections(2)
                .connect_with(options)
                .await
                .expect("Expected to connect to test schema");
            crate::run_migration(&pool)
                .await
                .expect("Expected migrations to run");

            let sys = create_sys();
            variants.push((sys.clone(), Self::create_postgres(pool, sys)));
        }

        variants
    }
}
