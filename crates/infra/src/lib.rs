mod config;
mod lifecycle;
mod repos;
mod services;
mod system;

pub use config::Config;
pub use lifecycle::LifecycleEventBus;
pub use repos::{
    AppointmentPage, IAppointmentRepo, IDelayedJobStore, IHealthRepo, InMemoryDelayedJobStore,
    Repos,
};
pub use services::*;
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::{ISys, MockSys, RealSys};
use tracing::{info, warn};

#[derive(Clone)]
pub struct AgendaContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub lifecycle: LifecycleEventBus,
    pub delivery: Arc<dyn INotificationDelivery>,
}

impl AgendaContext {
    fn create(repos: Repos, config: Config, sys: Arc<dyn ISys>) -> Self {
        let delivery: Arc<dyn INotificationDelivery> = match &config.notification_webhook_url {
            Some(url) => Arc::new(WebhookDelivery::new(
                url.clone(),
                config.notification_webhook_key.clone(),
            )),
            None => Arc::new(LogDelivery),
        };
        Self {
            repos,
            config,
            sys,
            lifecycle: LifecycleEventBus::new(),
            delivery,
        }
    }

    pub fn create_inmemory() -> Self {
        Self::create_inmemory_with_sys(Arc::new(RealSys {}))
    }

    /// Inmemory context where time is read from `sys`, which is
    /// shared with the inmemory job store
    pub fn create_inmemory_with_sys(sys: Arc<dyn ISys>) -> Self {
        Self::create(Repos::create_inmemory(sys.clone()), Config::new(), sys)
    }

    async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB RUNNING MIGRATIONS ...");
        run_migration(&pool).await?;
        info!("DB RUNNING MIGRATIONS ... [done]");

        let sys: Arc<dyn ISys> = Arc::new(RealSys {});
        Ok(Self::create(
            Repos::create_postgres(pool, sys.clone()),
            Config::new(),
            sys,
        ))
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> anyhow::Result<AgendaContext> {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    match std::env::var(PSQL_CONNECTION_STRING) {
        Ok(connection_string) => AgendaContext::create_postgres(&connection_string).await,
        Err(_) => {
            warn!(
                "{} env var was not found, falling back to inmemory repositories. Appointments and notification jobs will not survive a restart.",
                PSQL_CONNECTION_STRING
            );
            Ok(AgendaContext::create_inmemory())
        }
    }
}

async fn run_migration(pool: &sqlx::PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!().run(pool).await
}
