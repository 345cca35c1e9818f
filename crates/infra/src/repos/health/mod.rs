mod inmemory;
mod postgres;

pub use inmemory::InMemoryHealthRepo;
pub use postgres::PostgresHealthRepo;

#[async_trait::async_trait]
pub trait IHealthRepo: Send + Sync {
    /// Round trip to the database, returning how many millis it took
    async fn check_database_connection(&self) -> anyhow::Result<i64>;
}
