use crate::configuration::DatabaseSettings;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

mod newsletter_repo;
mod post_repo;
mod subscriber_repo;

/// Postgres-backed store for newsletters, subscribers and posts. The pool is
/// shared by the HTTP handlers and the post publisher.
#[derive(Clone, Debug)]
pub struct PostgresDb {
    pool: PgPool,
}

impl PostgresDb {
    pub fn new(configuration: &DatabaseSettings) -> PostgresDb {
        PostgresDb {
            pool: PgPoolOptions::new()
                .acquire_timeout(std::time::Duration::from_secs(2))
                .connect_lazy_with(configuration.with_db()),
        }
    }

    pub async fn migrate(&self) -> Result<(), anyhow::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(e) => e.is_unique_violation(),
        _ => false,
    }
}
