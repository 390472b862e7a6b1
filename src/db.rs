use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use crate::state::Config;

pub type DbPool = PgPool;

/// Build the connection pool without opening a connection. Connection and
/// credential errors surface on first use.
pub fn create_pool(config: &Config) -> Result<DbPool, sqlx::Error> {
    let mut options = match &config.store_url {
        Some(url) => url.parse::<PgConnectOptions>()?,
        None => PgConnectOptions::new(),
    };

    if let Some(key) = &config.store_key {
        options = options.password(key);
    }

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect_lazy_with(options);

    Ok(pool)
}

pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Host and database of the store URL, without user, password or query
/// parameters (which may carry `password=`).
pub fn redacted_store_url(config: &Config) -> String {
    let Some(url) = &config.store_url else {
        return "<libpq environment>".to_string();
    };

    let (base, query) = match url.split_once('?') {
        Some((base, _)) => (base, "?<hidden>"),
        None => (url.as_str(), ""),
    };

    match base.rsplit_once('@') {
        Some((_, host)) => format!("<hidden>@{}{}", host, query),
        None => format!("{}{}", base, query),
    }
}
