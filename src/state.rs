use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;

use crate::{
    conversation::ConversationResolver,
    message::message_service::MessageService,
    realtime::ChangeNotifier,
    store::ChatStore,
};

#[derive(Clone)]
pub struct AppState {
    pub conversation_resolver: ConversationResolver,
    pub message_service: MessageService,
    pub notifier: ChangeNotifier,
}

impl AppState {
    /// Wire every service onto the one injected store client.
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        let conversation_resolver = ConversationResolver::new(store.clone());
        let message_service = MessageService::new(store.clone(), conversation_resolver.clone());
        let notifier = ChangeNotifier::new(store);

        Self {
            conversation_resolver,
            message_service,
            notifier,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => anyhow::bail!("unknown STORE_BACKEND '{}', expected 'postgres' or 'memory'", other),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    /// Postgres connection URL. When unset, libpq `PG*` variables apply.
    pub store_url: Option<String>,
    /// Access key, sent as the connection password.
    pub store_key: Option<String>,
    pub store_backend: StoreBackend,
    pub run_migrations: bool,
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_url: None,
            store_key: None,
            store_backend: StoreBackend::Postgres,
            run_migrations: false,
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Config {
    /// Read settings from the process environment.
    ///
    /// Store credentials are not checked here; a bad URL or key surfaces on
    /// the first query.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let store_backend = match lookup("STORE_BACKEND") {
            Some(value) => value.parse()?,
            None => defaults.store_backend,
        };
        let run_migrations = match lookup("RUN_MIGRATIONS") {
            Some(value) => value
                .parse()
                .with_context(|| format!("RUN_MIGRATIONS must be true or false, got '{}'", value))?,
            None => defaults.run_migrations,
        };
        let port = match lookup("PORT") {
            Some(value) => value
                .parse()
                .with_context(|| format!("PORT must be a number, got '{}'", value))?,
            None => defaults.port,
        };

        Ok(Self {
            store_url: lookup("STORE_URL").filter(|v| !v.is_empty()),
            store_key: lookup("STORE_KEY").filter(|v| !v.is_empty()),
            store_backend,
            run_migrations,
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.store_backend, StoreBackend::Postgres);
        assert!(config.store_url.is_none());
        assert!(!config.run_migrations);
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_reads_store_settings() {
        let config = config_from(&[
            ("STORE_URL", "postgres://chat@db.example.com:5432/postgres"),
            ("STORE_KEY", "secret"),
            ("PORT", "8080"),
            ("STORE_BACKEND", "Memory"),
            ("RUN_MIGRATIONS", "true"),
        ])
        .unwrap();

        assert_eq!(config.store_url.as_deref(), Some("postgres://chat@db.example.com:5432/postgres"));
        assert_eq!(config.store_key.as_deref(), Some("secret"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!(config.run_migrations);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("STORE_BACKEND", "redis")]).is_err());
    }
}
