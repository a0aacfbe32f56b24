//! Settings for the application binary, read from `settings.toml`.
//!
//! Any key can be overridden with a `NODEFOLIO_`-prefixed environment
//! variable, using `__` between sections (`NODEFOLIO_SERVER__PORT=8080`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_PAYSTACK_URL: &str = "https://api.paystack.co";

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct BankVerification {
    pub base_url: Option<String>,
    pub secret_key: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub bank_verification: Option<BankVerification>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("NODEFOLIO").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(raw: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn reads_sqlite_database() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            port = 3000
            database = { sqlite = "nodefolio.db" }

            [bank_verification]
            secret_key = "sk_test"
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.server.port, 3000);
        assert!(matches!(settings.server.database, Database::Sqlite(ref path) if path == "nodefolio.db"));
        let bank = settings.bank_verification.unwrap();
        assert_eq!(bank.secret_key, "sk_test");
        assert!(bank.base_url.is_none());
    }

    #[test]
    fn reads_memory_database_and_default_level() {
        let settings = parse(
            r#"
            [app]

            [server]
            port = 3000
            database = "memory"
            "#,
        );
        assert_eq!(settings.app.level, "info");
        assert!(matches!(settings.server.database, Database::Memory));
        assert!(settings.bank_verification.is_none());
    }
}
