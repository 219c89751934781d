//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and from `SPLITLEDGER__*` environment variables
//! (`SPLITLEDGER__SERVER__PORT=8080` overrides `server.port`).

use std::str::FromStr;

use chrono::Weekday;
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File, FileFormat};
use engine::{Money, SplitLimits};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
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
pub struct Limits {
    pub max_participants: usize,
    /// Decimal string, e.g. `"10000000"` or `"2500.50"`.
    pub max_amount: String,
}

impl Limits {
    pub fn split_limits(&self) -> Result<SplitLimits, ConfigError> {
        let max_amount = Money::from_str(&self.max_amount)
            .map_err(|err| ConfigError::Message(format!("limits.max_amount: {err}")))?;
        Ok(SplitLimits::new(self.max_participants, max_amount))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    Log,
    Webhook,
}

#[derive(Debug, Deserialize)]
pub struct Notifier {
    pub transport: TransportKind,
    /// Relay endpoint, required by the webhook transport.
    pub url: Option<String>,
    pub from: String,
    pub currency_symbol: String,
}

#[derive(Debug, Deserialize)]
pub struct Weekly {
    pub enabled: bool,
    pub timezone: String,
    pub weekday: String,
    pub hour: u32,
}

impl Weekly {
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        Tz::from_str(&self.timezone)
            .map_err(|err| ConfigError::Message(format!("weekly.timezone: {err}")))
    }

    pub fn weekday(&self) -> Result<Weekday, ConfigError> {
        Weekday::from_str(&self.weekday).map_err(|_| {
            ConfigError::Message(format!("weekly.weekday: unknown day {}", self.weekday))
        })
    }

    pub fn hour(&self) -> Result<u32, ConfigError> {
        if self.hour < 24 {
            Ok(self.hour)
        } else {
            Err(ConfigError::Message(format!(
                "weekly.hour: {} is not an hour of the day",
                self.hour
            )))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Option<Server>,
    pub limits: Limits,
    pub notifier: Notifier,
    pub weekly: Weekly,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::build(
            defaults()?
                .add_source(File::with_name("settings").required(false))
                .add_source(Environment::with_prefix("SPLITLEDGER").separator("__")),
        )
    }

    /// Settings from a TOML document layered over the defaults.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Self::build(defaults()?.add_source(File::from_str(source, FileFormat::Toml)))
    }

    fn build(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        if settings.notifier.transport == TransportKind::Webhook && settings.notifier.url.is_none()
        {
            return Err(ConfigError::Message(
                "notifier.url is required by the webhook transport".to_string(),
            ));
        }
        Ok(settings)
    }
}

fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    Config::builder()
        .set_default("app.level", "info")?
        .set_default("limits.max_participants", 1000)?
        .set_default("limits.max_amount", "10000000")?
        .set_default("notifier.transport", "log")?
        .set_default("notifier.from", "noreply@splitledger.local")?
        .set_default("notifier.currency_symbol", "₹")?
        .set_default("weekly.enabled", true)?
        .set_default("weekly.timezone", "UTC")?
        .set_default("weekly.weekday", "Mon")?
        .set_default("weekly.hour", 12)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_a_file() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.app.level, "info");
        assert!(settings.server.is_none());
        assert_eq!(settings.notifier.transport, TransportKind::Log);
        assert!(settings.weekly.enabled);
        assert_eq!(settings.weekly.timezone().unwrap(), chrono_tz::UTC);
        assert_eq!(settings.weekly.weekday().unwrap(), Weekday::Mon);
        assert_eq!(settings.weekly.hour().unwrap(), 12);
        assert_eq!(
            settings.limits.split_limits().unwrap(),
            SplitLimits::default()
        );
    }

    #[test]
    fn server_section_is_read() {
        let settings = Settings::from_toml(
            r#"
            [app]
            level = "debug"

            [server]
            bind = "0.0.0.0"
            port = 8080
            database = { sqlite = "ledger.db" }

            [limits]
            max_participants = 10
            max_amount = "500"

            [weekly]
            timezone = "Europe/Rome"
            weekday = "friday"
            hour = 18
            "#,
        )
        .unwrap();

        let server = settings.server.unwrap();
        assert_eq!(server.port, 8080);
        assert_eq!(server.bind.as_deref(), Some("0.0.0.0"));
        assert!(matches!(server.database, Database::Sqlite(ref path) if path == "ledger.db"));
        assert_eq!(
            settings.limits.split_limits().unwrap(),
            SplitLimits::new(10, Money::major(500))
        );
        assert_eq!(settings.weekly.timezone().unwrap(), chrono_tz::Europe::Rome);
        assert_eq!(settings.weekly.weekday().unwrap(), Weekday::Fri);
    }

    #[test]
    fn memory_database_is_a_plain_string() {
        let settings = Settings::from_toml(
            r#"
            [server]
            port = 3000
            database = "memory"
            "#,
        )
        .unwrap();
        assert!(matches!(settings.server.unwrap().database, Database::Memory));
    }

    #[test]
    fn webhook_needs_a_url() {
        let err = Settings::from_toml(
            r#"
            [notifier]
            transport = "webhook"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("notifier.url"));
    }

    #[test]
    fn invalid_schedule_is_reported() {
        let settings = Settings::from_toml(
            r#"
            [weekly]
            timezone = "Mars/Olympus"
            weekday = "someday"
            hour = 25
            "#,
        )
        .unwrap();
        assert!(settings.weekly.timezone().is_err());
        assert!(settings.weekly.weekday().is_err());
        assert!(settings.weekly.hour().is_err());
    }
}
