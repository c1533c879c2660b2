use std::env;

use chrono::Duration;
use log::*;
use payment_engine::api::DEFAULT_TRANSACTION_EXPIRY_SECS;
use ppg_common::Secret;

const DEFAULT_PPG_HOST: &str = "127.0.0.1";
const DEFAULT_PPG_PORT: u16 = 8380;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The shared secret notifications are signed with. Carried opaquely through providers and verified on every
    /// inbound callback.
    pub signing_secret: Secret<String>,
    /// The time before a pending transaction stops accepting settlement notifications.
    pub transaction_expiry: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_PPG_HOST.to_string(),
            port: DEFAULT_PPG_PORT,
            database_url: String::default(),
            signing_secret: Secret::new(String::default()),
            transaction_expiry: Duration::seconds(DEFAULT_TRANSACTION_EXPIRY_SECS),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("PPG_HOST").ok().unwrap_or_else(|| DEFAULT_PPG_HOST.into());
        let port = env::var("PPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for PPG_PORT. {e} Using the default, {DEFAULT_PPG_PORT}, instead."
                    );
                    DEFAULT_PPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_PPG_PORT);
        let database_url = env::var("PPG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ PPG_DATABASE_URL is not set. Please set it to the URL for the payment store.");
            String::default()
        });
        let signing_secret = env::var("PPG_SIGNING_SECRET").map(Secret::new).unwrap_or_else(|_| {
            error!(
                "🪛️ PPG_SIGNING_SECRET is not set. Every inbound notification will fail verification until it is \
                 configured."
            );
            Secret::new(String::default())
        });
        let transaction_expiry = env::var("PPG_TRANSACTION_EXPIRY")
            .map_err(|_| {
                info!(
                    "🪛️ PPG_TRANSACTION_EXPIRY is not set. Using the default value of \
                     {DEFAULT_TRANSACTION_EXPIRY_SECS} seconds."
                )
            })
            .and_then(|s| {
                s.parse::<i64>()
                    .map(Duration::seconds)
                    .map_err(|e| warn!("🪛️ Invalid configuration value for PPG_TRANSACTION_EXPIRY. {e}"))
            })
            .ok()
            .unwrap_or_else(|| Duration::seconds(DEFAULT_TRANSACTION_EXPIRY_SECS));
        Self { host, port, database_url, signing_secret, transaction_expiry }
    }
}
