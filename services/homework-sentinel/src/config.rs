//! Configuration types for the homework sentinel service

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

pub const PRACTICUM_TOKEN_VAR: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_auth_scheme")]
    pub auth_scheme: String,
    #[serde(default = "default_retry_period")]
    pub retry_period_seconds: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_telegram_api_base")]
    pub telegram_api_base: String,
    #[serde(default = "default_verdicts")]
    pub verdicts: BTreeMap<String, String>,
    #[serde(default)]
    pub credentials: Credentials,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            auth_scheme: default_auth_scheme(),
            retry_period_seconds: default_retry_period(),
            request_timeout_seconds: default_request_timeout(),
            telegram_api_base: default_telegram_api_base(),
            verdicts: default_verdicts(),
            credentials: Credentials::default(),
        }
    }
}

/// The three secrets the service cannot run without
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub practicum_token: Option<String>,
    #[serde(default)]
    pub telegram_token: Option<String>,
    #[serde(default)]
    pub telegram_chat_id: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &self.practicum_token.as_ref().map(|_| "***"))
            .field("telegram_token", &self.telegram_token.as_ref().map(|_| "***"))
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish()
    }
}

/// Credentials after validation, every one present and non-empty
#[derive(Clone)]
pub struct ResolvedCredentials {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
}

impl std::fmt::Debug for ResolvedCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedCredentials")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn retry_period(&self) -> Duration {
        Duration::from_secs(self.retry_period_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Reject settings the poll loop cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.retry_period_seconds == 0 {
            return Err(crate::SentinelError::Config(
                "retry_period_seconds must be greater than zero".to_string(),
            ));
        }
        if self.verdicts.is_empty() {
            return Err(crate::SentinelError::Config(
                "verdicts must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Fill credentials missing from the config file from the process
    /// environment, then validate that all of them are present.
    pub fn resolve_secrets(&mut self) -> crate::Result<ResolvedCredentials> {
        self.resolve_secrets_with(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::resolve_secrets`] with an injectable variable lookup
    pub fn resolve_secrets_with<F>(&mut self, lookup: F) -> crate::Result<ResolvedCredentials>
    where
        F: Fn(&str) -> Option<String>,
    {
        let creds = &mut self.credentials;
        let slots = [
            (PRACTICUM_TOKEN_VAR, &mut creds.practicum_token),
            (TELEGRAM_TOKEN_VAR, &mut creds.telegram_token),
            (TELEGRAM_CHAT_ID_VAR, &mut creds.telegram_chat_id),
        ];

        let mut missing = Vec::new();
        for (name, slot) in slots {
            if slot.as_deref().is_none_or(str::is_empty) {
                *slot = lookup(name).filter(|v| !v.is_empty());
            }
            if slot.is_none() {
                missing.push(name);
            }
        }

        match (
            &creds.practicum_token,
            &creds.telegram_token,
            &creds.telegram_chat_id,
        ) {
            (Some(practicum_token), Some(telegram_token), Some(telegram_chat_id)) => {
                Ok(ResolvedCredentials {
                    practicum_token: practicum_token.clone(),
                    telegram_token: telegram_token.clone(),
                    telegram_chat_id: telegram_chat_id.clone(),
                })
            }
            _ => Err(crate::SentinelError::Config(format!(
                "Отсутствуют обязательные переменные окружения: {}",
                missing.join(", ")
            ))),
        }
    }
}

fn default_endpoint() -> String {
    "https://practicum.yandex.ru/api/user_api/homework_statuses/".to_string()
}

fn default_auth_scheme() -> String {
    "OAuth".to_string()
}

fn default_retry_period() -> u64 {
    600
}

fn default_request_timeout() -> u64 {
    30
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

pub fn default_verdicts() -> BTreeMap<String, String> {
    [
        (
            "approved",
            "Работа проверена: ревьюеру всё понравилось. Ура!",
        ),
        ("reviewing", "Работа взята на проверку ревьюером."),
        ("rejected", "Работа проверена: у ревьюера есть замечания."),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::SentinelError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}
