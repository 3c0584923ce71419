use std::collections::HashMap;
use std::fmt;

use secrecy::SecretString;

use crate::error::BootstrapError;

pub type EnvMap = HashMap<String, String>;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f64 = 0.3;
const DEFAULT_PORT: u16 = 8080;

/// Settings the AI client is built from.
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    pub openai_api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
}

impl WorkerConfig {
    /// Reads the worker settings out of an environment snapshot.
    ///
    /// Fails with [`BootstrapError::MissingEnv`] when `OPENAI_API_KEY` is
    /// absent or blank.
    pub fn from_env(env: &EnvMap) -> Result<Self, BootstrapError> {
        let api_key = env_opt(env, OPENAI_API_KEY).ok_or(BootstrapError::MissingEnv(OPENAI_API_KEY))?;

        let temperature = match env_opt(env, "OPENAI_TEMPERATURE") {
            Some(raw) => raw.parse::<f64>().map_err(|_| BootstrapError::InvalidEnv {
                name: "OPENAI_TEMPERATURE",
                value: raw.clone(),
            })?,
            None => DEFAULT_TEMPERATURE,
        };

        Ok(Self {
            openai_api_key: SecretString::from(api_key),
            base_url: env_or(env, "OPENAI_BASE_URL", DEFAULT_BASE_URL),
            model: env_or(env, "OPENAI_MODEL", DEFAULT_MODEL),
            temperature,
        })
    }
}

/// When configuration becomes available to the worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostMode {
    /// Bootstrap once at startup.
    Process,
    /// Bootstrap a fresh context for every request.
    PerRequest,
}

impl HostMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "process" => Some(HostMode::Process),
            "per-request" | "per_request" | "request" => Some(HostMode::PerRequest),
            _ => None,
        }
    }
}

impl fmt::Display for HostMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostMode::Process => write!(f, "process"),
            HostMode::PerRequest => write!(f, "per-request"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub mode: HostMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            mode: HostMode::Process,
        }
    }
}

impl ServerConfig {
    pub fn from_env(env: &EnvMap) -> Result<Self, BootstrapError> {
        let port = match env_opt(env, "PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| BootstrapError::InvalidEnv {
                name: "PORT",
                value: raw.clone(),
            })?,
            None => DEFAULT_PORT,
        };

        let mode = match env_opt(env, "HOST_MODE") {
            Some(raw) => HostMode::parse(&raw).ok_or(BootstrapError::InvalidEnv {
                name: "HOST_MODE",
                value: raw.clone(),
            })?,
            None => HostMode::Process,
        };

        Ok(Self { port, mode })
    }
}

fn env_opt(env: &EnvMap, key: &str) -> Option<String> {
    match env.get(key) {
        Some(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}

fn env_or(env: &EnvMap, key: &str, fallback: &str) -> String {
    env_opt(env, key).unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> EnvMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn missing_key_is_reported_by_name() {
        let err = WorkerConfig::from_env(&EnvMap::new()).unwrap_err();
        assert!(matches!(err, BootstrapError::MissingEnv(OPENAI_API_KEY)));
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: OPENAI_API_KEY"
        );
    }

    #[test]
    fn blank_key_counts_as_missing() {
        for value in ["", "   "] {
            let err = WorkerConfig::from_env(&env(&[(OPENAI_API_KEY, value)])).unwrap_err();
            assert!(matches!(err, BootstrapError::MissingEnv(_)));
        }
    }

    #[test]
    fn defaults_fill_optional_settings() {
        let cfg = WorkerConfig::from_env(&env(&[(OPENAI_API_KEY, "sk-test")])).unwrap();
        assert_eq!(cfg.openai_api_key.expose_secret(), "sk-test");
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.temperature, DEFAULT_TEMPERATURE);
    }

    #[test]
    fn bad_temperature_is_rejected() {
        let err = WorkerConfig::from_env(&env(&[
            (OPENAI_API_KEY, "sk-test"),
            ("OPENAI_TEMPERATURE", "warm"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::InvalidEnv { name: "OPENAI_TEMPERATURE", .. }
        ));
    }

    #[test]
    fn server_config_reads_mode_and_port() {
        let cfg = ServerConfig::from_env(&env(&[("PORT", "9090"), ("HOST_MODE", "per-request")])).unwrap();
        assert_eq!(cfg.port, 9090);
        assert_eq!(cfg.mode, HostMode::PerRequest);

        let cfg = ServerConfig::from_env(&EnvMap::new()).unwrap();
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.mode, HostMode::Process);
    }

    #[test]
    fn server_config_rejects_bad_port_and_mode() {
        assert!(matches!(
            ServerConfig::from_env(&env(&[("PORT", "not-a-port")])),
            Err(BootstrapError::InvalidEnv { name: "PORT", .. })
        ));
        assert!(matches!(
            ServerConfig::from_env(&env(&[("PORT", "70000")])),
            Err(BootstrapError::InvalidEnv { name: "PORT", .. })
        ));
        assert!(matches!(
            ServerConfig::from_env(&env(&[("HOST_MODE", "lambda")])),
            Err(BootstrapError::InvalidEnv { name: "HOST_MODE", .. })
        ));
    }
}
