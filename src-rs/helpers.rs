use std::env;
use std::sync::Arc;

use tracing::debug;

use crate::config::{EnvMap, WorkerConfig};
use crate::durable::{Durable, PromiseStore};
use crate::error::BootstrapError;
use crate::llm::openai_adapter::OpenAiConfig;
use crate::llm::{OpenAiAdapter, SharedAiClient};
use crate::research::{research, AI_CLIENT, RESEARCH};

/// Builds the AI client once the credential has been validated.
pub type ClientFactory = Arc<dyn Fn(&WorkerConfig) -> Result<SharedAiClient, BootstrapError> + Send + Sync>;

/// Snapshot of the process environment.
pub fn process_env() -> EnvMap {
    env::vars().collect()
}

pub fn openai_client_factory() -> ClientFactory {
    Arc::new(|cfg: &WorkerConfig| {
        let adapter = OpenAiAdapter::new(OpenAiConfig {
            api_key: cfg.openai_api_key.clone(),
            base_url: cfg.base_url.clone(),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
        })
        .map_err(|err| BootstrapError::Client(err.to_string()))?;
        debug!(model = adapter.model(), base_url = %cfg.base_url, "constructed openai client");
        let client: SharedAiClient = Arc::new(adapter);
        Ok(client)
    })
}

/// Turns an environment snapshot into a ready execution context:
/// validate the credential, construct the client, register it as
/// `aiclient`, register `research`.
pub fn bootstrap(env: &EnvMap, store: Arc<PromiseStore>, factory: &ClientFactory) -> Result<Durable, BootstrapError> {
    let cfg = WorkerConfig::from_env(env)?;
    let client = factory(&cfg)?;

    let durable = Durable::builder(store)
        .dependency(AI_CLIENT, client)
        .register(RESEARCH, Arc::new(research))?
        .build();
    Ok(durable)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use secrecy::ExposeSecret;

    use super::*;
    use crate::config::OPENAI_API_KEY;

    fn recording_factory(keys: Arc<Mutex<Vec<String>>>) -> ClientFactory {
        let inner = openai_client_factory();
        Arc::new(move |cfg: &WorkerConfig| {
            keys.lock().unwrap().push(cfg.openai_api_key.expose_secret().to_string());
            inner(cfg)
        })
    }

    #[test]
    fn missing_key_fails_before_client_construction() {
        let keys = Arc::new(Mutex::new(Vec::new()));
        let err = bootstrap(&EnvMap::new(), Arc::new(PromiseStore::new()), &recording_factory(keys.clone()))
            .err()
            .unwrap();
        assert!(err.to_string().contains(OPENAI_API_KEY));
        assert!(keys.lock().unwrap().is_empty());
    }

    #[test]
    fn present_key_builds_one_client_and_registers_research() {
        let keys = Arc::new(Mutex::new(Vec::new()));
        let env: EnvMap = [(OPENAI_API_KEY.to_string(), "sk-test".to_string())].into_iter().collect();

        let durable = bootstrap(&env, Arc::new(PromiseStore::new()), &recording_factory(keys.clone())).unwrap();

        assert_eq!(*keys.lock().unwrap(), vec!["sk-test".to_string()]);
        assert!(durable.dependency::<SharedAiClient>(AI_CLIENT).is_some());
        assert_eq!(durable.functions().names(), vec![RESEARCH.to_string()]);
    }

    #[test]
    fn factory_errors_surface_as_bootstrap_errors() {
        let failing: ClientFactory = Arc::new(|_cfg: &WorkerConfig| Err(BootstrapError::Client("no tls".to_string())));
        let env: EnvMap = [(OPENAI_API_KEY.to_string(), "sk-test".to_string())].into_iter().collect();
        let err = bootstrap(&env, Arc::new(PromiseStore::new()), &failing).err().unwrap();
        assert_eq!(err.to_string(), "failed to construct AI client: no tls");
    }
}
