//! Backend selection: picks the one chat backend named by configuration.

use std::sync::Arc;
use std::time::Duration;

use agentic_config::AppConfig;
use agentic_core::error::ProviderError;
use agentic_core::provider::ChatBackend;
use tracing::info;

use crate::ollama::OllamaBackend;
use crate::openai_compat::OpenAiCompatBackend;

/// Build the configured chat backend.
///
/// OpenAI and Groq need an API key (from the config file, an `env:NAME`
/// reference, or `OPENAI_API_KEY`/`GROQ_API_KEY`). Ollama needs none.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn ChatBackend>, ProviderError> {
    let provider = config.agent.provider.to_ascii_lowercase();
    let section = config
        .providers
        .get(&provider)
        .ok_or_else(|| ProviderError::NotConfigured(format!("unknown provider '{provider}'")))?;
    let model = config.effective_model();
    let timeout = Duration::from_secs(config.providers.request_timeout_secs);

    let backend: Arc<dyn ChatBackend> = match provider.as_str() {
        "openai" | "groq" => {
            let api_key = section.resolved_api_key().ok_or_else(|| {
                ProviderError::NotConfigured(format!("{provider} requires an API key"))
            })?;
            let backend = if provider == "openai" {
                OpenAiCompatBackend::openai(api_key, model, timeout)?
            } else {
                OpenAiCompatBackend::groq(api_key, model, timeout)?
            };
            match &section.base_url {
                Some(url) => Arc::new(backend.with_base_url(url)),
                None => Arc::new(backend),
            }
        }
        _ => Arc::new(OllamaBackend::new(section.base_url.clone(), model, timeout)?),
    };

    info!(provider = backend.name(), model = backend.model(), "Chat backend selected");
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_selects_ollama() {
        let backend = build_from_config(&AppConfig::default()).unwrap();
        assert_eq!(backend.name(), "ollama");
        assert_eq!(backend.model(), crate::ollama::OLLAMA_DEFAULT_MODEL);
    }

    #[test]
    fn openai_without_key_is_not_configured() {
        let mut config = AppConfig::default();
        config.agent.provider = "openai".into();
        config.providers.openai.api_key = Some("env:AGENTIC_TEST_SURELY_UNSET_KEY".into());
        let err = build_from_config(&config).err().unwrap();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn groq_with_key_uses_configured_model() {
        let mut config = AppConfig::default();
        config.agent.provider = "Groq".into();
        config.providers.groq.api_key = Some("gsk-test".into());
        config.providers.groq.model = Some("llama-3.3-70b-versatile".into());
        let backend = build_from_config(&config).unwrap();
        assert_eq!(backend.name(), "groq");
        assert_eq!(backend.model(), "llama-3.3-70b-versatile");
    }

    #[test]
    fn agent_model_overrides_provider_default() {
        let mut config = AppConfig::default();
        config.agent.provider = "openai".into();
        config.agent.model = Some("gpt-4o".into());
        config.providers.openai.api_key = Some("sk-test".into());
        let backend = build_from_config(&config).unwrap();
        assert_eq!(backend.model(), "gpt-4o");
    }
}
