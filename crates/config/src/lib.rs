//! Configuration loading, validation, and management for agentic.
//!
//! Loads configuration from `~/.agentic/config.toml` (or an explicit path)
//! with environment variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Providers the runtime knows how to construct.
pub const KNOWN_PROVIDERS: &[&str] = &["openai", "groq", "ollama"];

/// Conversation store backends the runtime knows how to construct.
pub const KNOWN_MEMORY_BACKENDS: &[&str] = &["file", "sqlite", "memory", "none"];

/// The root configuration structure.
///
/// Maps directly to `~/.agentic/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Decision loop settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Per-provider connection settings
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Conversation store settings
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Built-in tool settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// HTTP gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Which chat backend to use: openai, groq or ollama
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model override; falls back to the provider section, then the
    /// provider's built-in default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Upper bound on model calls per task
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    /// Fixed system prompt sent with every model call
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// How many stored turns seed each run
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,

    /// Also store tool turns, between the user and assistant turns
    #[serde(default)]
    pub persist_tool_turns: bool,
}

fn default_provider() -> String {
    "ollama".into()
}
fn default_max_steps() -> u32 {
    8
}
fn default_system_prompt() -> String {
    "You are a tool-using assistant.".into()
}
fn default_history_turns() -> usize {
    20
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            max_steps: default_max_steps(),
            system_prompt: default_system_prompt(),
            history_turns: default_history_turns(),
            persist_tool_turns: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// HTTP timeout for a single completion request
    #[serde(default = "default_provider_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub openai: ProviderConfig,

    #[serde(default)]
    pub groq: ProviderConfig,

    #[serde(default)]
    pub ollama: ProviderConfig,
}

fn default_provider_timeout() -> u64 {
    120
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_provider_timeout(),
            openai: ProviderConfig::default(),
            groq: ProviderConfig::default(),
            ollama: ProviderConfig::default(),
        }
    }
}

impl ProvidersConfig {
    /// The section for a provider name, if it is one we know.
    pub fn get(&self, provider: &str) -> Option<&ProviderConfig> {
        match provider.to_ascii_lowercase().as_str() {
            "openai" => Some(&self.openai),
            "groq" => Some(&self.groq),
            "ollama" => Some(&self.ollama),
            _ => None,
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key, or `env:NAME` to read it from the environment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL (OpenAI/Groq) or host (Ollama)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ProviderConfig {
    /// The API key with any `env:NAME` indirection resolved.
    pub fn resolved_api_key(&self) -> Option<String> {
        resolve_secret(self.api_key.as_deref(), |name| std::env::var(name).ok())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// file, sqlite, memory or none
    #[serde(default = "default_memory_backend")]
    pub backend: String,

    /// Where file logs and the SQLite database live
    #[serde(default = "default_memory_directory")]
    pub directory: PathBuf,
}

fn default_memory_backend() -> String {
    "file".into()
}
fn default_memory_directory() -> PathBuf {
    PathBuf::from("data/memory")
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: default_memory_backend(),
            directory: default_memory_directory(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Root directory for file-producing tools
    #[serde(default = "default_workspace")]
    pub workspace: PathBuf,

    /// SerpAPI key; `web_search` is only registered when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serpapi_key: Option<String>,

    /// Chroma MCP endpoint; `chroma_rag` is only registered when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chroma_mcp_url: Option<String>,

    /// HTTP timeout for tools that call out to the network
    #[serde(default = "default_tool_timeout")]
    pub request_timeout_secs: u64,
}

fn default_workspace() -> PathBuf {
    PathBuf::from("workspace")
}
fn default_tool_timeout() -> u64 {
    30
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            workspace: default_workspace(),
            serpapi_key: None,
            chroma_mcp_url: None,
            request_timeout_secs: default_tool_timeout(),
        }
    }
}

impl ToolsConfig {
    pub fn resolved_serpapi_key(&self) -> Option<String> {
        resolve_secret(self.serpapi_key.as_deref(), |name| std::env::var(name).ok())
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token required on `/v1` routes when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8080
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_token: None,
        }
    }
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl std::fmt::Debug for ToolsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolsConfig")
            .field("workspace", &self.workspace)
            .field("serpapi_key", &redact(&self.serpapi_key))
            .field("chroma_mcp_url", &self.chroma_mcp_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_token", &redact(&self.api_token))
            .finish()
    }
}

/// Resolve a configured secret. `env:NAME` reads `NAME` through `lookup`;
/// anything else is returned as-is. Blank values count as unset.
pub fn resolve_secret<F>(raw: Option<&str>, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = raw?.trim();
    let value = match raw.strip_prefix("env:") {
        Some(name) => lookup(name.trim())?,
        None => raw.to_string(),
    };
    (!value.trim().is_empty()).then_some(value)
}

impl AppConfig {
    /// Load configuration from the default path (~/.agentic/config.toml),
    /// then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_overrides(&Self::config_dir().join("config.toml"))
    }

    /// Load from `path`, then apply environment overrides and validate.
    pub fn load_with_overrides(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Environment variable overrides (highest priority):
    /// - `AGENTIC_PROVIDER`, `AGENTIC_MODEL`, `AGENTIC_MAX_STEPS`
    /// - `OPENAI_API_KEY`, `GROQ_API_KEY` when the section has no key
    /// - `SERPAPI_KEY` when no SerpAPI key is configured
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup("AGENTIC_PROVIDER") {
            self.agent.provider = provider.to_ascii_lowercase();
        }
        if let Some(model) = lookup("AGENTIC_MODEL") {
            self.agent.model = Some(model);
        }
        if let Some(steps) = lookup("AGENTIC_MAX_STEPS") {
            match steps.parse() {
                Ok(steps) => self.agent.max_steps = steps,
                Err(_) => tracing::warn!(value = %steps, "Ignoring non-numeric AGENTIC_MAX_STEPS"),
            }
        }
        if self.providers.openai.api_key.is_none() {
            self.providers.openai.api_key = lookup("OPENAI_API_KEY");
        }
        if self.providers.groq.api_key.is_none() {
            self.providers.groq.api_key = lookup("GROQ_API_KEY");
        }
        if self.tools.serpapi_key.is_none() {
            self.tools.serpapi_key = lookup("SERPAPI_KEY");
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".agentic")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.max_steps == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_steps must be at least 1".into(),
            ));
        }

        let provider = self.agent.provider.to_ascii_lowercase();
        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "unknown provider '{}', expected one of: {}",
                self.agent.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        let backend = self.memory.backend.to_ascii_lowercase();
        if !KNOWN_MEMORY_BACKENDS.contains(&backend.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "unknown memory backend '{}', expected one of: {}",
                self.memory.backend,
                KNOWN_MEMORY_BACKENDS.join(", ")
            )));
        }

        if self.gateway.port == 0 {
            return Err(ConfigError::ValidationError(
                "gateway.port must be non-zero".into(),
            ));
        }

        Ok(())
    }

    /// The model to request: `[agent].model`, then the active provider's
    /// section. `None` means the provider's built-in default.
    pub fn effective_model(&self) -> Option<String> {
        self.agent.model.clone().or_else(|| {
            self.providers
                .get(&self.agent.provider)
                .and_then(|p| p.model.clone())
        })
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.agent.provider, "ollama");
        assert_eq!(config.agent.max_steps, 8);
        assert_eq!(config.agent.history_turns, 20);
        assert_eq!(config.agent.system_prompt, "You are a tool-using assistant.");
        assert!(!config.agent.persist_tool_turns);
        assert_eq!(config.memory.backend, "file");
        assert_eq!(config.memory.directory, PathBuf::from("data/memory"));
        assert_eq!(config.tools.workspace, PathBuf::from("workspace"));
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.agent.provider, config.agent.provider);
        assert_eq!(parsed.gateway.port, config.gateway.port);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let toml_str = r#"
[agent]
provider = "groq"
max_steps = 3

[providers.groq]
api_key = "env:MY_GROQ"
model = "llama-3.3-70b-versatile"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.agent.provider, "groq");
        assert_eq!(config.agent.max_steps, 3);
        assert_eq!(config.agent.history_turns, 20);
        assert_eq!(
            config.effective_model().as_deref(),
            Some("llama-3.3-70b-versatile")
        );
        assert_eq!(config.memory.backend, "file");
    }

    #[test]
    fn agent_model_beats_provider_model() {
        let mut config = AppConfig::default();
        config.providers.ollama.model = Some("qwen2.5".into());
        assert_eq!(config.effective_model().as_deref(), Some("qwen2.5"));
        config.agent.model = Some("llama3.2".into());
        assert_eq!(config.effective_model().as_deref(), Some("llama3.2"));
    }

    #[test]
    fn zero_steps_rejected() {
        let mut config = AppConfig::default();
        config.agent.max_steps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_provider_rejected() {
        let mut config = AppConfig::default();
        config.agent.provider = "anthropic".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("anthropic"));
    }

    #[test]
    fn unknown_memory_backend_rejected() {
        let mut config = AppConfig::default();
        config.memory.backend = "redis".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.agent.provider, "ollama");
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[gateway]\nport = 9999\n").unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.gateway.port, 9999);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[agent\nprovider = ").unwrap();
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(env(&[
            ("AGENTIC_PROVIDER", "OpenAI"),
            ("AGENTIC_MODEL", "gpt-4o"),
            ("AGENTIC_MAX_STEPS", "4"),
            ("OPENAI_API_KEY", "sk-test"),
            ("SERPAPI_KEY", "serp"),
        ]));
        assert_eq!(config.agent.provider, "openai");
        assert_eq!(config.agent.model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.agent.max_steps, 4);
        assert_eq!(config.providers.openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.tools.serpapi_key.as_deref(), Some("serp"));
        assert!(config.providers.groq.api_key.is_none());
    }

    #[test]
    fn env_does_not_override_configured_keys() {
        let mut config = AppConfig::default();
        config.providers.openai.api_key = Some("from-file".into());
        config.apply_env_overrides(env(&[("OPENAI_API_KEY", "from-env")]));
        assert_eq!(config.providers.openai.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn bad_max_steps_env_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(env(&[("AGENTIC_MAX_STEPS", "lots")]));
        assert_eq!(config.agent.max_steps, 8);
    }

    #[test]
    fn secrets_resolve_env_indirection() {
        let lookup = env(&[("MY_KEY", "abc123")]);
        assert_eq!(resolve_secret(Some("env:MY_KEY"), &lookup).as_deref(), Some("abc123"));
        assert_eq!(resolve_secret(Some("literal"), &lookup).as_deref(), Some("literal"));
        assert_eq!(resolve_secret(Some("env:MISSING"), &lookup), None);
        assert_eq!(resolve_secret(Some("  "), &lookup), None);
        assert_eq!(resolve_secret(None, &lookup), None);
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut config = AppConfig::default();
        config.providers.openai.api_key = Some("sk-secret".into());
        config.gateway.api_token = Some("tok-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(!debug.contains("tok-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("ollama"));
        assert!(toml_str.contains("max_steps = 8"));
    }
}
