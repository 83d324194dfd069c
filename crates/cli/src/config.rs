use anyhow::{Context, Result};
use mathagent_llm::{DEFAULT_MODEL, GEMINI_OPENAI_BASE_URL};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Load `.env` from the working directory (or any parent), if present.
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// CLI configuration loaded from TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Model name sent with every request
    pub model: String,

    /// OpenAI-compatible base URL, including the version prefix
    pub base_url: String,

    /// API key stored in the config file (lowest priority)
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Maximum model round-trips per question
    pub max_iterations: usize,

    pub temperature: f32,

    pub max_tokens: u32,

    /// Per-request HTTP timeout in seconds; 0 disables it
    pub request_timeout_secs: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: GEMINI_OPENAI_BASE_URL.to_string(),
            api_key: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            max_iterations: 10,
            temperature: 0.0,
            max_tokens: 4096,
            request_timeout_secs: 120,
        }
    }
}

impl CliConfig {
    /// Return the default config file path: <config_dir>/mathagent/config.toml
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mathagent").join("config.toml"))
    }

    /// Load config from the given path, or the default path.
    ///
    /// A missing default file yields the built-in defaults; nothing is
    /// written. An explicitly given path must exist.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => match Self::default_config_path() {
                Some(p) if p.exists() => p,
                _ => {
                    debug!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        debug!(?config_path, "Loading config");
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config: {}", config_path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config: {}", config_path.display()))?;
        Ok(config)
    }

    /// Resolve the API key.
    /// Priority: cli_override > env var > config file.
    pub fn resolve_api_key(&self, cli_override: Option<&str>) -> Option<String> {
        if let Some(key) = cli_override {
            return Some(key.to_string());
        }
        if let Ok(key) = std::env::var(&self.api_key_env) {
            if !key.is_empty() {
                return Some(key);
            }
        }
        self.api_key.clone().filter(|k| !k.is_empty())
    }

    /// Resolve the model name. Priority: cli_override > config file.
    pub fn resolve_model(&self, cli_override: Option<&str>) -> String {
        cli_override.unwrap_or(&self.model).to_string()
    }

    /// Resolve the base URL. Priority: cli_override > config file.
    pub fn resolve_base_url(&self, cli_override: Option<&str>) -> String {
        cli_override.unwrap_or(&self.base_url).to_string()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "model = \"gpt-4o\"").unwrap();
        writeln!(file, "base_url = \"https://api.openai.com/v1\"").unwrap();
        writeln!(file, "request_timeout_secs = 0").unwrap();

        let config = CliConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(CliConfig::load(path.to_str()).is_err());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_iterations = \"many\"").unwrap();
        let err = CliConfig::load(file.path().to_str()).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to parse config"));
    }

    #[test]
    fn test_resolve_overrides() {
        let config = CliConfig::default();
        assert_eq!(config.resolve_model(None), "gemini-2.0-flash");
        assert_eq!(config.resolve_model(Some("gemini-2.5-pro")), "gemini-2.5-pro");
        assert_eq!(
            config.resolve_base_url(Some("http://localhost:8000/v1")),
            "http://localhost:8000/v1"
        );
    }

    #[test]
    fn test_resolve_api_key_priority() {
        let mut config = CliConfig {
            api_key_env: "MATHAGENT_TEST_KEY_NEVER_SET".to_string(),
            ..CliConfig::default()
        };
        assert_eq!(config.resolve_api_key(None), None);

        config.api_key = Some("file-key".to_string());
        assert_eq!(config.resolve_api_key(None), Some("file-key".to_string()));

        std::env::set_var("MATHAGENT_TEST_KEY_FROM_ENV", "env-key");
        config.api_key_env = "MATHAGENT_TEST_KEY_FROM_ENV".to_string();
        assert_eq!(config.resolve_api_key(None), Some("env-key".to_string()));

        assert_eq!(
            config.resolve_api_key(Some("cli-key")),
            Some("cli-key".to_string())
        );
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = CliConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: CliConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.base_url, config.base_url);
    }
}
