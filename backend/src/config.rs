//! Layered configuration loading using figment.
//!
//! Sources, highest priority first:
//! 1. `COURSEGEN_*` environment variables, `__` separating sections
//!    (`COURSEGEN_LLM__MODEL` -> `llm.model`)
//! 2. `OPENAI_API_KEY` / `OPENAI_API_BASE`
//! 3. `coursegen.toml` in the working directory
//! 4. Built-in defaults
//!
//! A `.env` file is loaded first when present. There is no built-in API key:
//! the server refuses to start without one.

use crate::pipeline::ModuleScope;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

const CONFIG_FILE: &str = "coursegen.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] figment::Error),

    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub pdf: PdfConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Open the form page in the default browser once the server is up.
    pub open_browser: bool,
    pub json_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            open_browser: true,
            json_limit_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Hosted model provider settings (OpenAI-compatible API).
#[derive(Clone, PartialEq, Deserialize, Serialize)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    /// Default chat model of new sessions.
    pub model: String,
    /// Models offered on the settings page.
    pub models: Vec<String>,
    pub image_model: String,
    pub speech_model: String,
    pub transcription_model: String,
    pub voice: String,
    pub timeout_secs: u64,
    /// List models at startup and exit if the provider rejects the key.
    pub verify_on_startup: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            models: vec![
                "gpt-3.5-turbo".to_string(),
                "gpt-4".to_string(),
                "gpt-4o".to_string(),
            ],
            image_model: "dall-e-3".to_string(),
            speech_model: "tts-1".to_string(),
            transcription_model: "whisper-1".to_string(),
            voice: "alloy".to_string(),
            timeout_secs: 120,
            verify_on_startup: true,
        }
    }
}

// Hand-written so the key never reaches a log line.
impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("models", &self.models)
            .field("image_model", &self.image_model)
            .field("speech_model", &self.speech_model)
            .field("transcription_model", &self.transcription_model)
            .field("voice", &self.voice)
            .field("timeout_secs", &self.timeout_secs)
            .field("verify_on_startup", &self.verify_on_startup)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StorageConfig {
    pub database_path: PathBuf,
    /// Directory holding generated images, audio and exported PDFs.
    pub resource_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("teaching_resources.db"),
            resource_dir: PathBuf::from("resource_files"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PdfConfig {
    pub fonts_dir: PathBuf,
    /// TTF family name, e.g. `NotoSansSC` for `NotoSansSC-Regular.ttf` etc.
    pub font_family: String,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            fonts_dir: PathBuf::from("./fonts"),
            font_family: "NotoSansSC".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub module_scope: ModuleScope,
}

impl AppConfig {
    /// Load `.env`, then every configuration source, then validate.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let config: AppConfig = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// The provider chain, exposed so tests can extract from it directly.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(
                Env::raw()
                    .only(&["OPENAI_API_KEY", "OPENAI_API_BASE"])
                    .map(|key| {
                        if key == "OPENAI_API_KEY" {
                            "llm.api_key".into()
                        } else {
                            "llm.base_url".into()
                        }
                    }),
            )
            .merge(Env::prefixed("COURSEGEN_").split("__"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.api_key.trim().is_empty() {
            return Err(invalid(
                "llm.api_key",
                "no API key configured; set OPENAI_API_KEY or COURSEGEN_LLM__API_KEY",
            ));
        }
        if self.llm.base_url.trim().is_empty() {
            return Err(invalid("llm.base_url", "must not be empty"));
        }
        if self.llm.model.trim().is_empty() {
            return Err(invalid("llm.model", "must not be empty"));
        }
        if self.server.port == 0 {
            return Err(invalid("server.port", "must not be 0"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_have_no_api_key() {
        let config = AppConfig::default();
        assert!(config.llm.api_key.is_empty());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.pipeline.module_scope, ModuleScope::All);
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_and_prefixed_env_are_layered() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                [llm]
                api_key = "from-file"
                model = "gpt-4"

                [pipeline]
                module_scope = "first_only"
                "#,
            )?;
            jail.set_env("COURSEGEN_LLM__MODEL", "gpt-4o");
            jail.set_env("COURSEGEN_SERVER__PORT", "9000");

            let config: AppConfig = AppConfig::figment().extract()?;
            assert_eq!(config.llm.model, "gpt-4o");
            assert_eq!(config.server.port, 9000);
            assert_eq!(config.pipeline.module_scope, ModuleScope::FirstOnly);
            assert_eq!(config.storage, StorageConfig::default());
            Ok(())
        });
    }

    #[test]
    fn openai_variables_fill_llm_section() {
        Jail::expect_with(|jail| {
            jail.set_env("OPENAI_API_KEY", "sk-test");
            jail.set_env("OPENAI_API_BASE", "http://localhost:9999/v1");

            let config: AppConfig = AppConfig::figment().extract()?;
            assert_eq!(config.llm.api_key, "sk-test");
            assert_eq!(config.llm.base_url, "http://localhost:9999/v1");
            assert!(config.validate().is_ok());
            Ok(())
        });
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let mut llm = LlmConfig::default();
        llm.api_key = "sk-secret".to_string();
        let rendered = format!("{llm:?}");
        assert!(!rendered.contains("sk-secret"));
    }
}
