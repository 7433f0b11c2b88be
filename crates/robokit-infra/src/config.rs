//! Service configuration loader for Robokit.
//!
//! Reads `config.toml` from the given directory and deserializes it into
//! [`ServiceConfig`]. Falls back to defaults when the file is missing or
//! malformed. The provider API key comes from the process environment only
//! and is never written to disk.

use std::path::Path;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Environment variables checked for the provider API key, in order.
const API_KEY_VARS: [&str; 2] = ["ROBOKIT_API_KEY", "OPENAI_API_KEY"];

/// Service-level configuration from `config.toml`.
///
/// Every field has a default, so a partial file is fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: String,
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Text-only chat model.
    pub text_model: String,
    /// Vision-capable chat model.
    pub vision_model: String,
    /// Primary image generation model.
    pub image_model_primary: String,
    /// Fallback image generation model.
    pub image_model_secondary: String,
    /// Run the concept-image refinement pass.
    pub refine_images: bool,
    /// Run the OBJ 3D-model generator.
    pub enable_3d_model: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            text_model: "gpt-4o-mini".to_string(),
            vision_model: "gpt-4o".to_string(),
            image_model_primary: "gpt-image-1".to_string(),
            image_model_secondary: "dall-e-3".to_string(),
            refine_images: false,
            enable_3d_model: false,
        }
    }
}

/// Load service configuration from `{dir}/config.toml`.
///
/// - If the file does not exist, returns [`ServiceConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_service_config(dir: &Path) -> ServiceConfig {
    let config_path = dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ServiceConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ServiceConfig::default();
        }
    };

    match toml::from_str::<ServiceConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ServiceConfig::default()
        }
    }
}

/// Resolve the provider API key from the environment.
///
/// Checks `ROBOKIT_API_KEY` first, then `OPENAI_API_KEY`.
pub fn resolve_api_key() -> Result<SecretString, ConfigError> {
    for var in API_KEY_VARS {
        match std::env::var(var) {
            Ok(val) if !val.trim().is_empty() => return Ok(SecretString::from(val)),
            _ => continue,
        }
    }
    Err(ConfigError::MissingApiKey)
}

/// Configuration resolution errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no provider API key found: set ROBOKIT_API_KEY or OPENAI_API_KEY")]
    MissingApiKey,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_service_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_service_config(tmp.path()).await;
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.text_model, "gpt-4o-mini");
        assert!(!config.refine_images);
        assert!(!config.enable_3d_model);
    }

    #[tokio::test]
    async fn load_service_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        tokio::fs::write(
            &config_path,
            r#"
bind_addr = "127.0.0.1:9000"
text_model = "gpt-4.1-mini"
enable_3d_model = true
"#,
        )
        .await
        .unwrap();

        let config = load_service_config(tmp.path()).await;
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.text_model, "gpt-4.1-mini");
        assert!(config.enable_3d_model);
        // unset fields keep their defaults
        assert_eq!(config.vision_model, "gpt-4o");
        assert_eq!(config.image_model_secondary, "dall-e-3");
    }

    #[tokio::test]
    async fn load_service_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        tokio::fs::write(&config_path, "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_service_config(tmp.path()).await;
        assert_eq!(config.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn resolve_api_key_prefers_robokit_var() {
        use secrecy::ExposeSecret;

        // SAFETY: env mutation is process-global; the vars are set and
        // removed within this single test.
        unsafe {
            std::env::set_var("ROBOKIT_API_KEY", "rk-key");
            std::env::set_var("OPENAI_API_KEY", "oa-key");
        }

        let key = resolve_api_key().unwrap();
        assert_eq!(key.expose_secret(), "rk-key");

        // SAFETY: removing the vars set above.
        unsafe {
            std::env::remove_var("ROBOKIT_API_KEY");
            std::env::remove_var("OPENAI_API_KEY");
        }
    }
}
