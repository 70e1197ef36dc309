//! Configuración cargada a partir de `movilizaciones.toml`.
//!
//! La struct [`AppConfig`] contiene todos los parámetros configurables.
//! Valores no presentes en el archivo usan defaults razonables.
//! Las variables de entorno `MOVILIZACIONES_API_URL` y `MOVILIZACIONES_TOKEN`
//! tienen precedencia sobre el archivo; las flags de la CLI, sobre ambas.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::api::DEFAULT_API_URL;
use crate::error::AppError;

pub const CONFIG_FILE: &str = "movilizaciones.toml";
pub const ENV_API_URL: &str = "MOVILIZACIONES_API_URL";
pub const ENV_TOKEN: &str = "MOVILIZACIONES_TOKEN";

/// Configuración de nivel superior.
#[derive(Clone, Deserialize)]
pub struct AppConfig {
    /// URL base del backend, p. ej. `http://localhost:3000/api`.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Token de sesión emitido por el backend al iniciar sesión.
    #[serde(default)]
    pub token: String,

    /// Tiempo máximo por petición, en segundos.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Nivel de registro cuando no hay `RUST_LOG` ni `--verbose`.
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

// 30 segundos por petición.
fn default_timeout_secs() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: String::new(),
            timeout_secs: default_timeout_secs(),
            log_level: None,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_url", &self.api_url)
            .field("token", &if self.token.is_empty() { "<unset>" } else { "<redacted>" })
            .field("timeout_secs", &self.timeout_secs)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl AppConfig {
    /// Carga `movilizaciones.toml` del directorio actual y aplica el entorno.
    pub fn load() -> Result<Self, AppError> {
        let mut config = Self::load_from(Path::new(CONFIG_FILE))?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Lee un archivo concreto; si no existe, usa los valores por defecto.
    pub fn load_from(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str::<AppConfig>(&contents)?;
        if config.timeout_secs == 0 {
            return Err(AppError::Config("timeout_secs must be greater than zero".into()));
        }
        Ok(config)
    }

    /// Sobrescribe con variables de entorno no vacías.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_url = url;
        }
        if let Some(token) = lookup(ENV_TOKEN).filter(|v| !v.trim().is_empty()) {
            self.token = token;
        }
    }

    /// Sobrescribe con las flags globales de la CLI.
    pub fn apply_cli(&mut self, api_url: Option<&str>, token: Option<&str>) {
        if let Some(url) = api_url {
            self.api_url = url.to_string();
        }
        if let Some(token) = token {
            self.token = token.to_string();
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let config = AppConfig::default();
        assert_eq!(config.api_url, "http://localhost:3000/api");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.token.is_empty());
        assert!(config.log_level.is_none());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            api_url = "https://arcg.example/api"
            log_level = "info"
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_url, "https://arcg.example/api");
        assert_eq!(config.log_level.as_deref(), Some("info"));
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn load_from_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn load_from_reads_file_and_rejects_zero_timeout() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeout_secs = 5").unwrap();
        assert_eq!(AppConfig::load_from(file.path()).unwrap().timeout_secs, 5);

        let mut zero = tempfile::NamedTempFile::new().unwrap();
        writeln!(zero, "timeout_secs = 0").unwrap();
        assert!(matches!(
            AppConfig::load_from(zero.path()),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn invalid_toml_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_url = ").unwrap();
        assert!(matches!(AppConfig::load_from(file.path()), Err(AppError::Toml(_))));
    }

    #[test]
    fn env_then_cli_precedence() {
        let mut config = AppConfig::default();
        config.apply_env(|key| match key {
            ENV_API_URL => Some("http://env/api".into()),
            ENV_TOKEN => Some("".into()),
            _ => None,
        });
        assert_eq!(config.api_url, "http://env/api");
        assert!(config.token.is_empty());

        config.apply_cli(Some("http://flag/api"), Some("a.b.c"));
        assert_eq!(config.api_url, "http://flag/api");
        assert_eq!(config.token, "a.b.c");
    }

    #[test]
    fn debug_never_shows_token() {
        let config = AppConfig {
            token: "secret.token.value".into(),
            ..Default::default()
        };
        assert!(!format!("{config:?}").contains("secret"));
    }
}
