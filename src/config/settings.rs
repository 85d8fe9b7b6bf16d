use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use config::{Config, ConfigError, Environment, File};
use docusign_v21::config::{DEFAULT_AUTH_SERVER, DEFAULT_BASE_PATH};
use docusign_v21::EsignConfig;
use crate::utils::{AppError, AppResult};

pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8501/callback";
pub const DEFAULT_TOKEN_PATH: &str = "tokens/docusign_token.json";
pub const DEFAULT_LOG_DIRECTORY: &str = "logs";

/// Variáveis de ambiente diretas e a chave de configuração que cada uma sobrescreve
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("DOCUSIGN_CLIENT_ID", "docusign.client_id"),
    ("DOCUSIGN_CLIENT_SECRET", "docusign.client_secret"),
    ("DOCUSIGN_REDIRECT_URI", "docusign.redirect_uri"),
    ("DOCUSIGN_AUTH_SERVER", "docusign.auth_server"),
    ("DOCUSIGN_ACCOUNT_ID", "docusign.account_id"),
    ("DOCUSIGN_TEMPLATE_ID", "docusign.template_id"),
    ("DOCUSIGN_BASE_PATH", "docusign.base_path"),
    ("TOKEN_PATH", "storage.token_path"),
    ("LOG_DIRECTORY", "logging.directory"),
];

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    pub docusign: DocuSignSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DocuSignSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_server: String,
    pub account_id: String,
    pub template_id: String,
    pub base_path: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageSettings {
    pub token_path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingSettings {
    pub directory: PathBuf,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .set_default("docusign.client_id", "")?
            .set_default("docusign.client_secret", "")?
            .set_default("docusign.redirect_uri", DEFAULT_REDIRECT_URI)?
            .set_default("docusign.auth_server", DEFAULT_AUTH_SERVER)?
            .set_default("docusign.account_id", "")?
            .set_default("docusign.template_id", "")?
            .set_default("docusign.base_path", DEFAULT_BASE_PATH)?
            .set_default("storage.token_path", DEFAULT_TOKEN_PATH)?
            .set_default("logging.directory", DEFAULT_LOG_DIRECTORY)?
            // Arquivo de configuração base
            .add_source(File::with_name("config/default").required(false))
            // Arquivo específico do ambiente
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // ORDER_SENDER__DOCUSIGN__ACCOUNT_ID=...
            .add_source(Environment::with_prefix("ORDER_SENDER").separator("__"));

        for (var, key) in ENV_OVERRIDES {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_override(*key, value)?;
            }
        }

        builder.build()?.try_deserialize()
    }

    /// Garante que as credenciais e identificadores obrigatórios foram informados
    pub fn validate(&self) -> AppResult<()> {
        let required = [
            ("DOCUSIGN_CLIENT_ID", &self.docusign.client_id),
            ("DOCUSIGN_CLIENT_SECRET", &self.docusign.client_secret),
            ("DOCUSIGN_ACCOUNT_ID", &self.docusign.account_id),
            ("DOCUSIGN_TEMPLATE_ID", &self.docusign.template_id),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(AppError::ConfigError(format!(
                "Variáveis obrigatórias ausentes: {}",
                missing.join(", ")
            )));
        }

        let redirect = &self.docusign.redirect_uri;
        if !redirect.starts_with("http://") && !redirect.starts_with("https://") {
            return Err(AppError::ConfigError(format!("DOCUSIGN_REDIRECT_URI inválida: {}", redirect)));
        }

        Ok(())
    }

    /// Configuração da crate `docusign_v21`
    pub fn to_esign_config(&self) -> EsignConfig {
        EsignConfig {
            client_id: self.docusign.client_id.clone(),
            client_secret: self.docusign.client_secret.clone(),
            redirect_uri: self.docusign.redirect_uri.clone(),
            auth_server: self.docusign.auth_server.clone(),
            account_id: self.docusign.account_id.clone(),
            base_path: self.docusign.base_path.clone(),
            token_path: self.storage.token_path.clone(),
        }
    }
}
