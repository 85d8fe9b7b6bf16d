use std::path::PathBuf;
use url::Url;
use crate::error::{EsignError, EsignResult};

/// Servidor de autenticação do ambiente demo da DocuSign
pub const DEFAULT_AUTH_SERVER: &str = "account-d.docusign.com";

/// Base da API REST do ambiente demo da DocuSign
pub const DEFAULT_BASE_PATH: &str = "https://demo.docusign.net/restapi";

/// Configuração da integração com a DocuSign.
///
/// A crate não lê variáveis de ambiente: quem chama monta esta estrutura
/// (o binário faz isso a partir do `Settings`).
#[derive(Debug, Clone, PartialEq)]
pub struct EsignConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Host do servidor OAuth (`account-d.docusign.com`) ou URL completa com esquema
    pub auth_server: String,
    pub account_id: String,
    pub base_path: String,
    pub token_path: PathBuf,
}

impl EsignConfig {
    /// Valida se todas as configurações obrigatórias estão presentes
    pub fn validate(&self) -> EsignResult<()> {
        if self.client_id.trim().is_empty() {
            return Err(EsignError::config_error("client_id é obrigatório"));
        }

        if self.client_secret.trim().is_empty() {
            return Err(EsignError::config_error("client_secret é obrigatório"));
        }

        if self.auth_server.trim().is_empty() {
            return Err(EsignError::config_error("auth_server é obrigatório"));
        }

        if self.account_id.trim().is_empty() {
            return Err(EsignError::config_error("account_id é obrigatório"));
        }

        if !self.redirect_uri.starts_with("http://") && !self.redirect_uri.starts_with("https://") {
            return Err(EsignError::config_error(format!(
                "redirect_uri deve ser uma URL válida: {}",
                self.redirect_uri
            )));
        }

        if self.token_path.as_os_str().is_empty() {
            return Err(EsignError::config_error("token_path é obrigatório"));
        }

        Ok(())
    }

    /// URL base do servidor OAuth, sem barra final
    pub fn auth_base_url(&self) -> String {
        let server = self.auth_server.trim().trim_end_matches('/');
        if server.contains("://") {
            server.to_string()
        } else {
            format!("https://{}", server)
        }
    }

    /// Endpoint de troca/renovação de token
    pub fn token_url(&self) -> String {
        format!("{}/oauth/token", self.auth_base_url())
    }

    /// Endpoint de consentimento (authorization endpoint)
    pub fn authorize_url(&self) -> String {
        format!("{}/oauth/auth", self.auth_base_url())
    }

    /// Porta e caminho em que o callback OAuth chega, extraídos da redirect URI
    pub fn callback_binding(&self) -> EsignResult<(u16, String)> {
        let url = Url::parse(&self.redirect_uri)?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| EsignError::config_error("redirect_uri sem porta"))?;
        let path = url.path().trim_matches('/').to_string();
        Ok((port, path))
    }
}
