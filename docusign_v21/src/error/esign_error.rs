use thiserror::Error;

/// Tipos de erro da integração com a DocuSign (OAuth2, armazenamento de token e API REST)
#[derive(Error, Debug)]
pub enum EsignError {
    #[error("Falha na troca do código de autorização: {0}")]
    AuthExchange(String),

    #[error("Falha ao renovar o token: {0}")]
    TokenRefresh(String),

    #[error("Arquivo de token corrompido ({path}): {reason}")]
    TokenStoreCorrupt { path: String, reason: String },

    #[error("Erro da API DocuSign em {method} {endpoint} (status {status}): {body}")]
    Api {
        method: String,
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Erro de rede: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Erro de parsing de URL: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro de serialização: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuração inválida: {0}")]
    Config(String),

    #[error("Erro do servidor de callback: {0}")]
    Callback(String),

    #[error("Acesso negado pelo usuário")]
    AccessDenied,

    #[error("Timeout durante autenticação")]
    Timeout,
}

impl EsignError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn callback_error(msg: impl Into<String>) -> Self {
        Self::Callback(msg.into())
    }

    pub fn api_error(
        method: impl Into<String>,
        endpoint: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        Self::Api {
            method: method.into(),
            endpoint: endpoint.into(),
            status,
            body: body.into(),
        }
    }

    pub fn corrupt_store(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TokenStoreCorrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Status HTTP retornado pela DocuSign, quando o erro veio de uma resposta da API
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Indica se o erro invalida a sessão autenticada (troca ou refresh rejeitados)
    pub fn revokes_authentication(&self) -> bool {
        matches!(self, Self::AuthExchange(_) | Self::TokenRefresh(_))
            || matches!(self.status(), Some(401))
    }
}

/// Tipo de resultado padrão para operações da crate
pub type EsignResult<T> = Result<T, EsignError>;
