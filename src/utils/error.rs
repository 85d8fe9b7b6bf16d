use std::fmt;
use docusign_v21::EsignError;
use thiserror::Error;

/// Etapas do envio de um pedido, na ordem em que são executadas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FulfillmentStep {
    CreateDraft,
    MergeFields,
    Send,
}

impl fmt::Display for FulfillmentStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FulfillmentStep::CreateDraft => "criação do rascunho",
            FulfillmentStep::MergeFields => "preenchimento dos campos",
            FulfillmentStep::Send => "envio do envelope",
        };
        write!(f, "{}", name)
    }
}

/// Contexto de uma chamada à DocuSign que falhou
#[derive(Debug, Clone, PartialEq)]
pub struct StepFailure {
    pub endpoint: String,
    pub request_summary: String,
    /// Texto de erro devolvido pelo provedor
    pub detail: String,
}

impl StepFailure {
    pub fn new(endpoint: impl Into<String>, request_summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            request_summary: request_summary.into(),
            detail: detail.into(),
        }
    }

    /// Usa o corpo da resposta quando o erro veio da API, senão a mensagem do erro
    pub fn from_esign(endpoint: impl Into<String>, request_summary: impl Into<String>, err: &EsignError) -> Self {
        let detail = match err {
            EsignError::Api { status, body, .. } => format!("status {}: {}", status, body),
            other => other.to_string(),
        };
        Self::new(endpoint, request_summary, detail)
    }
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.endpoint, self.request_summary, self.detail)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("DocuSign error: {0}")]
    Esign(#[from] EsignError),

    #[error("Envelope create error: {0}")]
    EnvelopeCreateError(StepFailure),

    #[error("Field fetch error: {0}")]
    FieldFetchError(StepFailure),

    #[error("Field update error: {0}")]
    FieldUpdateError(StepFailure),

    #[error("Envelope send error: {0}")]
    EnvelopeSendError(StepFailure),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Etapa do envio em que o erro aconteceu, se veio de uma delas
    pub fn step(&self) -> Option<FulfillmentStep> {
        match self {
            AppError::EnvelopeCreateError(_) => Some(FulfillmentStep::CreateDraft),
            AppError::FieldFetchError(_) | AppError::FieldUpdateError(_) => Some(FulfillmentStep::MergeFields),
            AppError::EnvelopeSendError(_) => Some(FulfillmentStep::Send),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&StepFailure> {
        match self {
            AppError::EnvelopeCreateError(f)
            | AppError::FieldFetchError(f)
            | AppError::FieldUpdateError(f)
            | AppError::EnvelopeSendError(f) => Some(f),
            _ => None,
        }
    }

    /// A autenticação salva deixou de valer e o operador precisa reconectar
    pub fn requires_reconnect(&self) -> bool {
        match self {
            AppError::Esign(e) => e.revokes_authentication(),
            other => other.failure().map_or(false, |f| f.detail.starts_with("status 401")),
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
