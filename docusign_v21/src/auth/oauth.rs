use std::time::Duration;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use url::Url;
use crate::auth::token::{TokenRecord, TokenResponse, TokenStore};
use crate::config::EsignConfig;
use crate::error::{EsignError, EsignResult};

/// Escopos pedidos no consentimento
pub const CONSENT_SCOPE: &str = "signature impersonation";

/// Tipo de grant enviado ao endpoint de token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grant {
    AuthorizationCode,
    RefreshToken,
}

impl Grant {
    fn as_str(&self) -> &'static str {
        match self {
            Grant::AuthorizationCode => "authorization_code",
            Grant::RefreshToken => "refresh_token",
        }
    }

    fn failure(&self, msg: String) -> EsignError {
        match self {
            Grant::AuthorizationCode => EsignError::AuthExchange(msg),
            Grant::RefreshToken => EsignError::TokenRefresh(msg),
        }
    }
}

/// Ciclo de vida do token OAuth2 (authorization code grant) da DocuSign.
///
/// Toda operação que gera um token novo (troca ou refresh) grava o token
/// no disco antes de devolvê-lo.
#[derive(Debug, Clone)]
pub struct AuthManager {
    config: EsignConfig,
    http_client: Client,
    store: TokenStore,
}

impl AuthManager {
    /// Cria o gerenciador a partir de uma configuração já carregada
    pub fn new(config: EsignConfig) -> EsignResult<Self> {
        config.validate()?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        let store = TokenStore::new(config.token_path.clone());

        Ok(Self {
            config,
            http_client,
            store,
        })
    }

    pub fn config(&self) -> &EsignConfig {
        &self.config
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// URL de consentimento para onde o operador é enviado
    pub fn consent_url(&self) -> EsignResult<Url> {
        let url = format!(
            "{}?response_type=code&scope={}&client_id={}&redirect_uri={}",
            self.config.authorize_url(),
            urlencoding::encode(CONSENT_SCOPE),
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
        );

        Ok(Url::parse(&url)?)
    }

    /// Troca o código de autorização por um token e o persiste
    pub async fn exchange_code(&self, code: &str) -> EsignResult<TokenRecord> {
        log::info!("🔄 Trocando código de autorização por token...");

        let params = [
            ("grant_type", Grant::AuthorizationCode.as_str()),
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let response = self.request_token(Grant::AuthorizationCode, &params).await?;
        let record = response.into_record(Utc::now(), None);
        self.store.persist(&record)?;

        log::info!("✅ Token de acesso obtido com sucesso");
        Ok(record)
    }

    /// Renova o token com o refresh token e persiste o resultado
    pub async fn refresh(&self, refresh_token: &str) -> EsignResult<TokenRecord> {
        log::info!("🔄 Renovando token de acesso...");

        if refresh_token.is_empty() {
            return Err(EsignError::TokenRefresh("nenhum refresh token disponível".to_string()));
        }

        let params = [
            ("grant_type", Grant::RefreshToken.as_str()),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let response = self.request_token(Grant::RefreshToken, &params).await?;
        let record = response.into_record(Utc::now(), Some(refresh_token));
        self.store.persist(&record)?;

        log::info!("✅ Token renovado com sucesso");
        Ok(record)
    }

    async fn request_token(&self, grant: Grant, params: &[(&str, &str)]) -> EsignResult<TokenResponse> {
        let url = self.config.token_url();
        log::debug!("POST {} grant_type={}", url, grant.as_str());

        let response = self
            .http_client
            .post(&url)
            .form(params)
            .send()
            .await
            .map_err(|e| grant.failure(format!("falha ao conectar em {}: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| grant.failure(format!("falha ao ler resposta: {}", e)))?;

        if status != StatusCode::OK {
            log::error!("❌ POST {} retornou {}: {}", url, status, body);
            return Err(grant.failure(body));
        }

        serde_json::from_str(&body)
            .map_err(|e| grant.failure(format!("resposta de token inválida ({}): {}", e, body)))
    }

    /// Verifica se o token pode autorizar chamadas agora. `None` nunca é válido.
    pub fn is_valid(record: Option<&TokenRecord>) -> bool {
        record.map_or(false, |r| r.is_valid_at(Utc::now()))
    }

    pub fn persist(&self, record: &TokenRecord) -> EsignResult<()> {
        self.store.persist(record)
    }

    pub fn load(&self) -> EsignResult<Option<TokenRecord>> {
        self.store.load()
    }

    pub fn delete(&self) -> bool {
        self.store.delete()
    }

    /// Carrega o token salvo e só o devolve se ainda for válido
    pub fn restore_session(&self) -> EsignResult<Option<TokenRecord>> {
        let record = self.store.load()?;

        match record {
            Some(record) if Self::is_valid(Some(&record)) => {
                log::info!("🔑 Token existente carregado e válido");
                Ok(Some(record))
            }
            Some(_) => {
                log::info!("⌛ Token salvo expirado ou perto de expirar");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Devolve o próprio token se ainda for válido; senão faz o refresh
    pub async fn ensure_fresh(&self, record: &TokenRecord) -> EsignResult<TokenRecord> {
        if Self::is_valid(Some(record)) {
            return Ok(record.clone());
        }

        log::info!("⌛ Token perto de expirar, renovando...");
        self.refresh(&record.refresh_token).await
    }
}
