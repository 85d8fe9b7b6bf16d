//! # DocuSign eSignature v2.1
//!
//! Integração mínima com a DocuSign usada pelo envio de pedidos.
//!
//! ## Features
//!
//! - Autenticação OAuth2 (authorization code grant + refresh)
//! - Token persistido em um único arquivo local
//! - Servidor local para capturar o redirect do consentimento
//! - Cliente HTTP assíncrono para envelopes e campos de geração de documento
//!
//! ## Exemplo
//!
//! ```no_run
//! use docusign_v21::{AuthManager, EsignClient, EsignConfig};
//!
//! # async fn run(config: EsignConfig) -> Result<(), docusign_v21::EsignError> {
//! let auth = AuthManager::new(config.clone())?;
//! let token = auth.exchange_code("codigo-do-redirect").await?;
//! let client = EsignClient::new(&token.access_token, &config.base_path, &config.account_id)?;
//! let documents = client.list_envelope_documents("envelope-id").await?;
//! println!("{} documentos", documents.envelope_documents.len());
//! # Ok(())
//! # }
//! ```

/// Módulo de autenticação OAuth2
pub mod auth;

/// Módulo de cliente API
pub mod client;

/// Módulo de configuração
pub mod config;

/// Módulo de tratamento de erros
pub mod error;

// Re-exportações para conveniência
pub use auth::{AuthManager, CallbackServer, TokenRecord, TokenStore};
pub use client::EsignClient;
pub use config::EsignConfig;
pub use error::{EsignError, EsignResult};
