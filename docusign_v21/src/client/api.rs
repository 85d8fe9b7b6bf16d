use std::time::Duration;
use reqwest::{Client, Method, header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE}};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use crate::client::models::{
    DocGenFormFieldRequest, DocGenFormFieldResponse, EnvelopeDefinition,
    EnvelopeDocumentsResult, EnvelopeSummary,
};
use crate::error::{EsignError, EsignResult};

/// `/v2.1/accounts/{account}/envelopes`
pub fn envelopes_path(account_id: &str) -> String {
    format!("/v2.1/accounts/{}/envelopes", account_id)
}

/// `/v2.1/accounts/{account}/envelopes/{envelope}`
pub fn envelope_path(account_id: &str, envelope_id: &str) -> String {
    format!("{}/{}", envelopes_path(account_id), envelope_id)
}

/// `/v2.1/accounts/{account}/envelopes/{envelope}/docGenFormFields`
pub fn doc_gen_form_fields_path(account_id: &str, envelope_id: &str) -> String {
    format!("{}/docGenFormFields", envelope_path(account_id, envelope_id))
}

/// `/v2.1/accounts/{account}/envelopes/{envelope}/documents`
pub fn envelope_documents_path(account_id: &str, envelope_id: &str) -> String {
    format!("{}/documents", envelope_path(account_id, envelope_id))
}

/// Cliente HTTP para a API eSignature v2.1, autenticado com bearer token
#[derive(Debug, Clone)]
pub struct EsignClient {
    client: Client,
    base_url: String,
    account_id: String,
}

impl EsignClient {
    /// Cria um novo cliente para uma conta
    pub fn new(access_token: &str, base_url: &str, account_id: &str) -> EsignResult<Self> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", access_token))
            .map_err(|e| EsignError::config_error(format!("Token com caracteres inválidos: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            account_id: account_id.to_string(),
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Constrói URL completa para um endpoint
    fn build_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Executa a requisição e converte respostas não-2xx em `EsignError::Api`
    async fn send<B, T>(&self, method: Method, endpoint: &str, body: Option<&B>) -> EsignResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.build_url(endpoint);
        log::debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let response_text = response.text().await?;

        log::debug!("Response status: {}, body: {}", status, response_text);

        if !status.is_success() {
            return Err(EsignError::api_error(
                method.as_str(),
                endpoint,
                status.as_u16(),
                response_text,
            ));
        }

        if response_text.trim().is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }

        Ok(serde_json::from_str(&response_text)?)
    }

    /// Cria um envelope a partir de um template (rascunho ou envio direto)
    pub async fn create_envelope(&self, definition: &EnvelopeDefinition) -> EsignResult<EnvelopeSummary> {
        let endpoint = envelopes_path(&self.account_id);
        self.send(Method::POST, &endpoint, Some(definition)).await
    }

    /// Atualiza um envelope existente (por exemplo, `created` → `sent`)
    pub async fn update_envelope(
        &self,
        envelope_id: &str,
        definition: &EnvelopeDefinition,
    ) -> EsignResult<EnvelopeSummary> {
        let endpoint = envelope_path(&self.account_id, envelope_id);
        self.send(Method::PUT, &endpoint, Some(definition)).await
    }

    /// Lê os campos de geração de documento do envelope
    pub async fn get_doc_gen_form_fields(&self, envelope_id: &str) -> EsignResult<DocGenFormFieldResponse> {
        let endpoint = doc_gen_form_fields_path(&self.account_id, envelope_id);
        self.send::<(), _>(Method::GET, &endpoint, None).await
    }

    /// Substitui os campos de geração de documento do envelope
    pub async fn update_doc_gen_form_fields(
        &self,
        envelope_id: &str,
        request: &DocGenFormFieldRequest,
    ) -> EsignResult<Value> {
        let endpoint = doc_gen_form_fields_path(&self.account_id, envelope_id);
        self.send(Method::PUT, &endpoint, Some(request)).await
    }

    /// Lista os documentos do envelope
    pub async fn list_envelope_documents(&self, envelope_id: &str) -> EsignResult<EnvelopeDocumentsResult> {
        let endpoint = envelope_documents_path(&self.account_id, envelope_id);
        self.send::<(), _>(Method::GET, &endpoint, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(envelopes_path("acc"), "/v2.1/accounts/acc/envelopes");
        assert_eq!(envelope_path("acc", "env"), "/v2.1/accounts/acc/envelopes/env");
        assert_eq!(
            doc_gen_form_fields_path("acc", "env"),
            "/v2.1/accounts/acc/envelopes/env/docGenFormFields"
        );
        assert_eq!(
            envelope_documents_path("acc", "env"),
            "/v2.1/accounts/acc/envelopes/env/documents"
        );
    }

    #[test]
    fn test_url_building() {
        let client = EsignClient::new("token", "https://demo.docusign.net/restapi/", "acc").unwrap();
        assert_eq!(client.base_url(), "https://demo.docusign.net/restapi");
        assert_eq!(
            client.build_url("/v2.1/accounts/acc/envelopes"),
            "https://demo.docusign.net/restapi/v2.1/accounts/acc/envelopes"
        );
    }

    #[test]
    fn test_rejects_token_with_newline() {
        assert!(EsignClient::new("bad\ntoken", "https://demo.docusign.net/restapi", "acc").is_err());
    }
}
