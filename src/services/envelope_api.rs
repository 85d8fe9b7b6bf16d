//! Porta entre o fluxo de envio e a API REST da DocuSign.

use async_trait::async_trait;
use docusign_v21::client::api::{doc_gen_form_fields_path, envelope_documents_path, envelope_path, envelopes_path};
use docusign_v21::client::models::{
    DocGenFormFieldRequest, DocGenFormFieldResponse, EnvelopeDefinition, EnvelopeDocumentsResult,
    EnvelopeSummary,
};
use docusign_v21::{EsignClient, EsignResult};
use serde::Serialize;
use serde_json::Value;
use crate::utils::logging::log_api_call;

/// Operações de envelope usadas pelo envio de pedidos
#[async_trait]
pub trait EnvelopeApi: Send + Sync {
    async fn create_envelope(&self, definition: &EnvelopeDefinition) -> EsignResult<EnvelopeSummary>;

    async fn update_envelope(
        &self,
        envelope_id: &str,
        definition: &EnvelopeDefinition,
    ) -> EsignResult<EnvelopeSummary>;

    async fn get_doc_gen_form_fields(&self, envelope_id: &str) -> EsignResult<DocGenFormFieldResponse>;

    async fn update_doc_gen_form_fields(
        &self,
        envelope_id: &str,
        request: &DocGenFormFieldRequest,
    ) -> EsignResult<Value>;

    async fn list_envelope_documents(&self, envelope_id: &str) -> EsignResult<EnvelopeDocumentsResult>;
}

fn as_json<T: Serialize>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}

/// Registra a chamada (sucesso ou erro) e devolve o resultado intacto
fn logged<T: Serialize>(
    method: &str,
    endpoint: &str,
    request: Option<Value>,
    result: EsignResult<T>,
) -> EsignResult<T> {
    match &result {
        Ok(response) => log_api_call(method, endpoint, request.as_ref(), as_json(response).as_ref(), None),
        Err(e) => log_api_call(method, endpoint, request.as_ref(), None, Some(&e.to_string())),
    }
    result
}

#[async_trait]
impl EnvelopeApi for EsignClient {
    async fn create_envelope(&self, definition: &EnvelopeDefinition) -> EsignResult<EnvelopeSummary> {
        let endpoint = envelopes_path(self.account_id());
        let result = EsignClient::create_envelope(self, definition).await;
        logged("POST", &endpoint, as_json(definition), result)
    }

    async fn update_envelope(
        &self,
        envelope_id: &str,
        definition: &EnvelopeDefinition,
    ) -> EsignResult<EnvelopeSummary> {
        let endpoint = envelope_path(self.account_id(), envelope_id);
        let result = EsignClient::update_envelope(self, envelope_id, definition).await;
        logged("PUT", &endpoint, as_json(definition), result)
    }

    async fn get_doc_gen_form_fields(&self, envelope_id: &str) -> EsignResult<DocGenFormFieldResponse> {
        let endpoint = doc_gen_form_fields_path(self.account_id(), envelope_id);
        let result = EsignClient::get_doc_gen_form_fields(self, envelope_id).await;
        logged("GET", &endpoint, None, result)
    }

    async fn update_doc_gen_form_fields(
        &self,
        envelope_id: &str,
        request: &DocGenFormFieldRequest,
    ) -> EsignResult<Value> {
        let endpoint = doc_gen_form_fields_path(self.account_id(), envelope_id);
        let result = EsignClient::update_doc_gen_form_fields(self, envelope_id, request).await;
        logged("PUT", &endpoint, as_json(request), result)
    }

    async fn list_envelope_documents(&self, envelope_id: &str) -> EsignResult<EnvelopeDocumentsResult> {
        let endpoint = envelope_documents_path(self.account_id(), envelope_id);
        let result = EsignClient::list_envelope_documents(self, envelope_id).await;
        logged("GET", &endpoint, None, result)
    }
}
