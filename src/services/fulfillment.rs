//! Envio de um pedido a partir de um template com Document Generation.
//!
//! São três chamadas, sempre nesta ordem e sem retry:
//!
//! 1. cria o envelope como rascunho (`created`) com os campos do signatário;
//! 2. lê os campos de geração do documento, troca a tabela `Product` pelos
//!    produtos do pedido e grava o conjunto inteiro de volta;
//! 3. muda o envelope para `sent`.
//!
//! Uma falha interrompe a sequência e o envelope fica no estado deixado pela
//! última etapa concluída. Não há rollback, e repetir o envio cria outro envelope.

use docusign_v21::client::api::{doc_gen_form_fields_path, envelope_path, envelopes_path};
use docusign_v21::client::models::{
    DocGenFormField, DocGenFormFieldRequest, DocGenFormFieldResponse, DocGenFormFieldRowValue,
    DocGenFormFields, EnvelopeDefinition, EnvelopeStatus, FormulaTab, Tabs, TemplateRole, TextTab,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use crate::models::{OrderSelection, Recipient};
use crate::services::envelope_api::EnvelopeApi;
use crate::utils::logging::log_envelope_sent;
use crate::utils::{AppError, AppResult, StepFailure};

pub const SIGNER_ROLE: &str = "Signer";
pub const TOTAL_TAB_LABEL: &str = "TotalAmount";
pub const PRODUCTS_TAB_LABEL: &str = "prod";
pub const PRODUCT_FIELD: &str = "Product";
pub const PRODUCT_NAME_FIELD: &str = "ProductName";
pub const PRICE_FIELD: &str = "Price";

/// Resultado de um envio concluído
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FulfillmentReceipt {
    pub envelope_id: String,
    pub total_amount: u64,
    pub products: Vec<String>,
}

/// Papel do signatário com o total calculado e a lista de produtos
pub fn build_signer_role(recipient: &Recipient, selection: &OrderSelection) -> TemplateRole {
    TemplateRole {
        email: recipient.email.clone(),
        name: recipient.name.clone(),
        role_name: SIGNER_ROLE.to_string(),
        tabs: Tabs {
            formula_tabs: vec![FormulaTab {
                font: "helvetica".to_string(),
                font_size: "size11".to_string(),
                tab_label: TOTAL_TAB_LABEL.to_string(),
                formula: selection.total_amount().to_string(),
                round_decimal_places: "0".to_string(),
                required: "true".to_string(),
                locked: "true".to_string(),
                disable_auto_size: "false".to_string(),
            }],
            text_tabs: vec![TextTab {
                tab_label: PRODUCTS_TAB_LABEL.to_string(),
                value: selection.joined_names(),
            }],
        },
    }
}

pub fn build_envelope_definition(
    template_id: &str,
    recipient: &Recipient,
    selection: &OrderSelection,
    status: EnvelopeStatus,
) -> EnvelopeDefinition {
    EnvelopeDefinition {
        status,
        template_id: template_id.to_string(),
        template_roles: vec![build_signer_role(recipient, selection)],
    }
}

/// Campo `Product` em formato de tabela, uma linha por produto
pub fn product_table_field(selection: &OrderSelection) -> DocGenFormField {
    let rows = selection
        .products()
        .iter()
        .map(|product| {
            DocGenFormFieldRowValue::new(vec![
                DocGenFormField::text(PRODUCT_NAME_FIELD, product.name.clone()),
                DocGenFormField::text(PRICE_FIELD, product.display_price()),
            ])
        })
        .collect();

    DocGenFormField::table_row(PRODUCT_FIELD, rows)
}

fn is_product_field(field: &Value) -> bool {
    field.get("name").and_then(Value::as_str) == Some(PRODUCT_FIELD)
}

/// Monta o conjunto de substituição para o documento do envelope.
///
/// Mantém os demais campos byte a byte, na mesma ordem, e coloca
/// `product_table` no fim. `None` quando o envelope não tem campos.
pub fn merge_fields(existing: DocGenFormFieldResponse, product_table: Value) -> Option<DocGenFormFieldRequest> {
    let document = existing.doc_gen_form_fields.into_iter().next()?;

    let mut fields: Vec<Value> = document
        .doc_gen_form_field_list
        .into_iter()
        .filter(|field| !is_product_field(field))
        .collect();
    fields.push(product_table);

    Some(DocGenFormFieldRequest {
        doc_gen_form_fields: vec![DocGenFormFields {
            document_id: document.document_id,
            doc_gen_form_field_list: fields,
            extra: document.extra,
        }],
    })
}

fn envelope_summary(status: EnvelopeStatus, template_id: &str, recipient: &Recipient, selection: &OrderSelection) -> String {
    format!(
        "status={} templateId={} signer={} total={} products=[{}]",
        status.as_str(),
        template_id,
        recipient.email,
        selection.total_amount(),
        selection.joined_names()
    )
}

/// Executa o envio de pedidos contra uma conta e um template fixos
pub struct TemplateFulfillment<P: EnvelopeApi> {
    api: P,
    account_id: String,
    template_id: String,
}

impl<P: EnvelopeApi> TemplateFulfillment<P> {
    pub fn new(api: P, account_id: impl Into<String>, template_id: impl Into<String>) -> Self {
        Self {
            api,
            account_id: account_id.into(),
            template_id: template_id.into(),
        }
    }

    pub fn api(&self) -> &P {
        &self.api
    }

    /// Etapa 1: cria o envelope como rascunho e devolve o `envelopeId`
    pub async fn create_draft_envelope(&self, recipient: &Recipient, selection: &OrderSelection) -> AppResult<String> {
        let endpoint = envelopes_path(&self.account_id);
        let summary = envelope_summary(EnvelopeStatus::Created, &self.template_id, recipient, selection);
        let definition = build_envelope_definition(&self.template_id, recipient, selection, EnvelopeStatus::Created);

        let created = self
            .api
            .create_envelope(&definition)
            .await
            .map_err(|e| AppError::EnvelopeCreateError(StepFailure::from_esign(&endpoint, &summary, &e)))?;

        let envelope_id = created.envelope_id.filter(|id| !id.is_empty()).ok_or_else(|| {
            AppError::EnvelopeCreateError(StepFailure::new(&endpoint, &summary, "resposta sem envelopeId"))
        })?;

        info!("📝 Rascunho criado: {}", envelope_id);
        Ok(envelope_id)
    }

    /// Etapa 2: substitui a tabela `Product` nos campos de geração do documento
    pub async fn merge_generation_fields(&self, envelope_id: &str, selection: &OrderSelection) -> AppResult<()> {
        let endpoint = doc_gen_form_fields_path(&self.account_id, envelope_id);

        let existing = self
            .api
            .get_doc_gen_form_fields(envelope_id)
            .await
            .map_err(|e| AppError::FieldFetchError(StepFailure::from_esign(&endpoint, "GET docGenFormFields", &e)))?;

        let product_table = serde_json::to_value(product_table_field(selection)).map_err(|e| {
            AppError::FieldUpdateError(StepFailure::new(&endpoint, "tabela Product", e.to_string()))
        })?;

        let request = merge_fields(existing, product_table).ok_or_else(|| {
            AppError::FieldFetchError(StepFailure::new(
                &endpoint,
                "GET docGenFormFields",
                "envelope sem campos de geração de documento",
            ))
        })?;

        let update_summary = request
            .doc_gen_form_fields
            .first()
            .map(|doc| {
                format!(
                    "documentId={} fields={} productRows={}",
                    doc.document_id,
                    doc.doc_gen_form_field_list.len(),
                    selection.products().len()
                )
            })
            .unwrap_or_default();

        self.api
            .update_doc_gen_form_fields(envelope_id, &request)
            .await
            .map_err(|e| AppError::FieldUpdateError(StepFailure::from_esign(&endpoint, &update_summary, &e)))?;

        info!("🧾 Campos de geração atualizados: {} produto(s)", selection.products().len());
        Ok(())
    }

    /// Etapa 3: reconstrói o papel do signatário e muda o envelope para `sent`
    pub async fn send_envelope(
        &self,
        envelope_id: &str,
        recipient: &Recipient,
        selection: &OrderSelection,
    ) -> AppResult<String> {
        let endpoint = envelope_path(&self.account_id, envelope_id);
        let summary = envelope_summary(EnvelopeStatus::Sent, &self.template_id, recipient, selection);
        let definition = build_envelope_definition(&self.template_id, recipient, selection, EnvelopeStatus::Sent);

        let sent = self
            .api
            .update_envelope(envelope_id, &definition)
            .await
            .map_err(|e| AppError::EnvelopeSendError(StepFailure::from_esign(&endpoint, &summary, &e)))?;

        Ok(sent
            .envelope_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| envelope_id.to_string()))
    }

    /// Valida o pedido e executa as três etapas em sequência
    pub async fn fulfill(&self, recipient: &Recipient, selection: &OrderSelection) -> AppResult<FulfillmentReceipt> {
        selection.validate()?;

        let envelope_id = self.create_draft_envelope(recipient, selection).await?;

        if let Err(e) = self.merge_generation_fields(&envelope_id, selection).await {
            warn!("⚠️ Envelope {} ficou em rascunho: {}", envelope_id, e);
            return Err(e);
        }

        let envelope_id = self.send_envelope(&envelope_id, recipient, selection).await?;
        log_envelope_sent(&envelope_id, selection.total_amount());

        Ok(FulfillmentReceipt {
            envelope_id,
            total_amount: selection.total_amount(),
            products: selection.product_names().into_iter().map(str::to_string).collect(),
        })
    }
}
