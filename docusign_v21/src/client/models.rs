//! Payloads da API eSignature v2.1 usados pela integração.
//!
//! Os nomes seguem o JSON da DocuSign (camelCase). Campos desconhecidos dos
//! campos de geração de documento são mantidos em `extra` para que possam ser
//! reenviados sem alteração.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status do envelope no fluxo de envio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    /// Rascunho, ainda não entregue ao signatário
    Created,
    Sent,
}

impl EnvelopeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvelopeStatus::Created => "created",
            EnvelopeStatus::Sent => "sent",
        }
    }
}

/// Campo calculado (formula tab)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaTab {
    pub font: String,
    pub font_size: String,
    pub tab_label: String,
    pub formula: String,
    pub round_decimal_places: String,
    pub required: String,
    pub locked: String,
    pub disable_auto_size: String,
}

/// Campo de texto livre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextTab {
    pub tab_label: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tabs {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub formula_tabs: Vec<FormulaTab>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text_tabs: Vec<TextTab>,
}

/// Papel do template preenchido com o destinatário
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRole {
    pub email: String,
    pub name: String,
    pub role_name: String,
    pub tabs: Tabs,
}

/// Corpo de criação (`POST /envelopes`) e de atualização (`PUT /envelopes/{id}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeDefinition {
    pub status: EnvelopeStatus,
    pub template_id: String,
    pub template_roles: Vec<TemplateRole>,
}

/// Resposta de criação/atualização de envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeSummary {
    #[serde(default)]
    pub envelope_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_date_time: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
}

/// Campo de geração de documento (doc gen form field)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocGenFormField {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_values: Option<Vec<DocGenFormFieldRowValue>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocGenFormField {
    /// Campo simples nome/valor
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: None,
            value: Some(value.into()),
            row_values: None,
            extra: Map::new(),
        }
    }

    /// Campo tabular (`TableRow`) com uma linha por item
    pub fn table_row(name: impl Into<String>, rows: Vec<DocGenFormFieldRowValue>) -> Self {
        Self {
            name: name.into(),
            field_type: Some("TableRow".to_string()),
            value: None,
            row_values: Some(rows),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocGenFormFieldRowValue {
    pub doc_gen_form_field_list: Vec<DocGenFormField>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocGenFormFieldRowValue {
    pub fn new(fields: Vec<DocGenFormField>) -> Self {
        Self {
            doc_gen_form_field_list: fields,
            extra: Map::new(),
        }
    }
}

/// Conjunto de campos de um documento do envelope.
///
/// Os campos ficam como JSON bruto para voltarem ao PUT exatamente como
/// vieram do GET, inclusive sem `name`, com `null` ou com chaves desconhecidas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocGenFormFields {
    pub document_id: String,
    #[serde(default)]
    pub doc_gen_form_field_list: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Resposta de `GET /docGenFormFields`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocGenFormFieldResponse {
    #[serde(default)]
    pub doc_gen_form_fields: Vec<DocGenFormFields>,
}

/// Corpo de `PUT /docGenFormFields` (substituição completa)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocGenFormFieldRequest {
    pub doc_gen_form_fields: Vec<DocGenFormFields>,
}

/// Documento listado em `GET /envelopes/{id}/documents`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeDocument {
    pub document_id: String,
    #[serde(default)]
    pub document_id_guid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub document_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeDocumentsResult {
    #[serde(default)]
    pub envelope_id: Option<String>,
    #[serde(default)]
    pub envelope_documents: Vec<EnvelopeDocument>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_definition_json_shape() {
        let definition = EnvelopeDefinition {
            status: EnvelopeStatus::Created,
            template_id: "tpl-1".to_string(),
            template_roles: vec![TemplateRole {
                email: "ana@example.com".to_string(),
                name: "Ana".to_string(),
                role_name: "Signer".to_string(),
                tabs: Tabs {
                    formula_tabs: vec![],
                    text_tabs: vec![TextTab {
                        tab_label: "prod".to_string(),
                        value: "Basic Service".to_string(),
                    }],
                },
            }],
        };

        assert_eq!(
            serde_json::to_value(&definition).unwrap(),
            json!({
                "status": "created",
                "templateId": "tpl-1",
                "templateRoles": [{
                    "email": "ana@example.com",
                    "name": "Ana",
                    "roleName": "Signer",
                    "tabs": { "textTabs": [{ "tabLabel": "prod", "value": "Basic Service" }] }
                }]
            })
        );
    }

    #[test]
    fn test_doc_gen_field_keeps_unknown_properties() {
        let raw = json!({
            "name": "CustomerName",
            "type": "TextBox",
            "label": "Customer",
            "required": "true",
            "value": "ACME"
        });

        let field: DocGenFormField = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(field.field_type.as_deref(), Some("TextBox"));
        assert_eq!(field.extra.get("label"), Some(&json!("Customer")));
        assert_eq!(serde_json::to_value(&field).unwrap(), raw);
    }

    #[test]
    fn test_table_row_json_shape() {
        let field = DocGenFormField::table_row(
            "Product",
            vec![DocGenFormFieldRowValue::new(vec![
                DocGenFormField::text("ProductName", "Basic Service"),
                DocGenFormField::text("Price", "$100"),
            ])],
        );

        assert_eq!(
            serde_json::to_value(&field).unwrap(),
            json!({
                "name": "Product",
                "type": "TableRow",
                "rowValues": [{
                    "docGenFormFieldList": [
                        { "name": "ProductName", "value": "Basic Service" },
                        { "name": "Price", "value": "$100" }
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_field_set_round_trips_untyped_entries() {
        let raw = json!({
            "documentId": "doc-guid",
            "docGenFormFieldList": [
                { "type": "Signature" },
                { "name": "Notes", "type": "TextBox", "value": null },
                { "name": "Quantity", "type": "Number", "value": 3 },
                {
                    "name": "Items",
                    "type": "TableRow",
                    "rowValues": [{
                        "rowIndex": 0,
                        "docGenFormFieldList": [{ "name": "Sku", "value": "A-1", "order": 1 }]
                    }]
                }
            ]
        });

        let fields: DocGenFormFields = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(fields.doc_gen_form_field_list.len(), 4);
        assert_eq!(serde_json::to_value(&fields).unwrap(), raw);
    }

    #[test]
    fn test_row_value_keeps_unknown_properties() {
        let raw = json!({
            "rowIndex": 2,
            "docGenFormFieldList": [{ "name": "ProductName", "value": "Basic Service" }]
        });

        let row: DocGenFormFieldRowValue = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(row.extra.get("rowIndex"), Some(&json!(2)));
        assert_eq!(serde_json::to_value(&row).unwrap(), raw);
    }
}
