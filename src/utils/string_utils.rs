/// Utilitários de texto para exibição segura de tokens e respostas

/// Quantidade de caracteres do access token mostrada ao operador
pub const TOKEN_PREVIEW_CHARS: usize = 20;

/// Prévia do access token: os 20 primeiros caracteres seguidos de `...`
pub fn token_preview(token: &str) -> String {
    let visible: String = token.chars().take(TOKEN_PREVIEW_CHARS).collect();
    format!("{}...", visible)
}

/// Remove access tokens de um JSON antes de gravá-lo em log
pub fn redact_tokens(value: &serde_json::Value) -> serde_json::Value {
    use serde_json::Value;

    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let redacted = match (k.as_str(), v) {
                        ("access_token" | "refresh_token", Value::String(token)) => {
                            Value::String(token_preview(token))
                        }
                        _ => redact_tokens(v),
                    };
                    (k.clone(), redacted)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_tokens).collect()),
        other => other.clone(),
    }
}
