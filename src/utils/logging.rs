use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use chrono::{Local, Utc};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use crate::utils::string_utils::redact_tokens;

/// Nome do arquivo de log do dia: `api_YYYYMMDD.log`
pub fn log_file_path(directory: &Path) -> PathBuf {
    directory.join(format!("api_{}.log", Local::now().format("%Y%m%d")))
}

/// Inicializa o tracing com saída no terminal e no arquivo diário.
///
/// Os registros da crate `docusign_v21` (facade `log`) também passam por aqui.
pub fn init_logging(directory: &Path, verbose: bool) -> std::io::Result<PathBuf> {
    fs::create_dir_all(directory)?;
    let path = log_file_path(directory);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)));

    if registry.try_init().is_err() {
        debug!("Tracing já inicializado");
    }

    Ok(path)
}

/// Registra uma chamada à API da DocuSign como uma entrada JSON
pub fn log_api_call(
    method: &str,
    endpoint: &str,
    request: Option<&Value>,
    response: Option<&Value>,
    error: Option<&str>,
) {
    let entry = api_call_entry(method, endpoint, request, response, error);
    let pretty = serde_json::to_string_pretty(&entry).unwrap_or_else(|_| entry.to_string());

    if error.is_some() {
        error!(target: "api", "❌ {} {}\n{}", method, endpoint, pretty);
    } else {
        info!(target: "api", "📡 {} {}\n{}", method, endpoint, pretty);
    }
}

fn api_call_entry(
    method: &str,
    endpoint: &str,
    request: Option<&Value>,
    response: Option<&Value>,
    error: Option<&str>,
) -> Value {
    json!({
        "timestamp": Utc::now().to_rfc3339(),
        "method": method,
        "endpoint": endpoint,
        "request": request.map(redact_tokens),
        "response": response.map(redact_tokens),
        "error": error,
    })
}

pub fn log_config_loaded(env: &str) {
    info!("Configuration loaded successfully for environment: {}", env);
}

pub fn log_validation_error(field: &str, message: &str) {
    warn!("Validation error: {} - {}", field, message);
}

pub fn log_envelope_sent(envelope_id: &str, total: u64) {
    info!("✅ Envelope enviado: {} - Total: ${}", envelope_id, total);
}

pub fn log_info(message: &str) {
    info!("{}", message);
}

pub fn log_error(message: &str) {
    error!("{}", message);
}

pub fn log_warning(message: &str) {
    warn!("{}", message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_name() {
        let path = log_file_path(Path::new("logs"));
        let name = path.file_name().and_then(|n| n.to_str()).unwrap();
        assert!(name.starts_with("api_"));
        assert!(name.ends_with(".log"));
        assert_eq!(name.len(), "api_YYYYMMDD.log".len());
    }

    #[test]
    fn test_api_call_entry_redacts_tokens() {
        let response = json!({ "access_token": "abcdefghijklmnopqrstuvwxyz", "expires_in": 3600 });
        let entry = api_call_entry("POST", "/oauth/token", None, Some(&response), None);

        assert_eq!(entry["method"], "POST");
        assert_eq!(entry["endpoint"], "/oauth/token");
        assert_eq!(entry["request"], Value::Null);
        assert_eq!(entry["response"]["access_token"], "abcdefghijklmnopqrst...");
        assert!(entry["timestamp"].as_str().is_some());
    }

    #[test]
    fn test_init_logging_creates_daily_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = init_logging(dir.path(), false).unwrap();
        assert!(path.exists());
        assert_eq!(path, log_file_path(dir.path()));
    }
}
