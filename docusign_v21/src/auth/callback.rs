use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use warp::Filter;
use crate::error::{EsignError, EsignResult};

/// Tempo máximo esperando o operador concluir o consentimento
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// Servidor HTTP local que captura o redirect do OAuth2
pub struct CallbackServer {
    port: u16,
    path: String,
    timeout: Duration,
}

/// Resultado do callback OAuth2
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackResult {
    pub code: String,
}

impl CallbackServer {
    pub fn new(port: u16, path: impl Into<String>) -> Self {
        Self {
            port,
            path: path.into(),
            timeout: CALLBACK_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Inicia o servidor e aguarda o callback
    pub async fn start_and_wait(self) -> EsignResult<CallbackResult> {
        let (tx, rx) = oneshot::channel::<EsignResult<CallbackResult>>();
        let tx = Arc::new(Mutex::new(Some(tx)));

        let expected_path = self.path.clone();
        let callback_route = warp::path::full()
            .and(warp::query::<HashMap<String, String>>())
            .and_then(move |full: warp::path::FullPath, params: HashMap<String, String>| {
                let tx = tx.clone();
                let expected_path = expected_path.clone();

                async move {
                    if full.as_str().trim_matches('/') != expected_path {
                        return Err(warp::reject::not_found());
                    }

                    // Prefetch do navegador ou visita sem parâmetros do OAuth
                    if !Self::is_oauth_redirect(&params) {
                        log::debug!("Ignorando requisição sem code/error em /{}", expected_path);
                        return Ok(warp::reply::html(WAITING_PAGE));
                    }

                    log::info!("Recebido callback OAuth2 em /{}", expected_path);

                    let result = Self::process_callback(&params);
                    let is_success = result.is_ok();

                    if let Ok(mut sender) = tx.lock() {
                        if let Some(tx) = sender.take() {
                            let _ = tx.send(result);
                        }
                    }

                    let page = if is_success { SUCCESS_PAGE } else { ERROR_PAGE };
                    Ok::<_, warp::Rejection>(warp::reply::html(page))
                }
            });

        let addr = ([127, 0, 0, 1], self.port);
        let (actual_addr, server_future) = warp::serve(callback_route)
            .try_bind_ephemeral(addr)
            .map_err(|e| EsignError::callback_error(format!("Falha ao abrir a porta {}: {}", self.port, e)))?;

        log::info!("Servidor de callback iniciado em: http://{}/{}", actual_addr, self.path);

        let server_task = tokio::spawn(server_future);
        let result = tokio::time::timeout(self.timeout, rx).await;
        server_task.abort();

        match result {
            Ok(Ok(callback_result)) => callback_result,
            Ok(Err(_)) => Err(EsignError::callback_error("Canal de comunicação fechado")),
            Err(_) => Err(EsignError::Timeout),
        }
    }

    /// Só o redirect do provedor traz `code` ou `error`
    pub fn is_oauth_redirect(params: &HashMap<String, String>) -> bool {
        params.contains_key("code") || params.contains_key("error")
    }

    /// Extrai o código (ou o erro) dos parâmetros do redirect
    pub fn process_callback(params: &HashMap<String, String>) -> EsignResult<CallbackResult> {
        if let Some(error) = params.get("error") {
            return match error.as_str() {
                "access_denied" => Err(EsignError::AccessDenied),
                other => {
                    let description = params.get("error_description").map(String::as_str).unwrap_or("");
                    Err(EsignError::AuthExchange(format!("{} {}", other, description).trim().to_string()))
                }
            };
        }

        let code = params
            .get("code")
            .filter(|c| !c.is_empty())
            .ok_or_else(|| EsignError::callback_error("Código não encontrado no callback"))?;

        Ok(CallbackResult { code: code.clone() })
    }
}

const SUCCESS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>DocuSign - Autorizado</title></head>
<body style="font-family: Arial, sans-serif; text-align: center; margin-top: 80px;">
    <h1>✅ Autorização concluída</h1>
    <p>Você já pode fechar esta janela e voltar ao terminal.</p>
</body>
</html>"#;

const WAITING_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>DocuSign - Aguardando</title></head>
<body style="font-family: Arial, sans-serif; text-align: center; margin-top: 80px;">
    <h1>⏳ Aguardando autorização</h1>
    <p>Conclua o consentimento na página da DocuSign.</p>
</body>
</html>"#;

const ERROR_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>DocuSign - Erro</title></head>
<body style="font-family: Arial, sans-serif; text-align: center; margin-top: 80px;">
    <h1>❌ Falha na autorização</h1>
    <p>Verifique o terminal para mais detalhes.</p>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_process_callback_with_code() {
        let result = CallbackServer::process_callback(&params(&[("code", "abc123")])).unwrap();
        assert_eq!(result.code, "abc123");
    }

    #[test]
    fn test_process_callback_access_denied() {
        let result = CallbackServer::process_callback(&params(&[("error", "access_denied")]));
        assert!(matches!(result, Err(EsignError::AccessDenied)));
    }

    #[test]
    fn test_process_callback_provider_error() {
        let result = CallbackServer::process_callback(&params(&[
            ("error", "invalid_request"),
            ("error_description", "bad redirect"),
        ]));
        match result {
            Err(EsignError::AuthExchange(msg)) => assert_eq!(msg, "invalid_request bad redirect"),
            other => panic!("resultado inesperado: {:?}", other),
        }
    }

    #[test]
    fn test_process_callback_without_code() {
        let result = CallbackServer::process_callback(&params(&[]));
        assert!(matches!(result, Err(EsignError::Callback(_))));
    }

    #[test]
    fn test_is_oauth_redirect() {
        assert!(CallbackServer::is_oauth_redirect(&params(&[("code", "abc123"), ("state", "x")])));
        assert!(CallbackServer::is_oauth_redirect(&params(&[("error", "access_denied")])));
        assert!(!CallbackServer::is_oauth_redirect(&params(&[])));
        assert!(!CallbackServer::is_oauth_redirect(&params(&[("utm_source", "prefetch")])));
    }

    #[tokio::test]
    async fn test_request_without_code_keeps_waiting() {
        let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let server = CallbackServer::new(port, "callback").with_timeout(Duration::from_secs(5));
        let waiting = tokio::spawn(server.start_and_wait());

        let base = format!("http://127.0.0.1:{}/callback", port);
        let client = reqwest::Client::new();

        let mut prefetch = None;
        for _ in 0..50 {
            match client.get(format!("{}?utm_source=prefetch", base)).send().await {
                Ok(response) => {
                    prefetch = Some(response);
                    break;
                }
                Err(_) => tokio::time::sleep(Duration::from_millis(20)).await,
            }
        }
        let page = prefetch.expect("servidor de callback não respondeu").text().await.unwrap();
        assert!(page.contains("Aguardando"));

        let page = client.get(format!("{}?code=abc123", base)).send().await.unwrap().text().await.unwrap();
        assert!(page.contains("Autorização concluída"));

        let result = waiting.await.unwrap().unwrap();
        assert_eq!(result.code, "abc123");
    }

    #[tokio::test]
    async fn test_start_and_wait_times_out() {
        let server = CallbackServer::new(0, "callback").with_timeout(Duration::from_millis(50));
        let result = server.start_and_wait().await;
        assert!(matches!(result, Err(EsignError::Timeout)));
    }
}
