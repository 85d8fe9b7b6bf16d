use chrono::{Duration, Utc};
use docusign_v21::{AuthManager, EsignConfig, EsignError, TokenRecord};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer, dir: &tempfile::TempDir) -> EsignConfig {
    EsignConfig {
        client_id: "client-123".to_string(),
        client_secret: "s3cret".to_string(),
        redirect_uri: "http://localhost:8501/callback".to_string(),
        auth_server: server.uri(),
        account_id: "acc-1".to_string(),
        base_path: server.uri(),
        token_path: dir.path().join("tokens").join("docusign_token.json"),
    }
}

#[tokio::test]
async fn exchange_code_persists_token_and_tracks_expiry() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=abc123"))
        .and(body_string_contains("client_secret=s3cret"))
        .and(body_string_contains("redirect_uri=http%3A%2F%2Flocalhost%3A8501%2Fcallback"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "T",
            "refresh_token": "R",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let manager = AuthManager::new(config(&server, &dir)).unwrap();
    let before = Utc::now();
    let token = manager.exchange_code("abc123").await.unwrap();

    assert_eq!(token.access_token, "T");
    assert_eq!(token.refresh_token, "R");
    assert_eq!(token.token_type, "Bearer");
    assert_eq!(token.expires_in, 3600);
    assert!(token.issued_at >= before);

    // já está no disco quando a chamada retorna
    assert_eq!(manager.load().unwrap(), Some(token.clone()));

    let t0 = token.issued_at;
    assert!(token.is_valid_at(t0));
    assert!(token.is_valid_at(t0 + Duration::seconds(3299)));
    assert!(!token.is_valid_at(t0 + Duration::seconds(3595)));
    assert!(!token.is_valid_at(t0 + Duration::seconds(3600)));
    assert!(AuthManager::is_valid(Some(&token)));
}

#[tokio::test]
async fn exchange_code_failure_carries_body_and_persists_nothing() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#))
        .mount(&server)
        .await;

    let manager = AuthManager::new(config(&server, &dir)).unwrap();
    let result = manager.exchange_code("expired-code").await;

    match result {
        Err(EsignError::AuthExchange(body)) => assert!(body.contains("invalid_grant")),
        other => panic!("esperado AuthExchange, veio {:?}", other),
    }
    assert_eq!(manager.load().unwrap(), None);
}

#[tokio::test]
async fn refresh_replaces_stored_token() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=R-old"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "T-new",
            "refresh_token": "R-new",
            "expires_in": 28800,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let manager = AuthManager::new(config(&server, &dir)).unwrap();
    let token = manager.refresh("R-old").await.unwrap();

    assert_eq!(token.access_token, "T-new");
    assert_eq!(token.refresh_token, "R-new");
    assert_eq!(manager.load().unwrap(), Some(token));
}

#[tokio::test]
async fn refresh_failure_is_typed() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("refresh token revoked"))
        .mount(&server)
        .await;

    let manager = AuthManager::new(config(&server, &dir)).unwrap();
    let result = manager.refresh("R").await;

    match result {
        Err(EsignError::TokenRefresh(body)) => assert_eq!(body, "refresh token revoked"),
        other => panic!("esperado TokenRefresh, veio {:?}", other),
    }
}

#[tokio::test]
async fn ensure_fresh_only_refreshes_near_expiry() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "T-new",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let manager = AuthManager::new(config(&server, &dir)).unwrap();

    let fresh = TokenRecord {
        access_token: "T".to_string(),
        refresh_token: "R".to_string(),
        token_type: "Bearer".to_string(),
        expires_in: 3600,
        issued_at: Utc::now(),
    };
    assert_eq!(manager.ensure_fresh(&fresh).await.unwrap(), fresh);

    let near_expiry = TokenRecord {
        issued_at: Utc::now() - Duration::seconds(3400),
        ..fresh
    };
    let renewed = manager.ensure_fresh(&near_expiry).await.unwrap();
    assert_eq!(renewed.access_token, "T-new");
    // a DocuSign não devolveu refresh token novo: mantém o anterior
    assert_eq!(renewed.refresh_token, "R");
}

#[tokio::test]
async fn delete_then_restore_session_is_absent() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let manager = AuthManager::new(config(&server, &dir)).unwrap();

    let token = TokenRecord {
        access_token: "T".to_string(),
        refresh_token: "R".to_string(),
        token_type: "Bearer".to_string(),
        expires_in: 3600,
        issued_at: Utc::now(),
    };
    manager.persist(&token).unwrap();
    assert_eq!(manager.restore_session().unwrap(), Some(token));

    assert!(manager.delete());
    assert_eq!(manager.restore_session().unwrap(), None);
    assert!(!manager.delete());
}
