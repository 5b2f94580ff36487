//! HTTP transport against a mock broker.

use std::time::Duration;

use serde_json::json;
use sso_client::config::ClientConfig;
use sso_client::transport::{HttpTransport, SsoTransport};
use sso_core::error::SsoError;
use sso_core::models::credential::MasterCredential;
use sso_core::models::session::SessionId;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport(server: &MockServer) -> HttpTransport {
    let config = ClientConfig::new(Url::parse(&server.uri()).unwrap())
        .with_request_timeout(Duration::from_millis(500));
    HttpTransport::new(&config).unwrap()
}

fn error_body(kind: &str) -> serde_json::Value {
    json!({ "error": kind, "message": "rejected" })
}

#[tokio::test]
async fn authenticate_sends_bearer_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sso/authenticate"))
        .and(header("authorization", "Bearer mc_abc.s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sessionId": "session-123",
            "expiresAt": "2030-01-01T00:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = transport(&server)
        .authenticate(&MasterCredential::new("mc_abc.s3cret"))
        .await
        .unwrap();
    assert_eq!(resp.session_id, SessionId::new("session-123"));
    assert!(resp.expires_at.is_some());
}

#[tokio::test]
async fn request_token_posts_session_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sso/validate/apps.example.com"))
        .and(body_json(json!({ "sessionId": "session-123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "header.payload.sig",
            "domain": "apps.example.com",
            "applicationName": "Hosted Apps",
            "expiresAt": "2030-01-01T00:05:00Z",
            "principal": {
                "id": "00000000-0000-0000-0000-000000000001",
                "role": "user",
                "permissions": ["apps:launch"]
            }
        })))
        .mount(&server)
        .await;

    let resp = transport(&server)
        .request_token(&SessionId::new("session-123"), "apps.example.com")
        .await
        .unwrap();
    assert_eq!(resp.token, "header.payload.sig");
    assert!(resp.principal.company_id.is_none());
}

#[tokio::test]
async fn error_kinds_map_back_to_taxonomy() {
    let server = MockServer::start().await;
    let cases = [
        ("expired.example.com", 401, "session_expired"),
        ("gone.example.com", 401, "session_not_found"),
        ("evil.example", 404, "domain_not_registered"),
        ("admin.example.com", 403, "forbidden"),
    ];
    for (domain, status, kind) in cases {
        Mock::given(method("POST"))
            .and(path(format!("/sso/validate/{domain}")))
            .respond_with(ResponseTemplate::new(status).set_body_json(error_body(kind)))
            .mount(&server)
            .await;
    }

    let t = transport(&server);
    let sid = SessionId::new("s");
    let err = t.request_token(&sid, "expired.example.com").await.unwrap_err();
    assert!(matches!(err, SsoError::SessionExpired));
    let err = t.request_token(&sid, "gone.example.com").await.unwrap_err();
    assert!(matches!(err, SsoError::SessionNotFound));
    let err = t.request_token(&sid, "evil.example").await.unwrap_err();
    assert!(matches!(err, SsoError::DomainNotRegistered { .. }));
    let err = t.request_token(&sid, "admin.example.com").await.unwrap_err();
    assert!(matches!(err, SsoError::Forbidden { .. }));
}

#[tokio::test]
async fn server_errors_are_network_errors() {
    let server = MockServer::start().await;
    // Even with a session kind in the body, a 5xx is never session invalidity.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_json(error_body("session_expired")))
        .mount(&server)
        .await;

    let err = transport(&server)
        .request_token(&SessionId::new("s"), "apps.example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, SsoError::Network(_)));
    assert!(!err.is_session_invalid());
}

#[tokio::test]
async fn timeout_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let err = transport(&server)
        .authenticate(&MasterCredential::new("mc_a.b"))
        .await
        .unwrap_err();
    assert!(matches!(err, SsoError::Network(_)));
}

#[tokio::test]
async fn bare_unauthorized_is_not_authenticated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sso/authenticate"))
        .respond_with(ResponseTemplate::new(401).set_body_string("nope"))
        .mount(&server)
        .await;

    let err = transport(&server)
        .authenticate(&MasterCredential::new("mc_a.b"))
        .await
        .unwrap_err();
    assert!(matches!(err, SsoError::NotAuthenticated { .. }));
}

#[tokio::test]
async fn logout_accepts_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sso/logout"))
        .and(body_json(json!({ "sessionId": "session-123" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    transport(&server)
        .logout(&SessionId::new("session-123"))
        .await
        .unwrap();
}

#[tokio::test]
async fn unreachable_broker_is_network_error() {
    let config = ClientConfig::new(Url::parse("http://127.0.0.1:9/").unwrap())
        .with_request_timeout(Duration::from_millis(500));
    let err = HttpTransport::new(&config)
        .unwrap()
        .logout(&SessionId::new("s"))
        .await
        .unwrap_err();
    assert!(matches!(err, SsoError::Network(_)));
}
