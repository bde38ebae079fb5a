#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end tests against a mock Grafana server.

use std::time::Duration;

use grafana_admin_sdk::{AdminApi, AdminClient, AdminError, User, UserPermissions};
use grafana_http::{CallContext, Credentials, HttpClient, HttpClientConfig, HttpError};
use httpmock::prelude::*;
use serde_json::json;

fn admin_client(server: &MockServer) -> AdminClient {
    let mut config = HttpClientConfig::for_testing(server.base_url());
    config.credentials = Credentials::basic("admin", "admin");
    AdminClient::from_config(config).unwrap()
}

#[tokio::test]
async fn create_user_round_trip() {
    let server = MockServer::start();
    let user = User::new("jdoe", "jdoe@example.com", "s3cret")
        .with_name("John Doe")
        .with_org_id(1);

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/admin/users")
            .header("authorization", "Basic YWRtaW46YWRtaW4=")
            .header("content-type", "application/json")
            .json_body(serde_json::to_value(&user).unwrap());
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({"id": 12, "message": "User created"}));
    });

    let msg = admin_client(&server)
        .create_user(&CallContext::new(), &user)
        .await
        .unwrap();

    mock.assert();
    assert_eq!(msg.id, Some(12));
    assert_eq!(msg.message.as_deref(), Some("User created"));
}

#[tokio::test]
async fn delete_user_round_trip() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(DELETE).path("/api/admin/users/42");
        then.status(200).json_body(json!({"message": "User deleted"}));
    });

    let msg = admin_client(&server)
        .delete_user(&CallContext::new(), 42)
        .await
        .unwrap();

    mock.assert();
    assert_eq!(msg.message.as_deref(), Some("User deleted"));
}

#[tokio::test]
async fn update_permissions_round_trip() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PUT)
            .path("/api/admin/users/7/permissions")
            .json_body(json!({"isGrafanaAdmin": true}));
        then.status(200)
            .json_body(json!({"message": "User permissions updated"}));
    });

    let msg = admin_client(&server)
        .update_user_permissions(&CallContext::new(), &UserPermissions::grafana_admin(true), 7)
        .await
        .unwrap();

    mock.assert();
    assert_eq!(msg.message.as_deref(), Some("User permissions updated"));
}

#[tokio::test]
async fn switch_context_round_trip() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/api/users/7/using/3");
        then.status(200)
            .json_body(json!({"message": "Active organization changed"}));
    });

    let msg = admin_client(&server)
        .switch_user_context(&CallContext::new(), 7, 3)
        .await
        .unwrap();

    mock.assert();
    assert_eq!(msg.message.as_deref(), Some("Active organization changed"));
}

#[tokio::test]
async fn base_url_subpath_is_kept() {
    let server = MockServer::start();
    let delete = server.mock(|when, then| {
        when.method(DELETE).path("/grafana/api/admin/users/5");
        then.status(200).json_body(json!({"message": "User deleted"}));
    });
    let switch = server.mock(|when, then| {
        when.method(POST).path("/grafana/api/users/5/using/2");
        then.status(200).json_body(json!({"message": "ok"}));
    });

    let client = AdminClient::from_config(HttpClientConfig::for_testing(server.url("/grafana/")))
        .unwrap();
    let ctx = CallContext::new();
    client.delete_user(&ctx, 5).await.unwrap();
    client.switch_user_context(&ctx, 5, 2).await.unwrap();

    delete.assert();
    switch.assert();
}

#[tokio::test]
async fn not_found_is_transport_error_sent_once() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(DELETE).path("/api/admin/users/999");
        then.status(404)
            .header("content-type", "application/json")
            .json_body(json!({"message": "user not found"}));
    });

    let err = admin_client(&server)
        .delete_user(&CallContext::new(), 999)
        .await
        .unwrap_err();

    assert_eq!(mock.hits(), 1);
    assert!(err.is_transport());
    assert_eq!(err.status(), Some(http::StatusCode::NOT_FOUND));
    assert!(matches!(
        err,
        AdminError::Transport(HttpError::HttpStatus { ref body_preview, .. })
            if body_preview.contains("user not found")
    ));
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/api/admin/users");
        then.status(500).body("internal error");
    });

    let user = User::new("jdoe", "jdoe@example.com", "s3cret");
    let err = admin_client(&server)
        .create_user(&CallContext::new(), &user)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(http::StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(mock.hits(), 1);
}

#[tokio::test]
async fn html_reply_is_decode_error() {
    let server = MockServer::start();
    let _mock = server.mock(|when, then| {
        when.method(DELETE).path("/api/admin/users/1");
        then.status(200)
            .header("content-type", "text/html")
            .body("<html>login</html>");
    });

    let err = admin_client(&server)
        .delete_user(&CallContext::new(), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::Deserialize(_)));
}

#[tokio::test]
async fn cancelled_call_sends_nothing() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(DELETE).path("/api/admin/users/1");
        then.status(200).json_body(json!({}));
    });

    let ctx = CallContext::new();
    ctx.cancellation().cancel();

    let err = admin_client(&server)
        .delete_user(&ctx, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::Transport(HttpError::Cancelled)));
    assert_eq!(mock.hits(), 0);
}

#[tokio::test]
async fn deadline_is_forwarded() {
    let server = MockServer::start();
    let _mock = server.mock(|when, then| {
        when.method(POST).path("/api/users/1/using/1");
        then.status(200)
            .delay(Duration::from_millis(500))
            .json_body(json!({}));
    });

    let ctx = CallContext::new().with_timeout(Duration::from_millis(50));
    let err = admin_client(&server)
        .switch_user_context(&ctx, 1, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::Transport(HttpError::DeadlineExceeded)));
}

#[tokio::test]
async fn bearer_token_through_shared_trait_object() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(DELETE)
            .path("/api/admin/users/8")
            .header("authorization", "Bearer glsa_service_token");
        then.status(200).json_body(json!({"message": "User deleted"}));
    });

    let transport = HttpClient::builder()
        .base_url(server.base_url())
        .allow_insecure_http()
        .bearer_token("glsa_service_token")
        .build()
        .unwrap();
    let api: std::sync::Arc<dyn AdminApi> = std::sync::Arc::new(AdminClient::new(transport));

    let msg = api.delete_user(&CallContext::new(), 8).await.unwrap();
    mock.assert();
    assert_eq!(msg.message.as_deref(), Some("User deleted"));
}

#[tokio::test]
async fn insecure_base_url_rejected_by_default() {
    let err = AdminClient::from_config(HttpClientConfig::new("http://grafana.internal:3000"))
        .unwrap_err();
    assert!(matches!(err, HttpError::InvalidScheme { .. }));
}
