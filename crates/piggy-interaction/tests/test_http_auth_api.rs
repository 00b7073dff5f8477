use piggy_core::auth::{
    ApiError, AuthApi, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest,
    RefreshRequest, RegisterRequest, ResetPasswordRequest,
};
use piggy_interaction::HttpAuthApi;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_json() -> serde_json::Value {
    json!({
        "id": 12,
        "username": "alice",
        "email": "alice@example.com",
        "createdAt": "2024-02-03T04:05:06Z"
    })
}

#[tokio::test]
async fn test_login_unwraps_data_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({
            "usernameOrEmail": "alice",
            "password": "piggybank1",
            "rememberMe": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "accessToken": "at-1",
                "refreshToken": "rt-1",
                "user": user_json()
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpAuthApi::new(server.uri());
    let tokens = api
        .login(&LoginRequest {
            username_or_email: "alice".into(),
            password: "piggybank1".into(),
            remember_me: true,
        })
        .await
        .unwrap();

    assert_eq!(tokens.access_token, "at-1");
    assert_eq!(tokens.refresh_token, "rt-1");
    assert_eq!(tokens.user.id, "12");
    assert_eq!(tokens.user.username, "alice");
}

#[tokio::test]
async fn test_register_accepts_bare_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "piggybank1"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "accessToken": "at-2",
            "refreshToken": "rt-2",
            "user": user_json()
        })))
        .mount(&server)
        .await;

    let api = HttpAuthApi::new(server.uri());
    let tokens = api
        .register(&RegisterRequest {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "piggybank1".into(),
        })
        .await
        .unwrap();

    assert_eq!(tokens.access_token, "at-2");
    assert_eq!(tokens.user.email, "alice@example.com");
}

#[tokio::test]
async fn test_login_rejection_carries_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let api = HttpAuthApi::new(server.uri());
    let err = api
        .login(&LoginRequest {
            username_or_email: "alice".into(),
            password: "wrong".into(),
            remember_me: false,
        })
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::rejected(401, "Invalid credentials"));
}

#[tokio::test]
async fn test_rejection_without_message_uses_status_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/forgot-password"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let api = HttpAuthApi::new(server.uri());
    let err = api
        .forgot_password(&ForgotPasswordRequest {
            email: "alice@example.com".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert_eq!(err.message(), "Request failed: 503");
}

#[tokio::test]
async fn test_verify_sends_bearer_and_accepts_nested_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/verify"))
        .and(header("Authorization", "Bearer at-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"user": user_json()}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpAuthApi::new(server.uri());
    let user = api.verify("at-1").await.unwrap();
    assert_eq!(user.username, "alice");
}

#[tokio::test]
async fn test_verify_accepts_direct_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(&server)
        .await;

    let api = HttpAuthApi::new(server.uri());
    assert_eq!(api.verify("at").await.unwrap().id, "12");
}

#[tokio::test]
async fn test_verify_with_unexpected_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let api = HttpAuthApi::new(server.uri());
    assert!(matches!(api.verify("at").await, Err(ApiError::Decode(_))));
}

#[tokio::test]
async fn test_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({"refreshToken": "rt-1"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"accessToken": "at-new"}})),
        )
        .mount(&server)
        .await;

    let api = HttpAuthApi::new(server.uri());
    let refreshed = api
        .refresh(&RefreshRequest {
            refresh_token: "rt-1".into(),
        })
        .await
        .unwrap();
    assert_eq!(refreshed.access_token, "at-new");
}

#[tokio::test]
async fn test_empty_success_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .and(header("Authorization", "Bearer at-1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/change-password"))
        .and(header("Authorization", "Bearer at-1"))
        .and(body_json(json!({
            "currentPassword": "old-pass1",
            "newPassword": "new-pass1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/reset-password"))
        .and(body_json(json!({"token": "reset-tok", "newPassword": "new-pass1"})))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let api = HttpAuthApi::new(server.uri());
    api.logout("at-1").await.unwrap();
    api.change_password(
        "at-1",
        &ChangePasswordRequest {
            current_password: "old-pass1".into(),
            new_password: "new-pass1".into(),
        },
    )
    .await
    .unwrap();
    api.reset_password(&ResetPasswordRequest {
        token: "reset-tok".into(),
        new_password: "new-pass1".into(),
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_slow_server_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/verify"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(user_json())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let api = HttpAuthApi::new(server.uri()).with_timeout(Duration::from_millis(100));
    assert!(matches!(api.verify("at").await, Err(ApiError::Transport(_))));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Port 9 (discard) is essentially never listening.
    let api = HttpAuthApi::new("http://127.0.0.1:9").with_timeout(Duration::from_secs(2));
    let err = api.logout("at").await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert!(err.status().is_none());
}
