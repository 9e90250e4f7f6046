//! HTTP-level tests for `ApiClient` against a mock backend.

use kwoon_core::api::{ApiClient, ApiError};
use kwoon_core::models::{
    DashboardStats, MediaType, RegistrationForm, RequestStatus, Role, UserFilter, UserStatus,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&server.uri())
        .expect("client builds")
        .with_token("access-1".to_string())
}

#[tokio::test]
async fn login_returns_session_for_email() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "ada@example.com", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "a",
            "refresh_token": "r",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(&format!("{}/", server.uri())).expect("client builds");
    let session = api.login("ada@example.com", "pw").await.expect("login");
    assert_eq!(session.access_token, "a");
    assert_eq!(session.refresh_token, "r");
    assert_eq!(session.email, "ada@example.com");
    assert!(!session.is_expired());
}

#[tokio::test]
async fn bad_credentials_surface_server_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Incorrect email or password"})),
        )
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).expect("client builds");
    let err = api.login("ada@example.com", "nope").await.unwrap_err();
    assert!(ApiError::is_auth_error(&err));
}

#[tokio::test]
async fn get_sends_bearer_token_and_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .and(header("authorization", "Bearer access-1"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "e1",
                "name": "Autumn seminar",
                "event_type": "SEMINAR",
                "start_datetime": "2026-10-01T10:00:00",
                "capacity": 20,
                "registration_count": 4
            }],
            "total": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client_for(&server).await;
    let events = api.fetch_events(Some(500)).await.expect("events");
    assert_eq!(events.len(), 1);
    assert!(events.items[0].is_seminar());
    assert!(!events.is_truncated());
}

#[tokio::test]
async fn get_retries_after_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/stats"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_schools": 3,
            "total_students": 40,
            "total_managers": 4,
            "active_events": 2,
            "pending_requests": 5,
            "pending_approvals": 1
        })))
        .mount(&server)
        .await;

    let api = client_for(&server).await;
    let stats = api.fetch_dashboard().await.expect("dashboard after retry");
    assert!(matches!(stats, DashboardStats::Admin(_)));
    assert_eq!(stats.pending_approvals(), 1);
}

#[tokio::test]
async fn writes_are_not_retried_on_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/events/e1/register"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let api = client_for(&server).await;
    let err = api
        .register_for_event("e1", &RegistrationForm::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ApiError>(),
        Some(ApiError::RateLimited)
    ));
}

#[tokio::test]
async fn validation_detail_is_user_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/events/e1/register"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"detail": "Already registered for this event"})),
        )
        .mount(&server)
        .await;

    let api = client_for(&server).await;
    let err = api
        .register_for_event("e1", &RegistrationForm::default())
        .await
        .unwrap_err();
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::Validation(msg)) => assert_eq!(msg, "Already registered for this event"),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn expired_token_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expired"})))
        .mount(&server)
        .await;

    let api = client_for(&server).await;
    let err = api.fetch_me().await.unwrap_err();
    assert!(ApiError::is_auth_error(&err));
}

#[tokio::test]
async fn media_list_is_bare_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/media/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "m1", "media_type": "IMAGE", "filename": "a.png",
             "file_url": "/uploads/a.png", "file_size": 2048},
            {"id": "m2", "media_type": "YOUTUBE", "file_url": "",
             "title": "Chi Sao", "youtube_url": "https://youtu.be/dQw4w9WgXcQ"}
        ])))
        .mount(&server)
        .await;

    let api = client_for(&server).await;
    let media = api.fetch_media().await.expect("media");
    assert_eq!(media.len(), 2);
    assert_eq!(media[0].media_type, MediaType::Image);
    assert_eq!(media[1].display_name(), "Chi Sao");
}

#[tokio::test]
async fn handle_request_sends_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/requests/r1/handle"))
        .and(body_json(json!({"status": "APPROVED"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Request approved"})))
        .expect(1)
        .mount(&server)
        .await;

    let api = client_for(&server).await;
    let ack = api
        .handle_request("r1", RequestStatus::Approved)
        .await
        .expect("handled");
    assert_eq!(ack.message, "Request approved");
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/schools/my-school"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let api = client_for(&server).await;
    let err = api.fetch_my_school().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ApiError>(),
        Some(ApiError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn user_filter_uses_wire_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/"))
        .and(query_param("role", "MANAGER"))
        .and(query_param("status", "ACTIVE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "u1",
                "email": "li@example.com",
                "first_name": "Li",
                "last_name": "Wen",
                "role": "MANAGER",
                "status": "ACTIVE"
            }],
            "total": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client_for(&server).await;
    let filter = UserFilter {
        role: Some(Role::Manager),
        status: Some(UserStatus::Active),
        ..Default::default()
    };
    let users = api.fetch_users(&filter).await.expect("users");
    assert_eq!(users.items[0].status, UserStatus::Active);
}
