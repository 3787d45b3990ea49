mod common;

use common::{key_request_json, TestPortal, TEST_AUTH_HEADER};
use key_portal::models::{KeyRequestState, RequestFilter};
use key_portal::services::Navigation;
use key_portal::ErrorKind;
use portal_core::error::{AuthFailure, NOT_AUTHENTICATED_MESSAGE, UNAUTHORIZED_MESSAGE};
use tokio::sync::broadcast::error::TryRecvError;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn list_requests_sends_identity_and_filter() {
    let app = TestPortal::spawn().await;
    app.sign_in();

    Mock::given(method("GET"))
        .and(path("/api/admin/requests"))
        .and(query_param("filter", "pending"))
        .and(header("authorization", TEST_AUTH_HEADER))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            key_request_json("req-1", "pending"),
            key_request_json("req-2", "pending"),
        ])))
        .expect(1)
        .mount(&app.server)
        .await;

    let requests = app
        .portal
        .admin()
        .list_requests(RequestFilter::default())
        .await
        .expect("list should succeed");

    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].request_id, "req-1");
    assert_eq!(requests[1].state, KeyRequestState::Pending);
    assert_eq!(
        requests[0].created_at.to_rfc3339(),
        "2025-06-01T12:00:00.123456+00:00"
    );
}

#[tokio::test]
async fn list_requests_accepts_wrapped_response() {
    let app = TestPortal::spawn().await;
    app.sign_in();

    Mock::given(method("GET"))
        .and(path("/api/admin/requests"))
        .and(query_param("filter", "review"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "requests": [key_request_json("req-9", "in-review")]
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    let requests = app
        .portal
        .admin()
        .list_requests(RequestFilter::Review)
        .await
        .unwrap();

    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].state, KeyRequestState::InReview);
}

#[tokio::test]
async fn request_details_by_id() {
    let app = TestPortal::spawn().await;
    app.sign_in();

    Mock::given(method("GET"))
        .and(path("/api/admin/requests/req-7"))
        .and(header("authorization", TEST_AUTH_HEADER))
        .respond_with(ResponseTemplate::new(200).set_body_json(key_request_json("req-7", "approved")))
        .expect(1)
        .mount(&app.server)
        .await;

    let request = app.portal.admin().request_details("req-7").await.unwrap();

    assert_eq!(request.request_id, "req-7");
    assert_eq!(request.state, KeyRequestState::Approved);
    assert_eq!(request.email, "user@example.com");
}

#[tokio::test]
async fn approve_posts_to_action_path() {
    let app = TestPortal::spawn().await;
    app.sign_in();

    Mock::given(method("POST"))
        .and(path("/api/admin/requests/req-1/approve"))
        .and(header("authorization", TEST_AUTH_HEADER))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Request approved",
            "success": true,
            "request_id": "req-1",
            "state": "approved"
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    let response = app.portal.admin().approve("req-1").await.unwrap();

    assert_eq!(response.message.as_deref(), Some("Request approved"));
    assert_eq!(response.state, Some(KeyRequestState::Approved));
}

#[tokio::test]
async fn deny_forwards_reason_verbatim() {
    let app = TestPortal::spawn().await;
    app.sign_in();

    let reason = "  Duplicate request; contact support  ";
    Mock::given(method("POST"))
        .and(path("/api/admin/requests/req-3/deny"))
        .and(body_json(serde_json::json!({ "reason": reason })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Request denied",
            "state": "denied"
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    let response = app.portal.admin().deny("req-3", reason).await.unwrap();
    assert_eq!(response.state, Some(KeyRequestState::Denied));
}

#[tokio::test]
async fn admin_calls_without_session_fail_before_network() {
    let app = TestPortal::spawn().await;
    let mut navigation = app.portal.subscribe();
    let admin = app.portal.admin();

    let results = vec![
        admin.list_requests(RequestFilter::All).await.map(|_| ()),
        admin.request_details("req-1").await.map(|_| ()),
        admin.approve("req-1").await.map(|_| ()),
        admin.deny("req-1", "no").await.map(|_| ()),
    ];

    for result in results {
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
        assert_eq!(err.auth_failure(), Some(AuthFailure::MissingCredentials));
        assert_eq!(err.message(), NOT_AUTHENTICATED_MESSAGE);
    }

    assert_eq!(app.request_count().await, 0);
    assert_eq!(app.storage.clears(), 0);
    assert!(matches!(navigation.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn rejection_on_any_endpoint_clears_session_once_and_signals_login() {
    let endpoints: Vec<(&str, &str)> = vec![
        ("GET", "/api/admin/requests"),
        ("GET", "/api/admin/requests/req-1"),
        ("POST", "/api/admin/requests/req-1/approve"),
        ("POST", "/api/admin/requests/req-1/deny"),
    ];

    for (verb, endpoint) in endpoints {
        let app = TestPortal::spawn().await;
        app.sign_in();
        let mut navigation = app.portal.subscribe();

        Mock::given(method(verb))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "detail": "Invalid credentials"
            })))
            .expect(1)
            .mount(&app.server)
            .await;

        let admin = app.portal.admin();
        let result = match endpoint {
            "/api/admin/requests" => admin.list_requests(RequestFilter::Pending).await.map(|_| ()),
            "/api/admin/requests/req-1" => admin.request_details("req-1").await.map(|_| ()),
            "/api/admin/requests/req-1/approve" => admin.approve("req-1").await.map(|_| ()),
            _ => admin.deny("req-1", "spam").await.map(|_| ()),
        };

        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated, "{}", endpoint);
        assert_eq!(err.auth_failure(), Some(AuthFailure::Rejected));
        assert_eq!(err.message(), UNAUTHORIZED_MESSAGE);

        assert_eq!(app.storage.clears(), 1, "{}", endpoint);
        assert!(!app.portal.session().is_authenticated());
        assert_eq!(navigation.try_recv().unwrap(), Navigation::Login);
        assert!(matches!(navigation.try_recv(), Err(TryRecvError::Empty)));
    }
}

#[tokio::test]
async fn session_stays_cleared_after_rejection() {
    let app = TestPortal::spawn().await;
    app.sign_in();

    Mock::given(method("GET"))
        .and(path("/api/admin/requests"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&app.server)
        .await;

    let first = app.portal.admin().list_requests(RequestFilter::All).await.unwrap_err();
    assert_eq!(first.auth_failure(), Some(AuthFailure::Rejected));

    // Second call never reaches the server.
    let second = app.portal.admin().list_requests(RequestFilter::All).await.unwrap_err();
    assert_eq!(second.auth_failure(), Some(AuthFailure::MissingCredentials));
    assert_eq!(app.request_count().await, 1);
}

#[tokio::test]
async fn non_auth_failures_keep_the_session() {
    let app = TestPortal::spawn().await;
    app.sign_in();
    let mut navigation = app.portal.subscribe();

    Mock::given(method("POST"))
        .and(path("/api/admin/requests/req-1/approve"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "message": "Request already approved"
        })))
        .mount(&app.server)
        .await;

    let err = app.portal.admin().approve("req-1").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Request);
    assert_eq!(err.status(), 409);
    assert_eq!(err.message(), "Request already approved");
    assert!(app.portal.session().is_authenticated());
    assert_eq!(app.storage.clears(), 0);
    assert!(matches!(navigation.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn forbidden_is_a_request_error_not_a_logout() {
    let app = TestPortal::spawn().await;
    app.sign_in();

    Mock::given(method("GET"))
        .and(path("/api/admin/requests/req-1"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&app.server)
        .await;

    let err = app.portal.admin().request_details("req-1").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Request);
    assert_eq!(err.status(), 403);
    assert_eq!(err.message(), "Request failed");
    assert!(app.portal.session().is_authenticated());
}
