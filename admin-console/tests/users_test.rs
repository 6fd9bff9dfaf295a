mod common;

use admin_console::error::ApiError;
use admin_console::models::{NewUser, Role, UserListQuery};
use common::{token, user_page, TestApp};
use wiremock::matchers::{body_json, header_exists, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_list_sends_filters_and_request_id() {
    let app = TestApp::spawn().await;
    app.sign_in(&token(3600, &["super_admin"]));

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("page", "1"))
        .and(query_param("page_size", "50"))
        .and(query_param("search", "ada"))
        .and(query_param("role", "scout"))
        .and(header_exists("x-request-id"))
        .and(header_exists("authorization"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(user_page(1, &["ada@example.com"])),
        )
        .expect(1)
        .mount(&app.app)
        .await;

    let page = app
        .state
        .user_client
        .list(&UserListQuery {
            page_size: 50,
            search: Some("ada".to_string()),
            role: Some(Role::Scout),
            ..UserListQuery::default()
        })
        .await
        .unwrap();

    assert_eq!(page.count, 1);
    assert_eq!(page.page, 1);
}

#[tokio::test]
async fn test_page_past_the_end_resets_to_first_page() {
    let app = TestApp::spawn().await;
    app.sign_in(&token(3600, &["admin"]));

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("page", "7"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({ "detail": "Invalid page." })),
        )
        .expect(1)
        .mount(&app.app)
        .await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(user_page(2, &["a@example.com", "b@example.com"])),
        )
        .expect(1)
        .mount(&app.app)
        .await;

    let page = app
        .state
        .user_client
        .list(&UserListQuery {
            page: 7,
            ..UserListQuery::default()
        })
        .await
        .unwrap();

    assert_eq!(page.page, 1);
    assert_eq!(page.results.len(), 2);
}

#[tokio::test]
async fn test_create_conflict_uses_server_message() {
    let app = TestApp::spawn().await;
    app.sign_in(&token(3600, &["admin"]));

    Mock::given(method("POST"))
        .and(path("/users"))
        .and(body_json(serde_json::json!({
            "email": "dup@example.com",
            "password": "long enough",
            "first_name": "Dee",
            "last_name": "Upe",
            "role": "scout",
            "is_active": true
        })))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "error": "Email already registered"
        })))
        .expect(1)
        .mount(&app.app)
        .await;

    let err = app
        .state
        .user_client
        .create(&NewUser {
            email: "dup@example.com".to_string(),
            password: "long enough".to_string(),
            first_name: "Dee".to_string(),
            last_name: "Upe".to_string(),
            role: Role::Scout,
            is_active: true,
        })
        .await
        .unwrap_err();

    match err {
        ApiError::Conflict(message) => assert_eq!(message, "Email already registered"),
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_missing_user_is_contextual() {
    let app = TestApp::spawn().await;
    app.sign_in(&token(3600, &["admin"]));

    Mock::given(method("DELETE"))
        .and(path("/users/99"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&app.app)
        .await;

    let err = app.state.user_client.delete("99").await.unwrap_err();
    assert_eq!(err.user_message(), "User not found.");
}

#[tokio::test]
async fn test_forbidden_hides_server_detail() {
    let app = TestApp::spawn().await;
    app.sign_in(&token(3600, &["admin"]));

    Mock::given(method("GET"))
        .and(path("/users/3"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "detail": "role check failed in policy engine"
        })))
        .expect(1)
        .mount(&app.app)
        .await;

    let err = app.state.user_client.get("3").await.unwrap_err();
    assert!(matches!(err, ApiError::Authorization(_)));
    assert!(!err.user_message().contains("policy"));
}
