/// Router tests over the in-memory store
///
/// Run with: cargo test -p promana-api

mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, TEST_PASSWORD};
use promana_shared::services::ADMIN_ROLE_MISSING;
use promana_shared::store::MemoryStore;
use serde_json::json;

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();

    let (status, body) = app.request(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_register_login_and_session() {
    let app = TestApp::new();
    let alice = app.register("alice").await;

    let (status, body) = app.get("/v1/auth/session", &alice.access_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["username"], "alice");

    let (status, body) = app
        .request(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({ "email": "ALICE@example.com", "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], alice.id.as_str());
    assert_eq!(body["token_type"], "Bearer");

    let (status, body) = app
        .request(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "Wrong1234" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let app = TestApp::new();
    app.register("alice").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/v1/auth/register",
            None,
            Some(json!({
                "email": "Alice@Example.com",
                "password": TEST_PASSWORD,
                "full_name": "Other Alice",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (status, body) = app
        .request(
            Method::POST,
            "/v1/auth/register",
            None,
            Some(json!({ "email": "not-an-email", "password": TEST_PASSWORD, "full_name": " " })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"full_name"));
}

#[tokio::test]
async fn test_create_project_makes_creator_admin() {
    let app = TestApp::new();
    let alice = app.register("alice").await;

    let (status, project) = app
        .post(
            "/v1/projects",
            &alice.access_token,
            json!({ "name": "Launch Plan", "description": "Q3 launch" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(project["name"], "Launch Plan");
    assert_eq!(project["status"], "active");
    let project_id = project["id"].as_str().unwrap();

    let (status, listed) = app.get("/v1/projects", &alice.access_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], project_id);

    let (status, members) = app
        .get(&format!("/v1/projects/{}/members", project_id), &alice.access_token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(members.as_array().unwrap().len(), 1);
    assert_eq!(members[0]["user_id"], alice.id.as_str());
    assert_eq!(members[0]["role_name"], "admin");

    assert_eq!(app.store.project_count().await, 1);
    assert_eq!(app.store.membership_count().await, 1);
}

#[tokio::test]
async fn test_projects_listed_newest_first() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    for name in ["First", "Second", "Third"] {
        app.create_project(&alice, name).await;
    }

    let (_, listed) = app.get("/v1/projects", &alice.access_token).await;
    let names: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Third", "Second", "First"]);
}

#[tokio::test]
async fn test_blank_project_name_rejected() {
    let app = TestApp::new();
    let alice = app.register("alice").await;

    let (status, body) = app
        .post("/v1/projects", &alice.access_token, json!({ "name": "   " }))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "name");
    assert_eq!(app.store.project_count().await, 0);
}

#[tokio::test]
async fn test_missing_admin_role_reports_role_not_found() {
    let app = TestApp::with_store(MemoryStore::new());
    let alice = app.register("alice").await;

    let (status, body) = app
        .post("/v1/projects", &alice.access_token, json!({ "name": "Launch Plan" }))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "role_not_found");
    assert_eq!(body["message"], ADMIN_ROLE_MISSING);
    assert_eq!(app.store.project_count().await, 0);
}

#[tokio::test]
async fn test_role_lookup_outage_is_unavailable() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    app.store.fail_role_lookups(true);

    let (status, body) = app
        .post("/v1/projects", &alice.access_token, json!({ "name": "Launch Plan" }))
        .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "service_unavailable");
    assert_eq!(app.store.project_count().await, 0);
}

#[tokio::test]
async fn test_failed_membership_insert_leaves_no_project() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    app.store.fail_membership_inserts(true);

    let (status, _) = app
        .post("/v1/projects", &alice.access_token, json!({ "name": "Launch Plan" }))
        .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(app.store.project_count().await, 0);
    assert_eq!(app.store.membership_count().await, 0);

    app.store.fail_membership_inserts(false);
    let (_, listed) = app.get("/v1/projects", &alice.access_token).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_workboards_and_tasks() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let project_id = app.create_project(&alice, "Launch Plan").await;

    let (status, board) = app
        .post(
            &format!("/v1/projects/{}/workboards", project_id),
            &alice.access_token,
            json!({ "name": "Backlog" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(board["project_id"], project_id.as_str());
    let board_id = board["id"].as_str().unwrap();

    let (status, fetched) = app
        .get(&format!("/v1/workboards/{}", board_id), &alice.access_token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Backlog");

    let (status, task) = app
        .post(
            &format!("/v1/workboards/{}/tasks", board_id),
            &alice.access_token,
            json!({ "title": "Draft announcement" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(task["due_date"].is_string());

    let (status, tasks) = app
        .get(&format!("/v1/workboards/{}/tasks", board_id), &alice.access_token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tasks[0]["title"], "Draft announcement");

    let (status, boards) = app
        .get(&format!("/v1/projects/{}/workboards", project_id), &alice.access_token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(boards.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_blank_workboard_name_rejected_without_insert() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let project_id = app.create_project(&alice, "Launch Plan").await;

    let (status, body) = app
        .post(
            &format!("/v1/projects/{}/workboards", project_id),
            &alice.access_token,
            json!({ "name": "" }),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "name");
    assert_eq!(app.store.workboard_count().await, 0);
}

#[tokio::test]
async fn test_non_member_is_forbidden() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let mallory = app.register("mallory").await;
    let project_id = app.create_project(&alice, "Launch Plan").await;

    let (status, body) = app
        .get(&format!("/v1/projects/{}", project_id), &mallory.access_token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You are not a member of this project");

    let (status, _) = app
        .post(
            &format!("/v1/projects/{}/workboards", project_id),
            &mallory.access_token,
            json!({ "name": "Hijack" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.store.workboard_count().await, 0);

    let (_, listed) = app.get("/v1/projects", &mallory.access_token).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_resources_are_not_found() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let missing = uuid::Uuid::new_v4();

    let (status, _) = app
        .get(&format!("/v1/projects/{}", missing), &alice.access_token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(
            &format!("/v1/workboards/{}/tasks", missing),
            &alice.access_token,
            json!({ "title": "Orphan" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_adds_member() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let project_id = app.create_project(&alice, "Launch Plan").await;
    let members_uri = format!("/v1/projects/{}/members", project_id);

    let (status, member) = app
        .post(&members_uri, &alice.access_token, json!({ "user": "bob" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(member["role_name"], "member");

    let (status, _) = app
        .post(&members_uri, &alice.access_token, json!({ "user": "bob@example.com" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, listed) = app.get("/v1/projects", &bob.access_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed[0]["id"], project_id.as_str());

    let (status, _) = app
        .post(&members_uri, &bob.access_token, json!({ "user": "alice" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::new();
    let alice = app.register("alice").await;

    let (status, body) = app
        .request(Method::POST, "/v1/auth/logout", Some(&alice.access_token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, body) = app.get("/v1/projects", &alice.access_token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Session has expired or was revoked");

    let (status, _) = app
        .request(
            Method::POST,
            "/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": alice.refresh_token })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_issues_working_token() {
    let app = TestApp::new();
    let alice = app.register("alice").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": alice.refresh_token })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let access = body["access_token"].as_str().unwrap();

    let (status, _) = app.get("/v1/auth/session", access).await;
    assert_eq!(status, StatusCode::OK);

    // Access tokens are not accepted as refresh tokens
    let (status, _) = app
        .request(
            Method::POST,
            "/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": alice.access_token })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bad_tokens_rejected() {
    let app = TestApp::new();

    let (status, _) = app.get("/v1/projects", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.request(Method::GET, "/v1/projects", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing authorization header");
}

#[tokio::test]
async fn test_check_username() {
    let app = TestApp::new();
    app.register("alice").await;

    let (status, body) = app
        .request(Method::GET, "/v1/auth/check-username", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["available"], false);
    assert_eq!(body["message"], "Username is required.");

    let (status, body) = app
        .request(Method::GET, "/v1/auth/check-username?username=alice", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
    assert_eq!(body["message"], "Username is already taken.");

    let (status, body) = app
        .request(Method::GET, "/v1/auth/check-username?username=bob", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], true);
    assert_eq!(body["message"], "Username is available.");
}

#[tokio::test]
async fn test_security_headers_on_api_responses() {
    let app = TestApp::new();

    let response = {
        use tower::ServiceExt;
        app.app
            .clone()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/health")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    };

    assert_eq!(
        response.headers().get("X-Content-Type-Options").unwrap(),
        "nosniff"
    );
    assert!(response.headers().get("Strict-Transport-Security").is_none());
}

#[tokio::test]
async fn test_padded_email_registers_and_logs_in() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            Method::POST,
            "/v1/auth/register",
            None,
            Some(json!({
                "email": " carol@example.com ",
                "password": TEST_PASSWORD,
                "full_name": "Carol",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["user"]["email"], "carol@example.com");

    let (status, body) = app
        .request(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({ "email": " carol@example.com ", "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert!(body["access_token"].is_string());
}

#[tokio::test]
async fn test_mistyped_body_field_is_a_json_validation_error() {
    let app = TestApp::new();
    let alice = app.register("alice").await;

    let (status, body) = app
        .post("/v1/projects", &alice.access_token, json!({ "name": 5 }))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "name");
    assert_eq!(app.store.project_count().await, 0);
}

#[tokio::test]
async fn test_malformed_body_and_bad_ids_use_json_errors() {
    use tower::ServiceExt;

    let app = TestApp::new();
    let alice = app.register("alice").await;

    let (status, body) = app
        .get("/v1/projects/not-a-uuid", &alice.access_token)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert_eq!(body["message"], "Invalid identifier in URL");

    let response = app
        .app
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .method(Method::POST)
                .uri("/v1/projects")
                .header("Authorization", format!("Bearer {}", alice.access_token))
                .header("Content-Type", "application/json")
                .body(axum::body::Body::from("{\"name\": "))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get("Content-Type").unwrap(),
        "application/json"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Request body is not valid JSON");
}
