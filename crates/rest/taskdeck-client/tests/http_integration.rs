//! End-to-end tests for the client adapter and the task-list view-model
//! against a mock backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use taskdeck_api::auth::{LoginRequest, RegisterRequest};
use taskdeck_api::{Priority, TaskCreate, TaskQuery, TaskUpdate};
use taskdeck_client::{ApiError, Filter, TaskApiClient, TaskApiClientBuilder, TaskList};
use taskdeck_session::SessionStore;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn task_json(id: i64, title: &str, completed: bool, priority: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "completed": completed,
        "priority": priority,
        "user_id": 1,
        "created_at": "2026-01-10T08:00:00Z",
        "updated_at": "2026-01-10T08:00:00Z"
    })
}

fn client_for(server: &MockServer, session: SessionStore) -> TaskApiClient {
    TaskApiClientBuilder::new(server.uri())
        .with_session(session)
        .build()
        .unwrap()
}

fn authenticated_client(server: &MockServer) -> TaskApiClient {
    let session = SessionStore::in_memory();
    session.set("sesame").unwrap();
    client_for(server, session)
}

#[tokio::test]
async fn test_load_replaces_list_and_filters_partition() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            task_json(1, "A", false, "low"),
            task_json(2, "B", true, "medium"),
            task_json(3, "C", false, "high"),
        ])))
        .mount(&server)
        .await;

    let mut list = TaskList::new(authenticated_client(&server));
    list.load().await.unwrap();
    assert!(!list.is_loading());
    assert_eq!(list.tasks().len(), 3);

    let active = list.filtered(Filter::Active);
    let completed = list.filtered(Filter::Completed);
    let all = list.filtered(Filter::All);

    assert_eq!(
        active.iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![1, 3]
    );
    assert_eq!(
        completed.iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![2]
    );
    // Active and completed partition the full list with no overlap.
    assert_eq!(active.len() + completed.len(), all.len());
    assert!(active.iter().all(|t| !completed.iter().any(|c| c.id == t.id)));
}

#[tokio::test]
async fn test_single_active_task_scenario() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([task_json(1, "A", false, "low")])),
        )
        .mount(&server)
        .await;

    let mut list = TaskList::new(authenticated_client(&server));
    list.load().await.unwrap();

    let active = list.filtered(Filter::Active);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, 1);
    assert_eq!(active[0].title, "A");
    assert_eq!(active[0].priority, Priority::Low);
    assert!(list.filtered(Filter::Completed).is_empty());
}

#[tokio::test]
async fn test_bearer_token_attached_to_task_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .and(header("Authorization", "Bearer sesame"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = authenticated_client(&server);
    client.list_tasks(&TaskQuery::default()).await.unwrap();
    server.verify().await;
}

#[tokio::test]
async fn test_list_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .and(query_param("completed", "false"))
        .and(query_param("priority", "high"))
        .and(query_param("search", "report"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = authenticated_client(&server);
    let query = TaskQuery {
        completed: Some(false),
        priority: Some(Priority::High),
        search: Some("report".to_string()),
    };
    client.list_tasks(&query).await.unwrap();
    server.verify().await;
}

#[tokio::test]
async fn test_login_stores_token_and_sends_no_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "fresh-token",
            "token_type": "bearer",
            "user": {"id": 1, "email": "ada@example.com", "name": "Ada"}
        })))
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    session.set("stale-token").unwrap();
    let client = client_for(&server, session.clone());

    let response = client
        .login(&LoginRequest {
            email: "ada@example.com".to_string(),
            password: "hunter2".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.user.id, 1);
    assert_eq!(session.token().as_deref(), Some("fresh-token"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_create_prepends_new_task() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([task_json(1, "A", false, "low")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(task_json(2, "B", false, "medium")),
        )
        .mount(&server)
        .await;

    let mut list = TaskList::new(authenticated_client(&server));
    list.load().await.unwrap();
    list.create(TaskCreate::new("B")).await.unwrap();

    let ids: Vec<i64> = list.tasks().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[tokio::test]
async fn test_create_with_empty_title_sends_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut list = TaskList::new(authenticated_client(&server));
    let err = list.create(TaskCreate::new("   ")).await.unwrap_err();

    assert!(matches!(err, ApiError::Validation { .. }));
    assert_eq!(list.last_error(), Some("Title is required"));
    assert!(list.tasks().is_empty());
    server.verify().await;
}

#[tokio::test]
async fn test_toggle_patches_only_the_completed_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([task_json(1, "A", false, "low")])),
        )
        .mount(&server)
        .await;
    // The server response carries a different title and a fresh
    // updated_at; only `completed` may reach the local entry.
    let mut toggled = task_json(1, "A renamed elsewhere", true, "low");
    toggled["updated_at"] = serde_json::json!("2026-01-11T09:00:00Z");
    Mock::given(method("PATCH"))
        .and(path("/api/tasks/1/complete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(toggled))
        .mount(&server)
        .await;

    let mut list = TaskList::new(authenticated_client(&server));
    list.load().await.unwrap();
    let before = list.tasks()[0].clone();

    list.toggle_complete(1).await.unwrap();

    let after = &list.tasks()[0];
    assert!(after.completed);
    assert_eq!(after.title, before.title);
    assert_eq!(after.updated_at, before.updated_at);
    assert_eq!(after.description, before.description);
}

#[tokio::test]
async fn test_toggle_for_unknown_id_sends_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/tasks/1/complete"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut list = TaskList::new(authenticated_client(&server));
    list.toggle_complete(1).await.unwrap();
    server.verify().await;
}

#[tokio::test]
async fn test_remove_without_confirmation_sends_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([task_json(1, "A", false, "low")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/tasks/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut list = TaskList::new(authenticated_client(&server));
    list.load().await.unwrap();
    list.remove(1, false).await.unwrap();

    assert_eq!(list.tasks().len(), 1);
    server.verify().await;
}

#[tokio::test]
async fn test_remove_confirmed_deletes_locally_and_failure_keeps_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            task_json(1, "A", false, "low"),
            task_json(2, "B", false, "low"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/tasks/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Task deleted successfully"
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/tasks/2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let mut list = TaskList::new(authenticated_client(&server));
    list.load().await.unwrap();

    list.remove(1, true).await.unwrap();
    assert_eq!(list.tasks().len(), 1);
    assert_eq!(list.tasks()[0].id, 2);

    let err = list.remove(2, true).await.unwrap_err();
    assert!(matches!(err, ApiError::Server { .. }));
    assert_eq!(list.tasks().len(), 1);
    assert_eq!(list.last_error(), Some("Failed to delete task"));
}

#[tokio::test]
async fn test_unauthorized_clears_token_and_fires_hook_once_per_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "detail": "Could not validate credentials"
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/tasks/1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "detail": "Could not validate credentials"
        })))
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    session.set("expired").unwrap();
    let fired = Arc::new(AtomicUsize::new(0));
    let hook_count = fired.clone();
    let client = TaskApiClientBuilder::new(server.uri())
        .with_session(session.clone())
        .on_auth_failure(move || {
            hook_count.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap();

    let err = client.list_tasks(&TaskQuery::default()).await.unwrap_err();
    assert!(matches!(err, ApiError::Auth { .. }));
    assert!(session.token().is_none());
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    // A second failing response triggers the side effect again, once.
    session.set("expired-again").unwrap();
    let _ = client.delete_task(1).await.unwrap_err();
    assert!(session.token().is_none());
    assert_eq!(fired.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_logout_is_local_only() {
    let server = MockServer::start().await;

    let session = SessionStore::in_memory();
    session.set("sesame").unwrap();
    let client = client_for(&server, session.clone());

    client.logout().unwrap();

    assert!(session.token().is_none());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_load_failure_preserves_previous_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([task_json(1, "A", false, "low")])),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let mut list = TaskList::new(authenticated_client(&server));
    list.load().await.unwrap();
    assert_eq!(list.tasks().len(), 1);

    let err = list.load().await.unwrap_err();
    assert!(matches!(err, ApiError::Server { .. }));
    assert_eq!(list.tasks().len(), 1);
    assert_eq!(list.last_error(), Some("Failed to load tasks"));
    assert!(!list.is_loading());
}

#[tokio::test]
async fn test_error_status_mapping() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/tasks/9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "detail": "Task not found"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "detail": "Email already registered"
        })))
        .mount(&server)
        .await;

    let client = authenticated_client(&server);

    match client.delete_task(9).await.unwrap_err() {
        ApiError::NotFound { detail } => assert_eq!(detail, "Task not found"),
        other => panic!("expected NotFound, got {other:?}"),
    }

    let request = RegisterRequest {
        email: "ada@example.com".to_string(),
        password: "hunter2".to_string(),
        name: None,
    };
    match client.register(&request).await.unwrap_err() {
        ApiError::Validation { detail } => assert_eq!(detail, "Email already registered"),
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_task_fetches_a_single_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json(7, "A", false, "low")))
        .mount(&server)
        .await;

    let client = authenticated_client(&server);
    let task = client.get_task(7).await.unwrap();
    assert_eq!(task.id, 7);

    match client.get_task(8).await.unwrap_err() {
        ApiError::NotFound { .. } => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_update_sends_only_the_set_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/tasks/1"))
        .and(body_json(serde_json::json!({"title": "A, rephrased"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(task_json(1, "A, rephrased", false, "low")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = authenticated_client(&server);
    let update = TaskUpdate {
        title: Some("A, rephrased".to_string()),
        ..TaskUpdate::default()
    };
    let task = client.update_task(1, &update).await.unwrap();
    assert_eq!(task.title, "A, rephrased");
    server.verify().await;
}

#[tokio::test]
async fn test_network_failure_surfaces_as_network_error() {
    // Point the client at a server that is no longer there.
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = TaskApiClientBuilder::new(uri).build().unwrap();
    let err = client.list_tasks(&TaskQuery::default()).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
}
