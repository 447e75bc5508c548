use super::test_util::{self, TEST_PASSWORD, TEST_USERNAME};
use crate::api::test_util::deserialize_body;
use crate::dto;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use axum::response::Response;
use speculoos::prelude::*;
use tower::ServiceExt;

/// Fires a request at the router with the test credentials attached
async fn send_authed(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("username", TEST_USERNAME)
        .header("password", TEST_PASSWORD);
    let request = match body {
        Some(json_body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::to_vec(&json_body).expect("request body should serialize"),
            ))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    };

    router
        .clone()
        .oneshot(request)
        .await
        .expect("router should produce a response")
}

async fn create_user(router: &Router, name: &str) -> dto::user::TodoUser {
    let response = send_authed(
        router,
        Method::POST,
        "/api/users",
        Some(serde_json::json!({ "name": name })),
    )
    .await;
    assert_eq!(StatusCode::CREATED, response.status());

    deserialize_body(response.into_body()).await
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn can_create_user_with_empty_task_list() {
    test_util::prepare_db_and_test(|pool| async move {
        let router = test_util::app_router(pool);

        let created = create_user(&router, "Ana").await;
        assert_eq!("Ana", created.name);
        let list = created
            .task_list
            .as_ref()
            .expect("new users must own a task list");
        assert_that!(list.tasks).is_empty();

        let fetch_response = send_authed(
            &router,
            Method::GET,
            &format!("/api/users/{}", created.id),
            None,
        )
        .await;
        assert_eq!(StatusCode::OK, fetch_response.status());
        let fetched: dto::user::TodoUser = deserialize_body(fetch_response.into_body()).await;
        assert_eq!(created, fetched);

        // looking the list up by owner resolves to the one provisioned at signup
        let list_response = send_authed(
            &router,
            Method::GET,
            &format!("/api/users/{}/tasklist", created.id),
            None,
        )
        .await;
        assert_eq!(StatusCode::OK, list_response.status());
        let owned_list: dto::task_list::TaskList =
            deserialize_body(list_response.into_body()).await;
        assert_eq!(list.id, owned_list.id);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn requests_without_credentials_get_401() {
    test_util::prepare_db_and_test(|pool| async move {
        let router = test_util::app_router(pool);

        // the welcome route is guarded just like the API subtree
        for uri in ["/api/users", "/"] {
            let response = router
                .clone()
                .oneshot(
                    Request::builder()
                        .uri(uri)
                        .body(Body::empty())
                        .expect("request should build"),
                )
                .await
                .expect("router should produce a response");

            assert_eq!(StatusCode::UNAUTHORIZED, response.status(), "uri: {uri}");
        }

        let welcome_response = send_authed(&router, Method::GET, "/", None).await;
        assert_eq!(StatusCode::OK, welcome_response.status());
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn unknown_entities_get_404() {
    test_util::prepare_db_and_test(|pool| async move {
        let router = test_util::app_router(pool);

        let user_response = send_authed(&router, Method::GET, "/api/users/999", None).await;
        assert_eq!(StatusCode::NOT_FOUND, user_response.status());

        let task_response = send_authed(&router, Method::GET, "/api/tasks/999", None).await;
        assert_eq!(StatusCode::NOT_FOUND, task_response.status());

        let list_response = send_authed(&router, Method::GET, "/api/tasklists/999", None).await;
        assert_eq!(StatusCode::NOT_FOUND, list_response.status());
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn can_search_users_by_name_fragment() {
    test_util::prepare_db_and_test(|pool| async move {
        let router = test_util::app_router(pool);

        create_user(&router, "Ana Clara").await;
        create_user(&router, "Bruno").await;

        let response = send_authed(&router, Method::GET, "/api/users/search?name=Ana", None).await;
        assert_eq!(StatusCode::OK, response.status());
        let found: Vec<dto::user::TodoUser> = deserialize_body(response.into_body()).await;
        assert_that!(found).matches(|users| {
            matches!(users.as_slice(), [dto::user::TodoUser { name, .. }] if name == "Ana Clara")
        });
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn task_lifecycle_works_end_to_end() {
    test_util::prepare_db_and_test(|pool| async move {
        let router = test_util::app_router(pool);
        let ana = create_user(&router, "Ana").await;
        let tasks_uri = format!("/api/users/{}/tasks", ana.id);

        // two tasks land on Ana's list, in order
        for description in ["water the plants", "buy groceries"] {
            let response = send_authed(
                &router,
                Method::POST,
                &tasks_uri,
                Some(serde_json::json!({ "description": description })),
            )
            .await;
            assert_eq!(StatusCode::CREATED, response.status());
        }

        let listing_response = send_authed(&router, Method::GET, &tasks_uri, None).await;
        assert_eq!(StatusCode::OK, listing_response.status());
        let tasks: Vec<dto::task::TodoTask> = deserialize_body(listing_response.into_body()).await;
        assert_eq!(2, tasks.len());
        assert_eq!("water the plants", tasks[0].description);
        assert_eq!("buy groceries", tasks[1].description);
        assert!(!tasks[0].finished);

        // finishing is visible on the next read, and is idempotent
        let first_task_id = tasks[0].id;
        for _ in 0..2 {
            let finish_response = send_authed(
                &router,
                Method::PATCH,
                &format!("/api/tasks/{first_task_id}/finish"),
                None,
            )
            .await;
            assert_eq!(StatusCode::OK, finish_response.status());
            let finished: dto::task::TodoTask =
                deserialize_body(finish_response.into_body()).await;
            assert!(finished.finished);
        }

        let unfinish_response = send_authed(
            &router,
            Method::PATCH,
            &format!("/api/tasks/{first_task_id}/unfinish"),
            None,
        )
        .await;
        assert_eq!(StatusCode::OK, unfinish_response.status());
        let reopened: dto::task::TodoTask = deserialize_body(unfinish_response.into_body()).await;
        assert!(!reopened.finished);

        // description updates keep the task in place
        let update_response = send_authed(
            &router,
            Method::PUT,
            &format!("/api/tasks/{first_task_id}"),
            Some(serde_json::json!({ "description": "water the garden" })),
        )
        .await;
        assert_eq!(StatusCode::OK, update_response.status());

        // the user's list carries both tasks, still in insertion order
        let list_response = send_authed(
            &router,
            Method::GET,
            &format!("/api/users/{}/tasklist", ana.id),
            None,
        )
        .await;
        assert_eq!(StatusCode::OK, list_response.status());
        let list: dto::task_list::TaskList = deserialize_body(list_response.into_body()).await;
        assert_eq!(2, list.tasks.len());
        assert_eq!("water the garden", list.tasks[0].description);

        // deleting a task removes it for good
        let delete_response = send_authed(
            &router,
            Method::DELETE,
            &format!("/api/tasks/{first_task_id}"),
            None,
        )
        .await;
        assert_eq!(StatusCode::OK, delete_response.status());

        let deleted_fetch = send_authed(
            &router,
            Method::GET,
            &format!("/api/tasks/{first_task_id}"),
            None,
        )
        .await;
        assert_eq!(StatusCode::NOT_FOUND, deleted_fetch.status());
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn blank_task_descriptions_get_400() {
    test_util::prepare_db_and_test(|pool| async move {
        let router = test_util::app_router(pool);
        let ana = create_user(&router, "Ana").await;

        let response = send_authed(
            &router,
            Method::POST,
            &format!("/api/users/{}/tasks", ana.id),
            Some(serde_json::json!({ "description": "   " })),
        )
        .await;

        assert_eq!(StatusCode::BAD_REQUEST, response.status());
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn deleting_a_user_with_a_list_surfaces_the_constraint() {
    test_util::prepare_db_and_test(|pool| async move {
        let router = test_util::app_router(pool);
        let ana = create_user(&router, "Ana").await;

        let response = send_authed(
            &router,
            Method::DELETE,
            &format!("/api/users/{}", ana.id),
            None,
        )
        .await;

        // the user row can't go away while the task list still references it
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
    });
}
