use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::{
    GenericErrorResponse, Json, NotFoundResponse, ValidationErrorResponse,
};
use crate::{AppState, SharedData, domain, dto, persistence};
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::{delete, get, post, put};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;
use validator::Validate;

/// OpenAPI definitions for the user routes
#[derive(OpenApi)]
#[openapi(
    paths(
        get_users,
        create_user,
        search_users,
        get_user,
        update_user,
        delete_user,
        get_tasks_for_user,
        add_task_for_user,
        get_task_list_for_user,
    ),
    tags((name = "users", description = "User management and user-owned resources"))
)]
pub struct UsersApi;

/// Builds a router for all the user routes
pub fn user_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/",
            get(|State(app_data): AppState| async move {
                let mut ext_cxn = app_data.ext_cxn.clone();
                let user_service = domain::user::UserService {};
                let user_reader = persistence::db_user_driven_ports::DbUserReader {};

                get_users(&mut ext_cxn, &user_service, &user_reader).await
            }),
        )
        .route(
            "/",
            post(
                |State(app_data): AppState, Json(new_user): Json<dto::user::NewUser>| async move {
                    let mut ext_cxn = app_data.ext_cxn.clone();
                    let user_service = domain::user::UserService {};
                    let user_writer = persistence::db_user_driven_ports::DbUserWriter {};

                    create_user(new_user, &mut ext_cxn, &user_service, &user_writer).await
                },
            ),
        )
        .route(
            "/search",
            get(
                |State(app_data): AppState, Query(search): Query<UserSearchQuery>| async move {
                    let mut ext_cxn = app_data.ext_cxn.clone();
                    let user_service = domain::user::UserService {};
                    let user_reader = persistence::db_user_driven_ports::DbUserReader {};

                    search_users(search.name, &mut ext_cxn, &user_service, &user_reader).await
                },
            ),
        )
        .route(
            "/:user_id",
            get(
                |State(app_data): AppState, Path(user_id): Path<i32>| async move {
                    let mut ext_cxn = app_data.ext_cxn.clone();
                    let user_service = domain::user::UserService {};
                    let user_reader = persistence::db_user_driven_ports::DbUserReader {};

                    get_user(user_id, &mut ext_cxn, &user_service, &user_reader).await
                },
            ),
        )
        .route(
            "/:user_id",
            put(
                |State(app_data): AppState,
                 Path(user_id): Path<i32>,
                 Json(update): Json<dto::user::UpdateUser>| async move {
                    let mut ext_cxn = app_data.ext_cxn.clone();
                    let user_service = domain::user::UserService {};
                    let user_reader = persistence::db_user_driven_ports::DbUserReader {};
                    let user_writer = persistence::db_user_driven_ports::DbUserWriter {};

                    update_user(
                        user_id,
                        update,
                        &mut ext_cxn,
                        &user_service,
                        &user_reader,
                        &user_writer,
                    )
                    .await
                },
            ),
        )
        .route(
            "/:user_id",
            delete(
                |State(app_data): AppState, Path(user_id): Path<i32>| async move {
                    let mut ext_cxn = app_data.ext_cxn.clone();
                    let user_service = domain::user::UserService {};
                    let user_detector = persistence::db_user_driven_ports::DbUserDetector {};
                    let user_writer = persistence::db_user_driven_ports::DbUserWriter {};

                    delete_user(
                        user_id,
                        &mut ext_cxn,
                        &user_service,
                        &user_detector,
                        &user_writer,
                    )
                    .await
                },
            ),
        )
        .route(
            "/:user_id/tasks",
            get(
                |State(app_data): AppState, Path(user_id): Path<i32>| async move {
                    let mut ext_cxn = app_data.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};
                    let user_detector = persistence::db_user_driven_ports::DbUserDetector {};
                    let list_reader = persistence::db_task_list_driven_ports::DbListReader {};

                    get_tasks_for_user(
                        user_id,
                        &mut ext_cxn,
                        &task_service,
                        &user_detector,
                        &list_reader,
                    )
                    .await
                },
            ),
        )
        .route(
            "/:user_id/tasks",
            post(
                |State(app_data): AppState,
                 Path(user_id): Path<i32>,
                 Json(new_task): Json<dto::task::NewTask>| async move {
                    let mut ext_cxn = app_data.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};
                    let user_detector = persistence::db_user_driven_ports::DbUserDetector {};
                    let list_reader = persistence::db_task_list_driven_ports::DbListReader {};
                    let task_writer = persistence::db_task_driven_ports::DbTaskWriter {};

                    add_task_for_user(
                        user_id,
                        new_task,
                        &mut ext_cxn,
                        &task_service,
                        &user_detector,
                        &list_reader,
                        &task_writer,
                    )
                    .await
                },
            ),
        )
        .route(
            "/:user_id/tasklist",
            get(
                |State(app_data): AppState, Path(user_id): Path<i32>| async move {
                    let mut ext_cxn = app_data.ext_cxn.clone();
                    let list_service = domain::task_list::ListService {};
                    let user_detector = persistence::db_user_driven_ports::DbUserDetector {};
                    let list_reader = persistence::db_task_list_driven_ports::DbListReader {};

                    get_task_list_for_user(
                        user_id,
                        &mut ext_cxn,
                        &list_service,
                        &user_detector,
                        &list_reader,
                    )
                    .await
                },
            ),
        )
}

#[derive(Deserialize)]
struct UserSearchQuery {
    name: String,
}

/// Maps a [UserError][domain::user::driving_ports::UserError] to an HTTP response
fn user_error_response(err: domain::user::driving_ports::UserError) -> ErrorResponse {
    match err {
        domain::user::driving_ports::UserError::NotFound => NotFoundResponse.into(),
        domain::user::driving_ports::UserError::PortError(inner) => {
            error!("User route failure: {inner:#}");
            GenericErrorResponse(inner).into()
        }
    }
}

/// Retrieves a list of all the users in the system.
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    responses(
        (status = 200, description = "Every stored user, task lists included", body = Vec<crate::dto::user::TodoUser>),
        (status = 500, response = crate::routing_utils::BasicErrorResponse),
    ),
)]
async fn get_users(
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl domain::user::driving_ports::UserPort,
    user_reader: &impl domain::user::driven_ports::UserReader,
) -> Result<Json<Vec<dto::user::TodoUser>>, ErrorResponse> {
    info!("Requested users");
    let users = user_service
        .get_users(&mut *ext_cxn, user_reader)
        .await
        .map_err(|err| {
            error!("Could not retrieve users: {err:#}");
            ErrorResponse::from(GenericErrorResponse(err))
        })?;

    Ok(Json(
        users.into_iter().map(dto::user::TodoUser::from).collect(),
    ))
}

/// Creates a user along with their empty task list.
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = crate::dto::user::NewUser,
    responses(
        (status = 201, description = "The created user with an empty task list attached", body = crate::dto::user::TodoUser),
        (status = 400, response = crate::routing_utils::BasicErrorResponse),
        (status = 500, response = crate::routing_utils::BasicErrorResponse),
    ),
)]
async fn create_user(
    new_user: dto::user::NewUser,
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl domain::user::driving_ports::UserPort,
    user_writer: &impl domain::user::driven_ports::UserWriter,
) -> Result<(StatusCode, Json<dto::user::TodoUser>), ErrorResponse> {
    info!("Attempt to create user: {new_user}");
    new_user.validate().map_err(ValidationErrorResponse::from)?;

    let domain_create = domain::user::CreateUser::from(new_user);
    let created_user = user_service
        .create_user(&domain_create, &mut *ext_cxn, user_writer)
        .await
        .map_err(|err| {
            error!("User create failure: {err:#}");
            ErrorResponse::from(GenericErrorResponse(err))
        })?;

    Ok((StatusCode::CREATED, Json(created_user.into())))
}

/// Searches users by a fragment of their name.
#[utoipa::path(
    get,
    path = "/api/users/search",
    tag = "users",
    params(("name" = String, Query, description = "Name fragment to match against stored users")),
    responses(
        (status = 200, description = "Users whose name contains the fragment, possibly none", body = Vec<crate::dto::user::TodoUser>),
        (status = 500, response = crate::routing_utils::BasicErrorResponse),
    ),
)]
async fn search_users(
    name_fragment: String,
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl domain::user::driving_ports::UserPort,
    user_reader: &impl domain::user::driven_ports::UserReader,
) -> Result<Json<Vec<dto::user::TodoUser>>, ErrorResponse> {
    info!("Searching users matching \"{name_fragment}\"");
    let users = user_service
        .search_users(&name_fragment, &mut *ext_cxn, user_reader)
        .await
        .map_err(|err| {
            error!("User search failure: {err:#}");
            ErrorResponse::from(GenericErrorResponse(err))
        })?;

    Ok(Json(
        users.into_iter().map(dto::user::TodoUser::from).collect(),
    ))
}

/// Retrieves a single user by their ID.
#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    tag = "users",
    params(("user_id" = i32, Path, description = "ID of the user to fetch")),
    responses(
        (status = 200, description = "The requested user", body = crate::dto::user::TodoUser),
        (status = 404, response = crate::routing_utils::BasicErrorResponse),
        (status = 500, response = crate::routing_utils::BasicErrorResponse),
    ),
)]
async fn get_user(
    user_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl domain::user::driving_ports::UserPort,
    user_reader: &impl domain::user::driven_ports::UserReader,
) -> Result<Json<dto::user::TodoUser>, ErrorResponse> {
    info!("Requested user {user_id}");
    let maybe_user = user_service
        .user_by_id(user_id, &mut *ext_cxn, user_reader)
        .await
        .map_err(|err| {
            error!("Could not retrieve user {user_id}: {err:#}");
            ErrorResponse::from(GenericErrorResponse(err))
        })?;

    let user = maybe_user.ok_or(NotFoundResponse)?;
    Ok(Json(user.into()))
}

/// Renames an existing user.
#[utoipa::path(
    put,
    path = "/api/users/{user_id}",
    tag = "users",
    params(("user_id" = i32, Path, description = "ID of the user to rename")),
    request_body = crate::dto::user::UpdateUser,
    responses(
        (status = 200, description = "The user with their new name", body = crate::dto::user::TodoUser),
        (status = 400, response = crate::routing_utils::BasicErrorResponse),
        (status = 404, response = crate::routing_utils::BasicErrorResponse),
        (status = 500, response = crate::routing_utils::BasicErrorResponse),
    ),
)]
async fn update_user(
    user_id: i32,
    update: dto::user::UpdateUser,
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl domain::user::driving_ports::UserPort,
    user_reader: &impl domain::user::driven_ports::UserReader,
    user_writer: &impl domain::user::driven_ports::UserWriter,
) -> Result<Json<dto::user::TodoUser>, ErrorResponse> {
    info!("Renaming user {user_id}");
    update.validate().map_err(ValidationErrorResponse::from)?;

    let domain_update = domain::user::UpdateUser::from(update);
    let renamed_user = user_service
        .rename_user(user_id, &domain_update, &mut *ext_cxn, user_reader, user_writer)
        .await
        .map_err(user_error_response)?;

    Ok(Json(renamed_user.into()))
}

/// Deletes a user.
#[utoipa::path(
    delete,
    path = "/api/users/{user_id}",
    tag = "users",
    params(("user_id" = i32, Path, description = "ID of the user to delete")),
    responses(
        (status = 200, description = "Confirmation of the delete", body = crate::dto::DeleteConfirmation),
        (status = 404, response = crate::routing_utils::BasicErrorResponse),
        (status = 500, response = crate::routing_utils::BasicErrorResponse),
    ),
)]
async fn delete_user(
    user_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl domain::user::driving_ports::UserPort,
    user_detector: &impl domain::user::driven_ports::DetectUser,
    user_writer: &impl domain::user::driven_ports::UserWriter,
) -> Result<Json<dto::DeleteConfirmation>, ErrorResponse> {
    info!("Deleting user {user_id}");
    user_service
        .delete_user(user_id, &mut *ext_cxn, user_detector, user_writer)
        .await
        .map_err(user_error_response)?;

    Ok(Json(dto::DeleteConfirmation {
        message: format!("User {user_id} deleted."),
    }))
}

/// Retrieves the tasks on a user's task list, oldest first.
#[utoipa::path(
    get,
    path = "/api/users/{user_id}/tasks",
    tag = "users",
    params(("user_id" = i32, Path, description = "ID of the user whose tasks to fetch")),
    responses(
        (status = 200, description = "The user's tasks in the order they were added", body = Vec<crate::dto::task::TodoTask>),
        (status = 404, response = crate::routing_utils::BasicErrorResponse),
        (status = 500, response = crate::routing_utils::BasicErrorResponse),
    ),
)]
async fn get_tasks_for_user(
    user_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl domain::task::driving_ports::TaskPort,
    user_detector: &impl domain::user::driven_ports::DetectUser,
    list_reader: &impl domain::task_list::driven_ports::ListReader,
) -> Result<Json<Vec<dto::task::TodoTask>>, ErrorResponse> {
    info!("Get tasks for user {user_id}");
    let tasks = task_service
        .tasks_for_user(user_id, &mut *ext_cxn, user_detector, list_reader)
        .await
        .map_err(super::task::task_error_response)?;

    Ok(Json(
        tasks.into_iter().map(dto::task::TodoTask::from).collect(),
    ))
}

/// Adds a new task to a user's task list.
#[utoipa::path(
    post,
    path = "/api/users/{user_id}/tasks",
    tag = "users",
    params(("user_id" = i32, Path, description = "ID of the user gaining a task")),
    request_body = crate::dto::task::NewTask,
    responses(
        (status = 201, description = "The created task", body = crate::dto::task::TodoTask),
        (status = 400, response = crate::routing_utils::BasicErrorResponse),
        (status = 404, response = crate::routing_utils::BasicErrorResponse),
        (status = 500, response = crate::routing_utils::BasicErrorResponse),
    ),
)]
async fn add_task_for_user(
    user_id: i32,
    new_task: dto::task::NewTask,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl domain::task::driving_ports::TaskPort,
    user_detector: &impl domain::user::driven_ports::DetectUser,
    list_reader: &impl domain::task_list::driven_ports::ListReader,
    task_writer: &impl domain::task::driven_ports::TaskWriter,
) -> Result<(StatusCode, Json<dto::task::TodoTask>), ErrorResponse> {
    info!("Adding task for user {user_id}");
    new_task.validate().map_err(ValidationErrorResponse::from)?;

    let domain_new_task = domain::task::NewTask::from(new_task);
    let created_task = task_service
        .create_task_for_user(
            user_id,
            &domain_new_task,
            &mut *ext_cxn,
            user_detector,
            list_reader,
            task_writer,
        )
        .await
        .map_err(super::task::task_error_response)?;

    Ok((StatusCode::CREATED, Json(created_task.into())))
}

/// Retrieves a user's task list with its tasks.
#[utoipa::path(
    get,
    path = "/api/users/{user_id}/tasklist",
    tag = "users",
    params(("user_id" = i32, Path, description = "ID of the user who owns the list")),
    responses(
        (status = 200, description = "The user's task list", body = crate::dto::task_list::TaskList),
        (status = 404, response = crate::routing_utils::BasicErrorResponse),
        (status = 500, response = crate::routing_utils::BasicErrorResponse),
    ),
)]
async fn get_task_list_for_user(
    user_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    list_service: &impl domain::task_list::driving_ports::ListPort,
    user_detector: &impl domain::user::driven_ports::DetectUser,
    list_reader: &impl domain::task_list::driven_ports::ListReader,
) -> Result<Json<dto::task_list::TaskList>, ErrorResponse> {
    info!("Get task list for user {user_id}");
    let list = list_service
        .list_for_user(user_id, &mut *ext_cxn, user_detector, list_reader)
        .await
        .map_err(super::task_list::list_error_response)?;

    Ok(Json(list.into()))
}
