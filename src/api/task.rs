use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::{
    GenericErrorResponse, Json, NotFoundResponse, ValidationErrorResponse,
};
use crate::{AppState, SharedData, domain, dto, persistence};
use axum::Router;
use axum::extract::{Path, State};
use axum::response::ErrorResponse;
use axum::routing::{delete, get, patch, put};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;
use validator::Validate;

/// OpenAPI definitions for the task routes
#[derive(OpenApi)]
#[openapi(
    paths(
        get_tasks,
        get_task,
        update_task,
        finish_task,
        unfinish_task,
        delete_task,
    ),
    tags((name = "tasks", description = "Operations on individual tasks"))
)]
pub struct TasksApi;

/// Adds routes under "/tasks" to the application router
pub fn task_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/tasks",
            get(|State(app_data): AppState| async move {
                let mut ext_cxn = app_data.ext_cxn.clone();
                let task_service = domain::task::TaskService {};
                let task_reader = persistence::db_task_driven_ports::DbTaskReader {};

                get_tasks(&mut ext_cxn, &task_service, &task_reader).await
            }),
        )
        .route(
            "/tasks/:task_id",
            get(
                |State(app_data): AppState, Path(task_id): Path<i32>| async move {
                    let mut ext_cxn = app_data.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};
                    let task_reader = persistence::db_task_driven_ports::DbTaskReader {};

                    get_task(task_id, &mut ext_cxn, &task_service, &task_reader).await
                },
            ),
        )
        .route(
            "/tasks/:task_id",
            put(
                |State(app_data): AppState,
                 Path(task_id): Path<i32>,
                 Json(update): Json<dto::task::UpdateTask>| async move {
                    let mut ext_cxn = app_data.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};
                    let task_reader = persistence::db_task_driven_ports::DbTaskReader {};
                    let task_writer = persistence::db_task_driven_ports::DbTaskWriter {};

                    update_task(
                        task_id,
                        update,
                        &mut ext_cxn,
                        &task_service,
                        &task_reader,
                        &task_writer,
                    )
                    .await
                },
            ),
        )
        .route(
            "/tasks/:task_id/finish",
            patch(
                |State(app_data): AppState, Path(task_id): Path<i32>| async move {
                    let mut ext_cxn = app_data.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};
                    let task_reader = persistence::db_task_driven_ports::DbTaskReader {};
                    let task_writer = persistence::db_task_driven_ports::DbTaskWriter {};

                    finish_task(
                        task_id,
                        &mut ext_cxn,
                        &task_service,
                        &task_reader,
                        &task_writer,
                    )
                    .await
                },
            ),
        )
        .route(
            "/tasks/:task_id/unfinish",
            patch(
                |State(app_data): AppState, Path(task_id): Path<i32>| async move {
                    let mut ext_cxn = app_data.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};
                    let task_reader = persistence::db_task_driven_ports::DbTaskReader {};
                    let task_writer = persistence::db_task_driven_ports::DbTaskWriter {};

                    unfinish_task(
                        task_id,
                        &mut ext_cxn,
                        &task_service,
                        &task_reader,
                        &task_writer,
                    )
                    .await
                },
            ),
        )
        .route(
            "/tasks/:task_id",
            delete(
                |State(app_data): AppState, Path(task_id): Path<i32>| async move {
                    let mut ext_cxn = app_data.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};
                    let task_reader = persistence::db_task_driven_ports::DbTaskReader {};
                    let task_writer = persistence::db_task_driven_ports::DbTaskWriter {};

                    delete_task(
                        task_id,
                        &mut ext_cxn,
                        &task_service,
                        &task_reader,
                        &task_writer,
                    )
                    .await
                },
            ),
        )
}

/// Maps a [TaskError][domain::task::driving_ports::TaskError] to an HTTP response.
/// Every "does not exist" variant comes back as a 404 so callers can't probe which
/// part of the lookup failed.
pub(super) fn task_error_response(err: domain::task::driving_ports::TaskError) -> ErrorResponse {
    use domain::task::driving_ports::TaskError;

    match err {
        TaskError::UserDoesNotExist
        | TaskError::ListDoesNotExist
        | TaskError::TaskDoesNotExist => NotFoundResponse.into(),
        TaskError::PortError(inner) => {
            error!("Task route failure: {inner:#}");
            GenericErrorResponse(inner).into()
        }
    }
}

/// Retrieves every task in the system regardless of owner.
#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "tasks",
    responses(
        (status = 200, description = "All stored tasks", body = Vec<crate::dto::task::TodoTask>),
        (status = 500, response = crate::routing_utils::BasicErrorResponse),
    ),
)]
async fn get_tasks(
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl domain::task::driving_ports::TaskPort,
    task_reader: &impl domain::task::driven_ports::TaskReader,
) -> Result<Json<Vec<dto::task::TodoTask>>, ErrorResponse> {
    info!("Requested all tasks");
    let tasks = task_service
        .all_tasks(&mut *ext_cxn, task_reader)
        .await
        .map_err(|err| {
            error!("Could not retrieve tasks: {err:#}");
            ErrorResponse::from(GenericErrorResponse(err))
        })?;

    Ok(Json(
        tasks.into_iter().map(dto::task::TodoTask::from).collect(),
    ))
}

/// Retrieves a single task by its ID.
#[utoipa::path(
    get,
    path = "/api/tasks/{task_id}",
    tag = "tasks",
    params(("task_id" = i32, Path, description = "ID of the task to fetch")),
    responses(
        (status = 200, description = "The requested task", body = crate::dto::task::TodoTask),
        (status = 404, response = crate::routing_utils::BasicErrorResponse),
        (status = 500, response = crate::routing_utils::BasicErrorResponse),
    ),
)]
async fn get_task(
    task_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl domain::task::driving_ports::TaskPort,
    task_reader: &impl domain::task::driven_ports::TaskReader,
) -> Result<Json<dto::task::TodoTask>, ErrorResponse> {
    info!("Requested task {task_id}");
    let maybe_task = task_service
        .task_by_id(task_id, &mut *ext_cxn, task_reader)
        .await
        .map_err(|err| {
            error!("Could not retrieve task {task_id}: {err:#}");
            ErrorResponse::from(GenericErrorResponse(err))
        })?;

    let task = maybe_task.ok_or(NotFoundResponse)?;
    Ok(Json(task.into()))
}

/// Updates the content of a task.
#[utoipa::path(
    put,
    path = "/api/tasks/{task_id}",
    tag = "tasks",
    params(("task_id" = i32, Path, description = "ID of the task to update")),
    request_body = crate::dto::task::UpdateTask,
    responses(
        (status = 200, description = "The updated task", body = crate::dto::task::TodoTask),
        (status = 400, response = crate::routing_utils::BasicErrorResponse),
        (status = 404, response = crate::routing_utils::BasicErrorResponse),
        (status = 500, response = crate::routing_utils::BasicErrorResponse),
    ),
)]
async fn update_task(
    task_id: i32,
    task_data: dto::task::UpdateTask,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl domain::task::driving_ports::TaskPort,
    task_reader: &impl domain::task::driven_ports::TaskReader,
    task_writer: &impl domain::task::driven_ports::TaskWriter,
) -> Result<Json<dto::task::TodoTask>, ErrorResponse> {
    info!("Updating task {task_id}");
    task_data.validate().map_err(ValidationErrorResponse::from)?;

    let domain_update = domain::task::UpdateTask::from(task_data);
    let updated_task = task_service
        .update_description(task_id, &domain_update, &mut *ext_cxn, task_reader, task_writer)
        .await
        .map_err(task_error_response)?;

    Ok(Json(updated_task.into()))
}

/// Marks a task as finished. Finishing an already-finished task succeeds without changes.
#[utoipa::path(
    patch,
    path = "/api/tasks/{task_id}/finish",
    tag = "tasks",
    params(("task_id" = i32, Path, description = "ID of the task to finish")),
    responses(
        (status = 200, description = "The task in its finished state", body = crate::dto::task::TodoTask),
        (status = 404, response = crate::routing_utils::BasicErrorResponse),
        (status = 500, response = crate::routing_utils::BasicErrorResponse),
    ),
)]
async fn finish_task(
    task_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl domain::task::driving_ports::TaskPort,
    task_reader: &impl domain::task::driven_ports::TaskReader,
    task_writer: &impl domain::task::driven_ports::TaskWriter,
) -> Result<Json<dto::task::TodoTask>, ErrorResponse> {
    info!("Finishing task {task_id}");
    let finished_task = task_service
        .mark_finished(task_id, &mut *ext_cxn, task_reader, task_writer)
        .await
        .map_err(task_error_response)?;

    Ok(Json(finished_task.into()))
}

/// Marks a task as unfinished. Unfinishing a pending task succeeds without changes.
#[utoipa::path(
    patch,
    path = "/api/tasks/{task_id}/unfinish",
    tag = "tasks",
    params(("task_id" = i32, Path, description = "ID of the task to reopen")),
    responses(
        (status = 200, description = "The task back in its pending state", body = crate::dto::task::TodoTask),
        (status = 404, response = crate::routing_utils::BasicErrorResponse),
        (status = 500, response = crate::routing_utils::BasicErrorResponse),
    ),
)]
async fn unfinish_task(
    task_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl domain::task::driving_ports::TaskPort,
    task_reader: &impl domain::task::driven_ports::TaskReader,
    task_writer: &impl domain::task::driven_ports::TaskWriter,
) -> Result<Json<dto::task::TodoTask>, ErrorResponse> {
    info!("Reopening task {task_id}");
    let pending_task = task_service
        .mark_unfinished(task_id, &mut *ext_cxn, task_reader, task_writer)
        .await
        .map_err(task_error_response)?;

    Ok(Json(pending_task.into()))
}

/// Deletes a task.
#[utoipa::path(
    delete,
    path = "/api/tasks/{task_id}",
    tag = "tasks",
    params(("task_id" = i32, Path, description = "ID of the task to delete")),
    responses(
        (status = 200, description = "Confirmation of the delete", body = crate::dto::DeleteConfirmation),
        (status = 404, response = crate::routing_utils::BasicErrorResponse),
        (status = 500, response = crate::routing_utils::BasicErrorResponse),
    ),
)]
async fn delete_task(
    task_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl domain::task::driving_ports::TaskPort,
    task_reader: &impl domain::task::driven_ports::TaskReader,
    task_writer: &impl domain::task::driven_ports::TaskWriter,
) -> Result<Json<dto::DeleteConfirmation>, ErrorResponse> {
    info!("Deleting task {task_id}");
    task_service
        .delete_task(task_id, &mut *ext_cxn, task_reader, task_writer)
        .await
        .map_err(task_error_response)?;

    Ok(Json(dto::DeleteConfirmation {
        message: format!("Task {task_id} deleted."),
    }))
}
