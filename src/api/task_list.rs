use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::{GenericErrorResponse, Json, NotFoundResponse};
use crate::{AppState, SharedData, domain, dto, persistence};
use axum::Router;
use axum::extract::{Path, State};
use axum::response::ErrorResponse;
use axum::routing::get;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;

/// OpenAPI definitions for the task list routes
#[derive(OpenApi)]
#[openapi(
    paths(get_task_list),
    tags((name = "tasklists", description = "Direct task list lookup"))
)]
pub struct TaskListsApi;

/// Builds a router for the task list routes
pub fn task_list_routes() -> Router<Arc<SharedData>> {
    Router::new().route(
        "/:list_id",
        get(
            |State(app_data): AppState, Path(list_id): Path<i32>| async move {
                let mut ext_cxn = app_data.ext_cxn.clone();
                let list_service = domain::task_list::ListService {};
                let list_reader = persistence::db_task_list_driven_ports::DbListReader {};

                get_task_list(list_id, &mut ext_cxn, &list_service, &list_reader).await
            },
        ),
    )
}

/// Maps a [ListError][domain::task_list::driving_ports::ListError] to an HTTP response
pub(super) fn list_error_response(
    err: domain::task_list::driving_ports::ListError,
) -> ErrorResponse {
    use domain::task_list::driving_ports::ListError;

    match err {
        ListError::UserDoesNotExist | ListError::ListDoesNotExist => NotFoundResponse.into(),
        ListError::PortError(inner) => {
            error!("Task list route failure: {inner:#}");
            GenericErrorResponse(inner).into()
        }
    }
}

/// Retrieves a task list by its own ID.
#[utoipa::path(
    get,
    path = "/api/tasklists/{list_id}",
    tag = "tasklists",
    params(("list_id" = i32, Path, description = "ID of the task list to fetch")),
    responses(
        (status = 200, description = "The requested task list", body = crate::dto::task_list::TaskList),
        (status = 404, response = crate::routing_utils::BasicErrorResponse),
        (status = 500, response = crate::routing_utils::BasicErrorResponse),
    ),
)]
async fn get_task_list(
    list_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    list_service: &impl domain::task_list::driving_ports::ListPort,
    list_reader: &impl domain::task_list::driven_ports::ListReader,
) -> Result<Json<dto::task_list::TaskList>, ErrorResponse> {
    info!("Requested task list {list_id}");
    let list = list_service
        .list_by_id(list_id, &mut *ext_cxn, list_reader)
        .await
        .map_err(list_error_response)?;

    Ok(Json(list.into()))
}
