use anyhow::Context;
use axum::Router;
use axum::routing::get;
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::sync::Arc;
use tracing::info;

mod api;
mod app_env;
mod console;
mod domain;
mod dto;
mod external_connections;
#[cfg(test)]
mod integration_test;
mod logging;
mod persistence;
mod routing_utils;

/// State shared by every request handler
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
    pub authenticator: Arc<dyn api::auth::Authenticator>,
}

pub type AppState = axum::extract::State<Arc<SharedData>>;

/// Describes the API surface to anyone hitting the root path
async fn welcome() -> routing_utils::Json<serde_json::Value> {
    routing_utils::Json(serde_json::json!({
        "message": "Welcome to the task list API.",
        "routes": {
            "GET /api/users": "List all users",
            "POST /api/users": "Create a user with an empty task list",
            "GET /api/users/search?name=": "Search users by name",
            "GET /api/users/{id}": "Fetch a user",
            "PUT /api/users/{id}": "Rename a user",
            "DELETE /api/users/{id}": "Delete a user",
            "GET /api/users/{id}/tasks": "List a user's tasks",
            "POST /api/users/{id}/tasks": "Add a task to a user's list",
            "GET /api/users/{id}/tasklist": "Fetch a user's task list",
            "GET /api/tasklists/{id}": "Fetch a task list by its own ID",
            "GET /api/tasks": "List every task",
            "GET /api/tasks/{id}": "Fetch a task",
            "PUT /api/tasks/{id}": "Update a task's description",
            "PATCH /api/tasks/{id}/finish": "Mark a task finished",
            "PATCH /api/tasks/{id}/unfinish": "Mark a task unfinished",
            "DELETE /api/tasks/{id}": "Delete a task",
            "GET /swagger-ui": "Interactive API documentation"
        }
    }))
}

/// Assembles the full application router. Every application route requires
/// credentials, including the welcome route. Only the swagger UI stays open.
pub fn build_router(shared_data: Arc<SharedData>) -> Router {
    let api_routes = Router::new()
        .nest("/users", api::user::user_routes())
        .nest("/tasklists", api::task_list::task_list_routes())
        .merge(api::task::task_routes());

    let router = Router::new()
        .route("/", get(welcome))
        .nest("/api", api_routes)
        .route_layer(axum::middleware::from_fn_with_state(
            shared_data.clone(),
            api::auth::require_auth,
        ))
        .merge(api::swagger_main::build_documentation())
        .with_state(shared_data);

    logging::attach_tracing_http(router)
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    if dotenv().is_err() {
        println!("Starting without a .env file.");
    }

    let db_url = env::var(app_env::DB_URL).context("DATABASE_URL must be set")?;
    let db_pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&db_url)
        .await
        .context("Connecting to the database")?;
    sqlx::migrate!()
        .run(&db_pool)
        .await
        .context("Applying database migrations")?;

    let ext_cxn = persistence::ExternalConnectivity::new(db_pool);

    // "console" as the first argument launches the interactive menu instead of the server
    if env::args().nth(1).as_deref() == Some("console") {
        return console::run(ext_cxn).await;
    }

    let otel_exporters = match (
        env::var(app_env::OTEL_SPAN_EXPORT_URL),
        env::var(app_env::OTEL_METRIC_EXPORT_URL),
    ) {
        (Ok(span_url), Ok(metric_url)) => Some(logging::init_exporters(&span_url, &metric_url)),
        _ => None,
    };
    logging::setup_logging_and_tracing(logging::init_env_filter(), otel_exporters);

    let authenticator = api::auth::StaticCredentials::from_env()?;
    let shared_data = Arc::new(SharedData {
        ext_cxn,
        authenticator: Arc::new(authenticator),
    });
    let router = build_router(shared_data);

    let port = env::var(app_env::SERVER_PORT).unwrap_or_else(|_| "8080".to_owned());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .context("Binding the server port")?;
    info!("Starting server on port {port}.");
    axum::serve(listener, router)
        .await
        .context("Running the HTTP server")?;

    Ok(())
}
