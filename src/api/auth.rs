use crate::app_env;
use crate::routing_utils::UnauthorizedResponse;
use crate::AppState;
use anyhow::Context;
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::env;

/// Credentials extracted from an incoming request
pub struct Credentials<'req> {
    pub username: &'req str,
    pub password: &'req str,
}

/// Decides whether a set of request credentials may access the API. The API routes
/// only depend on this trait, so the credential source can be swapped out without
/// touching any routing code.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, credentials: Credentials) -> bool;
}

/// [Authenticator] backed by a single fixed username/password pair, read from the
/// environment at startup
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: String, password: String) -> StaticCredentials {
        StaticCredentials { username, password }
    }

    /// Reads the accepted credential pair from [app_env::API_USERNAME] and
    /// [app_env::API_PASSWORD]
    pub fn from_env() -> Result<StaticCredentials, anyhow::Error> {
        let username = env::var(app_env::API_USERNAME)
            .context("API_USERNAME must be set to guard the API")?;
        let password = env::var(app_env::API_PASSWORD)
            .context("API_PASSWORD must be set to guard the API")?;

        Ok(StaticCredentials { username, password })
    }
}

impl Authenticator for StaticCredentials {
    fn authenticate(&self, credentials: Credentials) -> bool {
        self.username == credentials.username && self.password == credentials.password
    }
}

fn header_str<'headers>(headers: &'headers HeaderMap, name: &str) -> Option<&'headers str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Middleware guarding the API routes. Requests must carry "username" and "password"
/// headers matching the configured credentials or they are rejected with a 401.
pub async fn require_auth(
    State(app_data): AppState,
    request: Request,
    next: Next,
) -> Response {
    let headers = request.headers();
    let (Some(username), Some(password)) =
        (header_str(headers, "username"), header_str(headers, "password"))
    else {
        return UnauthorizedResponse.into_response();
    };

    if !app_data
        .authenticator
        .authenticate(Credentials { username, password })
    {
        return UnauthorizedResponse.into_response();
    }

    next.run(request).await
}
