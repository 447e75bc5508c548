pub mod task;
pub mod task_list;
pub mod user;

use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use validator::ValidationError;

/// Collects OpenAPI schema definitions for the API's data transfer objects so they
/// can be merged into the top-level API documentation
#[derive(OpenApi)]
#[openapi(components(
    schemas(
        user::TodoUser,
        user::NewUser,
        user::UpdateUser,
        task_list::TaskList,
        task::TodoTask,
        task::NewTask,
        task::UpdateTask,
        DeleteConfirmation,
        crate::routing_utils::ExtraInfo,
        crate::routing_utils::ValidationErrorSchema,
    ),
    responses(crate::routing_utils::BasicErrorResponse)
))]
pub struct OpenApiSchemas;

/// Rejects strings which are empty or contain nothing but whitespace
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("not_blank"))
    } else {
        Ok(())
    }
}

/// DTO acknowledging a successful delete
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize, PartialEq, Eq, Debug))]
pub struct DeleteConfirmation {
    #[schema(example = "User 4 deleted.")]
    pub message: String,
}
