use crate::domain;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// DTO for a returned task on the API
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq, Debug))]
pub struct TodoTask {
    #[schema(example = 10)]
    pub id: i32,
    #[schema(example = 7)]
    pub task_list_id: i32,
    #[schema(example = "Water the plants")]
    pub description: String,
    pub finished: bool,
}

impl From<domain::task::Task> for TodoTask {
    fn from(value: domain::task::Task) -> Self {
        TodoTask {
            id: value.id,
            task_list_id: value.task_list_id,
            description: value.description,
            finished: value.finished,
        }
    }
}

/// DTO for creating a new task via the API
#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Serialize))]
pub struct NewTask {
    #[schema(example = "Water the plants")]
    #[validate(custom = "crate::dto::not_blank")]
    pub description: String,
}

impl From<NewTask> for domain::task::NewTask {
    fn from(value: NewTask) -> Self {
        domain::task::NewTask {
            description: value.description,
        }
    }
}

/// DTO for updating a task's content via the API
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Serialize))]
pub struct UpdateTask {
    #[schema(example = "Water the garden")]
    #[validate(custom = "crate::dto::not_blank")]
    pub description: String,
}

impl From<UpdateTask> for domain::task::UpdateTask {
    fn from(value: UpdateTask) -> Self {
        domain::task::UpdateTask {
            description: value.description,
        }
    }
}
