use crate::domain;
use crate::dto::task_list::TaskList;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// DTO for a user returned by the API, carrying their task list when one exists
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq, Debug))]
pub struct TodoUser {
    #[schema(example = 4)]
    pub id: i32,
    #[schema(example = "Ana Clara")]
    pub name: String,
    pub task_list: Option<TaskList>,
}

impl From<domain::user::User> for TodoUser {
    fn from(value: domain::user::User) -> Self {
        TodoUser {
            id: value.id,
            name: value.name,
            task_list: value.task_list.map(TaskList::from),
        }
    }
}

/// DTO for creating a new user via the API
#[derive(Deserialize, Display, Validate, ToSchema)]
#[display("{name}")]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Serialize))]
pub struct NewUser {
    #[schema(example = "Ana Clara")]
    #[validate(length(max = 100), custom = "crate::dto::not_blank")]
    pub name: String,
}

impl From<NewUser> for domain::user::CreateUser {
    fn from(value: NewUser) -> Self {
        domain::user::CreateUser { name: value.name }
    }
}

/// DTO for renaming a user via the API
#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Serialize))]
pub struct UpdateUser {
    #[schema(example = "Ana C. Souza")]
    #[validate(length(max = 100), custom = "crate::dto::not_blank")]
    pub name: String,
}

impl From<UpdateUser> for domain::user::UpdateUser {
    fn from(value: UpdateUser) -> Self {
        domain::user::UpdateUser { name: value.name }
    }
}
