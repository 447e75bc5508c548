use crate::domain;
use crate::dto::task::TodoTask;
use serde::Serialize;
use utoipa::ToSchema;

/// DTO for a user's task list as returned by the API. Tasks appear in the order
/// they were added.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(serde::Deserialize, PartialEq, Eq, Debug))]
pub struct TaskList {
    #[schema(example = 7)]
    pub id: i32,
    pub tasks: Vec<TodoTask>,
}

impl From<domain::task_list::TaskList> for TaskList {
    fn from(value: domain::task_list::TaskList) -> Self {
        TaskList {
            id: value.id,
            tasks: value.tasks.into_iter().map(TodoTask::from).collect(),
        }
    }
}
