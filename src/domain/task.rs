use crate::domain::task_list;
use crate::domain::user;
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use thiserror::Error;

/// A single to-do item belonging to a task list
#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct Task {
    pub id: i32,
    pub task_list_id: i32,
    pub description: String,
    pub finished: bool,
}

impl Task {
    /// Marks the task complete. Finishing an already-finished task is a no-op.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// Marks the task incomplete. Unfinishing a pending task is a no-op.
    pub fn unfinish(&mut self) {
        self.finished = false;
    }
}

#[cfg_attr(test, derive(Clone))]
pub struct NewTask {
    pub description: String,
}

#[cfg_attr(test, derive(Clone))]
pub struct UpdateTask {
    pub description: String,
}

pub mod driven_ports {
    use super::*;

    pub trait TaskReader: Sync {
        async fn get_all(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Task>, anyhow::Error>;
        async fn get_by_id(
            &self,
            task_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Task>, anyhow::Error>;
    }

    pub trait TaskWriter: Sync {
        async fn create_in_list(
            &self,
            list_id: i32,
            new_task: &NewTask,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<i32, anyhow::Error>;
        /// Persists the full current state of the given task over its stored row
        async fn update(
            &self,
            task: &Task,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;
        async fn delete(
            &self,
            task_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;

    #[derive(Debug, Error)]
    pub enum TaskError {
        #[error("The specified user did not exist.")]
        UserDoesNotExist,
        #[error("The specified task list did not exist.")]
        ListDoesNotExist,
        #[error("The specified task did not exist.")]
        TaskDoesNotExist,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    impl From<user::UserExistsErr> for TaskError {
        fn from(value: user::UserExistsErr) -> Self {
            match value {
                user::UserExistsErr::UserDoesNotExist(_) => Self::UserDoesNotExist,
                user::UserExistsErr::PortError(err) => Self::PortError(err),
            }
        }
    }

    impl From<task_list::ListExistsErr> for TaskError {
        fn from(value: task_list::ListExistsErr) -> Self {
            match value {
                task_list::ListExistsErr::ListDoesNotExist(_) => Self::ListDoesNotExist,
                task_list::ListExistsErr::PortError(err) => Self::PortError(err),
            }
        }
    }

    pub trait TaskPort {
        async fn all_tasks(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
        ) -> Result<Vec<Task>, anyhow::Error>;
        async fn task_by_id(
            &self,
            task_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
        ) -> Result<Option<Task>, anyhow::Error>;
        async fn tasks_for_user(
            &self,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            u_detect: &impl user::driven_ports::DetectUser,
            list_read: &impl task_list::driven_ports::ListReader,
        ) -> Result<Vec<Task>, TaskError>;
        async fn create_task_for_user(
            &self,
            user_id: i32,
            new_task: &NewTask,
            ext_cxn: &mut impl ExternalConnectivity,
            u_detect: &impl user::driven_ports::DetectUser,
            list_read: &impl task_list::driven_ports::ListReader,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<Task, TaskError>;
        async fn create_task_in_list(
            &self,
            list_id: i32,
            new_task: &NewTask,
            ext_cxn: &mut impl ExternalConnectivity,
            l_detect: &impl task_list::driven_ports::DetectList,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<Task, TaskError>;
        async fn update_description(
            &self,
            task_id: i32,
            update: &UpdateTask,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<Task, TaskError>;
        async fn mark_finished(
            &self,
            task_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<Task, TaskError>;
        async fn mark_unfinished(
            &self,
            task_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<Task, TaskError>;
        async fn delete_task(
            &self,
            task_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<(), TaskError>;
    }

}

pub struct TaskService {}

impl TaskService {
    /// Shared tail of every "change a task" operation: look the task up,
    /// apply a mutation, then write the whole entity back.
    async fn alter_task(
        &self,
        task_id: i32,
        alteration: impl FnOnce(&mut Task),
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl driven_ports::TaskReader,
        task_write: &impl driven_ports::TaskWriter,
    ) -> Result<Task, driving_ports::TaskError> {
        let mut task = task_read
            .get_by_id(task_id, &mut *ext_cxn)
            .await
            .context("Looking up a task before altering it")?
            .ok_or(driving_ports::TaskError::TaskDoesNotExist)?;

        alteration(&mut task);
        task_write
            .update(&task, &mut *ext_cxn)
            .await
            .context("Saving an altered task")?;

        Ok(task)
    }
}

impl driving_ports::TaskPort for TaskService {
    async fn all_tasks(
        &self,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl driven_ports::TaskReader,
    ) -> Result<Vec<Task>, anyhow::Error> {
        task_read
            .get_all(ext_cxn)
            .await
            .context("Fetching every stored task")
    }

    async fn task_by_id(
        &self,
        task_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl driven_ports::TaskReader,
    ) -> Result<Option<Task>, anyhow::Error> {
        task_read
            .get_by_id(task_id, ext_cxn)
            .await
            .context("Fetching a task by ID")
    }

    async fn tasks_for_user(
        &self,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        u_detect: &impl user::driven_ports::DetectUser,
        list_read: &impl task_list::driven_ports::ListReader,
    ) -> Result<Vec<Task>, driving_ports::TaskError> {
        user::verify_user_exists(user_id, &mut *ext_cxn, u_detect).await?;

        let maybe_list = list_read
            .get_by_user_id(user_id, &mut *ext_cxn)
            .await
            .context("Fetching a user's list to read its tasks")?;

        // A user whose list provisioning never completed just has no tasks yet
        match maybe_list {
            Some(list) => Ok(list.tasks),
            None => Ok(Vec::new()),
        }
    }

    async fn create_task_for_user(
        &self,
        user_id: i32,
        new_task: &NewTask,
        ext_cxn: &mut impl ExternalConnectivity,
        u_detect: &impl user::driven_ports::DetectUser,
        list_read: &impl task_list::driven_ports::ListReader,
        task_write: &impl driven_ports::TaskWriter,
    ) -> Result<Task, driving_ports::TaskError> {
        user::verify_user_exists(user_id, &mut *ext_cxn, u_detect).await?;

        let list = list_read
            .get_by_user_id(user_id, &mut *ext_cxn)
            .await
            .context("Locating a user's list before adding a task")?
            .ok_or(driving_ports::TaskError::ListDoesNotExist)?;

        let new_task_id = task_write
            .create_in_list(list.id, new_task, &mut *ext_cxn)
            .await
            .context("Adding a task to a user's list")?;

        Ok(Task {
            id: new_task_id,
            task_list_id: list.id,
            description: new_task.description.clone(),
            finished: false,
        })
    }

    async fn create_task_in_list(
        &self,
        list_id: i32,
        new_task: &NewTask,
        ext_cxn: &mut impl ExternalConnectivity,
        l_detect: &impl task_list::driven_ports::DetectList,
        task_write: &impl driven_ports::TaskWriter,
    ) -> Result<Task, driving_ports::TaskError> {
        task_list::verify_list_exists(list_id, &mut *ext_cxn, l_detect).await?;

        let new_task_id = task_write
            .create_in_list(list_id, new_task, &mut *ext_cxn)
            .await
            .context("Adding a task directly to a list")?;

        Ok(Task {
            id: new_task_id,
            task_list_id: list_id,
            description: new_task.description.clone(),
            finished: false,
        })
    }

    async fn update_description(
        &self,
        task_id: i32,
        update: &UpdateTask,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl driven_ports::TaskReader,
        task_write: &impl driven_ports::TaskWriter,
    ) -> Result<Task, driving_ports::TaskError> {
        self.alter_task(
            task_id,
            |task| task.description = update.description.clone(),
            ext_cxn,
            task_read,
            task_write,
        )
        .await
    }

    async fn mark_finished(
        &self,
        task_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl driven_ports::TaskReader,
        task_write: &impl driven_ports::TaskWriter,
    ) -> Result<Task, driving_ports::TaskError> {
        self.alter_task(task_id, Task::finish, ext_cxn, task_read, task_write)
            .await
    }

    async fn mark_unfinished(
        &self,
        task_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl driven_ports::TaskReader,
        task_write: &impl driven_ports::TaskWriter,
    ) -> Result<Task, driving_ports::TaskError> {
        self.alter_task(task_id, Task::unfinish, ext_cxn, task_read, task_write)
            .await
    }

    async fn delete_task(
        &self,
        task_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl driven_ports::TaskReader,
        task_write: &impl driven_ports::TaskWriter,
    ) -> Result<(), driving_ports::TaskError> {
        let task_lookup = task_read
            .get_by_id(task_id, &mut *ext_cxn)
            .await
            .context("Looking up a task before deleting it")?;
        if task_lookup.is_none() {
            return Err(driving_ports::TaskError::TaskDoesNotExist);
        }

        task_write
            .delete(task_id, &mut *ext_cxn)
            .await
            .context("Deleting a task")?;
        Ok(())
    }
}
