use super::{NewId, TaskRow};
use crate::domain;
use crate::domain::task::{NewTask, Task};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use sqlx::{query, query_as};

pub struct DbTaskReader {}

impl domain::task::driven_ports::TaskReader for DbTaskReader {
    async fn get_all(&self, ext_cxn: &mut impl ExternalConnectivity) -> Result<Vec<Task>, Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let task_rows: Vec<TaskRow> = query_as(
            "SELECT t.id, t.task_list_id, t.description, t.finished FROM task t ORDER BY t.id",
        )
        .fetch_all(cxn_handle.borrow_connection())
        .await
        .context("Fetching all tasks")?;

        Ok(task_rows.into_iter().map(Into::into).collect())
    }

    async fn get_by_id(
        &self,
        task_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Task>, Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let task_row: Option<TaskRow> = query_as(
            "SELECT t.id, t.task_list_id, t.description, t.finished FROM task t WHERE t.id = $1",
        )
        .bind(task_id)
        .fetch_optional(cxn_handle.borrow_connection())
        .await
        .context("Fetching a task by id")?;

        Ok(task_row.map(Into::into))
    }
}

pub struct DbTaskWriter {}

impl domain::task::driven_ports::TaskWriter for DbTaskWriter {
    async fn create_in_list(
        &self,
        list_id: i32,
        new_task: &NewTask,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<i32, Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let inserted_task: NewId = query_as(
            "INSERT INTO task(task_list_id, description) VALUES ($1, $2) RETURNING task.id",
        )
        .bind(list_id)
        .bind(&new_task.description)
        .fetch_one(cxn_handle.borrow_connection())
        .await
        .context("Inserting new task")?;

        Ok(inserted_task.id)
    }

    async fn update(&self, task: &Task, ext_cxn: &mut impl ExternalConnectivity) -> Result<(), Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        query("UPDATE task SET description = $1, finished = $2 WHERE id = $3")
            .bind(&task.description)
            .bind(task.finished)
            .bind(task.id)
            .execute(cxn_handle.borrow_connection())
            .await
            .context("Updating task")?;

        Ok(())
    }

    async fn delete(&self, task_id: i32, ext_cxn: &mut impl ExternalConnectivity) -> Result<(), Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        query("DELETE FROM task WHERE id = $1")
            .bind(task_id)
            .execute(cxn_handle.borrow_connection())
            .await
            .context("Deleting task")?;

        Ok(())
    }
}
