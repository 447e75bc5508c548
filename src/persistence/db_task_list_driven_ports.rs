use super::{TaskListRow, TaskRow};
use crate::domain;
use crate::domain::task_list::TaskList;
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use sqlx::{PgConnection, query_as};

pub struct DbListDetector {}

impl domain::task_list::driven_ports::DetectList for DbListDetector {
    async fn list_exists(
        &self,
        list_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<bool, anyhow::Error> {
        let mut connection = ext_cxn.database_cxn().await?;

        let list_with_id_count = query_as::<_, super::Count>(
            "SELECT count(*) AS count FROM task_list tl WHERE tl.id = $1",
        )
        .bind(list_id)
        .fetch_one(connection.borrow_connection())
        .await
        .context("Detecting task list with ID")?;

        Ok(list_with_id_count.count() > 0)
    }
}

/// Loads a list's tasks and produces the populated [TaskList] entity
async fn hydrate_list(list_row: TaskListRow, cxn: &mut PgConnection) -> Result<TaskList, Error> {
    let task_rows: Vec<TaskRow> = query_as(
        "SELECT t.id, t.task_list_id, t.description, t.finished \
         FROM task t WHERE t.task_list_id = $1 ORDER BY t.id",
    )
    .bind(list_row.id)
    .fetch_all(&mut *cxn)
    .await
    .context("Fetching tasks on a task list")?;

    Ok(TaskList {
        id: list_row.id,
        tasks: task_rows.into_iter().map(Into::into).collect(),
    })
}

pub struct DbListReader {}

impl domain::task_list::driven_ports::ListReader for DbListReader {
    async fn get_by_id(
        &self,
        list_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<TaskList>, Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;
        let connection = cxn_handle.borrow_connection();

        let list_row: Option<TaskListRow> =
            query_as("SELECT tl.id, tl.user_id FROM task_list tl WHERE tl.id = $1")
                .bind(list_id)
                .fetch_optional(&mut *connection)
                .await
                .context("Fetching a task list by id")?;
        let Some(list_row) = list_row else {
            return Ok(None);
        };

        Ok(Some(hydrate_list(list_row, connection).await?))
    }

    async fn get_by_user_id(
        &self,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<TaskList>, Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;
        let connection = cxn_handle.borrow_connection();

        let list_row: Option<TaskListRow> =
            query_as("SELECT tl.id, tl.user_id FROM task_list tl WHERE tl.user_id = $1")
                .bind(user_id)
                .fetch_optional(&mut *connection)
                .await
                .context("Fetching a task list by owner")?;
        let Some(list_row) = list_row else {
            return Ok(None);
        };

        Ok(Some(hydrate_list(list_row, connection).await?))
    }
}
