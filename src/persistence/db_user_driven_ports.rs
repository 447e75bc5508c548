use super::{NewId, TaskListRow, TaskRow};
use crate::domain;
use crate::domain::task_list::TaskList;
use crate::domain::user::driven_ports::ProvisionedUser;
use crate::domain::user::{CreateUser, User};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use sqlx::{FromRow, PgConnection, query, query_as};
use std::collections::HashMap;

pub struct DbUserDetector {}

impl domain::user::driven_ports::DetectUser for DbUserDetector {
    async fn user_exists(
        &self,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<bool, anyhow::Error> {
        let mut connection = ext_cxn.database_cxn().await?;

        let user_with_id_count = query_as::<_, super::Count>(
            "SELECT count(*) AS count FROM todo_user tu WHERE tu.id = $1",
        )
        .bind(user_id)
        .fetch_one(connection.borrow_connection())
        .await
        .context("Detecting user with ID")?;

        Ok(user_with_id_count.count() > 0)
    }
}

#[derive(FromRow)]
struct UserRow {
    id: i32,
    name: String,
}

/// Stitches user rows together with their task lists and tasks. Rows are expected
/// in ID order, which keeps each list's tasks in insertion order.
fn assemble_users(
    user_rows: Vec<UserRow>,
    list_rows: Vec<TaskListRow>,
    task_rows: Vec<TaskRow>,
) -> Vec<User> {
    let mut tasks_by_list: HashMap<i32, Vec<domain::task::Task>> = HashMap::new();
    for task_row in task_rows {
        tasks_by_list
            .entry(task_row.task_list_id)
            .or_default()
            .push(task_row.into());
    }

    let mut lists_by_user: HashMap<i32, TaskList> = HashMap::new();
    for list_row in list_rows {
        let list_tasks = tasks_by_list.remove(&list_row.id).unwrap_or_default();
        lists_by_user.insert(
            list_row.user_id,
            TaskList {
                id: list_row.id,
                tasks: list_tasks,
            },
        );
    }

    user_rows
        .into_iter()
        .map(|user_row| User {
            id: user_row.id,
            name: user_row.name,
            task_list: lists_by_user.remove(&user_row.id),
        })
        .collect()
}

/// Loads the task lists and tasks belonging to the given user rows, producing
/// fully populated [User] entities
async fn hydrate_users(
    user_rows: Vec<UserRow>,
    cxn: &mut PgConnection,
) -> Result<Vec<User>, anyhow::Error> {
    if user_rows.is_empty() {
        return Ok(Vec::new());
    }

    let user_ids: Vec<i32> = user_rows.iter().map(|row| row.id).collect();
    let list_rows: Vec<TaskListRow> = query_as(
        "SELECT tl.id, tl.user_id FROM task_list tl WHERE tl.user_id = ANY($1) ORDER BY tl.id",
    )
    .bind(&user_ids)
    .fetch_all(&mut *cxn)
    .await
    .context("Fetching task lists for a set of users")?;

    let list_ids: Vec<i32> = list_rows.iter().map(|row| row.id).collect();
    let task_rows: Vec<TaskRow> = query_as(
        "SELECT t.id, t.task_list_id, t.description, t.finished \
         FROM task t WHERE t.task_list_id = ANY($1) ORDER BY t.id",
    )
    .bind(&list_ids)
    .fetch_all(&mut *cxn)
    .await
    .context("Fetching tasks for a set of users")?;

    Ok(assemble_users(user_rows, list_rows, task_rows))
}

pub struct DbUserReader {}

impl domain::user::driven_ports::UserReader for DbUserReader {
    async fn get_all(&self, ext_cxn: &mut impl ExternalConnectivity) -> Result<Vec<User>, Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;
        let connection = cxn_handle.borrow_connection();

        let user_rows: Vec<UserRow> =
            query_as("SELECT tu.id, tu.name FROM todo_user tu ORDER BY tu.id")
                .fetch_all(&mut *connection)
                .await
                .context("Fetching all users")?;

        hydrate_users(user_rows, connection).await
    }

    async fn get_by_id(
        &self,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<User>, Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;
        let connection = cxn_handle.borrow_connection();

        let user_row: Option<UserRow> =
            query_as("SELECT tu.id, tu.name FROM todo_user tu WHERE tu.id = $1")
                .bind(user_id)
                .fetch_optional(&mut *connection)
                .await
                .context("Fetching a user by id")?;
        let Some(user_row) = user_row else {
            return Ok(None);
        };

        let mut users = hydrate_users(vec![user_row], connection).await?;
        Ok(users.pop())
    }

    async fn search_by_name(
        &self,
        name_fragment: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<User>, Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;
        let connection = cxn_handle.borrow_connection();

        let user_rows: Vec<UserRow> = query_as(
            "SELECT tu.id, tu.name FROM todo_user tu \
             WHERE tu.name LIKE '%' || $1 || '%' ORDER BY tu.id",
        )
        .bind(name_fragment)
        .fetch_all(&mut *connection)
        .await
        .context("Searching users by name")?;

        hydrate_users(user_rows, connection).await
    }
}

pub struct DbUserWriter {}

impl domain::user::driven_ports::UserWriter for DbUserWriter {
    async fn create(
        &self,
        user: &CreateUser,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<ProvisionedUser, Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;
        let connection = cxn_handle.borrow_connection();

        // The list insert intentionally happens as a second independent write,
        // so a failure here can leave a user without a list.
        let inserted_user: NewId =
            query_as("INSERT INTO todo_user(name) VALUES ($1) RETURNING todo_user.id")
                .bind(&user.name)
                .fetch_one(&mut *connection)
                .await
                .context("Inserting new user")?;

        let inserted_list: NewId =
            query_as("INSERT INTO task_list(user_id) VALUES ($1) RETURNING task_list.id")
                .bind(inserted_user.id)
                .fetch_one(&mut *connection)
                .await
                .context("Provisioning task list for new user")?;

        Ok(ProvisionedUser {
            user_id: inserted_user.id,
            task_list_id: inserted_list.id,
        })
    }

    async fn rename(
        &self,
        user_id: i32,
        new_name: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        query("UPDATE todo_user SET name = $1 WHERE id = $2")
            .bind(new_name)
            .bind(user_id)
            .execute(cxn_handle.borrow_connection())
            .await
            .context("Renaming user")?;

        Ok(())
    }

    async fn delete(
        &self,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        // Only removes the user row. While the user still owns a task list the
        // foreign key rejects this, and the resulting error bubbles up as-is.
        query("DELETE FROM todo_user WHERE id = $1")
            .bind(user_id)
            .execute(cxn_handle.borrow_connection())
            .await
            .context("Deleting user")?;

        Ok(())
    }
}
