use crate::domain::task::Task;
use crate::domain::user;
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use thiserror::Error;

/// A user's task list. Every user owns exactly one, provisioned at signup,
/// and its tasks always come back in the order they were added.
#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct TaskList {
    pub id: i32,
    pub tasks: Vec<Task>,
}

pub mod driven_ports {
    use super::*;

    pub trait ListReader: Sync {
        async fn get_by_id(
            &self,
            list_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<TaskList>, anyhow::Error>;
        async fn get_by_user_id(
            &self,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<TaskList>, anyhow::Error>;
    }

    pub trait DetectList: Sync {
        async fn list_exists(
            &self,
            list_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;

    #[derive(Debug, Error)]
    pub enum ListError {
        #[error("The specified user did not exist.")]
        UserDoesNotExist,
        #[error("The specified task list did not exist.")]
        ListDoesNotExist,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    impl From<user::UserExistsErr> for ListError {
        fn from(value: user::UserExistsErr) -> Self {
            match value {
                user::UserExistsErr::UserDoesNotExist(_) => Self::UserDoesNotExist,
                user::UserExistsErr::PortError(err) => Self::PortError(err),
            }
        }
    }

    pub trait ListPort {
        async fn list_by_id(
            &self,
            list_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            l_reader: &impl driven_ports::ListReader,
        ) -> Result<TaskList, ListError>;
        async fn list_for_user(
            &self,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            u_detect: &impl user::driven_ports::DetectUser,
            l_reader: &impl driven_ports::ListReader,
        ) -> Result<TaskList, ListError>;
    }

}

pub struct ListService {}

#[derive(Debug, Error)]
pub(super) enum ListExistsErr {
    #[error("task list with ID {0} does not exist")]
    ListDoesNotExist(i32),

    #[error(transparent)]
    PortError(#[from] anyhow::Error),
}

/// Resolves to an error when the given list ID has no matching row
pub(super) async fn verify_list_exists(
    id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    list_detect: &impl driven_ports::DetectList,
) -> Result<(), ListExistsErr> {
    let does_list_exist = list_detect.list_exists(id, ext_cxn).await?;

    if does_list_exist {
        Ok(())
    } else {
        Err(ListExistsErr::ListDoesNotExist(id))
    }
}

impl driving_ports::ListPort for ListService {
    async fn list_by_id(
        &self,
        list_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        l_reader: &impl driven_ports::ListReader,
    ) -> Result<TaskList, driving_ports::ListError> {
        let maybe_list = l_reader
            .get_by_id(list_id, ext_cxn)
            .await
            .context("Fetching a task list by ID")?;

        maybe_list.ok_or(driving_ports::ListError::ListDoesNotExist)
    }

    async fn list_for_user(
        &self,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        u_detect: &impl user::driven_ports::DetectUser,
        l_reader: &impl driven_ports::ListReader,
    ) -> Result<TaskList, driving_ports::ListError> {
        user::verify_user_exists(user_id, &mut *ext_cxn, u_detect).await?;

        let maybe_list = l_reader
            .get_by_user_id(user_id, &mut *ext_cxn)
            .await
            .context("Fetching a user's task list")?;

        maybe_list.ok_or(driving_ports::ListError::ListDoesNotExist)
    }
}
