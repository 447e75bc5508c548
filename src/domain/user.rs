use crate::domain::task_list::TaskList;
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use thiserror::Error;

/// A user of the application. Reading a user always reconstructs their task list,
/// tasks included, in the same logical fetch.
#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct User {
    pub id: i32,
    pub name: String,
    /// Only absent when the list insert failed after the user insert went through
    pub task_list: Option<TaskList>,
}

#[cfg_attr(test, derive(Clone))]
pub struct CreateUser {
    pub name: String,
}

#[cfg_attr(test, derive(Clone))]
pub struct UpdateUser {
    pub name: String,
}

pub mod driven_ports {
    use super::*;

    /// IDs assigned by the store when a user and their empty task list are provisioned
    pub struct ProvisionedUser {
        pub user_id: i32,
        pub task_list_id: i32,
    }

    pub trait UserReader: Sync {
        async fn get_all(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<User>, anyhow::Error>;
        async fn get_by_id(
            &self,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<User>, anyhow::Error>;
        async fn search_by_name(
            &self,
            name_fragment: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<User>, anyhow::Error>;
    }

    pub trait UserWriter: Sync {
        /// Inserts the user row, then provisions their empty task list as a second,
        /// independent write.
        async fn create(
            &self,
            user: &CreateUser,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<ProvisionedUser, anyhow::Error>;
        async fn rename(
            &self,
            user_id: i32,
            new_name: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;
        /// Deletes only the user row. The store rejects the delete while dependent
        /// rows exist, and that failure passes through unmodified.
        async fn delete(
            &self,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;
    }

    pub trait DetectUser: Sync {
        async fn user_exists(
            &self,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;

    #[derive(Debug, Error)]
    pub enum UserError {
        #[error("The specified user did not exist.")]
        NotFound,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    pub trait UserPort {
        async fn get_users(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl driven_ports::UserReader,
        ) -> Result<Vec<User>, anyhow::Error>;
        async fn user_by_id(
            &self,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl driven_ports::UserReader,
        ) -> Result<Option<User>, anyhow::Error>;
        async fn search_users(
            &self,
            name_fragment: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl driven_ports::UserReader,
        ) -> Result<Vec<User>, anyhow::Error>;
        async fn create_user(
            &self,
            new_user: &CreateUser,
            ext_cxn: &mut impl ExternalConnectivity,
            u_writer: &impl driven_ports::UserWriter,
        ) -> Result<User, anyhow::Error>;
        async fn rename_user(
            &self,
            user_id: i32,
            update: &UpdateUser,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl driven_ports::UserReader,
            u_writer: &impl driven_ports::UserWriter,
        ) -> Result<User, UserError>;
        async fn delete_user(
            &self,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            u_detect: &impl driven_ports::DetectUser,
            u_writer: &impl driven_ports::UserWriter,
        ) -> Result<(), UserError>;
    }

}

pub struct UserService {}

#[derive(Debug, Error)]
pub(super) enum UserExistsErr {
    #[error("user with ID {0} does not exist")]
    UserDoesNotExist(i32),

    #[error(transparent)]
    PortError(#[from] anyhow::Error),
}

impl From<UserExistsErr> for driving_ports::UserError {
    fn from(value: UserExistsErr) -> Self {
        match value {
            UserExistsErr::UserDoesNotExist(_) => Self::NotFound,
            UserExistsErr::PortError(err) => Self::PortError(err),
        }
    }
}

/// Resolves to an error when the given user ID has no matching row
pub(super) async fn verify_user_exists(
    id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    user_detect: &impl driven_ports::DetectUser,
) -> Result<(), UserExistsErr> {
    let does_user_exist = user_detect.user_exists(id, ext_cxn).await?;

    if does_user_exist {
        Ok(())
    } else {
        Err(UserExistsErr::UserDoesNotExist(id))
    }
}

impl driving_ports::UserPort for UserService {
    async fn get_users(
        &self,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl driven_ports::UserReader,
    ) -> Result<Vec<User>, anyhow::Error> {
        let all_users_result = u_reader.get_all(ext_cxn).await;
        if let Err(ref port_err) = all_users_result {
            tracing::error!("User fetch failure: {port_err}");
        }

        all_users_result.context("Failed fetching users")
    }

    async fn user_by_id(
        &self,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl driven_ports::UserReader,
    ) -> Result<Option<User>, anyhow::Error> {
        u_reader
            .get_by_id(user_id, ext_cxn)
            .await
            .context("Fetching a user by ID")
    }

    async fn search_users(
        &self,
        name_fragment: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl driven_ports::UserReader,
    ) -> Result<Vec<User>, anyhow::Error> {
        u_reader
            .search_by_name(name_fragment, ext_cxn)
            .await
            .context("Searching users by name")
    }

    async fn create_user(
        &self,
        new_user: &CreateUser,
        ext_cxn: &mut impl ExternalConnectivity,
        u_writer: &impl driven_ports::UserWriter,
    ) -> Result<User, anyhow::Error> {
        let provisioned = u_writer
            .create(new_user, ext_cxn)
            .await
            .context("Trying to create user at service level")?;

        Ok(User {
            id: provisioned.user_id,
            name: new_user.name.clone(),
            task_list: Some(TaskList {
                id: provisioned.task_list_id,
                tasks: Vec::new(),
            }),
        })
    }

    async fn rename_user(
        &self,
        user_id: i32,
        update: &UpdateUser,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl driven_ports::UserReader,
        u_writer: &impl driven_ports::UserWriter,
    ) -> Result<User, driving_ports::UserError> {
        let mut user = u_reader
            .get_by_id(user_id, &mut *ext_cxn)
            .await
            .context("Looking up user before rename")?
            .ok_or(driving_ports::UserError::NotFound)?;

        u_writer
            .rename(user_id, &update.name, &mut *ext_cxn)
            .await
            .context("Renaming user")?;

        user.name = update.name.clone();
        Ok(user)
    }

    async fn delete_user(
        &self,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        u_detect: &impl driven_ports::DetectUser,
        u_writer: &impl driven_ports::UserWriter,
    ) -> Result<(), driving_ports::UserError> {
        verify_user_exists(user_id, &mut *ext_cxn, u_detect).await?;

        u_writer
            .delete(user_id, &mut *ext_cxn)
            .await
            .context("Deleting user")?;
        Ok(())
    }
}

#[cfg(test)]
mod user_service_tests {
    use super::*;
    use crate::domain::test_util::Connectivity;
    use crate::domain::user::driving_ports::{UserError, UserPort};
    use crate::external_connections;
    use speculoos::prelude::*;
    use std::sync::RwLock;

    mod get_users {
        use super::*;

        #[tokio::test]
        async fn fetches_users() {
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
            let user_data = test_util::InMemoryUserPersistence::new_with_users(&[
                CreateUser {
                    name: "Ana".to_owned(),
                },
                CreateUser {
                    name: "Otavio".to_owned(),
                },
            ]);
            let locked_user_data = RwLock::new(user_data);

            let users_result = UserService {}
                .get_users(&mut ext_cxn, &locked_user_data)
                .await;

            assert_that!(users_result).is_ok().matches(|users| {
                matches!(users.as_slice(), [
                    User { id: 1, name: n1, .. },
                    User { id: 2, name: n2, .. },
                ] if n1 == "Ana" && n2 == "Otavio")
            });
        }

        #[tokio::test]
        async fn propagates_port_error() {
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
            let mut user_data = test_util::InMemoryUserPersistence::new();
            user_data.connectivity = Connectivity::Disconnected;
            let locked_user_data = RwLock::new(user_data);

            let users_result = UserService {}
                .get_users(&mut ext_cxn, &locked_user_data)
                .await;
            assert_that!(users_result).is_err();
        }
    }

    mod create_user {
        use super::*;

        #[tokio::test]
        async fn created_user_has_an_empty_task_list_attached() {
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
            let user_data = test_util::InMemoryUserPersistence::new_locked();

            let create_result = UserService {}
                .create_user(
                    &CreateUser {
                        name: "Ana".to_owned(),
                    },
                    &mut ext_cxn,
                    &user_data,
                )
                .await;

            let created_user = match create_result {
                Ok(user) => user,
                Err(error) => panic!("User creation should have succeeded: {error}"),
            };
            assert_eq!("Ana", created_user.name);
            let attached_list = created_user
                .task_list
                .expect("a fresh user must own a task list");
            assert_that!(attached_list.tasks).is_empty();
        }

        #[tokio::test]
        async fn propagates_port_error() {
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
            let mut user_data = test_util::InMemoryUserPersistence::new();
            user_data.connectivity = Connectivity::Disconnected;
            let locked_user_data = RwLock::new(user_data);

            let create_result = UserService {}
                .create_user(
                    &CreateUser {
                        name: "Ana".to_owned(),
                    },
                    &mut ext_cxn,
                    &locked_user_data,
                )
                .await;
            assert_that!(create_result).is_err();
        }
    }

    mod search_users {
        use super::*;

        #[tokio::test]
        async fn finds_users_by_name_fragment() {
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
            let locked_user_data =
                RwLock::new(test_util::InMemoryUserPersistence::new_with_users(&[
                    CreateUser {
                        name: "Ana Clara".to_owned(),
                    },
                    CreateUser {
                        name: "Bruno".to_owned(),
                    },
                ]));

            let search_result = UserService {}
                .search_users("Ana", &mut ext_cxn, &locked_user_data)
                .await;
            assert_that!(search_result).is_ok().matches(|users| {
                matches!(users.as_slice(), [User { id: 1, name, .. }] if name == "Ana Clara")
            });
        }

        #[tokio::test]
        async fn returns_empty_set_for_no_match() {
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
            let locked_user_data =
                RwLock::new(test_util::InMemoryUserPersistence::new_with_users(&[
                    CreateUser {
                        name: "Ana Clara".to_owned(),
                    },
                ]));

            let search_result = UserService {}
                .search_users("Zelda", &mut ext_cxn, &locked_user_data)
                .await;
            assert_that!(search_result).is_ok().is_empty();
        }
    }

    mod rename_user {
        use super::*;

        #[tokio::test]
        async fn returns_updated_user() {
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
            let locked_user_data =
                RwLock::new(test_util::InMemoryUserPersistence::new_with_users(&[
                    CreateUser {
                        name: "Ana".to_owned(),
                    },
                ]));

            let rename_result = UserService {}
                .rename_user(
                    1,
                    &UpdateUser {
                        name: "Ana Clara".to_owned(),
                    },
                    &mut ext_cxn,
                    &locked_user_data,
                    &locked_user_data,
                )
                .await;

            assert_that!(rename_result)
                .is_ok()
                .matches(|user| user.name == "Ana Clara");

            let persisted = locked_user_data.read().expect("user rwlock poisoned");
            assert_eq!("Ana Clara", persisted.created_users[0].name);
        }

        #[tokio::test]
        async fn errors_when_user_missing() {
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
            let locked_user_data = test_util::InMemoryUserPersistence::new_locked();

            let rename_result = UserService {}
                .rename_user(
                    42,
                    &UpdateUser {
                        name: "Nobody".to_owned(),
                    },
                    &mut ext_cxn,
                    &locked_user_data,
                    &locked_user_data,
                )
                .await;
            assert_that!(rename_result)
                .is_err()
                .matches(|err| matches!(err, UserError::NotFound));
        }
    }

    mod delete_user {
        use super::*;

        #[tokio::test]
        async fn errors_when_user_missing() {
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
            let locked_user_data = test_util::InMemoryUserPersistence::new_locked();

            let delete_result = UserService {}
                .delete_user(9, &mut ext_cxn, &locked_user_data, &locked_user_data)
                .await;
            assert_that!(delete_result)
                .is_err()
                .matches(|err| matches!(err, UserError::NotFound));
        }

        #[tokio::test]
        async fn surfaces_integrity_error_while_list_exists() {
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
            let locked_user_data =
                RwLock::new(test_util::InMemoryUserPersistence::new_with_users(&[
                    CreateUser {
                        name: "Ana".to_owned(),
                    },
                ]));

            let delete_result = UserService {}
                .delete_user(1, &mut ext_cxn, &locked_user_data, &locked_user_data)
                .await;
            assert_that!(delete_result)
                .is_err()
                .matches(|err| matches!(err, UserError::PortError(_)));
        }

        #[tokio::test]
        async fn deletes_a_user_with_no_dependents() {
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
            let mut user_data = test_util::InMemoryUserPersistence::new();
            user_data.push_listless_user("Orphaned");
            let locked_user_data = RwLock::new(user_data);

            let delete_result = UserService {}
                .delete_user(1, &mut ext_cxn, &locked_user_data, &locked_user_data)
                .await;
            assert_that!(delete_result).is_ok();

            let persisted = locked_user_data.read().expect("user rwlock poisoned");
            assert_that!(persisted.created_users).is_empty();
        }
    }
}
