pub mod auth;
pub mod swagger_main;
pub mod task;
pub mod task_list;
pub mod user;

#[cfg(test)]
pub(crate) mod test_util;
