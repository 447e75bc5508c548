pub mod task;
pub mod task_list;
pub mod user;

#[cfg(test)]
pub mod test_util;
