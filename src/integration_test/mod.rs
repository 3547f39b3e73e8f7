pub mod test_util;

mod task_persistence;
mod user_persistence;
