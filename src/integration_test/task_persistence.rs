use super::test_util::prepare_db_and_test;
use crate::domain::task::driven_ports::{TaskReader, TaskWriter};
use crate::domain::task::{NewTask, TaskPriority, TaskStatus, UpdateTask};
use crate::domain::user::driven_ports::UserWriter;
use crate::domain::user::CreateUser;
use crate::external_connections::ExternalConnectivity;
use crate::persistence;
use crate::persistence::db_task_driven_ports::{DbTaskReader, DbTaskWriter};
use crate::persistence::db_user_driven_ports::DbWriteUsers;
use speculoos::prelude::*;

async fn provision_user(user_id: &str, ext_cxn: &mut impl ExternalConnectivity) {
    let user_writer = DbWriteUsers {};
    user_writer
        .create(
            &CreateUser {
                id: user_id.to_owned(),
                given_name: "Evan".to_owned(),
                family_name: "Rittenhouse".to_owned(),
                username: format!("user-{user_id}"),
                email: format!("{user_id}@example.com"),
            },
            ext_cxn,
        )
        .await
        .expect("could not provision task owner");
}

fn sample_task(title: &str) -> NewTask {
    NewTask {
        title: title.to_owned(),
        description: Some("A task for integration testing".to_owned()),
        category: None,
        priority: TaskPriority::Medium,
        deadline: None,
    }
}

#[test]
fn created_tasks_come_back_in_creation_order() {
    prepare_db_and_test(|pool| async move {
        let mut ext_cxn = persistence::ExternalConnectivity::new(pool);
        let task_reader = DbTaskReader {};
        let task_writer = DbTaskWriter {};
        provision_user("task-owner-1", &mut ext_cxn).await;

        let first = task_writer
            .create_task_for_user("task-owner-1", &sample_task("First task"), &mut ext_cxn)
            .await
            .expect("could not create first task");
        task_writer
            .create_task_for_user("task-owner-1", &sample_task("Second task"), &mut ext_cxn)
            .await
            .expect("could not create second task");

        assert_eq!(TaskStatus::Todo, first.status);
        assert_eq!("General", first.category);

        let tasks = task_reader
            .tasks_for_user("task-owner-1", &mut ext_cxn)
            .await
            .expect("could not list tasks");
        assert_eq!(2, tasks.len());
        assert_eq!("First task", tasks[0].title);
        assert_eq!("Second task", tasks[1].title);
    });
}

#[test]
fn task_lookups_are_scoped_to_their_owner() {
    prepare_db_and_test(|pool| async move {
        let mut ext_cxn = persistence::ExternalConnectivity::new(pool);
        let task_reader = DbTaskReader {};
        let task_writer = DbTaskWriter {};
        provision_user("task-owner-1", &mut ext_cxn).await;
        provision_user("task-owner-2", &mut ext_cxn).await;

        let owned_task = task_writer
            .create_task_for_user("task-owner-1", &sample_task("Private task"), &mut ext_cxn)
            .await
            .expect("could not create task");

        let foreign_lookup = task_reader
            .task_for_user("task-owner-2", &owned_task.id, &mut ext_cxn)
            .await
            .expect("could not query for task");
        assert_that!(foreign_lookup).is_none();

        let owner_lookup = task_reader
            .task_for_user("task-owner-1", &owned_task.id, &mut ext_cxn)
            .await
            .expect("could not query for task");
        assert_that!(owner_lookup)
            .is_some()
            .matches(|task| task.title == "Private task");
    });
}

#[test]
fn tasks_can_be_updated_and_deleted() {
    prepare_db_and_test(|pool| async move {
        let mut ext_cxn = persistence::ExternalConnectivity::new(pool);
        let task_reader = DbTaskReader {};
        let task_writer = DbTaskWriter {};
        provision_user("task-owner-1", &mut ext_cxn).await;

        let task = task_writer
            .create_task_for_user("task-owner-1", &sample_task("Mutable task"), &mut ext_cxn)
            .await
            .expect("could not create task");

        task_writer
            .update_task_for_user(
                "task-owner-1",
                &task.id,
                &UpdateTask {
                    title: "Renamed task".to_owned(),
                    description: None,
                    category: "Chores".to_owned(),
                    status: TaskStatus::Done,
                    priority: TaskPriority::High,
                    deadline: None,
                },
                &mut ext_cxn,
            )
            .await
            .expect("could not update task");

        let updated = task_reader
            .task_for_user("task-owner-1", &task.id, &mut ext_cxn)
            .await
            .expect("could not re-fetch task")
            .expect("task disappeared after update");
        assert_eq!("Renamed task", updated.title);
        assert_eq!(TaskStatus::Done, updated.status);
        assert_eq!(TaskPriority::High, updated.priority);
        assert_that!(updated.description).is_none();

        task_writer
            .delete_task_for_user("task-owner-1", &task.id, &mut ext_cxn)
            .await
            .expect("could not delete task");
        let after_delete = task_reader
            .task_for_user("task-owner-1", &task.id, &mut ext_cxn)
            .await
            .expect("could not query for task");
        assert_that!(after_delete).is_none();
    });
}
