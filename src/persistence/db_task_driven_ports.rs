use crate::domain;
use crate::domain::task::{NewTask, Task, UpdateTask};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use chrono::{DateTime, Utc};
use sqlx::{query, query_as};
use uuid::Uuid;

pub struct DbTaskReader {}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: String,
    user_id: String,
    title: String,
    description: Option<String>,
    category: String,
    status: String,
    priority: String,
    deadline: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = anyhow::Error;

    fn try_from(value: TaskRow) -> Result<Self, Self::Error> {
        Ok(Task {
            id: value.id,
            owner_user_id: value.user_id,
            title: value.title,
            description: value.description,
            category: value.category,
            status: value.status.parse().context("reading a task's status")?,
            priority: value
                .priority
                .parse()
                .context("reading a task's priority")?,
            deadline: value.deadline,
            created_at: value.created_at,
        })
    }
}

impl domain::task::driven_ports::TaskReader for DbTaskReader {
    async fn tasks_for_user(
        &self,
        user_id: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<Task>, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let tasks = query_as::<_, TaskRow>(
            "SELECT t.* FROM tasks t WHERE t.user_id = $1 ORDER BY t.created_at ASC",
        )
        .bind(user_id)
        .fetch_all(cxn.borrow_connection())
        .await
        .context("trying to fetch tasks for a user")?
        .into_iter()
        .map(Task::try_from)
        .collect::<Result<Vec<Task>, Error>>()?;

        Ok(tasks)
    }

    async fn task_for_user(
        &self,
        user_id: &str,
        task_id: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Task>, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let task_row =
            query_as::<_, TaskRow>("SELECT t.* FROM tasks t WHERE t.user_id = $1 AND t.id = $2")
                .bind(user_id)
                .bind(task_id)
                .fetch_optional(cxn.borrow_connection())
                .await
                .context("trying to fetch a task by ID")?;

        task_row.map(Task::try_from).transpose()
    }
}

pub struct DbTaskWriter {}

impl domain::task::driven_ports::TaskWriter for DbTaskWriter {
    async fn create_task_for_user(
        &self,
        user_id: &str,
        new_task: &NewTask,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Task, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let category = new_task
            .category
            .clone()
            .unwrap_or_else(|| domain::task::DEFAULT_CATEGORY.to_owned());
        let created_row = query_as::<_, TaskRow>(
            "INSERT INTO tasks(id, user_id, title, description, category, status, priority, deadline, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now()) \
             RETURNING *",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(&new_task.title)
        .bind(&new_task.description)
        .bind(&category)
        .bind(domain::task::TaskStatus::Todo.to_string())
        .bind(new_task.priority.to_string())
        .bind(new_task.deadline)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("trying to insert a new task into the database")?;

        Task::try_from(created_row)
    }

    async fn update_task_for_user(
        &self,
        user_id: &str,
        task_id: &str,
        update: &UpdateTask,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        query(
            "UPDATE tasks SET title = $1, description = $2, category = $3, status = $4, priority = $5, deadline = $6 \
             WHERE user_id = $7 AND id = $8",
        )
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.category)
        .bind(update.status.to_string())
        .bind(update.priority.to_string())
        .bind(update.deadline)
        .bind(user_id)
        .bind(task_id)
        .execute(cxn.borrow_connection())
        .await
        .context("trying to update a task in the database")?;

        Ok(())
    }

    async fn delete_task_for_user(
        &self,
        user_id: &str,
        task_id: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        query("DELETE FROM tasks WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(task_id)
            .execute(cxn.borrow_connection())
            .await
            .context("trying to remove a task from the database")?;

        Ok(())
    }
}
