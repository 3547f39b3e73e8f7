use crate::domain;
use crate::domain::task::driven_ports::{TaskReader, TaskWriter};
use crate::domain::task::driving_ports::TaskError;
use crate::domain::user::driven_ports::UserReader;
use crate::external_connections::ExternalConnectivity;
use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing::error;

/// Category applied to tasks created without one
pub const DEFAULT_CATEGORY: &str = "General";

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        };
        write!(f, "{label}")
    }
}

impl FromStr for TaskStatus {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            other => Err(anyhow::anyhow!("unrecognized task status: {other}")),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl Display for TaskPriority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{label}")
    }
}

impl FromStr for TaskPriority {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(anyhow::anyhow!("unrecognized task priority: {other}")),
        }
    }
}

#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct Task {
    pub id: String,
    pub owner_user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg_attr(test, derive(Clone, Debug))]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: TaskPriority,
    pub deadline: Option<DateTime<Utc>>,
}

#[cfg_attr(test, derive(Clone, Debug))]
pub struct UpdateTask {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub deadline: Option<DateTime<Utc>>,
}

pub mod driven_ports {
    use super::*;

    pub trait TaskReader: Sync {
        /// Fetches a user's tasks ordered by creation time, oldest first
        async fn tasks_for_user(
            &self,
            user_id: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Task>, anyhow::Error>;

        /// Fetches a single task, scoped to its owner. A task ID belonging to a
        /// different user produces None just like a nonexistent one.
        async fn task_for_user(
            &self,
            user_id: &str,
            task_id: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Task>, anyhow::Error>;
    }

    pub trait TaskWriter: Sync {
        async fn create_task_for_user(
            &self,
            user_id: &str,
            new_task: &NewTask,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Task, anyhow::Error>;

        async fn update_task_for_user(
            &self,
            user_id: &str,
            task_id: &str,
            update: &UpdateTask,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;

        async fn delete_task_for_user(
            &self,
            user_id: &str,
            task_id: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum TaskError {
        #[error("The acting user did not exist.")]
        UserDoesNotExist,
        #[error("Task with id {id} not found")]
        TaskNotFound { id: String },
        #[error("The task deadline must be in the future.")]
        DeadlineNotInFuture,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    impl From<domain::user::UserResolveErr> for TaskError {
        fn from(value: domain::user::UserResolveErr) -> Self {
            match value {
                domain::user::UserResolveErr::NotFound(username) => {
                    error!("User {username} didn't exist when touching tasks.");
                    TaskError::UserDoesNotExist
                }
                domain::user::UserResolveErr::PortError(err) => {
                    TaskError::from(err.context("resolving a task's owner"))
                }
            }
        }
    }


    pub trait TaskPort {
        async fn create_task_for_user(
            &self,
            username: &str,
            task: &NewTask,
            ext_cxn: &mut impl ExternalConnectivity,
            user_read: &impl UserReader,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<Task, TaskError>;

        async fn tasks_for_user(
            &self,
            username: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            user_read: &impl UserReader,
            task_read: &impl driven_ports::TaskReader,
        ) -> Result<Vec<Task>, TaskError>;

        async fn update_task(
            &self,
            username: &str,
            task_id: &str,
            update: &UpdateTask,
            ext_cxn: &mut impl ExternalConnectivity,
            user_read: &impl UserReader,
            task_read: &impl driven_ports::TaskReader,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<Task, TaskError>;

        async fn delete_task(
            &self,
            username: &str,
            task_id: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            user_read: &impl UserReader,
            task_read: &impl driven_ports::TaskReader,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<(), TaskError>;
    }
}

/// Rejects deadlines that aren't strictly in the future at the time of the write
fn check_deadline(deadline: &Option<DateTime<Utc>>) -> Result<(), TaskError> {
    match deadline {
        Some(moment) if *moment <= Utc::now() => Err(TaskError::DeadlineNotInFuture),
        _ => Ok(()),
    }
}

pub struct TaskService {}

impl driving_ports::TaskPort for TaskService {
    async fn create_task_for_user(
        &self,
        username: &str,
        task: &NewTask,
        ext_cxn: &mut impl ExternalConnectivity,
        user_read: &impl UserReader,
        task_write: &impl TaskWriter,
    ) -> Result<Task, TaskError> {
        let owner = domain::user::resolve_user(username, &mut *ext_cxn, user_read).await?;
        check_deadline(&task.deadline)?;

        let created_task = task_write
            .create_task_for_user(&owner.id, task, &mut *ext_cxn)
            .await?;
        Ok(created_task)
    }

    async fn tasks_for_user(
        &self,
        username: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        user_read: &impl UserReader,
        task_read: &impl TaskReader,
    ) -> Result<Vec<Task>, TaskError> {
        let owner = domain::user::resolve_user(username, &mut *ext_cxn, user_read).await?;
        let tasks = task_read.tasks_for_user(&owner.id, &mut *ext_cxn).await?;

        Ok(tasks)
    }

    async fn update_task(
        &self,
        username: &str,
        task_id: &str,
        update: &UpdateTask,
        ext_cxn: &mut impl ExternalConnectivity,
        user_read: &impl UserReader,
        task_read: &impl TaskReader,
        task_write: &impl TaskWriter,
    ) -> Result<Task, TaskError> {
        let owner = domain::user::resolve_user(username, &mut *ext_cxn, user_read).await?;
        let existing_task = task_read
            .task_for_user(&owner.id, task_id, &mut *ext_cxn)
            .await?
            .ok_or_else(|| TaskError::TaskNotFound {
                id: task_id.to_owned(),
            })?;
        check_deadline(&update.deadline)?;

        task_write
            .update_task_for_user(&owner.id, task_id, update, &mut *ext_cxn)
            .await?;

        Ok(Task {
            title: update.title.clone(),
            description: update.description.clone(),
            category: update.category.clone(),
            status: update.status,
            priority: update.priority,
            deadline: update.deadline,
            ..existing_task
        })
    }

    async fn delete_task(
        &self,
        username: &str,
        task_id: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        user_read: &impl UserReader,
        task_read: &impl TaskReader,
        task_write: &impl TaskWriter,
    ) -> Result<(), TaskError> {
        let owner = domain::user::resolve_user(username, &mut *ext_cxn, user_read).await?;
        let existing_task = task_read
            .task_for_user(&owner.id, task_id, &mut *ext_cxn)
            .await?;
        if existing_task.is_none() {
            return Err(TaskError::TaskNotFound {
                id: task_id.to_owned(),
            });
        }

        task_write
            .delete_task_for_user(&owner.id, task_id, &mut *ext_cxn)
            .await?;
        Ok(())
    }
}
