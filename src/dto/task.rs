use crate::domain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Lifecycle state of a task on the API
#[derive(Deserialize, Serialize, ToSchema, Clone, Copy)]
#[cfg_attr(test, derive(PartialEq, Eq, Debug))]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl From<TaskStatus> for domain::task::TaskStatus {
    fn from(value: TaskStatus) -> Self {
        match value {
            TaskStatus::Todo => domain::task::TaskStatus::Todo,
            TaskStatus::InProgress => domain::task::TaskStatus::InProgress,
            TaskStatus::Done => domain::task::TaskStatus::Done,
        }
    }
}

impl From<domain::task::TaskStatus> for TaskStatus {
    fn from(value: domain::task::TaskStatus) -> Self {
        match value {
            domain::task::TaskStatus::Todo => TaskStatus::Todo,
            domain::task::TaskStatus::InProgress => TaskStatus::InProgress,
            domain::task::TaskStatus::Done => TaskStatus::Done,
        }
    }
}

/// Priority of a task on the API
#[derive(Deserialize, Serialize, ToSchema, Clone, Copy)]
#[cfg_attr(test, derive(PartialEq, Eq, Debug))]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl From<TaskPriority> for domain::task::TaskPriority {
    fn from(value: TaskPriority) -> Self {
        match value {
            TaskPriority::Low => domain::task::TaskPriority::Low,
            TaskPriority::Medium => domain::task::TaskPriority::Medium,
            TaskPriority::High => domain::task::TaskPriority::High,
        }
    }
}

impl From<domain::task::TaskPriority> for TaskPriority {
    fn from(value: domain::task::TaskPriority) -> Self {
        match value {
            domain::task::TaskPriority::Low => TaskPriority::Low,
            domain::task::TaskPriority::Medium => TaskPriority::Medium,
            domain::task::TaskPriority::High => TaskPriority::High,
        }
    }
}

/// DTO for creating a new task via the API
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct NewTask {
    #[validate(length(min = 1, max = 50))]
    #[schema(example = "Water the plants")]
    pub title: String,
    #[validate(length(max = 200))]
    #[schema(example = "The ones on the balcony, not the cactus")]
    pub description: Option<String>,
    /// Defaults to "General" when omitted
    #[validate(length(max = 30))]
    #[schema(example = "Chores")]
    pub category: Option<String>,
    pub priority: TaskPriority,
    /// Must be in the future when present
    pub deadline: Option<DateTime<Utc>>,
}

impl From<NewTask> for domain::task::NewTask {
    fn from(value: NewTask) -> Self {
        domain::task::NewTask {
            title: value.title,
            description: value.description,
            category: value.category,
            priority: value.priority.into(),
            deadline: value.deadline,
        }
    }
}

/// DTO for replacing a task's content via the API
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct UpdateTask {
    #[validate(length(min = 1, max = 50))]
    #[schema(example = "Water the plants")]
    pub title: String,
    #[validate(length(max = 200))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 30))]
    #[schema(example = "Chores")]
    pub category: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// Must be in the future when present
    pub deadline: Option<DateTime<Utc>>,
}

impl From<UpdateTask> for domain::task::UpdateTask {
    fn from(value: UpdateTask) -> Self {
        domain::task::UpdateTask {
            title: value.title,
            description: value.description,
            category: value.category,
            status: value.status.into(),
            priority: value.priority.into(),
            deadline: value.deadline,
        }
    }
}

/// DTO for a returned task on the API
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct TaskResponse {
    #[schema(example = "77f159b6-2c5e-44ac-8fa9-e318b6d4a463")]
    pub id: String,
    #[schema(example = "Water the plants")]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "Chores")]
    pub category: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<domain::task::Task> for TaskResponse {
    fn from(value: domain::task::Task) -> Self {
        TaskResponse {
            id: value.id,
            title: value.title,
            description: value.description,
            category: value.category,
            status: value.status.into(),
            priority: value.priority.into(),
            deadline: value.deadline,
            created_at: value.created_at,
        }
    }
}
