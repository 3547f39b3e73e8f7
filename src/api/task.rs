use crate::api::security::Authenticated;
use crate::domain::task::driving_ports::{TaskError, TaskPort};
use crate::dto::err_resps::{BasicError400, BasicError401, BasicError404, BasicError500};
use crate::dto::task::{NewTask, TaskResponse, UpdateTask};
use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::{basic_error, GenericErrorResponse, Json, ValidationErrorResponse};
use crate::{domain, dto, persistence, AppState, SharedData};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use validator::Validate;

/// Adds the task CRUD routes under "/tasks" to the application router
pub fn task_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/tasks",
            post(
                |State(app_state): AppState,
                 authenticated: Authenticated,
                 Json(new_task): Json<dto::task::NewTask>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    create_task(authenticated, new_task, &mut ext_cxn, &task_service).await
                },
            ),
        )
        .route(
            "/tasks",
            get(
                |State(app_state): AppState, authenticated: Authenticated| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    list_tasks(authenticated, &mut ext_cxn, &task_service).await
                },
            ),
        )
        .route(
            "/tasks/:task_id",
            put(
                |State(app_state): AppState,
                 authenticated: Authenticated,
                 Path(task_id): Path<String>,
                 Json(update): Json<dto::task::UpdateTask>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    update_task(authenticated, task_id, update, &mut ext_cxn, &task_service).await
                },
            ),
        )
        .route(
            "/tasks/:task_id",
            delete(
                |State(app_state): AppState,
                 authenticated: Authenticated,
                 Path(task_id): Path<String>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    delete_task(authenticated, task_id, &mut ext_cxn, &task_service).await
                },
            ),
        )
}

/// Registers this module's endpoints with the OpenAPI docs
#[derive(OpenApi)]
#[openapi(
    paths(create_task, list_tasks, update_task, delete_task),
    tags(
        (name = "tasks", description = "CRUD for the signed-in user's tasks")
    )
)]
pub struct TaskApi;

/// Maps task service failures onto API error responses. A task belonging to another
/// user produces the same 404 as a task that doesn't exist.
fn task_error_response(err: TaskError) -> ErrorResponse {
    match err {
        TaskError::UserDoesNotExist => {
            basic_error(StatusCode::NOT_FOUND, "not_found", "User not found.").into()
        }
        TaskError::TaskNotFound { id } => basic_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("Task with id {id} not found"),
        )
        .into(),
        TaskError::DeadlineNotInFuture => basic_error(
            StatusCode::BAD_REQUEST,
            "invalid_input",
            "The task deadline must be in the future.",
        )
        .into(),
        TaskError::PortError(cause) => {
            GenericErrorResponse(cause.context("completing a task operation")).into()
        }
    }
}

/// Creates a task owned by the signed-in user
#[utoipa::path(
    post,
    path = "/tasks",
    tag = "tasks",
    request_body = NewTask,
    responses(
        (status = 201, description = "The created task", body = TaskResponse),
        (status = 400, description = "Invalid task data", body = BasicError400),
        (status = 401, description = "No valid bearer token accompanied the request", body = BasicError401),
        (status = 404, description = "No user matches the token's username", body = BasicError404),
        (status = 500, description = "Task creation failed unexpectedly", body = BasicError500),
    ),
    security(("bearer_token" = []))
)]
async fn create_task(
    authenticated: Authenticated,
    new_task: dto::task::NewTask,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<(StatusCode, Json<dto::task::TaskResponse>), ErrorResponse> {
    info!("Creating a task for the signed-in user.");
    new_task.validate().map_err(ValidationErrorResponse::from)?;

    let user_reader = persistence::db_user_driven_ports::DbReadUsers {};
    let task_writer = persistence::db_task_driven_ports::DbTaskWriter {};
    let domain_new_task = domain::task::NewTask::from(new_task);

    let created_task = task_service
        .create_task_for_user(
            &authenticated.username,
            &domain_new_task,
            &mut *ext_cxn,
            &user_reader,
            &task_writer,
        )
        .await
        .map_err(task_error_response)?;

    Ok((StatusCode::CREATED, Json(created_task.into())))
}

/// Lists the signed-in user's tasks, oldest first
#[utoipa::path(
    get,
    path = "/tasks",
    tag = "tasks",
    responses(
        (status = 200, description = "The signed-in user's tasks", body = Vec<TaskResponse>),
        (status = 401, description = "No valid bearer token accompanied the request", body = BasicError401),
        (status = 404, description = "No user matches the token's username", body = BasicError404),
        (status = 500, description = "Task listing failed unexpectedly", body = BasicError500),
    ),
    security(("bearer_token" = []))
)]
async fn list_tasks(
    authenticated: Authenticated,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<Json<Vec<dto::task::TaskResponse>>, ErrorResponse> {
    info!("Listing tasks for the signed-in user.");
    let user_reader = persistence::db_user_driven_ports::DbReadUsers {};
    let task_reader = persistence::db_task_driven_ports::DbTaskReader {};

    let tasks = task_service
        .tasks_for_user(
            &authenticated.username,
            &mut *ext_cxn,
            &user_reader,
            &task_reader,
        )
        .await
        .map_err(task_error_response)?;

    Ok(Json(
        tasks.into_iter().map(dto::task::TaskResponse::from).collect(),
    ))
}

/// Replaces the content of one of the signed-in user's tasks
#[utoipa::path(
    put,
    path = "/tasks/{task_id}",
    tag = "tasks",
    params(
        ("task_id" = String, Path, description = "ID of the task to update")
    ),
    request_body = UpdateTask,
    responses(
        (status = 200, description = "The updated task", body = TaskResponse),
        (status = 400, description = "Invalid task data", body = BasicError400),
        (status = 401, description = "No valid bearer token accompanied the request", body = BasicError401),
        (status = 404, description = "The task does not exist or belongs to another user", body = BasicError404),
        (status = 500, description = "Task update failed unexpectedly", body = BasicError500),
    ),
    security(("bearer_token" = []))
)]
async fn update_task(
    authenticated: Authenticated,
    task_id: String,
    update: dto::task::UpdateTask,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<Json<dto::task::TaskResponse>, ErrorResponse> {
    info!("Updating task {task_id}.");
    update.validate().map_err(ValidationErrorResponse::from)?;

    let user_reader = persistence::db_user_driven_ports::DbReadUsers {};
    let task_reader = persistence::db_task_driven_ports::DbTaskReader {};
    let task_writer = persistence::db_task_driven_ports::DbTaskWriter {};
    let domain_update = domain::task::UpdateTask::from(update);

    let updated_task = task_service
        .update_task(
            &authenticated.username,
            &task_id,
            &domain_update,
            &mut *ext_cxn,
            &user_reader,
            &task_reader,
            &task_writer,
        )
        .await
        .map_err(task_error_response)?;

    Ok(Json(updated_task.into()))
}

/// Deletes one of the signed-in user's tasks
#[utoipa::path(
    delete,
    path = "/tasks/{task_id}",
    tag = "tasks",
    params(
        ("task_id" = String, Path, description = "ID of the task to delete")
    ),
    responses(
        (status = 204, description = "The task was deleted"),
        (status = 401, description = "No valid bearer token accompanied the request", body = BasicError401),
        (status = 404, description = "The task does not exist or belongs to another user", body = BasicError404),
        (status = 500, description = "Task deletion failed unexpectedly", body = BasicError500),
    ),
    security(("bearer_token" = []))
)]
async fn delete_task(
    authenticated: Authenticated,
    task_id: String,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<StatusCode, ErrorResponse> {
    info!("Deleting task {task_id}.");
    let user_reader = persistence::db_user_driven_ports::DbReadUsers {};
    let task_reader = persistence::db_task_driven_ports::DbTaskReader {};
    let task_writer = persistence::db_task_driven_ports::DbTaskWriter {};

    task_service
        .delete_task(
            &authenticated.username,
            &task_id,
            &mut *ext_cxn,
            &user_reader,
            &task_reader,
            &task_writer,
        )
        .await
        .map_err(task_error_response)?;

    Ok(StatusCode::NO_CONTENT)
}
