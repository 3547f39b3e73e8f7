pub mod auth;
pub mod task;
pub mod user;

use utoipa::OpenApi;

/// Registers this module's DTO schemas with the OpenAPI docs
#[derive(OpenApi)]
#[openapi(components(schemas(
    auth::SignInRequest,
    auth::TokenDto,
    auth::SignInResponse,
    auth::MessageResponse,
    user::UserResponse,
    task::NewTask,
    task::UpdateTask,
    task::TaskResponse,
    task::TaskStatus,
    task::TaskPriority,
)))]
pub struct OpenApiSchemas;

/// Standard error response schemas which endpoint docs can reference by status code
pub mod err_resps {
    use utoipa::ToSchema;

    #[derive(ToSchema)]
    #[schema(example = json!({
        "error_code": "invalid_input",
        "error_description": "Submitted data was invalid.",
        "extra_info": null
    }))]
    pub struct BasicError400 {
        pub error_code: String,
        pub error_description: String,
    }

    #[derive(ToSchema)]
    #[schema(example = json!({
        "error_code": "invalid_token",
        "error_description": "The provided bearer token could not be verified.",
        "extra_info": null
    }))]
    pub struct BasicError401 {
        pub error_code: String,
        pub error_description: String,
    }

    #[derive(ToSchema)]
    #[schema(example = json!({
        "error_code": "not_found",
        "error_description": "The requested entity could not be found.",
        "extra_info": null
    }))]
    pub struct BasicError404 {
        pub error_code: String,
        pub error_description: String,
    }

    #[derive(ToSchema)]
    #[schema(example = json!({
        "error_code": "internal_error",
        "error_description": "Could not access data to complete your request",
        "extra_info": null
    }))]
    pub struct BasicError500 {
        pub error_code: String,
        pub error_description: String,
    }
}
