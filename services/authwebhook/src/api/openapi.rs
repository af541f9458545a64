//! OpenAPI schema aggregation for the webhook API.
//!
//! # Purpose
//! Collects all routes and schema types into a single OpenAPI document served
//! next to the Swagger UI.
use crate::api::{
    authenticate, authorize, login, system,
    types::{
        ErrorResponse, HealthStatus, LoginResponse, ReviewUser, SubjectAccessReview,
        SubjectAccessReviewStatus, TokenReview, TokenReviewRequest, TokenReviewSpec,
        TokenReviewStatus,
    },
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "auth-webhook",
        version = "v0",
        description = "Token issuance and TokenReview/SubjectAccessReview webhook"
    ),
    paths(
        system::health,
        login::login,
        authenticate::authenticate,
        authorize::authorize
    ),
    components(schemas(
        HealthStatus,
        ErrorResponse,
        LoginResponse,
        TokenReviewRequest,
        TokenReviewSpec,
        TokenReview,
        TokenReviewStatus,
        ReviewUser,
        SubjectAccessReview,
        SubjectAccessReviewStatus
    )),
    tags(
        (name = "system", description = "Health and build metadata"),
        (name = "auth", description = "Login, token review, and access review")
    )
)]
pub struct ApiDoc;
