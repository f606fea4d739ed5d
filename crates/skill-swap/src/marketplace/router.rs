use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    ProfileUpdate, SignupRequest, SwapPartition, SwapRequestId, SwapStatus, SwapSubmission, UserId,
};
use super::lifecycle::TransitionError;
use super::repository::{RepositoryError, SwapRepository, UserRepository};
use super::service::{MarketplaceError, SkillSwapService};

/// Header carrying the acting user's id, set by the upstream gateway.
pub const ACTOR_HEADER: &str = "x-user-id";

type SharedService<U, S> = Arc<SkillSwapService<U, S>>;

/// Router builder exposing the directory and swap lifecycle endpoints.
pub fn marketplace_router<U, S>(service: SharedService<U, S>) -> Router
where
    U: UserRepository + 'static,
    S: SwapRepository + 'static,
{
    Router::new()
        .route("/auth/signup", post(signup_handler::<U, S>))
        .route("/users", get(list_users_handler::<U, S>))
        .route("/users/public", get(browse_handler::<U, S>))
        .route(
            "/users/:user_id",
            get(get_user_handler::<U, S>)
                .patch(update_profile_handler::<U, S>)
                .delete(delete_user_handler::<U, S>),
        )
        .route(
            "/users/:user_id/requests",
            get(list_requests_handler::<U, S>),
        )
        .route("/requests", post(create_swap_handler::<U, S>))
        .route("/requests/:request_id", get(get_swap_handler::<U, S>))
        .route(
            "/requests/:request_id/status",
            post(update_status_handler::<U, S>),
        )
        .route("/admin/overview", get(overview_handler::<U, S>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BrowseQuery {
    #[serde(default)]
    pub(crate) q: Option<String>,
    #[serde(default)]
    pub(crate) exclude: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListRequestsQuery {
    #[serde(default)]
    pub(crate) filter: Option<SwapPartition>,
}

/// Kept as text so unknown values are reported as rejected transitions.
#[derive(Debug, Deserialize)]
pub(crate) struct StatusChange {
    pub(crate) status: String,
}

pub(crate) fn actor_from_headers(headers: &HeaderMap) -> Option<UserId> {
    headers
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| UserId(value.to_string()))
}

fn missing_actor() -> Response {
    let payload = json!({
        "error": format!("{ACTOR_HEADER} header is required"),
    });
    (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
}

fn malformed_body(rejection: JsonRejection) -> Response {
    let payload = json!({
        "error": rejection.body_text(),
    });
    (rejection.status(), axum::Json(payload)).into_response()
}

pub(crate) fn error_response(error: MarketplaceError) -> Response {
    let status = match &error {
        MarketplaceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        MarketplaceError::NotFound { .. }
        | MarketplaceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        MarketplaceError::InvalidTransition(_)
        | MarketplaceError::Conflict(_)
        | MarketplaceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        MarketplaceError::Forbidden { .. } => StatusCode::FORBIDDEN,
        MarketplaceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %error, "marketplace request failed");
    }

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn signup_handler<U, S>(
    State(service): State<SharedService<U, S>>,
    axum::Json(signup): axum::Json<SignupRequest>,
) -> Response
where
    U: UserRepository + 'static,
    S: SwapRepository + 'static,
{
    match service.signup(signup) {
        Ok(user) => (StatusCode::CREATED, axum::Json(user)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_users_handler<U, S>(
    State(service): State<SharedService<U, S>>,
) -> Response
where
    U: UserRepository + 'static,
    S: SwapRepository + 'static,
{
    match service.list_users() {
        Ok(users) => (StatusCode::OK, axum::Json(users)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn browse_handler<U, S>(
    State(service): State<SharedService<U, S>>,
    Query(query): Query<BrowseQuery>,
) -> Response
where
    U: UserRepository + 'static,
    S: SwapRepository + 'static,
{
    let excluding = query.exclude.map(UserId);
    match service.browse(query.q.as_deref(), excluding.as_ref()) {
        Ok(users) => (StatusCode::OK, axum::Json(users)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_user_handler<U, S>(
    State(service): State<SharedService<U, S>>,
    Path(user_id): Path<String>,
) -> Response
where
    U: UserRepository + 'static,
    S: SwapRepository + 'static,
{
    match service.get_user(&UserId(user_id)) {
        Ok(user) => (StatusCode::OK, axum::Json(user)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_profile_handler<U, S>(
    State(service): State<SharedService<U, S>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    axum::Json(update): axum::Json<ProfileUpdate>,
) -> Response
where
    U: UserRepository + 'static,
    S: SwapRepository + 'static,
{
    let Some(actor) = actor_from_headers(&headers) else {
        return missing_actor();
    };
    match service.update_profile(&actor, &UserId(user_id), update) {
        Ok(user) => (StatusCode::OK, axum::Json(user)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_user_handler<U, S>(
    State(service): State<SharedService<U, S>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    U: UserRepository + 'static,
    S: SwapRepository + 'static,
{
    let Some(actor) = actor_from_headers(&headers) else {
        return missing_actor();
    };
    match service.delete_user(&actor, &UserId(user_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_requests_handler<U, S>(
    State(service): State<SharedService<U, S>>,
    Path(user_id): Path<String>,
    Query(query): Query<ListRequestsQuery>,
) -> Response
where
    U: UserRepository + 'static,
    S: SwapRepository + 'static,
{
    match service.list_for_user(&UserId(user_id), query.filter) {
        Ok(listing) => (StatusCode::OK, axum::Json(listing)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_swap_handler<U, S>(
    State(service): State<SharedService<U, S>>,
    headers: HeaderMap,
    axum::Json(submission): axum::Json<SwapSubmission>,
) -> Response
where
    U: UserRepository + 'static,
    S: SwapRepository + 'static,
{
    let actor = actor_from_headers(&headers);
    match service.create_swap(submission, actor.as_ref()) {
        Ok(request) => (StatusCode::CREATED, axum::Json(request)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_swap_handler<U, S>(
    State(service): State<SharedService<U, S>>,
    Path(request_id): Path<String>,
) -> Response
where
    U: UserRepository + 'static,
    S: SwapRepository + 'static,
{
    match service.get_swap(&SwapRequestId(request_id)) {
        Ok(request) => (StatusCode::OK, axum::Json(request)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_status_handler<U, S>(
    State(service): State<SharedService<U, S>>,
    Path(request_id): Path<String>,
    headers: HeaderMap,
    body: Result<axum::Json<StatusChange>, JsonRejection>,
) -> Response
where
    U: UserRepository + 'static,
    S: SwapRepository + 'static,
{
    let Some(actor) = actor_from_headers(&headers) else {
        return missing_actor();
    };
    let axum::Json(change) = match body {
        Ok(body) => body,
        Err(rejection) => return malformed_body(rejection),
    };
    let Some(next) = SwapStatus::from_label(&change.status) else {
        let error = TransitionError::UnknownStatus {
            value: change.status,
        };
        return error_response(error.into());
    };
    match service.update_status(&SwapRequestId(request_id), &actor, next) {
        Ok(request) => (StatusCode::OK, axum::Json(request)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn overview_handler<U, S>(State(service): State<SharedService<U, S>>) -> Response
where
    U: UserRepository + 'static,
    S: SwapRepository + 'static,
{
    match service.overview() {
        Ok(overview) => (StatusCode::OK, axum::Json(overview)).into_response(),
        Err(error) => error_response(error),
    }
}
