use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use service::issues::{DeletedIssue, Issue, IssuePage, IssuePatch, IssueQuery, NewIssue};
use tracing::info;

use crate::errors::JsonApiError;
use crate::routes::AppState;

#[utoipa::path(
    get, path = "/issues", tag = "issues",
    params(crate::openapi::ListIssuesParams),
    responses(
        (status = 200, description = "Page of matching issues", body = crate::openapi::IssuePageDoc),
        (status = 400, description = "Malformed query parameter"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn list_issues(
    State(state): State<AppState>,
    query: Result<Query<IssueQuery>, QueryRejection>,
) -> Result<Json<IssuePage>, JsonApiError> {
    let Query(query) = query?;
    let page = state.issues.list(&query).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get, path = "/issues/{id}", tag = "issues",
    params(("id" = u64, Path, description = "Issue id")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::IssueDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_issue(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<Issue>, JsonApiError> {
    let Path(id) = id?;
    Ok(Json(state.issues.get(id).await?))
}

#[utoipa::path(
    post, path = "/issues", tag = "issues",
    request_body = crate::openapi::NewIssueDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::IssueDoc),
        (status = 422, description = "Validation Error")
    )
)]
pub async fn create_issue(
    State(state): State<AppState>,
    input: Result<Json<NewIssue>, JsonRejection>,
) -> Result<(StatusCode, Json<Issue>), JsonApiError> {
    let Json(input) = input?;
    let created = state.issues.create(input).await?;
    info!(id = created.id, title = %created.title, "issue_create_request");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put, path = "/issues/{id}", tag = "issues",
    params(("id" = u64, Path, description = "Issue id")),
    request_body = crate::openapi::IssuePatchDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::IssueDoc),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Validation Error")
    )
)]
pub async fn update_issue(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    patch: Result<Json<IssuePatch>, JsonRejection>,
) -> Result<Json<Issue>, JsonApiError> {
    let Path(id) = id?;
    let Json(patch) = patch?;
    Ok(Json(state.issues.update(id, patch).await?))
}

#[utoipa::path(
    delete, path = "/issues/{id}", tag = "issues",
    params(("id" = u64, Path, description = "Issue id")),
    responses(
        (status = 200, description = "Deleted", body = crate::openapi::DeletedIssueDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_issue(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<DeletedIssue>, JsonApiError> {
    let Path(id) = id?;
    Ok(Json(state.issues.delete(id).await?))
}
