use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};

#[derive(Serialize, ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueDoc {
    pub id: u64,
    pub title: String,
    pub description: String,
    #[schema(example = "open")]
    pub status: String,
    #[schema(example = "medium")]
    pub priority: String,
    pub assignee: Option<String>,
    #[schema(example = "2024-05-01T09:30:00.123456Z")]
    pub created_at: String,
    #[schema(example = "2024-05-01T09:30:00.123456Z")]
    pub updated_at: String,
}

#[derive(Serialize, ToSchema)]
pub struct NewIssueDoc {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
}

/// Every key is optional; `assignee: null` unassigns.
#[derive(Serialize, ToSchema)]
pub struct IssuePatchDoc {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuePageDoc {
    pub items: Vec<IssueDoc>,
    pub total: u64,
    pub page: i64,
    pub page_size: i64,
}

#[derive(Serialize, ToSchema)]
pub struct DeletedIssueDoc {
    #[schema(example = "deleted")]
    pub status: String,
    pub id: u64,
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListIssuesParams {
    /// Case-insensitive title substring
    pub search: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    /// Case-insensitive assignee substring; unassigned issues never match
    pub assignee: Option<String>,
    /// id, title, description, status, priority, assignee, createdAt or updatedAt (default updatedAt)
    pub sort_by: Option<String>,
    /// `desc` (default) or anything else for ascending
    pub sort_dir: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::issues::list_issues,
        crate::routes::issues::get_issue,
        crate::routes::issues::create_issue,
        crate::routes::issues::update_issue,
        crate::routes::issues::delete_issue,
    ),
    components(
        schemas(
            HealthResponse,
            IssueDoc,
            NewIssueDoc,
            IssuePatchDoc,
            IssuePageDoc,
            DeletedIssueDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "issues")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
