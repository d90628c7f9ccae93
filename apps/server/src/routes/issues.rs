use actix_web::{web, HttpResponse};

use crate::error::AppResult;
use crate::extractors::IssuePayload;
use crate::models::{CreateIssue, DeleteIssue, IssueFilter, UpdateIssue};
use crate::services::IssueService;
use crate::store::IssueStore;

/// GET /api/issues/{project}
/// Lists the project's issues; every query parameter is an equality filter
pub async fn list_issues(
    store: web::Data<dyn IssueStore>,
    path: web::Path<String>,
    query: web::Query<Vec<(String, String)>>,
) -> AppResult<HttpResponse> {
    let project = path.into_inner();
    let filter = IssueFilter::from_pairs(query.into_inner());

    let issues = IssueService::list(store.get_ref(), &project, filter).await?;
    let responses: Vec<_> = issues.iter().map(|i| i.to_response()).collect();

    Ok(HttpResponse::Ok().json(responses))
}

/// POST /api/issues/{project}
/// Creates an issue and returns the full record
pub async fn create_issue(
    store: web::Data<dyn IssueStore>,
    path: web::Path<String>,
    body: IssuePayload<CreateIssue>,
) -> AppResult<HttpResponse> {
    let project = path.into_inner();
    let issue = IssueService::create(store.get_ref(), &project, body.into_inner()).await?;

    Ok(HttpResponse::Created().json(issue.to_full_response()))
}

/// PUT /api/issues/{project}
/// Partially updates the issue named by `_id`
pub async fn update_issue(
    store: web::Data<dyn IssueStore>,
    path: web::Path<String>,
    body: IssuePayload<UpdateIssue>,
) -> AppResult<HttpResponse> {
    let project = path.into_inner();
    let result = IssueService::update(store.get_ref(), &project, body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(result))
}

/// DELETE /api/issues/{project}
/// Permanently deletes the issue named by `_id`
pub async fn delete_issue(
    store: web::Data<dyn IssueStore>,
    path: web::Path<String>,
    body: IssuePayload<DeleteIssue>,
) -> AppResult<HttpResponse> {
    let project = path.into_inner();
    let result = IssueService::remove(store.get_ref(), &project, body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(result))
}

/// Configure issue routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    for prefix in ["/api/issues", "/issues"] {
        cfg.service(
            web::resource(format!("{}/{{project}}", prefix))
                .route(web::get().to(list_issues))
                .route(web::post().to(create_issue))
                .route(web::put().to(update_issue))
                .route(web::delete().to(delete_issue)),
        );
    }
}
