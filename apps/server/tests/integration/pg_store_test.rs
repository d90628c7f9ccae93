//! Integration tests for the PostgreSQL issue store
//!
//! Runs the store and the HTTP API against a real PostgreSQL container.

use std::sync::Arc;

use actix_web::{test, web, App};
use issuetracker::models::{IssueFilter, IssuePatch, IssueQuery, NewIssue, TextField};
use issuetracker::routes;
use issuetracker::store::IssueStore;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{IssueBuilder, PgTestStore};

fn new_issue(project: &str, created_by: &str, assigned_to: &str) -> NewIssue {
    NewIssue {
        project: project.to_string(),
        issue_title: "Title".to_string(),
        issue_text: "Text".to_string(),
        created_by: created_by.to_string(),
        assigned_to: assigned_to.to_string(),
        status_text: String::new(),
        open: true,
    }
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL testcontainer"]
async fn test_pg_insert_and_find_by_id() {
    let pg = PgTestStore::start().await;
    let store = pg.store.clone();

    let issue = store.insert(new_issue("p", "Bob", "")).await.unwrap();

    assert_eq!(issue.created_on, issue.updated_on);
    assert!(issue.open);

    let found = store
        .find_by_id(&issue.id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found, issue);

    assert!(store.find_by_id("not-a-uuid").await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL testcontainer"]
async fn test_pg_find_many_filters_in_insertion_order() {
    let pg = PgTestStore::start().await;
    let store = pg.store.clone();

    let first = store.insert(new_issue("p", "Bob", "Liz")).await.unwrap();
    store.insert(new_issue("p", "Bob", "Bob")).await.unwrap();
    store.insert(new_issue("p", "Liz", "Liz")).await.unwrap();
    store.insert(new_issue("q", "Bob", "Liz")).await.unwrap();

    let all = store
        .find_many(&IssueQuery::new("p", IssueFilter::default()))
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].id, first.id);

    let filter = IssueFilter::from_pairs([("created_by", "Bob"), ("assigned_to", "Liz")]);
    let matched = store
        .find_many(&IssueQuery::new("p", filter))
        .await
        .unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].id, first.id);

    let by_time = IssueFilter::from_pairs([("created_on", first.created_on.to_rfc3339())]);
    let matched = store
        .find_many(&IssueQuery::new("p", by_time))
        .await
        .unwrap();
    assert_eq!(matched[0].id, first.id);

    let unmatchable = IssueFilter::from_pairs([("open", "sometimes")]);
    assert!(store
        .find_many(&IssueQuery::new("p", unmatchable))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
#[ignore = "requires Docker for the PostgreSQL testcontainer"]
async fn test_pg_patch_and_delete() {
    let pg = PgTestStore::start().await;
    let store = pg.store.clone();
    let issue = store.insert(new_issue("p", "Bob", "")).await.unwrap();
    let id = issue.id.to_string();

    let mut patch = IssuePatch {
        open: Some(false),
        ..IssuePatch::default()
    };
    patch.text.insert(TextField::StatusText, "Done".to_string());
    store.patch_by_id(&id, &patch).await.unwrap();

    let updated = store.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(updated.status_text, "Done");
    assert!(!updated.open);
    assert_eq!(updated.issue_title, issue.issue_title);
    assert_eq!(updated.created_on, issue.created_on);
    assert!(updated.updated_on > updated.created_on);

    // Unknown ids are silently ignored
    store.patch_by_id("nope", &patch).await.unwrap();
    store.delete_by_id("nope").await.unwrap();

    store.delete_by_id(&id).await.unwrap();
    assert!(store.find_by_id(&id).await.unwrap().is_none());
    assert!(store.ping().await);

    // Re-running migrations on an up-to-date schema is a no-op
    store.migrate().await.unwrap();
}

#[actix_web::test]
#[ignore = "requires Docker for the PostgreSQL testcontainer"]
async fn test_pg_api_round_trip() {
    let pg = PgTestStore::start().await;
    let store: Arc<dyn IssueStore> = Arc::new(pg.store.clone());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::from(store))
            .configure(routes::issues::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/issues/apitest")
        .set_json(IssueBuilder::new().with_assigned_to("Milwakee").build())
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["_id"].as_str().unwrap().to_string();
    assert_eq!(created["project"], "apitest");

    let req = test::TestRequest::put()
        .uri("/api/issues/apitest")
        .set_json(json!({ "_id": id, "open": false }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::get()
        .uri("/api/issues/apitest?open=false&assigned_to=Milwakee")
        .to_request();
    let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["_id"], id.as_str());
    assert!(listed[0].get("project").is_none());

    let req = test::TestRequest::delete()
        .uri("/api/issues/apitest")
        .set_json(json!({ "_id": id }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "result": "successfully deleted", "_id": id }));
}
