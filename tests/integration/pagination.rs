//! Integration tests for Link-header pagination

use super::*;
use futures::TryStreamExt;
use integrations_github_issues::services::{IssueStateFilter, ListIssuesParams};
use integrations_github_issues::{GitHubErrorKind, Issue, Page};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

/// Mounts three pages of issues: the first at the repository path, the rest
/// at the repository-id path GitHub links to.
async fn mount_three_pages(server: &MockServer) {
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello-world/issues"))
        .respond_with(page_response(
            issues_json(&[1, 2]),
            Some(format!(
                r#"<{uri}/repositories/42/issues?page=2>; rel="next", <{uri}/repositories/42/issues?page=3>; rel="last""#
            )),
        ))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repositories/42/issues"))
        .and(query_param("page", "2"))
        .respond_with(page_response(
            issues_json(&[3, 4]),
            Some(format!(
                r#"<{uri}/repositories/42/issues?page=1>; rel="prev", <{uri}/repositories/42/issues?page=3>; rel="next", <{uri}/repositories/42/issues?page=3>; rel="last", <{uri}/repositories/42/issues?page=1>; rel="first""#
            )),
        ))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repositories/42/issues"))
        .and(query_param("page", "3"))
        .respond_with(page_response(
            issues_json(&[5]),
            Some(format!(
                r#"<{uri}/repositories/42/issues?page=2>; rel="prev", <{uri}/repositories/42/issues?page=1>; rel="first""#
            )),
        ))
        .expect(1)
        .mount(server)
        .await;
}

fn numbers(issues: &[Issue]) -> Vec<u64> {
    issues.iter().map(|i| i.number).collect()
}

#[tokio::test]
async fn test_list_follows_every_page_in_order() {
    let mock_server = setup_mock_server().await;
    mount_three_pages(&mock_server).await;

    let client = client_for(&mock_server);
    let issues = client
        .issues()
        .list("octocat", "hello-world")
        .await
        .expect("listing should succeed");

    assert_eq!(numbers(&issues), vec![1, 2, 3, 4, 5]);

    let snapshot = client.metrics().snapshot();
    assert_eq!(snapshot.requests_total, 3);
    assert_eq!(snapshot.requests_success, 3);
    assert_eq!(snapshot.pages_fetched, 3);
}

#[tokio::test]
async fn test_single_page_without_link_header() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello-world/labels"))
        .respond_with(page_response(
            json!([
                {"id": 208045946, "name": "bug", "color": "f29513", "default": true},
                {"id": 208045947, "name": "epic", "color": "a2eeef", "default": false}
            ]),
            None,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let labels = client
        .issues()
        .list_labels("octocat", "hello-world")
        .await
        .unwrap();

    let names: Vec<&str> = labels.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["bug", "epic"]);
}

#[tokio::test]
async fn test_empty_collection_makes_one_request() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello-world/issues/comments"))
        .respond_with(page_response(json!([]), None))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let comments = client
        .issues()
        .list_repo_comments("octocat", "hello-world")
        .await
        .unwrap();

    assert!(comments.is_empty());
}

#[tokio::test]
async fn test_error_on_later_page_discards_everything() {
    let mock_server = setup_mock_server().await;
    let uri = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello-world/issues"))
        .respond_with(page_response(
            issues_json(&[1, 2]),
            Some(format!(r#"<{uri}/repositories/42/issues?page=2>; rel="next""#)),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repositories/42/issues"))
        .and(query_param("page", "2"))
        .respond_with(error_response(500, "Server Error"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repositories/42/issues"))
        .and(query_param("page", "3"))
        .respond_with(page_response(issues_json(&[5]), None))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .issues()
        .list("octocat", "hello-world")
        .await
        .unwrap_err();

    assert_eq!(*err.kind(), GitHubErrorKind::InternalError);
    assert_eq!(err.status_code(), Some(500));
    assert_eq!(err.message(), "Server Error");
    assert_eq!(client.metrics().snapshot().requests_failed, 1);
}

#[tokio::test]
async fn test_malformed_link_header_fails_listing() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello-world/issues"))
        .respond_with(page_response(issues_json(&[1]), Some("garbage".to_string())))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .issues()
        .list("octocat", "hello-world")
        .await
        .unwrap_err();

    assert_eq!(*err.kind(), GitHubErrorKind::MalformedLinkHeader);
}

#[tokio::test]
async fn test_page_ceiling_stops_runaway_listing() {
    let mock_server = setup_mock_server().await;
    let uri = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello-world/issues"))
        .respond_with(page_response(
            issues_json(&[1]),
            Some(format!(r#"<{uri}/repositories/42/issues?page=2>; rel="next""#)),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repositories/42/issues"))
        .and(query_param("page", "2"))
        .respond_with(page_response(
            issues_json(&[2]),
            Some(format!(r#"<{uri}/repositories/42/issues?page=3>; rel="next""#)),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repositories/42/issues"))
        .and(query_param("page", "3"))
        .respond_with(page_response(issues_json(&[3]), None))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = GitHubClient::builder()
        .base_url(mock_server.uri())
        .max_pages(2)
        .build()
        .unwrap();

    let err = client
        .issues()
        .list("octocat", "hello-world")
        .await
        .unwrap_err();

    assert_eq!(*err.kind(), GitHubErrorKind::PageLimitExceeded);
}

#[tokio::test]
async fn test_ceiling_reached_exactly_is_not_an_error() {
    let mock_server = setup_mock_server().await;
    mount_three_pages(&mock_server).await;

    let client = GitHubClient::builder()
        .base_url(mock_server.uri())
        .max_pages(3)
        .build()
        .unwrap();

    let issues = client.issues().list("octocat", "hello-world").await.unwrap();
    assert_eq!(issues.len(), 5);
}

#[tokio::test]
async fn test_next_link_on_foreign_origin_is_followed_without_token() {
    let api_server = setup_mock_server().await;
    let other_server = setup_mock_server().await;

    // The token must never reach the other origin.
    Mock::given(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(401))
        .expect(0)
        .mount(&other_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/octocat/repos"))
        .and(header("authorization", "token ghp_SECRET"))
        .respond_with(page_response(
            json!([{"id": 1, "name": "hello-world", "full_name": "octocat/hello-world"}]),
            Some(format!(
                r#"<{}/mirror/users/octocat/repos?page=2>; rel="next""#,
                other_server.uri()
            )),
        ))
        .expect(1)
        .mount(&api_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/mirror/users/octocat/repos"))
        .and(query_param("page", "2"))
        .respond_with(page_response(
            json!([{"id": 2, "name": "spoon-knife", "full_name": "octocat/spoon-knife"}]),
            None,
        ))
        .expect(1)
        .mount(&other_server)
        .await;

    let client = authenticated_client_for(&api_server, "ghp_SECRET");
    let repos = client
        .repositories()
        .list_for_user("octocat")
        .await
        .unwrap();

    let names: Vec<&str> = repos.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["hello-world", "spoon-knife"]);
}

#[tokio::test]
async fn test_list_with_params_sends_query_on_first_request() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello-world/issues"))
        .and(query_param("state", "all"))
        .and(query_param("labels", "bug,epic"))
        .and(query_param("per_page", "50"))
        .respond_with(page_response(issues_json(&[9]), None))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let params = ListIssuesParams::default()
        .state(IssueStateFilter::All)
        .labels(["bug", "epic"])
        .per_page(50);

    let issues = client
        .issues()
        .list_with_params("octocat", "hello-world", &params)
        .await
        .unwrap();

    assert_eq!(numbers(&issues), vec![9]);
}

#[tokio::test]
async fn test_paginator_walks_page_by_page() {
    let mock_server = setup_mock_server().await;
    mount_three_pages(&mock_server).await;

    let client = client_for(&mock_server);
    let mut pager = client.paginate::<Issue>("/repos/octocat/hello-world/issues");

    let first = pager.next_page().await.unwrap().unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first.links.total_pages(), Some(3));
    assert!(pager.has_more());

    let second = pager.next_page().await.unwrap().unwrap();
    assert_eq!(second.links.prev(), Some("/repositories/42/issues?page=1"));

    let third = pager.next_page().await.unwrap().unwrap();
    assert!(!third.has_next());
    assert!(!pager.has_more());
    assert_eq!(pager.pages_fetched(), 3);

    assert!(pager.next_page().await.unwrap().is_none());
}

#[tokio::test]
async fn test_paginator_retries_failed_page() {
    let mock_server = setup_mock_server().await;
    let uri = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello-world/issues"))
        .respond_with(page_response(
            issues_json(&[1]),
            Some(format!(r#"<{uri}/repositories/42/issues?page=2>; rel="next""#)),
        ))
        .mount(&mock_server)
        .await;

    // First attempt at page 2 fails, the next one succeeds.
    Mock::given(method("GET"))
        .and(path("/repositories/42/issues"))
        .respond_with(error_response(502, "Bad Gateway"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repositories/42/issues"))
        .respond_with(page_response(issues_json(&[2]), None))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let mut pager = client.paginate::<Issue>("/repos/octocat/hello-world/issues");

    let first = pager.next_page().await.unwrap().unwrap();
    assert_eq!(numbers(&first.items), vec![1]);

    let err = pager.next_page().await.unwrap_err();
    assert_eq!(*err.kind(), GitHubErrorKind::BadGateway);
    assert_eq!(pager.pages_fetched(), 1);
    assert!(pager.has_more());

    let second = pager.next_page().await.unwrap().unwrap();
    assert_eq!(numbers(&second.items), vec![2]);
}

#[tokio::test]
async fn test_stream_of_pages() {
    let mock_server = setup_mock_server().await;
    mount_three_pages(&mock_server).await;

    let client = client_for(&mock_server);
    let pages: Vec<Page<Issue>> = client
        .paginate::<Issue>("/repos/octocat/hello-world/issues")
        .into_stream()
        .try_collect()
        .await
        .unwrap();

    let sizes: Vec<usize> = pages.iter().map(Page::len).collect();
    assert_eq!(sizes, vec![2, 2, 1]);
}

#[tokio::test]
async fn test_every_page_request_carries_headers() {
    let mock_server = setup_mock_server().await;
    let uri = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello-world/assignees"))
        .and(header("accept", "application/vnd.github.v3+json"))
        .and(header("authorization", "token ghp_test"))
        .respond_with(page_response(
            json!([user_json("octocat", 1)]),
            Some(format!(r#"<{uri}/repositories/42/assignees?page=2>; rel="next""#)),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repositories/42/assignees"))
        .and(header("accept", "application/vnd.github.v3+json"))
        .and(header("authorization", "token ghp_test"))
        .respond_with(page_response(json!([user_json("hubot", 2)]), None))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Anything missing the headers lands here and fails the test.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = authenticated_client_for(&mock_server, "ghp_test");
    let users = client
        .issues()
        .list_assignees("octocat", "hello-world")
        .await
        .unwrap();

    let logins: Vec<&str> = users.iter().map(|u| u.login.as_str()).collect();
    assert_eq!(logins, vec!["octocat", "hubot"]);
}
