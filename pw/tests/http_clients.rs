//! HTTP-level tests for the commits client and the webhook notifier

use pathwatch::{ApiError, ChangeRecord, CommitQuery, CommitSource, GitHubClient, Notifier, NotifyError, RepoIdentity, TeamsWebhook};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn query() -> CommitQuery {
    CommitQuery {
        owner: "acme".to_string(),
        repo: "widgets".to_string(),
        branch: "develop".to_string(),
        path: "src/lib".to_string(),
        since: "2024-01-01T00:00:00.000Z".to_string(),
    }
}

fn record() -> ChangeRecord {
    ChangeRecord {
        repo: RepoIdentity {
            owner: "acme".to_string(),
            name: "widgets".to_string(),
        },
        path: "src/".to_string(),
        combined_message: "fix bug\nadd feature".to_string(),
        most_recent: "2024-01-02T10:00:00Z".to_string(),
    }
}

#[tokio::test]
async fn list_commits_sends_filters_and_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/repos/acme/widgets/commits"))
        .and(query_param("sha", "develop"))
        .and(query_param("path", "src/lib"))
        .and(query_param("since", "2024-01-01T00:00:00.000Z"))
        .and(query_param("per_page", "100"))
        .and(header("authorization", "token ghp_test_token"))
        .and(header("accept", "application/vnd.github+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"sha": "a1", "commit": {"message": "fix bug", "author": {"date": "2024-01-02T10:00:00Z"}}},
            {"sha": "b2", "commit": {"message": "add feature", "author": {"date": "2024-01-01T09:00:00Z"}}}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = GitHubClient::new(&format!("{}/api/v3/", server.uri()), "ghp_test_token").unwrap();
    let commits = client.list_commits(&query()).await.unwrap();

    let messages: Vec<_> = commits.iter().map(|c| c.message.as_str()).collect();
    assert_eq!(messages, vec!["fix bug", "add feature"]);
    assert_eq!(commits[0].authored_at.as_deref(), Some("2024-01-02T10:00:00Z"));
    assert_eq!(commits[1].sha, "b2");
}

#[tokio::test]
async fn list_commits_surfaces_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let client = GitHubClient::new(&server.uri(), "tok").unwrap();
    match client.list_commits(&query()).await {
        Err(ApiError::Status { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "Not Found");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn list_commits_rejects_unexpected_payload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "not a list"})))
        .mount(&server)
        .await;

    let client = GitHubClient::new(&server.uri(), "tok").unwrap();
    let result = client.list_commits(&query()).await;
    assert!(matches!(result, Err(ApiError::InvalidResponse(_))));
}

#[tokio::test]
async fn webhook_posts_message_card() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1"))
        .expect(1)
        .mount(&server)
        .await;

    let webhook = TeamsWebhook::new(&format!("{}/webhook", server.uri())).unwrap();
    webhook.notify(&record()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["@type"], "MessageCard");
    assert_eq!(body["sections"][0]["activityTitle"], "Changes detected in acme/widgets");
    assert_eq!(body["sections"][0]["facts"][0]["value"], "acme/widgets");
    assert_eq!(body["sections"][0]["facts"][1]["value"], "2024-01-02T10:00:00Z");
    assert_eq!(body["sections"][0]["facts"][2]["value"], "src/");
    assert_eq!(body["sections"][0]["facts"][3]["value"], "fix bug\nadd feature");
}

#[tokio::test]
async fn webhook_rejection_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Bad payload"))
        .expect(1)
        .mount(&server)
        .await;

    let webhook = TeamsWebhook::new(&server.uri()).unwrap();
    match webhook.notify(&record()).await {
        Err(NotifyError::Rejected { status, body }) => {
            assert_eq!(status, 400);
            assert_eq!(body, "Bad payload");
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}
