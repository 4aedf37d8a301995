use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skylift_core::error::SkyliftError;
use skylift_provision::{CreateRepo, GithubClient};

async fn client(server: &MockServer) -> GithubClient {
    GithubClient::with_base_url("ghp_test_token", server.uri()).unwrap()
}

#[tokio::test]
async fn test_create_repo_returns_clone_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .and(header("authorization", "token ghp_test_token"))
        .and(body_string_contains("auto_init"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "full_name": "acme/widget-deploy-1700000000",
            "clone_url": "https://github.com/acme/widget-deploy-1700000000.git",
            "private": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let repo = client(&server)
        .await
        .create_repo(&CreateRepo::public(
            "widget-deploy-1700000000",
            "widget deployment configuration",
        ))
        .await
        .unwrap();
    assert_eq!(repo.full_name, "acme/widget-deploy-1700000000");
    assert_eq!(
        repo.clone_url,
        "https://github.com/acme/widget-deploy-1700000000.git"
    );
}

#[tokio::test]
async fn test_401_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .create_repo(&CreateRepo::public("widget-deploy", "config"))
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert!(err.to_string().contains("GitHub"));
}

#[tokio::test]
async fn test_validation_failure_surfaces_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({ "message": "name already exists on this account" })),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .create_repo(&CreateRepo::public("widget-deploy", "config"))
        .await
        .unwrap_err();
    assert!(matches!(err, SkyliftError::Api(_)));
    assert!(err.to_string().contains("name already exists"));
}
