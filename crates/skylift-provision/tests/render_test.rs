use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skylift_core::artifacts::EnvVarEntry;
use skylift_core::error::SkyliftError;
use skylift_provision::{CreateWebService, RenderClient};

async fn client(server: &MockServer) -> RenderClient {
    RenderClient::with_base_url("rnd_test_key", server.uri()).unwrap()
}

fn request(owner_id: &str) -> CreateWebService {
    CreateWebService {
        service_type: "web_service".to_string(),
        name: "widget-web".to_string(),
        owner_id: owner_id.to_string(),
        repo: "https://github.com/acme/widget".to_string(),
        branch: "main".to_string(),
        plan_id: "starter".to_string(),
        region: "oregon".to_string(),
        build_command: "bundle install".to_string(),
        start_command: "bundle exec rails s".to_string(),
        env_vars: vec![EnvVarEntry {
            key: "RAILS_ENV".to_string(),
            value: "production".to_string(),
        }],
    }
}

#[tokio::test]
async fn test_owners_then_create_service() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/owners"))
        .and(header("authorization", "Bearer rnd_test_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "owner": { "id": "own-1", "name": "acme" }, "cursor": "c1" }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/services"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "service": {
                "id": "srv-1",
                "name": "widget-web",
                "serviceDetailsUrl": "https://dashboard.render.com/web/srv-1"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server).await;
    let owners = client.list_owners().await.unwrap();
    assert_eq!(owners.len(), 1);
    assert_eq!(owners[0].name, "acme");

    let service = client.create_web_service(&request(&owners[0].id)).await.unwrap();
    assert_eq!(service.id, "srv-1");
    assert_eq!(
        service.service_details_url.as_deref(),
        Some("https://dashboard.render.com/web/srv-1")
    );
}

#[tokio::test]
async fn test_401_is_unauthorized_with_hint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/owners"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client(&server).await.list_owners().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(err.to_string().contains("Render API key"));
}

#[tokio::test]
async fn test_validation_failure_surfaces_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "message": "repo is not accessible" })),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .create_web_service(&request("own-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, SkyliftError::Api(_)));
    assert!(err.to_string().contains("repo is not accessible"));
}
