use serde_json::json;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skylift_core::resource::{ProvisionState, ResourceRef};
use skylift_provision::railway::RailwayClient;
use skylift_provision::{ProvisionDriver, ServicePlan, ServiceSource};

use skylift_core::resource::EnvVarSet;

async fn client(server: &MockServer) -> RailwayClient {
    RailwayClient::with_endpoint("test-token", server.uri()).unwrap()
}

fn plan(project: ResourceRef, vars: EnvVarSet) -> ServicePlan {
    ServicePlan {
        project,
        fragment: "worker".to_string(),
        name: "widget-worker".to_string(),
        source: ServiceSource::repo("acme/widget"),
        variables: vars,
        start_command: None,
    }
}

fn services_response(names: &[(&str, &str)]) -> serde_json::Value {
    let edges: Vec<_> = names
        .iter()
        .map(|(id, name)| json!({ "node": { "id": id, "name": name } }))
        .collect();
    json!({ "data": { "project": { "services": { "edges": edges } } } })
}

#[tokio::test]
async fn test_existing_service_is_reused_without_create() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("services"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(services_response(&[("svc-1", "Widget-Worker")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("serviceCreate"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let railway = client(&server).await;
    let driver = ProvisionDriver::new(&railway);
    let (service, state) = driver
        .ensure_service("p-1", "worker", "widget-worker", &ServiceSource::repo("acme/widget"))
        .await
        .unwrap();
    assert_eq!(state, ProvisionState::Found);
    assert_eq!(service.id, "svc-1");
}

#[tokio::test]
async fn test_missing_service_is_created_exactly_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("serviceCreate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "serviceCreate": { "id": "svc-new", "name": "widget-worker" } }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(services_response(&[])))
        .mount(&server)
        .await;

    let railway = client(&server).await;
    let driver = ProvisionDriver::new(&railway);
    let (service, state) = driver
        .ensure_service("p-1", "worker", "widget-worker", &ServiceSource::repo("acme/widget"))
        .await
        .unwrap();
    assert_eq!(state, ProvisionState::Created);
    assert_eq!(service.id, "svc-new");
}

#[tokio::test]
async fn test_variable_failure_is_isolated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("services"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(services_response(&[("svc-1", "app-worker")])),
        )
        .mount(&server)
        .await;
    // REDIS_URL is refused; everything else succeeds.
    Mock::given(method("POST"))
        .and(body_string_contains("variableUpsert"))
        .and(body_string_contains("REDIS_URL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [ { "message": "Problem processing request" } ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("variableUpsert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "variableUpsert": { "id": "v-1", "name": "x" } }
        })))
        .mount(&server)
        .await;

    let mut vars = EnvVarSet::new();
    vars.set("DATABASE_URL", "postgres://u:p@h/db")
        .set("REDIS_URL", "redis://default:pw@h:6379")
        .set("RAILS_ENV", "production");

    let railway = client(&server).await;
    let driver = ProvisionDriver::new(&railway);
    let report = driver
        .provision_service(&plan(ResourceRef::new("p-1", "widget"), vars))
        .await
        .unwrap();

    assert!(report.is_partial());
    assert!(report.reused);
    assert_eq!(report.applied(), vec!["DATABASE_URL", "RAILS_ENV"]);
    assert_eq!(report.failed().len(), 1);
    assert_eq!(report.failed()[0].name, "REDIS_URL");
}

#[tokio::test]
async fn test_full_run_reaches_done_with_start_command() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("serviceCreate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "serviceCreate": { "id": "svc-new", "name": "widget-worker" } }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("variableUpsert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "variableUpsert": { "id": "v-1", "name": "x" } }
        })))
        .expect(4)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("serviceUpdate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "serviceUpdate": { "id": "svc-new" } }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(services_response(&[])))
        .mount(&server)
        .await;

    let mut vars = EnvVarSet::new();
    vars.set("DATABASE_URL", "postgres://u:p@h/db")
        .set("RAILS_ENV", "production")
        .set("NODE_ENV", "production")
        .set("FRONTEND_URL", "https://x.example.com");

    let mut plan = plan(ResourceRef::new("p-1", "widget"), vars);
    plan.start_command = Some("bundle exec sidekiq -C config/sidekiq.yml".to_string());

    let railway = client(&server).await;
    let driver = ProvisionDriver::new(&railway);
    let report = driver.provision_service(&plan).await.unwrap();

    assert_eq!(report.state, ProvisionState::Done);
    assert!(!report.reused);
    assert_eq!(
        report.applied(),
        vec![
            "DATABASE_URL",
            "RAILS_ENV",
            "NODE_ENV",
            "FRONTEND_URL",
            "start command"
        ]
    );
}

#[tokio::test]
async fn test_ensure_project_creates_when_no_fragment_match() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("projectCreate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "projectCreate": { "project": { "id": "p-new", "name": "widget-worker" } } }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "me": { "projects": { "edges": [
                { "node": { "id": "p-1", "name": "unrelated" } }
            ] } } }
        })))
        .mount(&server)
        .await;

    let railway = client(&server).await;
    let driver = ProvisionDriver::new(&railway);
    let (project, state) = driver.ensure_project("worker", "widget-worker").await.unwrap();
    assert_eq!(state, ProvisionState::Created);
    assert_eq!(project.id, "p-new");
}
