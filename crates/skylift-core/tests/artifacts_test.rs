use skylift_core::artifacts::{
    self, RailwayManifest, RenderBlueprint, WORKER_START_COMMAND,
};
use skylift_core::resource::EnvVarSet;

fn sample_vars() -> EnvVarSet {
    let mut vars = EnvVarSet::new();
    vars.set("DATABASE_URL", "postgres://u:p@h/db")
        .set("REDIS_URL", "redis://default:pw@host:6379")
        .set("FRONTEND_URL", "https://x.example.com")
        .set("RAILS_ENV", "production");
    vars
}

#[test]
fn test_render_blueprint_round_trip() {
    let blueprint = RenderBlueprint::web("widget", &sample_vars());
    let yaml = blueprint.to_yaml().unwrap();

    assert!(yaml.contains("type: web"));
    assert!(yaml.contains("name: widget-web"));
    assert!(yaml.contains("buildCommand"));
    assert!(yaml.contains("startCommand"));
    assert!(yaml.contains("DATABASE_URL"));
    assert!(yaml.contains("REDIS_URL"));
    assert!(yaml.contains("FRONTEND_URL"));

    let parsed = RenderBlueprint::from_yaml(&yaml).unwrap();
    assert_eq!(parsed.services.len(), 1);
    let service = &parsed.services[0];
    assert_eq!(service.service_type, "web");
    assert_eq!(service.env_vars.len(), 4);
}

#[test]
fn test_railway_manifest_round_trip() {
    let manifest = RailwayManifest::worker("widget", &sample_vars());
    let toml_text = manifest.to_toml().unwrap();

    assert!(toml_text.contains("[build]"));
    assert!(toml_text.contains("[deploy]"));
    assert!(toml_text.contains("[service.variables]"));

    let parsed = RailwayManifest::from_toml(&toml_text).unwrap();
    assert_eq!(parsed.build.builder, "nixpacks");
    assert_eq!(parsed.deploy.start_command, WORKER_START_COMMAND);
    assert_eq!(parsed.deploy.restart_policy_type, "on_failure");
    assert_eq!(parsed.deploy.restart_policy_max_retries, 10);
    assert_eq!(parsed.service.name, "widget-worker");
    assert_eq!(
        parsed.service.variables.get("DATABASE_URL").map(String::as_str),
        Some("postgres://u:p@h/db")
    );
}

#[test]
fn test_artifacts_written_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let vars = sample_vars();

    let blueprint_path = RenderBlueprint::web("widget", &vars).write(dir.path()).unwrap();
    let manifest_path = RailwayManifest::worker("widget", &vars).write(dir.path()).unwrap();
    let env_path = artifacts::write_env_deploy(dir.path(), &vars).unwrap();

    assert!(blueprint_path.ends_with("render.yaml"));
    assert!(manifest_path.ends_with("railway.toml"));
    assert!(env_path.ends_with(".env.deploy"));
    assert!(blueprint_path.exists());
    assert!(manifest_path.exists());

    let env_content = std::fs::read_to_string(env_path).unwrap();
    assert!(env_content.contains("DATABASE_URL=\"postgres://u:p@h/db\""));
}

#[test]
fn test_env_example_marks_missing_fields() {
    let rendered = artifacts::render_env_example(&[
        ("DATABASE_URL", Some("postgres://u:p@h/db")),
        ("RENDER_API_KEY", None),
    ]);
    assert!(rendered.contains("DATABASE_URL=postgres://u:p@h/db"));
    assert!(rendered.contains("# RENDER_API_KEY=your_value_here"));
}
