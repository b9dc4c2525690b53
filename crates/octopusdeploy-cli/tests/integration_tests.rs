//! Integration tests for CLI commands

use std::path::Path;
use std::process::{Command, Output};

use serde_json::json;
use tempfile::TempDir;

/// Variables that would leak the developer's own Octopus setup into a test
const ISOLATED_VARS: &[&str] = &[
    "OCTOPUS_URL",
    "OCTOPUS_APIKEY",
    "OCTOPUS_ACCESS_TOKEN",
    "OCTOPUS_SPACE_ID",
    "TF_OCTOPUS_DEPRECATION_REVERSALS",
    "REDIRECTION_SERVICE_ENABLED",
    "REDIRECTION_SERVICE_API_KEY",
    "TF_LOG",
];

/// Command with no ambient configuration; `home` stands in for the user's
/// config directory
fn provider_command(home: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_terraform-provider-octopusdeploy"));
    for var in ISOLATED_VARS {
        cmd.env_remove(var);
    }
    cmd.env("HOME", home).env("XDG_CONFIG_HOME", home).args(args);
    cmd
}

fn run(home: &Path, args: &[&str]) -> Output {
    provider_command(home, args)
        .output()
        .expect("Failed to execute terraform-provider-octopusdeploy")
}

fn write(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

mod schema_command {
    use super::*;

    #[test]
    fn test_schema_lists_everything() {
        let home = TempDir::new().unwrap();
        let output = run(home.path(), &["schema"]);

        assert!(output.status.success(), "{}", stderr(&output));
        let json: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("Output should be valid JSON");
        assert!(json["provider"].is_object());
        assert!(json["resource_schemas"]["octopusdeploy_environment"].is_object());
        assert!(json["resource_schemas"]["octopusdeploy_azure_subscription_account"].is_object());
        assert!(json["data_source_schemas"]["octopusdeploy_environments"].is_object());
    }

    #[test]
    fn test_schema_single_type() {
        let home = TempDir::new().unwrap();
        let output = run(home.path(), &["schema", "octopusdeploy_feeds"]);

        assert!(output.status.success());
        assert!(stdout(&output).contains("feed_type"));
    }

    #[test]
    fn test_schema_unknown_type_suggests() {
        let home = TempDir::new().unwrap();
        let output = run(home.path(), &["schema", "octopusdeploy_enviroment"]);

        assert_eq!(output.status.code(), Some(64));
        assert!(stderr(&output).contains("octopusdeploy_environment"));
    }
}

mod validate_command {
    use super::*;

    #[test]
    fn test_validate_valid_yaml() {
        let home = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        let config = write(&dir, "policy.yaml", "strategy: Count\nquantity_to_keep: 30\nunit: Days\n");

        let output = run(
            home.path(),
            &[
                "validate",
                "octopusdeploy_space_default_lifecycle_release_retention_policy",
                &config,
            ],
        );
        assert!(output.status.success(), "{}", stderr(&output));
        assert!(stderr(&output).contains("configuration is valid"));
    }

    #[test]
    fn test_validate_missing_required_attribute() {
        let home = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        let config = write(&dir, "environment.json", r#"{"description": "no name"}"#);

        let output = run(home.path(), &["validate", "octopusdeploy_environment", &config]);
        assert_eq!(output.status.code(), Some(2));
        assert!(stderr(&output).contains("name"));
    }

    #[test]
    fn test_validate_count_strategy_needs_quantity() {
        let home = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        let config = write(&dir, "policy.json", r#"{"strategy": "Count", "unit": "Days"}"#);

        let output = run(
            home.path(),
            &[
                "validate",
                "octopusdeploy_space_default_lifecycle_tentacle_retention_policy",
                &config,
            ],
        );
        assert_eq!(output.status.code(), Some(2));
        assert!(stderr(&output).contains("quantity_to_keep"));
    }

    #[test]
    fn test_validate_malformed_file() {
        let home = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        let config = write(&dir, "environment.json", "{ not json");

        let output = run(home.path(), &["validate", "octopusdeploy_environment", &config]);
        assert_eq!(output.status.code(), Some(4));
    }
}

mod plan_command {
    use super::*;

    #[test]
    fn test_plan_create() {
        let home = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        let config = write(&dir, "environment.json", r#"{"name": "Production"}"#);

        let output = run(home.path(), &["plan", "octopusdeploy_environment", &config]);
        assert!(output.status.success(), "{}", stderr(&output));
        let out = stdout(&output);
        assert!(out.contains("octopusdeploy_environment will be created"));
        assert!(out.contains("(known after apply)"));
    }

    #[test]
    fn test_plan_matching_state_is_up_to_date() {
        let home = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        let config = write(&dir, "environment.json", r#"{"name": "Production"}"#);
        let state = write(
            &dir,
            "state.json",
            &json!({
                "resource_type": "octopusdeploy_environment",
                "state": {
                    "id": "Environments-1",
                    "name": "Production",
                    "slug": "production",
                    "description": "",
                    "sort_order": 1,
                    "use_guided_failure": false,
                    "allow_dynamic_infrastructure": false,
                    "space_id": "Spaces-1"
                }
            })
            .to_string(),
        );

        let output = run(
            home.path(),
            &["plan", "octopusdeploy_environment", &config, "--state", &state],
        );
        assert!(output.status.success(), "{}", stderr(&output));
        assert!(stdout(&output).contains("is up to date"));
    }

    #[test]
    fn test_plan_rejects_state_of_other_type() {
        let home = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        let config = write(&dir, "environment.json", r#"{"name": "Production"}"#);
        let state = write(
            &dir,
            "state.json",
            r#"{"resource_type": "octopusdeploy_space", "state": {"id": "Spaces-1"}}"#,
        );

        let output = run(
            home.path(),
            &["plan", "octopusdeploy_environment", &config, "--state", &state],
        );
        assert_eq!(output.status.code(), Some(4));
        assert!(stderr(&output).contains("octopusdeploy_space"));
    }

    #[test]
    fn test_plan_hides_secrets() {
        let home = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        let config = write(
            &dir,
            "feed.yaml",
            "name: Charts\nfeed_uri: https://charts.example.com\npassword: hunter2\n",
        );

        let output = run(home.path(), &["plan", "octopusdeploy_helm_feed", &config]);
        assert!(output.status.success(), "{}", stderr(&output));
        assert!(!stdout(&output).contains("hunter2"));
        assert!(stdout(&output).contains("(sensitive value)"));
    }
}

mod connection {
    use super::*;

    #[test]
    fn test_apply_without_address_fails_configuration() {
        let home = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        let config = write(&dir, "environment.json", r#"{"name": "Production"}"#);

        let output = run(home.path(), &["apply", "octopusdeploy_environment", &config]);
        assert_eq!(output.status.code(), Some(4));
        assert!(stderr(&output).contains("address"));
    }

    #[test]
    fn test_missing_settings_file() {
        let home = TempDir::new().unwrap();
        let output = run(
            home.path(),
            &["query", "octopusdeploy_spaces", "--config", "/nonexistent/config.yaml"],
        );
        assert_eq!(output.status.code(), Some(4));
    }

    #[test]
    fn test_unknown_data_source() {
        let home = TempDir::new().unwrap();
        let output = run(home.path(), &["query", "octopusdeploy_enviroments"]);
        assert_eq!(output.status.code(), Some(64));
        assert!(stderr(&output).contains("octopusdeploy_environments"));
    }
}

mod against_server {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn environment() -> serde_json::Value {
        json!({
            "Id": "Environments-1",
            "Name": "Production",
            "Slug": "production",
            "SortOrder": 1,
            "SpaceId": "Spaces-1"
        })
    }

    async fn run_async(home: &Path, args: Vec<String>) -> Output {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let mut cmd = provider_command(home, &args);
        tokio::task::spawn_blocking(move || cmd.output().expect("Failed to execute terraform-provider-octopusdeploy"))
            .await
            .unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_apply_refresh_destroy() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/Spaces-1/environments"))
            .respond_with(ResponseTemplate::new(201).set_body_json(environment()))
            .expect(1)
            .mount(&mock)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/environments/Environments-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(environment()))
            .mount(&mock)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/Spaces-1/environments/Environments-1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock)
            .await;

        let home = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        let config = write(&dir, "environment.json", r#"{"name": "Production"}"#);
        let state = dir.path().join("state.json");
        let state_arg = state.to_string_lossy().into_owned();
        let connection = vec![
            "--address".to_string(),
            mock.uri(),
            "--api-key".to_string(),
            "API-TEST".to_string(),
            "--space-id".to_string(),
            "Spaces-1".to_string(),
        ];
        let args = |command: &[&str]| -> Vec<String> {
            command
                .iter()
                .map(|s| s.to_string())
                .chain(connection.iter().cloned())
                .collect()
        };

        let output = run_async(
            home.path(),
            args(&["apply", "octopusdeploy_environment", &config, "--state", &state_arg]),
        )
        .await;
        assert!(output.status.success(), "{}", stderr(&output));
        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&state).unwrap()).unwrap();
        assert_eq!(written["resource_type"], "octopusdeploy_environment");
        assert_eq!(written["state"]["id"], "Environments-1");
        assert_eq!(written["state"]["slug"], "production");

        let output = run_async(
            home.path(),
            args(&["refresh", "octopusdeploy_environment", "--state", &state_arg]),
        )
        .await;
        assert!(output.status.success(), "{}", stderr(&output));
        assert!(!stderr(&output).contains("drifted"));

        let output = run_async(
            home.path(),
            args(&["destroy", "octopusdeploy_environment", "--state", &state_arg]),
        )
        .await;
        assert!(output.status.success(), "{}", stderr(&output));
        assert!(!state.exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_import_prints_state() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Spaces-1/environments/Environments-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(environment()))
            .mount(&mock)
            .await;

        let home = TempDir::new().unwrap();
        let output = run_async(
            home.path(),
            vec![
                "import".to_string(),
                "octopusdeploy_environment".to_string(),
                "Environments-1".to_string(),
                "--address".to_string(),
                mock.uri(),
                "--api-key".to_string(),
                "API-TEST".to_string(),
                "--space-id".to_string(),
                "Spaces-1".to_string(),
            ],
        )
        .await;
        assert!(output.status.success(), "{}", stderr(&output));
        let printed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(printed["state"]["name"], "Production");
    }
}
