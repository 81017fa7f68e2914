//! Integration tests for the `calypshome` CLI binary.
//!
//! Argument parsing, help output, completions and error exit codes run
//! without a gateway. The end-to-end tests drive the binary against a
//! wiremock server passed with `--url`.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

const ISOLATED_HOME: &str = "/tmp/calypshome-cli-test-nonexistent";

/// Build a [`Command`] for the `calypshome` binary with env isolation.
///
/// Clears all `CALYPSHOME_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn calypshome_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("calypshome");
    cmd.env("HOME", ISOLATED_HOME)
        .env("XDG_CONFIG_HOME", ISOLATED_HOME)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("CALYPSHOME_PROFILE")
        .env_remove("CALYPSHOME_URL")
        .env_remove("CALYPSHOME_OUTPUT")
        .env_remove("CALYPSHOME_TIMEOUT")
        .env_remove("CALYPSHOME_USERNAME")
        .env_remove("CALYPSHOME_PASSWORD");
    cmd
}

/// Command wired to a mock gateway with credentials from the environment.
fn gateway_cmd(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = calypshome_cmd();
    cmd.env("CALYPSHOME_USERNAME", "user@example.com")
        .env("CALYPSHOME_PASSWORD", "s3cret!")
        .args(["--url", &server.uri()]);
    cmd
}

/// Command whose config directories live under `home`.
fn calypshome_cmd_in(home: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = calypshome_cmd();
    cmd.env("HOME", home).env("XDG_CONFIG_HOME", home.join(".config"));
    cmd
}

/// Write `contents` where the binary looks for its config file under `home`.
fn write_config(home: &std::path::Path, contents: &str) -> std::path::PathBuf {
    let output = calypshome_cmd_in(home)
        .args(["config", "path"])
        .output()
        .unwrap();
    let path = std::path::PathBuf::from(String::from_utf8(output.stdout).unwrap().trim());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, contents).unwrap();
    path
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run a blocking command off the async runtime driving the mock server.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

async fn mount_gateway(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", "/")
                .insert_header("Set-Cookie", "JSESSIONID=CLI42;Path=/"),
        )
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/ajax"))
        .and(header("Cookie", "JSESSIONID=CLI42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([[
            { "alias": "System" },
            {
                "alias": "Living room",
                "objects": [{
                    "id": 7,
                    "gw": "GW1",
                    "statuss": [
                        { "statusname": "dev/7/__user_name", "status": "Office" },
                        { "statusname": "dev/7/manufacturer_name", "status": "Acme" },
                        { "statusname": "dev/7/level", "status": "42" },
                        { "statusname": "dev/7/angle", "status": "15" }
                    ]
                }]
            }
        ]])))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = calypshome_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    calypshome_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("window coverings")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("cover"))
            .and(predicate::str::contains("login")),
    );
}

#[test]
fn test_version_flag() {
    calypshome_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("calypshome"));
}

#[test]
fn test_completions_bash() {
    calypshome_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_invalid_subcommand() {
    let output = calypshome_cmd().arg("frobnicate").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_level_out_of_range_is_usage_error() {
    let output = calypshome_cmd()
        .args(["cover", "level", "7@GW1", "150"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("150"), "Expected the rejected value:\n{text}");
}

#[test]
fn test_negative_tilt_parses() {
    // Reaches credential resolution, so parsing succeeded
    let output = calypshome_cmd()
        .args(["cover", "tilt", "7@GW1", "-30"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_devices_list_without_credentials() {
    let output = calypshome_cmd().args(["devices", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(3), "Expected auth exit code");
    let text = combined_output(&output);
    assert!(
        text.contains("No credentials configured"),
        "Expected credentials hint:\n{text}"
    );
}

#[test]
fn test_unknown_profile_is_reported() {
    let output = calypshome_cmd()
        .args(["--profile", "nope", "devices", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("Profile 'nope' not found"), "{text}");
}

#[test]
fn test_config_path_prints_location() {
    calypshome_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_no_config() {
    calypshome_cmd()
        .args(["config", "show", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"default_profile\""));
}

#[test]
fn test_invalid_output_format() {
    let output = calypshome_cmd()
        .args(["--output", "xml", "devices", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_config_profiles_and_use_round_trip() {
    let home = tempfile::tempdir().unwrap();
    let path = write_config(
        home.path(),
        r#"
default_profile = "home"

[profiles.home]
username = "me@example.com"

[profiles.lab]
url = "http://127.0.0.1:9"
username = "lab"
"#,
    );

    calypshome_cmd_in(home.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("home *").and(predicate::str::contains("lab")));

    calypshome_cmd_in(home.path())
        .args(["config", "use", "lab"])
        .assert()
        .success();

    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(saved.contains(r#"default_profile = "lab""#), "{saved}");
    assert!(saved.contains("http://127.0.0.1:9"), "{saved}");

    let output = calypshome_cmd_in(home.path())
        .args(["config", "use", "attic"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("Available profiles: home, lab"));
}

#[test]
fn test_config_show_masks_plaintext_password() {
    let home = tempfile::tempdir().unwrap();
    write_config(
        home.path(),
        r#"
[profiles.home]
username = "me@example.com"
password = "hunter2"
"#,
    );

    calypshome_cmd_in(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("me@example.com")
                .and(predicate::str::contains("********"))
                .and(predicate::str::contains("hunter2").not()),
        );
}

// ── Against a mock gateway ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_login_reports_success() {
    let server = MockServer::start().await;
    mount_gateway(&server).await;

    let mut cmd = gateway_cmd(&server);
    cmd.arg("login");
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Logged in"), "{stdout}");
    assert!(stdout.contains("user@example.com"), "{stdout}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_profile_supplies_url_and_username() {
    let server = MockServer::start().await;
    // Mounted first so it takes precedence over the catch-all login
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_string_contains("_login=lab%40example.com"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Set-Cookie", "JSESSIONID=CLI42;Path=/"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_gateway(&server).await;

    let home = tempfile::tempdir().unwrap();
    write_config(
        home.path(),
        &format!(
            "default_profile = \"lab\"\n\n[profiles.lab]\nurl = \"{}\"\nusername = \"lab@example.com\"\n",
            server.uri()
        ),
    );

    let mut cmd = calypshome_cmd_in(home.path());
    cmd.env("CALYPSHOME_PASSWORD", "s3cret!")
        .args(["devices", "list", "-o", "plain"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "7");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_list_json() {
    let server = MockServer::start().await;
    mount_gateway(&server).await;

    let mut cmd = gateway_cmd(&server);
    cmd.args(["devices", "list", "-o", "json"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let devices: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        devices,
        json!([{
            "id": 7,
            "gw": "GW1",
            "name": "Office",
            "manufacturer": "Acme",
            "kv": {
                "__user_name": "Office",
                "manufacturer_name": "Acme",
                "level": "42",
                "angle": "15"
            }
        }])
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_list_plain_ids() {
    let server = MockServer::start().await;
    mount_gateway(&server).await;

    let mut cmd = gateway_cmd(&server);
    cmd.args(["devices", "list", "-o", "plain"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "7");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_get_unknown_is_not_found() {
    let server = MockServer::start().await;
    mount_gateway(&server).await;

    let mut cmd = gateway_cmd(&server);
    cmd.args(["devices", "get", "Garage"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cover_level_by_name() {
    let server = MockServer::start().await;
    mount_gateway(&server).await;
    Mock::given(method("POST"))
        .and(path("/ihm"))
        .and(body_string_contains("gw=GW1"))
        .and(body_string_contains("id=7"))
        .and(body_string_contains("action=LEVEL"))
        .and(body_string_contains("args=level%3D60"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = gateway_cmd(&server);
    cmd.args(["cover", "level", "office", "60"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cover_direct_target_skips_listing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Set-Cookie", "JSESSIONID=CLI42;Path=/"),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ajax"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ihm"))
        .and(body_string_contains("action=STOP"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = gateway_cmd(&server);
    cmd.args(["cover", "stop", "7@GW1"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cover_rejected_action_fails() {
    let server = MockServer::start().await;
    mount_gateway(&server).await;
    Mock::given(method("POST"))
        .and(path("/ihm"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut cmd = gateway_cmd(&server);
    cmd.args(["cover", "open", "7@GW1"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("did not accept OPEN"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_login_exits_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<form>"))
        .mount(&server)
        .await;

    let mut cmd = gateway_cmd(&server);
    cmd.arg("login");
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}
