//! End-to-end tests for the oauth-automator binary
//!
//! Every test runs in its own project directory with the automator home
//! pointed at a temporary directory, so no real key or history is touched.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SECRET: &str = "0123456789abcdefghijklmnopqrstuv";

struct Sandbox {
    home: TempDir,
    project: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            home: TempDir::new().unwrap(),
            project: TempDir::new().unwrap(),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("oauth-automator").unwrap();
        cmd.current_dir(self.project.path())
            .env("OAUTH_AUTOMATOR_HOME", self.home.path())
            .env_remove("ENABLE_SECURE_LOGGING")
            .env_remove("OAUTH_CLIENT_SECRET")
            .env_remove("OAUTH_APP_NAME")
            .env_remove("OAUTH_BASE_URL")
            .env_remove("RUST_LOG");
        cmd
    }

    fn save(&self, client_id: &str, extra: &[&str]) -> Command {
        let mut cmd = self.cmd();
        cmd.args([
            "save",
            "--app-name",
            "acme",
            "--client-id",
            client_id,
            "--client-secret",
            SECRET,
        ])
        .args(extra);
        cmd
    }

    fn env_file(&self) -> String {
        fs::read_to_string(self.project.path().join(".env")).unwrap()
    }

    fn write_env_file(&self, contents: &str) {
        fs::write(self.project.path().join(".env"), contents).unwrap();
    }
}

// ============================================================================
// save
// ============================================================================

#[test]
fn test_save_creates_env_file() {
    let sandbox = Sandbox::new();

    sandbox
        .save("Ov23liAcme", &[])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved credentials for 'acme' (DEV)"))
        .stdout(predicate::str::contains("Written:   GITHUB_CLIENT_ID"));

    let contents = sandbox.env_file();
    assert!(contents.contains("# GitHub OAuth Credentials (acme)\n"));
    assert!(contents.contains("GITHUB_CLIENT_ID=Ov23liAcme\n"));
    assert!(contents.contains(&format!("GITHUB_CLIENT_SECRET={}\n", SECRET)));
}

#[test]
fn test_save_keeps_existing_values_without_terminal() {
    let sandbox = Sandbox::new();
    sandbox.write_env_file("DATABASE_URL=postgres://localhost/app\nGITHUB_CLIENT_ID=old123\n");

    sandbox
        .save("Ov23liAcme", &[])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Renamed:   GITHUB_CLIENT_ID -> GENERATED_GITHUB_CLIENT_ID",
        ));

    let contents = sandbox.env_file();
    assert!(contents.starts_with("DATABASE_URL=postgres://localhost/app\nGITHUB_CLIENT_ID=old123\n"));
    assert!(contents.contains("GENERATED_GITHUB_CLIENT_ID=Ov23liAcme\n"));
    assert!(contents.contains("GENERATED_GITHUB_CLIENT_SECRET="));
}

#[test]
fn test_save_archive_policy() {
    let sandbox = Sandbox::new();
    sandbox.write_env_file("GITHUB_CLIENT_ID=old123\n");

    sandbox
        .save("Ov23liAcme", &["--policy", "archive"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Archived:  GITHUB_CLIENT_ID"));

    let contents = sandbox.env_file();
    assert!(contents.starts_with("# OLD_GITHUB_CLIENT_ID=old123\n"));
    assert!(contents.contains("\nGITHUB_CLIENT_ID=Ov23liAcme\n"));
}

#[test]
fn test_save_forced_prefix() {
    let sandbox = Sandbox::new();
    sandbox.write_env_file("GITHUB_CLIENT_ID=dev123\n");

    sandbox
        .save("Ov23liProd", &["--prefix", "PROD", "--environment", "prod"])
        .assert()
        .success();

    let contents = sandbox.env_file();
    assert!(contents.starts_with("GITHUB_CLIENT_ID=dev123\n"));
    assert!(contents.contains("PROD_GITHUB_CLIENT_ID=Ov23liProd\n"));
}

#[test]
fn test_save_to_named_target() {
    let sandbox = Sandbox::new();

    sandbox
        .save("Ov23liAcme", &["--target", "local"])
        .assert()
        .success();

    let local = fs::read_to_string(sandbox.project.path().join(".env.local")).unwrap();
    assert!(local.contains("GITHUB_CLIENT_ID=Ov23liAcme"));
    assert!(!sandbox.project.path().join(".env").exists());
}

#[test]
fn test_save_rejects_empty_client_id() {
    let sandbox = Sandbox::new();

    sandbox
        .save("", &[])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Client ID cannot be empty"));

    assert!(!sandbox.project.path().join(".env").exists());
}

#[test]
fn test_save_dual_combined() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args([
            "save-dual",
            "--app-name",
            "acme",
            "--dev-client-id",
            "Ov23liDev",
            "--dev-client-secret",
            SECRET,
            "--prod-client-id",
            "Ov23liProd",
            "--prod-client-secret",
            SECRET,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("'acme-dev' (DEV)"))
        .stdout(predicate::str::contains("'acme-prod' (PROD)"));

    let contents = sandbox.env_file();
    assert!(contents.contains("GITHUB_CLIENT_ID=Ov23liDev\n"));
    assert!(contents.contains("PROD_GITHUB_CLIENT_ID=Ov23liProd\n"));
}

// ============================================================================
// history
// ============================================================================

#[test]
fn test_history_list_empty() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No GitHub apps logged yet."));
}

#[test]
fn test_logged_save_listed_and_revealed() {
    let sandbox = Sandbox::new();

    sandbox
        .save("Ov23liAcme", &["--log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Secure history: logged"));

    sandbox
        .cmd()
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("acme"))
        .stdout(predicate::str::contains("Ov23liAcme"))
        .stdout(predicate::str::contains(SECRET).not());

    sandbox
        .cmd()
        .args(["history", "reveal", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Client Secret:  {}", SECRET)));

    sandbox
        .cmd()
        .args(["history", "reveal", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    let raw = fs::read_to_string(sandbox.home.path().join("github").join("history.enc")).unwrap();
    assert!(!raw.contains(SECRET));
}

#[test]
fn test_secure_logging_setting_enables_history() {
    let sandbox = Sandbox::new();
    sandbox.write_env_file("ENABLE_SECURE_LOGGING=true\n");

    sandbox.save("Ov23liAcme", &[]).assert().success();
    assert!(sandbox.home.path().join("github").join("history.enc").exists());

    sandbox.save("Ov23liOther", &["--no-log"]).assert().success();

    sandbox
        .cmd()
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ov23liOther").not());
}

#[test]
fn test_history_enable() {
    let sandbox = Sandbox::new();
    sandbox.write_env_file("ENABLE_SECURE_LOGGING=false\n");

    sandbox
        .cmd()
        .args(["history", "enable"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Secure logging enabled."));

    assert!(sandbox.home.path().join(".key").exists());
    assert_eq!(sandbox.env_file(), "ENABLE_SECURE_LOGGING=true\n");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(sandbox.home.path().join(".key"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

// ============================================================================
// credentials / config
// ============================================================================

#[test]
fn test_credentials_masks_secrets() {
    let sandbox = Sandbox::new();
    sandbox.write_env_file(&format!(
        "GITHUB_CLIENT_ID=Ov23liAcme\nGITHUB_CLIENT_SECRET={}\n",
        SECRET
    ));

    sandbox
        .cmd()
        .arg("credentials")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ov23liAcme"))
        .stdout(predicate::str::contains("0123456789...stuv"))
        .stdout(predicate::str::contains(SECRET).not());
}

#[test]
fn test_config_shows_paths() {
    let sandbox = Sandbox::new();
    sandbox.write_env_file("OAUTH_PROD_BASE_URL=https://acme.test\n");

    sandbox
        .cmd()
        .arg("config")
        .env_remove("OAUTH_PROD_BASE_URL")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            sandbox.home.path().join(".key").display().to_string(),
        ))
        .stdout(predicate::str::contains("https://acme.test"))
        .stdout(predicate::str::contains("Key initialized:   false"));
}
