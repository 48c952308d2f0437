use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn namelock() -> Command {
    let mut cmd = Command::cargo_bin("namelock").unwrap();
    cmd.env_remove("RUST_LOG");
    // Keep runs independent of any config in the user's home directory
    cmd.env(
        "NAMELOCK_CONFIG_PATH",
        std::env::temp_dir().join("namelock-tests-absent").join("config.toml"),
    );
    cmd
}

#[test]
fn test_simulate_runs_all_workers() {
    namelock()
        .args(["simulate", "--workers", "3", "--hold-ms", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ran 3/3 workers"));
}

#[test]
fn test_simulate_json_report() {
    let output = namelock()
        .args([
            "simulate",
            "--name",
            "jobs",
            "--workers",
            "4",
            "--hold-ms",
            "20",
            "--max-queue-size",
            "1",
            "--strategy",
            "first",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["name"], "jobs");
    assert_eq!(report["ran"], serde_json::json!([0, 3]));
    assert_eq!(report["dropped"], serde_json::json!([1, 2]));
    assert_eq!(report["options"]["overflow_strategy"], "first");
    assert_eq!(report["options"]["max_queue_size"], 1);
}

#[test]
fn test_simulate_rejects_zero_workers() {
    namelock()
        .args(["simulate", "--workers", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--workers must be at least 1"));
}

#[test]
fn test_config_init_show_and_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    let path_arg = path.to_str().unwrap();

    namelock()
        .args(["config", "path", "--config", path_arg])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    namelock()
        .args(["config", "init", "--config", path_arg])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config"));
    assert!(path.exists());

    namelock()
        .args(["config", "init", "--config", path_arg])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    namelock()
        .args(["config", "show", "--config", path_arg])
        .assert()
        .success()
        .stdout(predicate::str::contains("[locks.example]"));
}

#[test]
fn test_config_path_from_env() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("env-config.toml");

    namelock()
        .env("NAMELOCK_CONFIG_PATH", &path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("env-config.toml"));
}

#[test]
fn test_broken_config_reports_friendly_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, "[defaults]\noverflow_strategy = \"middle\"\n").unwrap();

    namelock()
        .args(["simulate", "--config", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"))
        .stderr(predicate::str::contains("suggestion"));
}
