use namelock::constants::CONFIG_PATH_ENV;
use namelock::test_utils::{HeldGuards, wait_for};
use namelock::{LockRegistry, OverflowStrategy, QueueLimit, RegistryConfig};
use serial_test::serial;
use std::path::PathBuf;
use tempfile::TempDir;

const CONFIG: &str = r#"
[defaults]
max_queue_size = 4

[locks.hot]
max_queue_size = 1
overflow_strategy = "first"
"#;

#[tokio::test]
async fn test_registry_from_config_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    tokio::fs::write(&path, CONFIG).await.unwrap();

    let config = RegistryConfig::load_from(&path).await.unwrap();
    let registry = LockRegistry::with_config(config).unwrap();

    registry.lock("hot", |_guard| {}, None).unwrap();
    registry.lock("cold", |_guard| {}, None).unwrap();

    let hot = registry.options("hot").unwrap().unwrap();
    assert_eq!(hot.max_queue_size, QueueLimit::bounded(1).unwrap());
    assert_eq!(hot.overflow_strategy, OverflowStrategy::First);

    let cold = registry.options("cold").unwrap().unwrap();
    assert_eq!(cold.max_queue_size.get(), Some(4));
    assert_eq!(cold.overflow_strategy, OverflowStrategy::This);
}

#[tokio::test]
async fn test_preset_bound_is_enforced() {
    let config = RegistryConfig::from_toml_str(CONFIG).unwrap();
    let registry = LockRegistry::with_config(config).unwrap();
    let held = HeldGuards::new();

    registry.lock("hot", held.capture("holder"), None).unwrap();
    for _ in 0..3 {
        registry.lock("hot", |_guard| {}, None).unwrap();
    }
    assert_eq!(registry.queue_size("hot").unwrap(), Some(1));

    assert!(wait_for(|| held.len() == 1, crate::WAIT).await);
    held.release_all();
}

#[tokio::test]
async fn test_reset_keeps_presets() {
    let config = RegistryConfig::from_toml_str(CONFIG).unwrap();
    let registry = LockRegistry::with_config(config).unwrap();

    registry.lock("hot", |_guard| {}, None).unwrap();
    registry.reset();
    assert!(!registry.lock_exists("hot").unwrap());

    registry.lock("hot", |_guard| {}, None).unwrap();
    assert_eq!(registry.options("hot").unwrap().unwrap().max_queue_size.get(), Some(1));
}

#[tokio::test]
async fn test_invalid_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    tokio::fs::write(&path, "[locks.hot]\nmax_queue_size = 0\n").await.unwrap();

    let err = RegistryConfig::load_from(&path).await.unwrap_err();
    assert!(format!("{err:#}").contains("positive integer"));
}

#[test]
#[serial]
fn test_default_path_honors_env() {
    let temp = TempDir::new().unwrap();
    let custom = temp.path().join("custom.toml");

    // SAFETY: serialized with every other test touching the environment
    unsafe { std::env::set_var(CONFIG_PATH_ENV, &custom) };
    let resolved = RegistryConfig::default_path().unwrap();
    unsafe { std::env::remove_var(CONFIG_PATH_ENV) };

    assert_eq!(resolved, custom);
}

#[test]
#[serial]
fn test_default_path_under_home() {
    // SAFETY: serialized with every other test touching the environment
    unsafe { std::env::remove_var(CONFIG_PATH_ENV) };
    let resolved = RegistryConfig::default_path().unwrap();
    assert!(resolved.ends_with(PathBuf::from(".namelock").join("config.toml")));
}
