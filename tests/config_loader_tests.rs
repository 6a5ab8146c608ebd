use controller::config::{ConfigError, ConfigLoader};
use controller::storage::Dialect;
use std::{
    env, fs,
    path::PathBuf,
    sync::{Mutex, MutexGuard, OnceLock},
};
use tempfile::TempDir;

const VARS: &[&str] = &[
    "CONTROLLER_PROFILE",
    "CONTROLLER_API_BIND_ADDR",
    "CONTROLLER_LOG_LEVEL",
    "CONTROLLER_LOG_FORMAT",
    "CONTROLLER_DATABASE_DRIVER",
    "CONTROLLER_DATABASE_URL",
    "CONTROLLER_DB_MAX_CONNECTIONS",
    "CONTROLLER_AUTO_MIGRATE",
];

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn env_guard() -> MutexGuard<'static, ()> {
    env_lock()
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

fn clear_env() {
    for var in VARS {
        unsafe {
            env::remove_var(var);
        }
    }
}

fn write_env_file(dir: &TempDir, name: &str, contents: &str) {
    let path = dir.path().join(name);
    fs::write(path, contents).unwrap();
}

#[test]
fn loads_defaults_when_no_env_present() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let cfg = loader.load().expect("config loads with defaults");

    assert_eq!(cfg.profile, "local");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:8080");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.dialect().unwrap(), Dialect::Sqlite);
    assert!(cfg.auto_migrate);
    cfg.bind_addr().expect("default bind addr parses");
    clear_env();
}

#[test]
fn layered_env_files_apply_in_order() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "CONTROLLER_API_BIND_ADDR=127.0.0.1:3000\n");
    write_env_file(
        &temp_dir,
        ".env.test",
        "CONTROLLER_API_BIND_ADDR=192.168.0.10:5000\nCONTROLLER_DB_MAX_CONNECTIONS=3\n",
    );
    write_env_file(
        &temp_dir,
        ".env.test.local",
        "CONTROLLER_API_BIND_ADDR=10.0.0.5:6000\n",
    );

    // Select profile via .env.local before profile-specific files load.
    write_env_file(
        &temp_dir,
        ".env.local",
        "CONTROLLER_PROFILE=test\nCONTROLLER_API_BIND_ADDR=127.0.0.1:4000\n",
    );

    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let cfg = loader.load().expect("config loads with layered env files");

    assert_eq!(cfg.profile, "test");
    assert_eq!(cfg.api_bind_addr, "10.0.0.5:6000");
    assert_eq!(cfg.db_max_connections, 3);
    clear_env();
}

#[test]
fn os_environment_has_highest_precedence() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "CONTROLLER_API_BIND_ADDR=127.0.0.1:3000\nCONTROLLER_DATABASE_URL=sqlite::memory:\n",
    );

    unsafe {
        env::set_var("CONTROLLER_API_BIND_ADDR", "0.0.0.0:9090");
        env::set_var(
            "CONTROLLER_DATABASE_URL",
            "postgres://controller:secret@db:5432/controller",
        );
    }

    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let cfg = loader.load().expect("config loads with env override");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:9090");
    assert_eq!(cfg.dialect().unwrap(), Dialect::Postgres);

    let redacted = cfg.redacted_json().unwrap();
    assert!(!redacted.contains("secret"));

    clear_env();
}

#[test]
fn driver_name_selects_dialect() {
    let _guard = env_guard();
    clear_env();

    unsafe {
        env::set_var("CONTROLLER_DATABASE_DRIVER", "sqlite3");
        env::set_var("CONTROLLER_DATABASE_URL", "sqlite://other.db");
    }
    let temp_dir = TempDir::new().unwrap();
    let cfg = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()))
        .load()
        .expect("sqlite3 driver accepted");
    assert_eq!(cfg.dialect().unwrap(), Dialect::Sqlite);

    unsafe {
        env::set_var("CONTROLLER_DATABASE_DRIVER", "oracle");
    }
    let err = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()))
        .load()
        .expect_err("unknown driver should fail");
    assert!(matches!(err, ConfigError::UnsupportedDriver { .. }));

    clear_env();
}

#[test]
fn invalid_bind_addr_returns_error() {
    let _guard = env_guard();
    clear_env();

    unsafe {
        env::set_var("CONTROLLER_API_BIND_ADDR", "not-an-addr");
    }
    let temp_dir = TempDir::new().unwrap();
    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let err = loader.load().expect_err("invalid bind addr should fail");
    assert!(format!("{}", err).contains("invalid api bind address"));

    clear_env();
}
