use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;
use tokio::sync::broadcast;

use flashcards_backend::config::{Config, SessionConfig, SrsEnvConfig, WorkerConfig};
use flashcards_backend::routes::build_router;
use flashcards_backend::srs::config::SrsConfig;
use flashcards_backend::srs::registry::SessionRegistry;
use flashcards_backend::state::AppState;
use flashcards_backend::store::Store;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
    _temp_dir: TempDir,
}

pub async fn spawn_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("flashcards-test.sled");

    // 直接构造 Config，避免使用 set_var 造成多线程测试环境变量竞态
    let config = Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        sled_path: sled_path.to_string_lossy().to_string(),
        cors_origin: "http://localhost:5173".to_string(),
        worker: WorkerConfig {
            is_leader: false,
            enable_due_digest: false,
        },
        session: SessionConfig {
            idle_ttl_secs: 3600,
        },
        srs: SrsEnvConfig {
            initial_interval_days: 1.0,
            min_ease_factor: 1.3,
            max_ease_factor: 3.0,
        },
    };

    let store = Arc::new(Store::open(&config.sled_path).expect("open store"));
    store.run_migrations().expect("run migrations");

    let srs_config = SrsConfig::from_env(&config.srs);
    srs_config.validate().expect("valid srs config");

    let sessions = Arc::new(SessionRegistry::new(config.session.idle_ttl_secs));
    let (shutdown_tx, _) = broadcast::channel::<()>(8);

    let state = AppState::new(store, sessions, srs_config, &config, shutdown_tx);

    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        config,
        _temp_dir: temp_dir,
    }
}
