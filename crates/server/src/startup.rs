use std::sync::Arc;

use axum::Router;
use common::utils::logging::init_logging_with_format;
use configs::{AppConfig, StorageBackend};
use dotenvy::dotenv;
use service::{runtime, JsonFileStore, MemoryStore, StudentRepository};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Prefer `config.toml` (or `CONFIG_PATH`); fall back to env vars when the file is absent.
fn load_config() -> Result<(AppConfig, bool), StartupError> {
    load_config_at(&configs::default_path())
}

fn load_config_at(path: &str) -> Result<(AppConfig, bool), StartupError> {
    let (mut cfg, from_file) = match configs::load_from_file(path) {
        Ok(cfg) => (cfg, true),
        Err(e) if is_missing_file(&e) => (AppConfig::from_env(), false),
        Err(e) => return Err(StartupError::InvalidConfig(format!("{path}: {e}"))),
    };
    cfg.normalize_and_validate()
        .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    Ok((cfg, from_file))
}

fn is_missing_file(err: &anyhow::Error) -> bool {
    err.downcast_ref::<std::io::Error>()
        .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
}

/// Pick the repository for the configured backend.
pub async fn build_repository(cfg: &AppConfig) -> anyhow::Result<Arc<dyn StudentRepository>> {
    let repo: Arc<dyn StudentRepository> = match cfg.storage.backend {
        StorageBackend::File => {
            runtime::ensure_env(&cfg.storage.path).await?;
            info!(path = %cfg.storage.path.display(), "using JSON file storage");
            Arc::new(JsonFileStore::new(cfg.storage.path.clone()))
        }
        StorageBackend::Memory => {
            warn!("using in-memory storage; records are lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };
    Ok(repo)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let (cfg, from_file) = load_config()?;
    init_logging_with_format(&cfg.logging.format);
    if !from_file {
        info!("no config file found; using environment and defaults");
    }

    let repo = build_repository(&cfg).await?;
    let state = AppState::new(repo);

    let app: Router = routes::build_router(state, build_cors());

    let addr = cfg.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %listener.local_addr()?, "starting student registry");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use service::StudentService;

    #[tokio::test]
    async fn file_backend_creates_data_dir() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let mut cfg = AppConfig::default();
        cfg.storage.path = tmp.path().join("data/students.json");
        let repo = build_repository(&cfg).await?;
        assert!(tmp.path().join("data").is_dir());
        let svc = StudentService::new(repo);
        assert!(svc.list().await?.is_empty());
        Ok(())
    }

    #[test]
    fn missing_config_file_falls_back_to_env() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("config.toml");
        let (cfg, from_file) = load_config_at(&path.to_string_lossy())?;
        assert!(!from_file);
        assert_eq!(cfg.storage.backend, StorageBackend::File);
        Ok(())
    }

    #[test]
    fn malformed_config_file_is_rejected() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            "[server]\nport = \"9000\"\n\n[storage]\npath = \"/srv/real/students.json\"\n",
        )?;
        let err = load_config_at(&path.to_string_lossy()).unwrap_err();
        assert!(matches!(err, StartupError::InvalidConfig(_)), "{err}");
        Ok(())
    }

    #[test]
    fn config_file_values_are_used() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 9000\n\n[storage]\nbackend = \"memory\"\n")?;
        let (cfg, from_file) = load_config_at(&path.to_string_lossy())?;
        assert!(from_file);
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.storage.backend, StorageBackend::Memory);
        Ok(())
    }

    #[tokio::test]
    async fn memory_backend_starts_empty() -> anyhow::Result<()> {
        let mut cfg = AppConfig::default();
        cfg.storage.backend = StorageBackend::Memory;
        let repo = build_repository(&cfg).await?;
        assert!(repo.load().await?.is_empty());
        Ok(())
    }
}
