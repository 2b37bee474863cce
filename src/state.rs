use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;

use crate::config::Config;
use crate::srs::config::SrsConfig;
use crate::srs::registry::SessionRegistry;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    store: Arc<Store>,
    sessions: Arc<SessionRegistry>,
    srs_config: Arc<SrsConfig>,
    config: Arc<Config>,
    shutdown_tx: broadcast::Sender<()>,
    started_at: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<Store>,
        sessions: Arc<SessionRegistry>,
        srs_config: SrsConfig,
        config: &Config,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        Self {
            store,
            sessions,
            srs_config: Arc::new(srs_config),
            config: Arc::new(config.clone()),
            shutdown_tx,
            started_at: Instant::now(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn srs_config(&self) -> &SrsConfig {
        &self.srs_config
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shutdown_rx(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn shutdown_tx(&self) -> &broadcast::Sender<()> {
        &self.shutdown_tx
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::broadcast;

    use crate::config::Config;
    use crate::srs::config::SrsConfig;
    use crate::srs::registry::SessionRegistry;
    use crate::store::Store;

    use super::*;

    fn test_state() -> (AppState, tempfile::TempDir) {
        let cfg = Config::from_env();
        let tmp = tempfile::tempdir().expect("tempdir");
        let store =
            Arc::new(Store::open(tmp.path().join("state.sled").to_str().unwrap()).unwrap());
        let sessions = Arc::new(SessionRegistry::new(cfg.session.idle_ttl_secs));
        let (tx, _) = broadcast::channel(4);
        (
            AppState::new(store, sessions, SrsConfig::default(), &cfg, tx),
            tmp,
        )
    }

    #[tokio::test]
    async fn shutdown_receiver_can_clone() {
        let (state, _tmp) = test_state();

        let mut rx1 = state.shutdown_rx();
        let mut rx2 = state.shutdown_rx();
        state.shutdown_tx().send(()).unwrap();
        rx1.recv().await.unwrap();
        rx2.recv().await.unwrap();
    }

    #[tokio::test]
    async fn registry_is_shared_across_clones() {
        let (state, _tmp) = test_state();
        let cloned = state.clone();
        assert_eq!(cloned.sessions().active_count().await, 0);
    }
}
