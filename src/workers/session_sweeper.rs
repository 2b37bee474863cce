use chrono::Utc;

use crate::srs::registry::SessionRegistry;

/// Evict abandoned and long-idle review sessions from memory. Sessions are
/// ephemeral by design; whatever was committed before the session went idle
/// is already in the store.
pub async fn run(sessions: &SessionRegistry) {
    let removed = sessions.sweep(Utc::now()).await;
    if removed > 0 {
        tracing::info!(removed, "Swept stale review sessions");
    } else {
        tracing::debug!("No stale review sessions to sweep");
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use crate::srs::config::SrsConfig;
    use crate::srs::session::ReviewSession;

    use super::*;

    #[tokio::test]
    async fn sweeps_idle_sessions() {
        let registry = SessionRegistry::new(60);
        registry
            .insert(ReviewSession::new(
                "old".to_string(),
                "c1".to_string(),
                Vec::new(),
                SrsConfig::default(),
                Utc::now() - Duration::hours(1),
            ))
            .await;

        run(&registry).await;
        assert_eq!(registry.active_count().await, 0);
    }
}
