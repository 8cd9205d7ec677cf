//! Session lifecycle: login, restore, logout
//!
//! At most one active session per process. The manager owns the persisted
//! store; the connection manager and API client are passed in by the
//! caller so ownership stays explicit and tests can substitute fakes.

use hwatch_core::prelude::*;
use hwatch_core::AuthSession;
use hwatch_transport::{ConnectionManager, Dialer};

use crate::api::ApiClient;
use crate::store::SessionStore;

/// Owns the current session and its persistence
pub struct SessionManager<S: SessionStore> {
    store: S,
    current: Option<AuthSession>,
}

impl<S: SessionStore> SessionManager<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&AuthSession> {
        self.current.as_ref()
    }

    /// Load a persisted session at startup, if one exists
    pub fn restore(&mut self) -> Option<&AuthSession> {
        if self.current.is_none() {
            self.current = self.store.load();
            if let Some(session) = &self.current {
                info!(account_id = %session.account_id, "session restored");
            }
        }
        self.current.as_ref()
    }

    /// Authenticate and persist the resulting session
    ///
    /// A second login replaces the first.
    pub async fn login(
        &mut self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<AuthSession> {
        let session = api.login(email, password).await?;
        self.store.save(&session)?;
        self.current = Some(session.clone());
        Ok(session)
    }

    /// Clear the persisted session and tear down every open channel
    /// (general and device-scoped). Idempotent.
    pub fn logout<D: Dialer>(&mut self, conn: &mut ConnectionManager<D>) -> Result<()> {
        conn.disconnect_all();
        self.store.clear()?;
        if self.current.take().is_some() {
            info!("logged out");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use hwatch_transport::test_utils::FakeDialer;
    use url::Url;

    fn session() -> AuthSession {
        AuthSession {
            user_id: "u1".into(),
            account_id: "acct-1".into(),
            auth_token: "tok".into(),
        }
    }

    fn seeded_manager() -> SessionManager<MemoryStore> {
        let mut store = MemoryStore::new();
        store.save(&session()).unwrap();
        SessionManager::new(store)
    }

    #[test]
    fn test_restore_loads_persisted_session() {
        let mut manager = seeded_manager();
        assert!(manager.current().is_none());
        assert_eq!(manager.restore().unwrap().account_id, "acct-1");
        assert!(manager.current().is_some());
    }

    #[tokio::test]
    async fn test_logout_clears_store_and_disconnects_everything() {
        let mut manager = seeded_manager();
        manager.restore();

        let dialer = FakeDialer::new();
        let mut conn = ConnectionManager::new(dialer, Url::parse("ws://backend.test/rt").unwrap());
        assert!(conn.connect("acct-1").await);
        assert!(conn.connect_to_device("SN-1", "acct-1").await);
        assert!(conn.connect_to_device("SN-2", "acct-1").await);

        manager.logout(&mut conn).unwrap();

        assert!(manager.current().is_none());
        let status = conn.status();
        assert!(!status.is_connected);
        assert!(status.connected_devices.is_empty());

        // Store must be empty: a fresh manager over the same store sees
        // nothing to restore.
        assert!(manager.restore().is_none());
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let mut manager = SessionManager::new(MemoryStore::new());
        let dialer = FakeDialer::new();
        let mut conn = ConnectionManager::new(dialer, Url::parse("ws://backend.test/rt").unwrap());

        manager.logout(&mut conn).unwrap();
        manager.logout(&mut conn).unwrap();
        assert!(manager.current().is_none());
    }
}
