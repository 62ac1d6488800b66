use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::session::model::{Session, TokenPair, UserProfile};
use crate::session::store::TokenStore;

/// Sole owner of the process-wide session.
///
/// Every mutation goes through `login`, `update_access_token`, `set_user`,
/// `clear` or `clear_if_refresh_token`; readers only ever get clones.
pub struct SessionHolder {
    state: RwLock<Session>,
    store: Arc<dyn TokenStore>,
}

impl SessionHolder {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            state: RwLock::new(Session::default()),
            store,
        }
    }

    /// Load persisted tokens into memory. Returns whether any were found.
    ///
    /// The user profile is not persisted and stays empty until re-fetched.
    pub fn rehydrate(&self) -> Result<bool, ClientError> {
        let tokens = self.store.load()?;
        let mut state = self.state.write();
        *state = Session::default();
        match tokens {
            Some(pair) => {
                state.access_token = Some(pair.access);
                state.refresh_token = pair.refresh;
                debug!("Rehydrated session from token store");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Replace the session with a freshly issued token pair.
    pub fn login(&self, tokens: TokenPair) -> Result<(), ClientError> {
        {
            let mut state = self.state.write();
            state.access_token = Some(tokens.access.clone());
            state.refresh_token = tokens.refresh.clone();
            state.current_user = None;
        }
        self.store.save(&tokens)
    }

    /// Swap in a refreshed access token.
    ///
    /// `sent_refresh` is the refresh token the new access token was issued
    /// for. If the session no longer holds it (logout, or a login that
    /// replaced it) nothing is touched and `SessionExpired` is returned. The
    /// refresh token is kept unless the server rotated it. A failed write to
    /// the store is logged; the new token is still used for the rest of this
    /// process.
    pub fn update_access_token(
        &self,
        sent_refresh: &str,
        access: String,
        rotated_refresh: Option<String>,
    ) -> Result<TokenPair, ClientError> {
        let tokens = {
            let mut state = self.state.write();
            if state.refresh_token.as_deref() != Some(sent_refresh) {
                debug!("Session changed during refresh; discarding refreshed token");
                return Err(ClientError::session_expired());
            }
            let refresh = rotated_refresh.unwrap_or_else(|| sent_refresh.to_string());
            state.access_token = Some(access.clone());
            state.refresh_token = Some(refresh.clone());
            TokenPair::new(access, Some(refresh))
        };
        if let Err(e) = self.store.save(&tokens) {
            warn!(error = %e, "Failed to persist refreshed access token");
        }
        Ok(tokens)
    }

    /// Clear the session only while it still holds `refresh_token`.
    ///
    /// Returns whether the session was cleared.
    pub fn clear_if_refresh_token(&self, refresh_token: &str) -> bool {
        {
            let mut state = self.state.write();
            if state.refresh_token.as_deref() != Some(refresh_token) {
                debug!("Session changed during refresh; keeping it");
                return false;
            }
            *state = Session::default();
        }
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear persisted tokens");
        }
        info!("Session cleared");
        true
    }

    pub fn set_user(&self, user: UserProfile) {
        self.state.write().current_user = Some(user);
    }

    /// Drop tokens and user, in memory and in the store. Idempotent.
    pub fn clear(&self) {
        let was_authenticated = {
            let mut state = self.state.write();
            let was = state.is_authenticated();
            *state = Session::default();
            was
        };
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear persisted tokens");
        }
        if was_authenticated {
            info!("Session cleared");
        }
    }

    pub fn snapshot(&self) -> Session {
        self.state.read().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.read().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.state.read().refresh_token.clone()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.state.read().current_user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::session::model::Role;
    use crate::session::store::MemoryTokenStore;

    fn holder_with(store: Arc<MemoryTokenStore>) -> SessionHolder {
        SessionHolder::new(store)
    }

    fn profile() -> UserProfile {
        serde_json::from_value(json!({
            "id": 1,
            "username": "admin",
            "email": "admin@uni.edu",
            "role": "ADMIN"
        }))
        .unwrap()
    }

    #[test]
    fn rehydrate_restores_tokens_without_user() {
        let store = Arc::new(MemoryTokenStore::with_tokens(TokenPair::new(
            "A1",
            Some("R1".into()),
        )));
        let holder = holder_with(store);

        assert!(holder.rehydrate().unwrap());
        assert_eq!(holder.access_token().as_deref(), Some("A1"));
        assert_eq!(holder.refresh_token().as_deref(), Some("R1"));
        assert!(holder.current_user().is_none());
        assert!(holder.is_authenticated());
    }

    #[test]
    fn rehydrate_with_empty_store_is_signed_out() {
        let holder = holder_with(Arc::new(MemoryTokenStore::new()));
        assert!(!holder.rehydrate().unwrap());
        assert!(!holder.is_authenticated());
    }

    #[test]
    fn login_persists_and_resets_user() {
        let store = Arc::new(MemoryTokenStore::new());
        let holder = holder_with(store.clone());
        holder.set_user(profile());

        holder
            .login(TokenPair::new("A1", Some("R1".into())))
            .unwrap();

        assert!(holder.current_user().is_none());
        assert_eq!(
            store.load().unwrap(),
            Some(TokenPair::new("A1", Some("R1".into())))
        );
    }

    #[test]
    fn update_access_token_keeps_refresh_token() {
        let store = Arc::new(MemoryTokenStore::new());
        let holder = holder_with(store.clone());
        holder
            .login(TokenPair::new("A1", Some("R1".into())))
            .unwrap();

        let tokens = holder.update_access_token("R1", "A2".into(), None).unwrap();

        assert_eq!(tokens, TokenPair::new("A2", Some("R1".into())));
        assert_eq!(holder.access_token().as_deref(), Some("A2"));
        assert_eq!(store.load().unwrap(), Some(tokens));
    }

    #[test]
    fn update_access_token_without_refresh_token_changes_nothing() {
        let store = Arc::new(MemoryTokenStore::new());
        let holder = holder_with(store.clone());
        holder.login(TokenPair::new("A1", None)).unwrap();

        let result = holder.update_access_token("R1", "A2".into(), None);

        assert!(matches!(result, Err(ClientError::SessionExpired)));
        assert_eq!(holder.access_token().as_deref(), Some("A1"));
        assert_eq!(store.load().unwrap(), Some(TokenPair::new("A1", None)));
    }

    #[test]
    fn update_access_token_accepts_rotated_refresh_token() {
        let store = Arc::new(MemoryTokenStore::new());
        let holder = holder_with(store.clone());
        holder
            .login(TokenPair::new("A1", Some("R1".into())))
            .unwrap();

        holder
            .update_access_token("R1", "A2".into(), Some("R2".into()))
            .unwrap();

        assert_eq!(holder.refresh_token().as_deref(), Some("R2"));
        assert_eq!(
            store.load().unwrap(),
            Some(TokenPair::new("A2", Some("R2".into())))
        );
    }

    #[test]
    fn update_access_token_for_replaced_session_changes_nothing() {
        let store = Arc::new(MemoryTokenStore::new());
        let holder = holder_with(store.clone());
        holder
            .login(TokenPair::new("B1", Some("RB".into())))
            .unwrap();

        let result = holder.update_access_token("R1", "OLD_A2".into(), None);

        assert!(matches!(result, Err(ClientError::SessionExpired)));
        assert_eq!(holder.access_token().as_deref(), Some("B1"));
        assert_eq!(holder.refresh_token().as_deref(), Some("RB"));
        assert_eq!(
            store.load().unwrap(),
            Some(TokenPair::new("B1", Some("RB".into())))
        );
    }

    #[test]
    fn clear_if_refresh_token_only_clears_matching_session() {
        let store = Arc::new(MemoryTokenStore::new());
        let holder = holder_with(store.clone());
        holder
            .login(TokenPair::new("B1", Some("RB".into())))
            .unwrap();

        assert!(!holder.clear_if_refresh_token("R1"));
        assert!(holder.is_authenticated());
        assert!(store.load().unwrap().is_some());

        assert!(holder.clear_if_refresh_token("RB"));
        assert!(!holder.is_authenticated());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn clear_wipes_memory_and_store() {
        let store = Arc::new(MemoryTokenStore::new());
        let holder = holder_with(store.clone());
        holder
            .login(TokenPair::new("A1", Some("R1".into())))
            .unwrap();
        holder.set_user(profile());

        holder.clear();
        holder.clear();

        let session = holder.snapshot();
        assert!(session.access_token.is_none());
        assert!(session.refresh_token.is_none());
        assert!(session.current_user.is_none());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn set_user_is_visible_in_snapshot() {
        let holder = holder_with(Arc::new(MemoryTokenStore::new()));
        holder.set_user(profile());
        assert_eq!(
            holder.snapshot().current_user.map(|u| u.role),
            Some(Role::Admin)
        );
    }
}
