//! CredentialManager - obtains a usable credential
//!
//! Load cached → validate or refresh → interactive consent → persist.

use std::sync::Arc;
use async_trait::async_trait;
use crate::Result;
use crate::error::Error;
use super::credentials::{Credential, CredentialStore, ValidCredential};

/// Token operations the manager delegates to
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Trade the credential's refresh token for a fresh credential
    async fn refresh(&self, credential: &Credential) -> Result<Credential>;

    /// Run the interactive consent flow; blocks until the user responds
    async fn consent(&self) -> Result<Credential>;
}

/// Where a credential stands in the acquisition state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    NoCredential,
    LoadedInvalid,
    Refreshable,
    NeedsConsent,
    Valid,
}

impl CredentialState {
    /// Classify the result of loading the store
    pub fn classify(credential: Option<&Credential>) -> Self {
        match credential {
            None => CredentialState::NoCredential,
            Some(c) if c.is_valid() => CredentialState::Valid,
            Some(c) if c.is_expired() && c.can_refresh() => CredentialState::Refreshable,
            Some(_) => CredentialState::LoadedInvalid,
        }
    }
}

/// Orchestrates store, refresh and consent into a valid credential
#[derive(Clone)]
pub struct CredentialManager {
    store: Arc<dyn CredentialStore>,
    authorizer: Arc<dyn Authorizer>,
}

impl CredentialManager {
    pub fn new(store: Arc<dyn CredentialStore>, authorizer: Arc<dyn Authorizer>) -> Self {
        Self { store, authorizer }
    }

    /// Return a valid credential, refreshing or re-consenting as needed
    ///
    /// Credentials obtained by refresh or consent are saved before returning.
    pub async fn ensure_valid_credential(&self) -> Result<ValidCredential> {
        let cached = self.store.load()?;
        let mut state = CredentialState::classify(cached.as_ref());

        loop {
            tracing::debug!("Credential state: {:?}", state);
            state = match state {
                CredentialState::Valid => {
                    // Only reachable for a directly loaded credential
                    let credential = cached.clone()
                        .ok_or_else(|| Error::Other("Valid state without a credential".to_string()))?;
                    return into_valid(credential);
                }
                CredentialState::NoCredential | CredentialState::LoadedInvalid => {
                    CredentialState::NeedsConsent
                }
                CredentialState::Refreshable => {
                    let Some(credential) = cached.as_ref() else {
                        return Err(Error::Other("Refreshable state without a credential".to_string()));
                    };
                    tracing::info!("Access token expired, refreshing");
                    let refreshed = self.authorizer.refresh(credential).await.and_then(into_valid);
                    match refreshed {
                        Ok(valid) => {
                            self.store.save(valid.credential())?;
                            return Ok(valid);
                        }
                        Err(e) => {
                            tracing::warn!("Token refresh failed: {}, falling back to consent", e);
                            CredentialState::NeedsConsent
                        }
                    }
                }
                CredentialState::NeedsConsent => {
                    tracing::info!("No usable credential, starting consent flow");
                    let fresh = self.authorizer.consent().await?;
                    return self.persist(fresh);
                }
            };
        }
    }

    fn persist(&self, credential: Credential) -> Result<ValidCredential> {
        let valid = into_valid(credential)?;
        self.store.save(valid.credential())?;
        Ok(valid)
    }
}

fn into_valid(credential: Credential) -> Result<ValidCredential> {
    ValidCredential::new(credential)
        .ok_or_else(|| Error::Auth("Authorization produced an expired or empty token".to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory store that counts saves
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        pub credential: Mutex<Option<Credential>>,
        pub saves: AtomicUsize,
    }

    impl MemoryStore {
        pub fn with(credential: Credential) -> Self {
            Self { credential: Mutex::new(Some(credential)), saves: AtomicUsize::new(0) }
        }

        pub fn stored(&self) -> Option<Credential> {
            self.credential.lock().unwrap().clone()
        }
    }

    impl CredentialStore for MemoryStore {
        fn load(&self) -> Result<Option<Credential>> {
            Ok(self.credential.lock().unwrap().clone())
        }

        fn save(&self, credential: &Credential) -> Result<()> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            *self.credential.lock().unwrap() = Some(credential.clone());
            Ok(())
        }

        fn delete(&self) -> Result<()> {
            *self.credential.lock().unwrap() = None;
            Ok(())
        }
    }

    /// Scripted authorizer
    pub(crate) struct FakeAuthorizer {
        pub refresh_result: Option<String>,
        pub consent_result: Option<String>,
        pub refreshes: AtomicUsize,
        pub consents: AtomicUsize,
    }

    impl FakeAuthorizer {
        pub fn new(refresh_result: Option<&str>, consent_result: Option<&str>) -> Self {
            Self {
                refresh_result: refresh_result.map(str::to_string),
                consent_result: consent_result.map(str::to_string),
                refreshes: AtomicUsize::new(0),
                consents: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Authorizer for FakeAuthorizer {
        async fn refresh(&self, credential: &Credential) -> Result<Credential> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            match &self.refresh_result {
                Some(token) => Ok(Credential::new(token.clone(), credential.refresh_token.clone(), Some(3600))),
                None => Err(Error::Auth("invalid_grant".to_string())),
            }
        }

        async fn consent(&self) -> Result<Credential> {
            self.consents.fetch_add(1, Ordering::SeqCst);
            match &self.consent_result {
                Some(token) => Ok(Credential::new(token.clone(), Some("r".to_string()), Some(3600))),
                None => Err(Error::Auth("access_denied".to_string())),
            }
        }
    }

    fn expired(refresh: Option<&str>) -> Credential {
        Credential::new("stale".to_string(), refresh.map(str::to_string), Some(-60))
    }

    fn manager(store: &Arc<MemoryStore>, auth: &Arc<FakeAuthorizer>) -> CredentialManager {
        CredentialManager::new(store.clone(), auth.clone())
    }

    #[test]
    fn test_classify() {
        assert_eq!(CredentialState::classify(None), CredentialState::NoCredential);
        let valid = Credential::new("a".to_string(), None, Some(3600));
        assert_eq!(CredentialState::classify(Some(&valid)), CredentialState::Valid);
        assert_eq!(CredentialState::classify(Some(&expired(Some("r")))), CredentialState::Refreshable);
        assert_eq!(CredentialState::classify(Some(&expired(None))), CredentialState::LoadedInvalid);
    }

    #[tokio::test]
    async fn test_valid_cached_credential_skips_everything() {
        let store = Arc::new(MemoryStore::with(Credential::new("cached".to_string(), None, Some(3600))));
        let auth = Arc::new(FakeAuthorizer::new(None, None));

        let creds = manager(&store, &auth).ensure_valid_credential().await.unwrap();
        assert_eq!(creds.access_token(), "cached");
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);
        assert_eq!(auth.refreshes.load(Ordering::SeqCst), 0);
        assert_eq!(auth.consents.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_expired_with_refresh_token_is_refreshed_and_persisted() {
        let store = Arc::new(MemoryStore::with(expired(Some("refresh-1"))));
        let auth = Arc::new(FakeAuthorizer::new(Some("refreshed"), None));

        let creds = manager(&store, &auth).ensure_valid_credential().await.unwrap();
        assert_eq!(creds.access_token(), "refreshed");

        let stored = store.stored().unwrap();
        assert_eq!(stored.access_token, "refreshed");
        assert_eq!(stored.refresh_token.as_deref(), Some("refresh-1"));
        assert!(stored.is_valid());
        assert_eq!(auth.consents.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_absent_store_runs_consent_and_saves_once() {
        let store = Arc::new(MemoryStore::default());
        let auth = Arc::new(FakeAuthorizer::new(None, Some("consented")));

        let creds = manager(&store, &auth).ensure_valid_credential().await.unwrap();
        assert_eq!(creds.access_token(), "consented");
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
        assert_eq!(store.stored().unwrap().access_token, "consented");
        assert_eq!(auth.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_expired_without_refresh_token_needs_consent() {
        let store = Arc::new(MemoryStore::with(expired(None)));
        let auth = Arc::new(FakeAuthorizer::new(Some("unused"), Some("consented")));

        let creds = manager(&store, &auth).ensure_valid_credential().await.unwrap();
        assert_eq!(creds.access_token(), "consented");
        assert_eq!(auth.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_refresh_failure_falls_back_to_consent() {
        let store = Arc::new(MemoryStore::with(expired(Some("revoked"))));
        let auth = Arc::new(FakeAuthorizer::new(None, Some("consented")));

        let creds = manager(&store, &auth).ensure_valid_credential().await.unwrap();
        assert_eq!(creds.access_token(), "consented");
        assert_eq!(auth.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(auth.consents.load(Ordering::SeqCst), 1);
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
    }

    /// Authorizer whose refresh hands back a token that is already expiring
    struct ShortLivedRefresh(FakeAuthorizer);

    #[async_trait]
    impl Authorizer for ShortLivedRefresh {
        async fn refresh(&self, credential: &Credential) -> Result<Credential> {
            self.0.refreshes.fetch_add(1, Ordering::SeqCst);
            Ok(Credential::new("short".to_string(), credential.refresh_token.clone(), Some(120)))
        }

        async fn consent(&self) -> Result<Credential> {
            self.0.consent().await
        }
    }

    #[tokio::test]
    async fn test_unusable_refreshed_token_falls_back_to_consent() {
        let store = Arc::new(MemoryStore::with(expired(Some("refresh-1"))));
        let auth = Arc::new(ShortLivedRefresh(FakeAuthorizer::new(None, Some("consented"))));

        let creds = CredentialManager::new(store.clone(), auth.clone())
            .ensure_valid_credential()
            .await
            .unwrap();
        assert_eq!(creds.access_token(), "consented");
        assert_eq!(auth.0.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(auth.0.consents.load(Ordering::SeqCst), 1);
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
        assert_eq!(store.stored().unwrap().access_token, "consented");
    }

    #[tokio::test]
    async fn test_denied_consent_is_fatal_and_saves_nothing() {
        let store = Arc::new(MemoryStore::default());
        let auth = Arc::new(FakeAuthorizer::new(None, None));

        let err = manager(&store, &auth).ensure_valid_credential().await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);
        assert!(store.stored().is_none());
    }
}
