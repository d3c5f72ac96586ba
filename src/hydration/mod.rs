//! Settings hydration for API clients.
//!
//! A client keeps its settings in a [`SettingsCache`] backed by a local JSON
//! file. On startup [`hydrate`] makes one best-effort fetch of the server's
//! settings, overlays them on the local copy, persists the result and tells
//! subscribers about it. If the server cannot be reached the local settings
//! stay in effect.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};

use crate::errors::AppError;
use crate::models::Settings;

/// Where remote settings come from.
#[async_trait]
pub trait SettingsSource: Send + Sync {
    /// `Ok(None)` when the remote has no settings resource at all.
    async fn fetch(&self) -> Result<Option<Settings>, AppError>;
}

/// Fetches `GET {base}/api/settings` from a running backend.
pub struct HttpSettingsSource {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HttpSettingsSource {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: format!("{}/api/settings", base_url.trim_end_matches('/')),
            token: None,
        })
    }

    /// Send a session token along with the request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

#[async_trait]
impl SettingsSource for HttpSettingsSource {
    async fn fetch(&self) -> Result<Option<Settings>, AppError> {
        let mut request = self.client.get(&self.url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("settings request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = response
            .error_for_status()
            .map_err(|e| AppError::Internal(format!("settings request failed: {}", e)))?;

        let settings = response
            .json::<Settings>()
            .await
            .map_err(|e| AppError::Internal(format!("settings response unreadable: {}", e)))?;

        Ok(Some(settings))
    }
}

/// Process-wide settings with local persistence and change notifications.
///
/// The current value lives in a watch channel. Every change is published
/// synchronously while the writer lock is held, so subscribers observe changes
/// in the order they were applied and the last value seen always equals
/// [`SettingsCache::get`].
pub struct SettingsCache {
    local_path: Option<PathBuf>,
    writer: Mutex<()>,
    updates: watch::Sender<Settings>,
    changed_once: AtomicBool,
}

impl SettingsCache {
    /// Start from `defaults`, overlaid with the local file if one exists.
    pub async fn load(local_path: Option<PathBuf>, defaults: Settings) -> Self {
        let mut settings = defaults;

        if let Some(path) = &local_path {
            match tokio::fs::read_to_string(path).await {
                Ok(raw) => match serde_json::from_str::<Settings>(&raw) {
                    Ok(stored) => settings.merge_from(stored),
                    Err(e) => tracing::warn!("Ignoring unreadable settings file {:?}: {}", path, e),
                },
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("Failed to read settings file {:?}: {}", path, e),
            }
        }

        let (updates, _) = watch::channel(settings);

        Self {
            local_path,
            writer: Mutex::new(()),
            updates,
            changed_once: AtomicBool::new(false),
        }
    }

    /// Snapshot of the current settings.
    pub async fn get(&self) -> Settings {
        self.updates.borrow().clone()
    }

    /// Watch for settings changes.
    ///
    /// Once any update has happened, a new receiver starts with the latest
    /// value marked unseen, so subscribing right after [`hydrate`] returns
    /// still observes the hydrated settings.
    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        let mut receiver = self.updates.subscribe();
        if self.changed_once.load(Ordering::Acquire) {
            receiver.mark_changed();
        }
        receiver
    }

    /// Replace the settings, persist them locally and notify subscribers.
    ///
    /// Subscribers are notified even if persisting fails; the error is returned.
    pub async fn update(&self, settings: Settings) -> Result<(), AppError> {
        self.apply(move |current| *current = settings).await
    }

    /// Overlay `other` on the current settings per key, persist and notify.
    pub async fn merge(&self, other: Settings) -> Result<(), AppError> {
        self.apply(move |current| current.merge_from(other)).await
    }

    async fn apply<F>(&self, change: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut Settings),
    {
        let _writer = self.writer.lock().await;

        self.changed_once.store(true, Ordering::Release);
        self.updates.send_modify(change);
        let snapshot = self.updates.borrow().clone();

        self.persist(&snapshot).await
    }

    async fn persist(&self, settings: &Settings) -> Result<(), AppError> {
        let Some(path) = &self.local_path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.ok();
        }
        let raw = serde_json::to_string_pretty(settings)
            .map_err(|e| AppError::Internal(format!("settings could not be encoded: {}", e)))?;
        tokio::fs::write(path, raw)
            .await
            .map_err(|e| AppError::Internal(format!("failed to write {:?}: {}", path, e)))
    }
}

/// What a hydration attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationOutcome {
    /// Remote settings were merged, persisted and announced
    Merged,
    /// The remote had nothing to contribute
    Empty,
    /// The remote could not be reached; local settings stay in effect
    Unavailable,
}

/// One best-effort pull of remote settings into `cache`.
pub async fn hydrate(cache: &SettingsCache, source: &dyn SettingsSource) -> HydrationOutcome {
    let remote = match source.fetch().await {
        Ok(Some(remote)) if !remote.is_empty() => remote,
        Ok(_) => return HydrationOutcome::Empty,
        Err(e) => {
            tracing::debug!("Settings hydration skipped: {}", e);
            return HydrationOutcome::Unavailable;
        }
    };

    if let Err(e) = cache.merge(remote).await {
        tracing::warn!("Hydrated settings could not be saved locally: {}", e);
    }
    HydrationOutcome::Merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct FixedSource(Result<Option<Settings>, ()>);

    #[async_trait]
    impl SettingsSource for FixedSource {
        async fn fetch(&self) -> Result<Option<Settings>, AppError> {
            self.0
                .clone()
                .map_err(|_| AppError::Internal("connection refused".to_string()))
        }
    }

    fn settings(value: serde_json::Value) -> Settings {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_load_overlays_local_file_on_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        tokio::fs::write(&path, r#"{"companyName":"Saved"}"#).await.unwrap();

        let cache = SettingsCache::load(
            Some(path),
            settings(json!({ "companyName": "Default", "currency": "USD" })),
        )
        .await;

        let current = cache.get().await;
        assert_eq!(current.get("companyName"), Some(&json!("Saved")));
        assert_eq!(current.get("currency"), Some(&json!("USD")));
    }

    #[tokio::test]
    async fn test_hydrate_merges_persists_and_notifies_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let cache = SettingsCache::load(
            Some(path.clone()),
            settings(json!({ "companyName": "Local", "currency": "USD" })),
        )
        .await;

        let source = FixedSource(Ok(Some(settings(json!({
            "companyName": "Remote",
            "logo": "data:image/png;base64,AAAA"
        })))));

        let outcome = hydrate(&cache, &source).await;
        // Subscribing after hydrate returns still sees the update
        let mut updates = cache.subscribe();
        assert_eq!(outcome, HydrationOutcome::Merged);

        tokio::time::timeout(Duration::from_secs(1), updates.changed())
            .await
            .unwrap()
            .unwrap();
        let event = updates.borrow_and_update().clone();
        assert_eq!(event.get("companyName"), Some(&json!("Remote")));
        assert_eq!(event.get("currency"), Some(&json!("USD")));

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let persisted: Settings = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted, cache.get().await);

        assert!(
            tokio::time::timeout(Duration::from_millis(100), updates.changed())
                .await
                .is_err(),
            "only one update expected"
        );
    }

    #[tokio::test]
    async fn test_hydrate_ignores_empty_remote() {
        let cache = SettingsCache::load(None, settings(json!({ "companyName": "Local" }))).await;

        let outcome = hydrate(&cache, &FixedSource(Ok(Some(Settings::default())))).await;
        assert_eq!(outcome, HydrationOutcome::Empty);

        let outcome = hydrate(&cache, &FixedSource(Ok(None))).await;
        assert_eq!(outcome, HydrationOutcome::Empty);

        assert_eq!(cache.get().await.get("companyName"), Some(&json!("Local")));
        assert!(!cache.subscribe().has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_hydrate_failure_keeps_local_settings() {
        let cache = SettingsCache::load(None, settings(json!({ "companyName": "Local" }))).await;
        let mut updates = cache.subscribe();

        let outcome = hydrate(&cache, &FixedSource(Err(()))).await;
        assert_eq!(outcome, HydrationOutcome::Unavailable);
        assert_eq!(cache.get().await.get("companyName"), Some(&json!("Local")));

        assert!(tokio::time::timeout(Duration::from_millis(100), updates.changed())
            .await
            .is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_subscriber_attached_after_update_sees_it() {
        let cache = SettingsCache::load(None, Settings::default()).await;

        for round in 0..300 {
            let expected = settings(json!({ "round": round }));
            cache.update(expected.clone()).await.unwrap();

            let mut updates = cache.subscribe();
            tokio::time::timeout(Duration::from_millis(50), updates.changed())
                .await
                .unwrap_or_else(|_| panic!("update {} was missed", round))
                .unwrap();
            assert_eq!(*updates.borrow_and_update(), expected);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_last_event_matches_state_after_back_to_back_updates() {
        let cache = SettingsCache::load(None, Settings::default()).await;
        let mut updates = cache.subscribe();

        for round in 0..300 {
            let first = settings(json!({ "step": "a", "round": round }));
            let second = settings(json!({ "step": "b", "round": round }));
            cache.update(first).await.unwrap();
            cache.update(second.clone()).await.unwrap();

            tokio::time::timeout(Duration::from_millis(50), updates.changed())
                .await
                .unwrap()
                .unwrap();
            let last = updates.borrow_and_update().clone();
            assert_eq!(last, second);
            assert_eq!(last, cache.get().await);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_leave_file_and_state_in_agreement() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let cache = Arc::new(SettingsCache::load(Some(path.clone()), Settings::default()).await);
        let updates = cache.subscribe();

        let writers: Vec<_> = (0..8)
            .map(|writer| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move {
                    for step in 0..25 {
                        let change = settings(json!({ "writer": writer, "step": step }));
                        if step % 2 == 0 {
                            cache.update(change).await.unwrap();
                        } else {
                            cache.merge(change).await.unwrap();
                        }
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap();
        }

        let current = cache.get().await;
        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let persisted: Settings = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted, current);
        assert_eq!(*updates.borrow(), current);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_update_racing_hydrate_is_never_lost() {
        let remote = settings(json!({ "logo": "remote-logo" }));
        let local = settings(json!({ "theme": "light" }));
        let mut hydrated_last = local.clone();
        hydrated_last.merge_from(remote.clone());

        for _ in 0..100 {
            let cache = Arc::new(
                SettingsCache::load(None, settings(json!({ "companyName": "Local" }))).await,
            );

            let hydrating = {
                let cache = Arc::clone(&cache);
                let source = FixedSource(Ok(Some(remote.clone())));
                tokio::spawn(async move { hydrate(&cache, &source).await })
            };
            let updating = {
                let cache = Arc::clone(&cache);
                let local = local.clone();
                tokio::spawn(async move { cache.update(local).await.unwrap() })
            };

            assert_eq!(hydrating.await.unwrap(), HydrationOutcome::Merged);
            updating.await.unwrap();

            let current = cache.get().await;
            assert!(
                current == local || current == hydrated_last,
                "unexpected final settings {:?}",
                current
            );
        }
    }
}
