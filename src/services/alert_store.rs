//! JSON-file backed alert collection.
//!
//! The whole collection is the unit of persistence: every mutation reads the
//! file, applies the change and rewrites it. All read-modify-write sequences
//! run under one lock so overlapping requests and evaluation passes cannot
//! lose each other's updates.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::Utc;
use tokio::{fs, sync::Mutex};

use crate::{
    error::AppError,
    models::{Alert, NewAlert},
};

#[derive(Clone)]
pub struct AlertStore {
    path: Arc<PathBuf>,
    lock: Arc<Mutex<()>>,
}

impl AlertStore {
    /// Opens the store, creating the data directory and an empty collection
    /// on first run.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| AppError::Persistence(format!("{}: {e}", dir.display())))?;
        }

        let store = Self {
            path: Arc::new(path),
            lock: Arc::new(Mutex::new(())),
        };

        match fs::try_exists(store.path()).await {
            Ok(true) => {
                // surface a corrupt file at startup rather than on first request
                store.read_all().await?;
            }
            Ok(false) => {
                tracing::info!(path = %store.path().display(), "creating empty alerts file");
                store.write_all(&[]).await?;
            }
            Err(e) => return Err(AppError::StoreUnavailable(e.to_string())),
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All alerts in insertion order.
    pub async fn list(&self) -> Result<Vec<Alert>, AppError> {
        let _guard = self.lock.lock().await;
        self.read_all().await
    }

    pub async fn count_active(&self) -> Result<usize, AppError> {
        Ok(self.list().await?.iter().filter(|a| a.active).count())
    }

    pub async fn create(&self, new: NewAlert) -> Result<Alert, AppError> {
        let _guard = self.lock.lock().await;
        let mut alerts = self.read_all().await?;

        let id = match alerts.iter().map(|a| a.id).max() {
            None => 1,
            Some(max) => max
                .checked_add(1)
                .ok_or_else(|| AppError::Persistence("alert id space exhausted".to_string()))?,
        };

        let alert = Alert {
            id,
            coin: new.coin,
            condition: new.condition,
            threshold: new.threshold,
            active: true,
            created_at: Utc::now(),
        };

        alerts.push(alert.clone());
        self.write_all(&alerts).await?;

        tracing::info!(alert_id = id, coin = %alert.coin, total = alerts.len(), "alert created");

        Ok(alert)
    }

    pub async fn delete(&self, id: u64) -> Result<(), AppError> {
        let _guard = self.lock.lock().await;
        let mut alerts = self.read_all().await?;

        let Some(idx) = alerts.iter().position(|a| a.id == id) else {
            return Err(AppError::NotFound(id));
        };

        alerts.remove(idx);
        self.write_all(&alerts).await?;

        tracing::info!(alert_id = id, "alert deleted");

        Ok(())
    }

    /// Marks an alert as fired. Returns false if it was already inactive.
    pub async fn deactivate(&self, id: u64) -> Result<bool, AppError> {
        let _guard = self.lock.lock().await;
        let mut alerts = self.read_all().await?;

        let Some(alert) = alerts.iter_mut().find(|a| a.id == id) else {
            return Err(AppError::NotFound(id));
        };

        if !alert.active {
            return Ok(false);
        }

        alert.active = false;
        self.write_all(&alerts).await?;

        Ok(true)
    }

    async fn read_all(&self) -> Result<Vec<Alert>, AppError> {
        let raw = match fs::read_to_string(self.path()).await {
            Ok(s) => s,
            // removed underneath us: treat as empty, the next write recreates it
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::StoreUnavailable(e.to_string())),
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&raw).map_err(|e| {
            AppError::StoreUnavailable(format!("{}: {e}", self.path().display()))
        })
    }

    async fn write_all(&self, alerts: &[Alert]) -> Result<(), AppError> {
        let body = serde_json::to_string_pretty(alerts)
            .map_err(|e| AppError::Persistence(e.to_string()))?;

        let tmp = self.path().with_extension("json.tmp");

        fs::write(&tmp, body)
            .await
            .map_err(|e| AppError::Persistence(format!("{}: {e}", tmp.display())))?;

        fs::rename(&tmp, self.path())
            .await
            .map_err(|e| AppError::Persistence(format!("{}: {e}", self.path().display())))?;

        Ok(())
    }
}
