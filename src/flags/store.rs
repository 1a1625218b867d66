//! File-backed feature flag records.
//!
//! The file is a pretty-printed JSON object keyed by flag name:
//! `{"custom_agents": {"enabled": true, "description": "...", "updated_at": "..."}}`.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagRecord {
    pub enabled: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum FlagStoreError {
    #[error("flag file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("flag file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Flags seeded on first start.
pub const DEFAULT_FLAGS: &[(&str, &str)] = &[
    ("custom_agents", "Custom agent creation and management"),
    ("agentPlaygroundFlagFrontend", "Agent playground in the frontend"),
    ("marketplaceFlagFrontend", "Agent marketplace in the frontend"),
    ("agentPlaygroundEnabled", "Agent playground"),
    ("marketplaceEnabled", "Agent marketplace"),
];

pub struct FlagStore {
    path: Option<PathBuf>,
    flags: RwLock<BTreeMap<String, FlagRecord>>,
}

impl FlagStore {
    /// Store persisted at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            flags: RwLock::new(BTreeMap::new()),
        }
    }

    /// Store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            flags: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read the file into memory. `Ok(false)` when there is nothing on disk.
    pub async fn load(&self) -> Result<bool, FlagStoreError> {
        let Some(path) = &self.path else {
            return Ok(false);
        };
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        let parsed: BTreeMap<String, FlagRecord> = serde_json::from_slice(&bytes)?;
        *self.flags.write().await = parsed;
        Ok(true)
    }

    async fn persist(&self, flags: &BTreeMap<String, FlagRecord>) -> Result<(), FlagStoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, serde_json::to_vec_pretty(flags)?).await?;
        Ok(())
    }

    /// Write the current flags to disk.
    pub async fn save(&self) -> Result<(), FlagStoreError> {
        let flags = self.flags.read().await;
        self.persist(&flags).await
    }

    /// Create or update a flag. `None` keeps the existing description.
    pub async fn set_flag(
        &self,
        name: &str,
        enabled: bool,
        description: Option<&str>,
    ) -> Result<FlagRecord, FlagStoreError> {
        let mut flags = self.flags.write().await;
        let description = match description {
            Some(d) => d.to_string(),
            None => flags.get(name).map(|r| r.description.clone()).unwrap_or_default(),
        };
        let record = FlagRecord {
            enabled,
            description,
            updated_at: Utc::now(),
        };
        let mut staged = flags.clone();
        staged.insert(name.to_string(), record.clone());
        self.persist(&staged).await?;
        *flags = staged;
        tracing::info!(flag = name, enabled, "feature flag updated");
        Ok(record)
    }

    pub async fn enable(&self, name: &str) -> Result<FlagRecord, FlagStoreError> {
        self.set_flag(name, true, None).await
    }

    pub async fn disable(&self, name: &str) -> Result<FlagRecord, FlagStoreError> {
        self.set_flag(name, false, None).await
    }

    /// `Ok(false)` when the flag did not exist.
    pub async fn delete(&self, name: &str) -> Result<bool, FlagStoreError> {
        let mut flags = self.flags.write().await;
        let mut staged = flags.clone();
        if staged.remove(name).is_none() {
            return Ok(false);
        }
        self.persist(&staged).await?;
        *flags = staged;
        tracing::info!(flag = name, "feature flag deleted");
        Ok(true)
    }

    pub async fn list(&self) -> BTreeMap<String, bool> {
        self.flags
            .read()
            .await
            .iter()
            .map(|(name, r)| (name.clone(), r.enabled))
            .collect()
    }

    pub async fn details(&self, name: &str) -> Option<FlagRecord> {
        self.flags.read().await.get(name).cloned()
    }

    pub async fn is_enabled(&self, name: &str) -> Option<bool> {
        self.flags.read().await.get(name).map(|r| r.enabled)
    }
}

/// Load persisted flags, seeding [`DEFAULT_FLAGS`] when there are none, then
/// write the result back. Returns the number of flags known afterwards.
pub async fn initialize(store: &FlagStore) -> Result<usize, FlagStoreError> {
    let loaded = match store.load().await {
        Ok(loaded) => loaded,
        Err(FlagStoreError::Parse(e)) => {
            tracing::warn!(error = %e, path = ?store.path(), "flag file unreadable, reseeding defaults");
            false
        }
        Err(e) => return Err(e),
    };

    if !loaded {
        let now = Utc::now();
        let mut flags = store.flags.write().await;
        for (name, description) in DEFAULT_FLAGS {
            flags.insert(
                name.to_string(),
                FlagRecord {
                    enabled: true,
                    description: description.to_string(),
                    updated_at: now,
                },
            );
        }
    }

    store.save().await?;
    let count = store.flags.read().await.len();
    tracing::info!(count, seeded = !loaded, "feature flags initialized");
    Ok(count)
}
