//! Feature flags: forced overrides, the persisted flag file, and the
//! interceptor that answers flag lookups on the shared HTTP client.

pub mod forced;
pub mod intercept;
pub mod store;

use std::sync::Arc;

use serde::Serialize;

pub use forced::FlagOverrides;
pub use store::{FlagRecord, FlagStore, FlagStoreError};

#[derive(Debug, Clone, Serialize)]
pub struct FlagStatus {
    pub flag_name: String,
    pub enabled: bool,
    pub overridden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FlagRecord>,
}

/// Flag lookups with the override table consulted first.
#[derive(Clone)]
pub struct FlagService {
    overrides: Arc<FlagOverrides>,
    store: Arc<FlagStore>,
}

impl FlagService {
    pub fn new(overrides: FlagOverrides, store: Arc<FlagStore>) -> Self {
        Self {
            overrides: Arc::new(overrides),
            store,
        }
    }

    pub fn overrides(&self) -> &FlagOverrides {
        &self.overrides
    }

    pub fn store(&self) -> &FlagStore {
        &self.store
    }

    pub async fn is_enabled(&self, name: &str) -> bool {
        if self.overrides.is_overridden(name) {
            return self.overrides.value_of(name);
        }
        self.store.is_enabled(name).await.unwrap_or(false)
    }

    pub async fn status(&self, name: &str) -> FlagStatus {
        FlagStatus {
            flag_name: name.to_string(),
            enabled: self.is_enabled(name).await,
            overridden: self.overrides.is_overridden(name),
            details: self.store.details(name).await,
        }
    }
}
