// Agent Integrations - application state

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::flags::intercept::FeatureFlagInterceptor;
use crate::flags::{FlagOverrides, FlagService, FlagStore};
use crate::http_client::InterceptingClient;
use crate::i18n::preferences::{MemoryPreferenceStore, PgPreferenceStore, PreferenceStore};
use crate::i18n::Translator;
use crate::mcp::profiles::{CredentialProfileSource, HttpProfileSource, StaticProfileSource};
use crate::mcp::registry::{HttpRegistry, RegistrySource, StaticRegistry};
use crate::mcp::store::{ConfigurationStore, MemoryConfigurationStore, PgConfigurationStore};
use crate::mcp::McpService;

/// Central application state. Clone-friendly, every field is shared.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub mcp: McpService,
    pub registry: Arc<dyn RegistrySource>,
    pub profiles: Arc<dyn CredentialProfileSource>,
    pub translator: Translator,
    pub flags: FlagService,
    /// Outbound client shared by the remote sources; carries the flag interceptor.
    pub client: InterceptingClient,
    pub start_time: Instant,
    /// `true` once startup work (flag file load) has finished.
    pub ready: Arc<AtomicBool>,
    /// From AUTH_SECRET. None = dev mode (no auth).
    pub auth_secret: Option<String>,
}

// ── Readiness ───────────────────────────────────────────────────────────────
impl AppState {
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Relaxed);
        tracing::info!("Backend marked as READY");
    }
}

impl AppState {
    /// Postgres-backed state.
    pub fn new(db: PgPool, config: AppConfig) -> Result<Self, reqwest::Error> {
        Self::with_stores(
            config,
            Arc::new(PgConfigurationStore::new(db.clone())),
            Arc::new(PgPreferenceStore::new(db)),
        )
    }

    /// State with every store in memory. Nothing survives a restart.
    pub fn in_memory(config: AppConfig) -> Result<Self, reqwest::Error> {
        Self::with_stores(
            config,
            Arc::new(MemoryConfigurationStore::new()),
            Arc::new(MemoryPreferenceStore::default()),
        )
    }

    pub fn with_stores(
        config: AppConfig,
        configurations: Arc<dyn ConfigurationStore>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Result<Self, reqwest::Error> {
        let client = InterceptingClient::with_defaults()?;
        let overrides = FlagOverrides::builtin().with_forced(config.forced_flags.iter().cloned());

        if let Some(mode) = config.intercept_mode {
            client.install(Arc::new(FeatureFlagInterceptor::new(mode, overrides.clone())));
        }

        let registry: Arc<dyn RegistrySource> = match &config.registry_url {
            Some(url) => Arc::new(HttpRegistry::new(client.clone(), url.clone())),
            None => {
                tracing::info!("REGISTRY_URL not set, server browser will be empty");
                Arc::new(StaticRegistry::default())
            }
        };
        let profiles: Arc<dyn CredentialProfileSource> = match &config.profiles_url {
            Some(url) => Arc::new(HttpProfileSource::new(client.clone(), url.clone())),
            None => Arc::new(StaticProfileSource::default()),
        };

        let flag_store = Arc::new(match &config.flags_file {
            Some(path) => FlagStore::new(path),
            None => FlagStore::in_memory(),
        });

        let auth_secret = config.auth_secret.clone();
        if auth_secret.is_some() {
            tracing::info!("AUTH_SECRET configured, authentication enabled");
        } else {
            tracing::info!("AUTH_SECRET not set, authentication disabled (dev mode)");
        }

        Ok(Self {
            mcp: McpService::new(configurations),
            registry,
            profiles,
            translator: Translator::new(preferences, config.default_language),
            flags: FlagService::new(overrides, flag_store),
            client,
            start_time: Instant::now(),
            ready: Arc::new(AtomicBool::new(false)),
            auth_secret,
            config: Arc::new(config),
        })
    }

    pub fn with_registry(mut self, registry: Arc<dyn RegistrySource>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_profiles(mut self, profiles: Arc<dyn CredentialProfileSource>) -> Self {
        self.profiles = profiles;
        self
    }
}
