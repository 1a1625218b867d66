//! Persistence for per-agent MCP configuration lists.
//!
//! A list is always written back whole; there is no per-entry update.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use super::model::McpConfiguration;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored configuration list is not valid: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[async_trait]
pub trait ConfigurationStore: Send + Sync {
    /// Unknown agents have an empty list.
    async fn load(&self, agent_id: &str) -> Result<Vec<McpConfiguration>, StoreError>;

    async fn replace(&self, agent_id: &str, configurations: &[McpConfiguration]) -> Result<(), StoreError>;
}

// ── Postgres ────────────────────────────────────────────────────────────────

pub struct PgConfigurationStore {
    db: PgPool,
}

impl PgConfigurationStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ConfigurationStore for PgConfigurationStore {
    async fn load(&self, agent_id: &str) -> Result<Vec<McpConfiguration>, StoreError> {
        let row = sqlx::query_as::<_, (String,)>(
            "SELECT configurations FROM ai_agent_mcp_configs WHERE agent_id = $1",
        )
        .bind(agent_id)
        .fetch_optional(&self.db)
        .await?;

        match row {
            Some((text,)) => Ok(serde_json::from_str(&text)?),
            None => Ok(Vec::new()),
        }
    }

    async fn replace(&self, agent_id: &str, configurations: &[McpConfiguration]) -> Result<(), StoreError> {
        let text = serde_json::to_string(configurations)?;
        sqlx::query(
            "INSERT INTO ai_agent_mcp_configs (agent_id, configurations) VALUES ($1, $2) \
             ON CONFLICT (agent_id) DO UPDATE SET configurations = EXCLUDED.configurations, updated_at = NOW()",
        )
        .bind(agent_id)
        .bind(&text)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}

// ── In-memory ───────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryConfigurationStore {
    lists: RwLock<HashMap<String, Vec<McpConfiguration>>>,
}

impl MemoryConfigurationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigurationStore for MemoryConfigurationStore {
    async fn load(&self, agent_id: &str) -> Result<Vec<McpConfiguration>, StoreError> {
        Ok(self.lists.read().await.get(agent_id).cloned().unwrap_or_default())
    }

    async fn replace(&self, agent_id: &str, configurations: &[McpConfiguration]) -> Result<(), StoreError> {
        self.lists
            .write()
            .await
            .insert(agent_id.to_string(), configurations.to_vec());
        Ok(())
    }
}
