//! Owner of the per-agent configuration lists.
//!
//! Each mutation loads the current list, applies one editor operation and
//! writes the resulting list back through the [`ConfigurationStore`].

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::credentials::{CredentialForm, CredentialUpdate};
use super::editor::{self, CustomDraft, RegistrySelection, ToolsTarget};
use super::model::{ConfigError, EntryKey, McpConfiguration};
use super::registry::RegistryServer;
use super::store::{ConfigurationStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no MCP configuration at index {index} (list has {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("no MCP configuration named {0}")]
    UnknownEntry(String),
    #[error("MCP configuration at index {0} is not a custom server")]
    NotEditable(usize),
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Clone)]
pub struct McpService {
    store: Arc<dyn ConfigurationStore>,
    /// One writer per agent at a time.
    write_locks: Arc<std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl McpService {
    pub fn new(store: Arc<dyn ConfigurationStore>) -> Self {
        Self {
            store,
            write_locks: Arc::new(std::sync::Mutex::new(HashMap::new())),
        }
    }

    fn lock_for(&self, agent_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.write_locks.lock().unwrap_or_else(|p| p.into_inner());
        // locks nobody is holding or waiting on
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.entry(agent_id.to_string()).or_default().clone()
    }

    pub async fn list(&self, agent_id: &str) -> Result<Vec<McpConfiguration>, McpError> {
        Ok(self.store.load(agent_id).await?)
    }

    pub async fn get(&self, agent_id: &str, index: usize) -> Result<McpConfiguration, McpError> {
        let list = self.list(agent_id).await?;
        let len = list.len();
        list.into_iter()
            .nth(index)
            .ok_or(McpError::IndexOutOfRange { index, len })
    }

    pub async fn find(&self, agent_id: &str, qualified_name: &str) -> Result<McpConfiguration, McpError> {
        self.list(agent_id)
            .await?
            .into_iter()
            .find(|c| c.qualified_name == qualified_name)
            .ok_or_else(|| McpError::UnknownEntry(qualified_name.to_string()))
    }

    async fn mutate<F>(&self, agent_id: &str, op: F) -> Result<Vec<McpConfiguration>, McpError>
    where
        F: FnOnce(&[McpConfiguration]) -> Result<Vec<McpConfiguration>, McpError> + Send,
    {
        let lock = self.lock_for(agent_id);
        let _guard = lock.lock().await;
        let current = self.store.load(agent_id).await?;
        let next = op(&current)?;
        self.store.replace(agent_id, &next).await?;
        tracing::info!(agent_id, before = current.len(), after = next.len(), "MCP configuration list saved");
        Ok(next)
    }

    pub async fn replace_all(
        &self,
        agent_id: &str,
        configurations: Vec<McpConfiguration>,
    ) -> Result<Vec<McpConfiguration>, McpError> {
        self.mutate(agent_id, move |_| Ok(configurations)).await
    }

    pub async fn add_custom(&self, agent_id: &str, draft: CustomDraft) -> Result<Vec<McpConfiguration>, McpError> {
        self.mutate(agent_id, move |list| Ok(editor::add_custom(list, draft, now_ms())?))
            .await
    }

    pub async fn add_from_registry(
        &self,
        agent_id: &str,
        selection: RegistrySelection,
    ) -> Result<Vec<McpConfiguration>, McpError> {
        self.mutate(agent_id, move |list| Ok(editor::add_from_registry(list, selection)))
            .await
    }

    /// Returns the saved list and the new entry awaiting credentials.
    pub async fn add_from_browser(
        &self,
        agent_id: &str,
        server: &RegistryServer,
    ) -> Result<(Vec<McpConfiguration>, McpConfiguration), McpError> {
        let mut opened = None;
        let list = self
            .mutate(agent_id, |list| {
                let (next, entry) = editor::add_from_browser(list, server);
                opened = Some(entry);
                Ok(next)
            })
            .await?;
        let entry = opened.unwrap_or_else(|| editor::browser_entry(server));
        Ok((list, entry))
    }

    pub async fn update_tools(
        &self,
        agent_id: &str,
        key: &EntryKey,
        tools: Vec<String>,
    ) -> Result<Vec<McpConfiguration>, McpError> {
        self.mutate(agent_id, move |list| Ok(editor::update_tools(list, key, tools)))
            .await
    }

    pub async fn remove(&self, agent_id: &str, index: usize) -> Result<Vec<McpConfiguration>, McpError> {
        self.mutate(agent_id, move |list| Ok(editor::remove(list, index))).await
    }

    pub async fn begin_edit(&self, agent_id: &str, index: usize) -> Result<CustomDraft, McpError> {
        let list = self.list(agent_id).await?;
        if index >= list.len() {
            return Err(McpError::IndexOutOfRange { index, len: list.len() });
        }
        editor::begin_edit(&list, index).ok_or(McpError::NotEditable(index))
    }

    pub async fn save_edit(
        &self,
        agent_id: &str,
        index: usize,
        draft: CustomDraft,
    ) -> Result<Vec<McpConfiguration>, McpError> {
        self.mutate(agent_id, move |list| {
            if index >= list.len() {
                return Err(McpError::IndexOutOfRange { index, len: list.len() });
            }
            Ok(editor::save_edit(list, index, draft, now_ms())?)
        })
        .await
    }

    pub async fn tools_target(&self, agent_id: &str, index: usize) -> Result<Option<ToolsTarget>, McpError> {
        let entry = self.get(agent_id, index).await?;
        Ok(editor::tools_target(&entry))
    }

    /// Apply a credential form submission to the named entry.
    pub async fn save_credentials(
        &self,
        agent_id: &str,
        update: CredentialUpdate,
    ) -> Result<Vec<McpConfiguration>, McpError> {
        self.mutate(agent_id, move |list| {
            let entry = list
                .iter()
                .find(|c| c.qualified_name == update.qualified_name)
                .cloned()
                .ok_or_else(|| McpError::UnknownEntry(update.qualified_name.clone()))?;

            let mut form = CredentialForm::open(entry, Vec::new());
            if let Some(config) = update.config {
                form.replace_config(config);
            }
            for (key, value) in update.fields {
                form.set_field(&key, value);
            }
            if let Some(selection) = &update.selected_profile_id {
                form.select_profile(selection.as_deref());
            }
            let updated = form.try_finish()?;
            Ok(editor::save_credentials(list, updated))
        })
        .await
    }
}
