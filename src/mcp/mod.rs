//! Per-agent MCP (Model Context Protocol) integration lists.
//!
//! - `model`: typed configuration entries and their JSON wire form.
//! - `editor`: pure add/edit/remove/tool/credential operations over a list.
//! - `credentials`: credential form for a single entry.
//! - `store` / `service`: persistence and the load-apply-save cycle.
//! - `registry` / `profiles`: read-only data behind the pickers.

pub mod credentials;
pub mod editor;
pub mod model;
pub mod profiles;
pub mod registry;
pub mod service;
pub mod store;

pub use model::{CustomType, EntryKey, McpConfig, McpConfiguration};
pub use service::{McpError, McpService};
