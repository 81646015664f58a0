// Event Planner - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod audit;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod menu;
pub mod reference;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use audit::{suspicious_alerts, AlertSeverity, AuditAlert, AuditLogEntry};
pub use config::PlannerConfig;
pub use error::MenuError;
pub use menu::{
    default_catalog, MalformedDataPolicy, MenuCategory, MenuItem, MenuRecordStore,
    PriceHistoryEntry, PricePolicy, MENU_ITEMS_KEY, PRICE_HISTORY_KEY,
};
pub use session::{Actor, Session, SessionContext};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};

/// Open the SQLite-backed store described by `config`
pub fn open_store(config: &PlannerConfig) -> anyhow::Result<MenuRecordStore<SqliteStore>> {
    let storage = SqliteStore::open(&config.db_path)?;
    Ok(MenuRecordStore::new(storage)
        .with_price_policy(config.price_policy)
        .with_malformed_policy(config.malformed_policy))
}
