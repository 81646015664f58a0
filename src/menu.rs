// 🍽️ Menu Record Store - catalog + price history over a key-value port
//
// Two persisted collections:
// - "menu_items"          → current catalog (ordered)
// - "menu_price_history"  → append-only log of price changes (oldest first)
//
// The store is a stateless façade: every call re-reads storage, there is no
// cache to invalidate. Callers always get owned copies.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::MenuError;
use crate::storage::KeyValueStore;

pub const MENU_ITEMS_KEY: &str = "menu_items";
pub const PRICE_HISTORY_KEY: &str = "menu_price_history";

// ============================================================================
// CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuCategory {
    MainCourse,
    Starter,
    Dessert,
    Beverage,
}

impl MenuCategory {
    pub const ALL: [MenuCategory; 4] = [
        MenuCategory::MainCourse,
        MenuCategory::Starter,
        MenuCategory::Dessert,
        MenuCategory::Beverage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MenuCategory::MainCourse => "main_course",
            MenuCategory::Starter => "starter",
            MenuCategory::Dessert => "dessert",
            MenuCategory::Beverage => "beverage",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuCategory::MainCourse => "Main Course",
            MenuCategory::Starter => "Starter",
            MenuCategory::Dessert => "Dessert",
            MenuCategory::Beverage => "Beverage",
        }
    }

    pub fn parse(value: &str) -> Option<MenuCategory> {
        let normalized = value.trim().to_lowercase().replace([' ', '-'], "_");
        MenuCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
    }
}

// ============================================================================
// RECORDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub category: MenuCategory,
}

impl MenuItem {
    pub fn new(id: &str, name: &str, price: f64, category: MenuCategory) -> Self {
        MenuItem {
            id: id.to_string(),
            name: name.to_string(),
            price,
            category,
        }
    }
}

/// One price change. Never mutated once written.
///
/// `item_id` is a reference, not ownership: the entry stays valid even if the
/// item later leaves the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistoryEntry {
    pub item_id: String,
    pub old_price: f64,
    pub new_price: f64,
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
}

impl PriceHistoryEntry {
    /// Signed change (new - old)
    pub fn delta(&self) -> f64 {
        self.new_price - self.old_price
    }

    /// Relative change against the old price, None when the old price was 0
    pub fn relative_change(&self) -> Option<f64> {
        if self.old_price == 0.0 {
            None
        } else {
            Some(self.delta() / self.old_price)
        }
    }
}

/// Catalog written on first access
pub fn default_catalog() -> Vec<MenuItem> {
    vec![
        MenuItem::new("pollo-parrilla", "Pollo a la Parrilla", 50.0, MenuCategory::MainCourse),
        MenuItem::new("lomo-saltado", "Lomo Saltado", 65.0, MenuCategory::MainCourse),
        MenuItem::new("salmon-miel", "Salmón en Salsa de Miel", 72.0, MenuCategory::MainCourse),
        MenuItem::new("ceviche-clasico", "Ceviche Clásico", 38.0, MenuCategory::Starter),
        MenuItem::new("tequenos", "Tequeños con Guacamole", 22.0, MenuCategory::Starter),
        MenuItem::new("crema-volteada", "Crema Volteada", 18.0, MenuCategory::Dessert),
        MenuItem::new("torta-chocolate", "Torta de Chocolate", 20.0, MenuCategory::Dessert),
        MenuItem::new("chicha-morada", "Chicha Morada", 8.0, MenuCategory::Beverage),
        MenuItem::new("limonada-frozen", "Limonada Frozen", 10.0, MenuCategory::Beverage),
    ]
}

// ============================================================================
// POLICIES
// ============================================================================

/// Which prices `update_price` accepts. Non-finite values are always rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PricePolicy {
    Unrestricted,
    NonNegative,
    Range { min: f64, max: f64 },
}

impl Default for PricePolicy {
    fn default() -> Self {
        PricePolicy::NonNegative
    }
}

impl PricePolicy {
    /// Ok(()) if accepted, otherwise the reason
    pub fn check(&self, price: f64) -> std::result::Result<(), String> {
        if !price.is_finite() {
            return Err("price must be a finite number".to_string());
        }

        match *self {
            PricePolicy::Unrestricted => Ok(()),
            PricePolicy::NonNegative if price < 0.0 => {
                Err("price must not be negative".to_string())
            }
            PricePolicy::NonNegative => Ok(()),
            PricePolicy::Range { min, max } if price < min || price > max => {
                Err(format!("price must be between {} and {}", min, max))
            }
            PricePolicy::Range { .. } => Ok(()),
        }
    }

    /// Parse "unrestricted", "non_negative" or "range:MIN:MAX"
    pub fn parse(value: &str) -> Option<PricePolicy> {
        let value = value.trim().to_lowercase();
        match value.as_str() {
            "unrestricted" | "none" => Some(PricePolicy::Unrestricted),
            "non_negative" | "non-negative" => Some(PricePolicy::NonNegative),
            other => {
                let rest = other.strip_prefix("range:")?;
                let (min, max) = rest.split_once(':')?;
                let min: f64 = min.trim().parse().ok()?;
                let max: f64 = max.trim().parse().ok()?;
                if min.is_finite() && max.is_finite() && min <= max {
                    Some(PricePolicy::Range { min, max })
                } else {
                    None
                }
            }
        }
    }
}

/// What to do when a stored collection fails to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedDataPolicy {
    /// Surface MenuError::CorruptRecord to the caller
    #[default]
    FailFast,
    /// Catalog: reseed the default. History: treat as empty.
    ResetToDefault,
}

impl MalformedDataPolicy {
    pub fn parse(value: &str) -> Option<MalformedDataPolicy> {
        match value.trim().to_lowercase().as_str() {
            "fail_fast" | "fail-fast" | "fail" => Some(MalformedDataPolicy::FailFast),
            "reset" | "reset_to_default" | "reset-to-default" => {
                Some(MalformedDataPolicy::ResetToDefault)
            }
            _ => None,
        }
    }
}

// ============================================================================
// STORE
// ============================================================================

pub struct MenuRecordStore<S: KeyValueStore> {
    storage: S,
    price_policy: PricePolicy,
    malformed_policy: MalformedDataPolicy,
    /// Held across every read-modify-write (seeding, price updates) so
    /// concurrent callers sharing one store never overwrite each other's history
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> MenuRecordStore<S> {
    /// Store with default policies (non-negative prices, fail fast on corrupt data)
    pub fn new(storage: S) -> Self {
        MenuRecordStore {
            storage,
            price_policy: PricePolicy::default(),
            malformed_policy: MalformedDataPolicy::default(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_price_policy(mut self, policy: PricePolicy) -> Self {
        self.price_policy = policy;
        self
    }

    pub fn with_malformed_policy(mut self, policy: MalformedDataPolicy) -> Self {
        self.malformed_policy = policy;
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn price_policy(&self) -> PricePolicy {
        self.price_policy
    }

    /// Current catalog. Seeds storage with the default catalog on first use.
    pub fn get_menu_items(&self) -> Result<Vec<MenuItem>> {
        if let Some(items) = self.read_catalog()? {
            return Ok(items);
        }

        let _guard = self.write_lock.lock().unwrap();
        self.catalog_or_seed()
    }

    /// Change one item's price and log the change.
    ///
    /// Returns Ok(false) without writing anything when `item_id` is unknown.
    /// A price rejected by the policy is an error, also without writes.
    pub fn update_price(&self, item_id: &str, new_price: f64, changed_by: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().unwrap();
        let mut items = self.catalog_or_seed()?;

        let Some(item) = items.iter_mut().find(|item| item.id == item_id) else {
            debug!(item_id, "Price update skipped: item not found");
            return Ok(false);
        };

        if let Err(reason) = self.price_policy.check(new_price) {
            return Err(MenuError::InvalidPrice {
                item_id: item_id.to_string(),
                price: new_price,
                reason,
            }
            .into());
        }

        let old_price = item.price;
        item.price = new_price;

        let mut history = self.get_price_history()?;
        history.push(PriceHistoryEntry {
            item_id: item_id.to_string(),
            old_price,
            new_price,
            changed_by: changed_by.to_string(),
            changed_at: Utc::now(),
        });

        // Catalog and history go out in one batch so adapters can commit both together
        let catalog_json = serde_json::to_string(&items)?;
        let history_json = serde_json::to_string(&history)?;
        self.storage
            .set_many(&[
                (MENU_ITEMS_KEY, catalog_json),
                (PRICE_HISTORY_KEY, history_json),
            ])
            .with_context(|| format!("Failed to persist price change for '{}'", item_id))?;

        info!(item_id, old_price, new_price, changed_by, "Menu price updated");
        Ok(true)
    }

    /// Every price change, oldest first. Never writes to storage.
    pub fn get_price_history(&self) -> Result<Vec<PriceHistoryEntry>> {
        let raw = self
            .storage
            .get(PRICE_HISTORY_KEY)
            .context("Failed to read price history")?;

        let Some(raw) = raw else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<PriceHistoryEntry>>(&raw) {
            Ok(history) => Ok(history),
            Err(e) => match self.malformed_policy {
                MalformedDataPolicy::FailFast => Err(MenuError::CorruptRecord {
                    key: PRICE_HISTORY_KEY.to_string(),
                    detail: e.to_string(),
                }
                .into()),
                MalformedDataPolicy::ResetToDefault => {
                    warn!(error = %e, "Price history is corrupt, treating it as empty");
                    Ok(Vec::new())
                }
            },
        }
    }

    /// First item (catalog order) whose name contains `name`, ignoring case
    pub fn get_item_by_name(&self, name: &str) -> Result<Option<MenuItem>> {
        let needle = name.to_lowercase();
        Ok(self
            .get_menu_items()?
            .into_iter()
            .find(|item| item.name.to_lowercase().contains(&needle)))
    }

    pub fn get_item(&self, item_id: &str) -> Result<Option<MenuItem>> {
        Ok(self
            .get_menu_items()?
            .into_iter()
            .find(|item| item.id == item_id))
    }

    pub fn items_by_category(&self, category: MenuCategory) -> Result<Vec<MenuItem>> {
        Ok(self
            .get_menu_items()?
            .into_iter()
            .filter(|item| item.category == category)
            .collect())
    }

    /// Price changes for one item, oldest first
    pub fn history_for_item(&self, item_id: &str) -> Result<Vec<PriceHistoryEntry>> {
        Ok(self
            .get_price_history()?
            .into_iter()
            .filter(|entry| entry.item_id == item_id)
            .collect())
    }

    /// Stored catalog, or None when it is missing (or corrupt under ResetToDefault)
    fn read_catalog(&self) -> Result<Option<Vec<MenuItem>>> {
        let raw = self
            .storage
            .get(MENU_ITEMS_KEY)
            .context("Failed to read menu catalog")?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        match serde_json::from_str::<Vec<MenuItem>>(&raw) {
            Ok(items) => {
                debug!(count = items.len(), "Loaded menu catalog");
                Ok(Some(items))
            }
            Err(e) => match self.malformed_policy {
                MalformedDataPolicy::FailFast => Err(MenuError::CorruptRecord {
                    key: MENU_ITEMS_KEY.to_string(),
                    detail: e.to_string(),
                }
                .into()),
                MalformedDataPolicy::ResetToDefault => {
                    warn!(error = %e, "Menu catalog is corrupt, reseeding default catalog");
                    Ok(None)
                }
            },
        }
    }

    /// Caller must hold `write_lock`. Re-reads so a seed written by another
    /// caller in the meantime is kept.
    fn catalog_or_seed(&self) -> Result<Vec<MenuItem>> {
        match self.read_catalog()? {
            Some(items) => Ok(items),
            None => self.seed_default_catalog(),
        }
    }

    fn seed_default_catalog(&self) -> Result<Vec<MenuItem>> {
        let items = default_catalog();
        let json = serde_json::to_string(&items)?;
        self.storage
            .set(MENU_ITEMS_KEY, &json)
            .context("Failed to seed default menu catalog")?;
        info!(count = items.len(), "Seeded default menu catalog");
        Ok(items)
    }
}
