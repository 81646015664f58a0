// ⚙️ Configuration - environment driven, .env aware
//
// PLANNER_DB_PATH           SQLite file (default: event_planner.db)
// PLANNER_PRICE_POLICY      unrestricted | non_negative | range:MIN:MAX
// PLANNER_MALFORMED_POLICY  fail_fast | reset
// PLANNER_ACTOR             actor logged in for CLI/TUI price changes
// PLANNER_ROLE              staff role of that actor (default: chef)
// PLANNER_BIND_ADDR         API server address (default: 0.0.0.0:3000)

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::menu::{MalformedDataPolicy, PricePolicy};

pub const DEFAULT_DB_PATH: &str = "event_planner.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_ROLE: &str = "chef";

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub db_path: PathBuf,
    pub price_policy: PricePolicy,
    pub malformed_policy: MalformedDataPolicy,
    pub actor: Option<String>,
    pub role: String,
    pub bind_addr: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            price_policy: PricePolicy::default(),
            malformed_policy: MalformedDataPolicy::default(),
            actor: None,
            role: DEFAULT_ROLE.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl PlannerConfig {
    /// Load `.env` (if present) and then read the process environment
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let vars: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with("PLANNER_"))
            .collect();
        Self::from_vars(&vars)
    }

    /// Build from an explicit variable map. Unknown policy values are errors.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let mut config = PlannerConfig::default();

        if let Some(path) = non_empty(vars, "PLANNER_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }

        if let Some(raw) = non_empty(vars, "PLANNER_PRICE_POLICY") {
            config.price_policy = PricePolicy::parse(raw)
                .ok_or_else(|| anyhow!("Invalid PLANNER_PRICE_POLICY: '{}'", raw))?;
        }

        if let Some(raw) = non_empty(vars, "PLANNER_MALFORMED_POLICY") {
            config.malformed_policy = MalformedDataPolicy::parse(raw)
                .ok_or_else(|| anyhow!("Invalid PLANNER_MALFORMED_POLICY: '{}'", raw))?;
        }

        config.actor = non_empty(vars, "PLANNER_ACTOR").map(str::to_string);

        if let Some(role) = non_empty(vars, "PLANNER_ROLE") {
            config.role = role.to_lowercase();
        }

        if let Some(addr) = non_empty(vars, "PLANNER_BIND_ADDR") {
            config.bind_addr = addr.to_string();
        }

        Ok(config)
    }
}

fn non_empty<'a>(vars: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = PlannerConfig::from_vars(&HashMap::new()).unwrap();
        assert_eq!(config, PlannerConfig::default());
        assert_eq!(config.db_path, PathBuf::from("event_planner.db"));
        assert_eq!(config.price_policy, PricePolicy::NonNegative);
        assert_eq!(config.malformed_policy, MalformedDataPolicy::FailFast);
        assert_eq!(config.role, "chef");
    }

    #[test]
    fn test_overrides() {
        let config = PlannerConfig::from_vars(&vars(&[
            ("PLANNER_DB_PATH", "/tmp/menu.db"),
            ("PLANNER_PRICE_POLICY", "range:0:500"),
            ("PLANNER_MALFORMED_POLICY", "reset"),
            ("PLANNER_ACTOR", "chef1"),
            ("PLANNER_ROLE", "Coordinador"),
            ("PLANNER_BIND_ADDR", "127.0.0.1:8080"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/menu.db"));
        assert_eq!(config.price_policy, PricePolicy::Range { min: 0.0, max: 500.0 });
        assert_eq!(config.malformed_policy, MalformedDataPolicy::ResetToDefault);
        assert_eq!(config.actor.as_deref(), Some("chef1"));
        assert_eq!(config.role, "coordinador");
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = PlannerConfig::from_vars(&vars(&[("PLANNER_ACTOR", "  ")])).unwrap();
        assert!(config.actor.is_none());
    }

    #[test]
    fn test_invalid_policy_is_error() {
        let err = PlannerConfig::from_vars(&vars(&[("PLANNER_PRICE_POLICY", "cheap")]))
            .unwrap_err();
        assert!(err.to_string().contains("PLANNER_PRICE_POLICY"));
    }
}
