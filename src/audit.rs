// 🚨 Audit Alerts - classify and render suspicious activity
//
// Consumes pre-built log entries (actor, action, timestamp); it never writes
// the audit log itself. Price changes from the menu store can be converted
// into entries so large price swings show up alongside everything else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

use crate::menu::PriceHistoryEntry;

/// Relative price move at or above which a change is critical
pub const CRITICAL_PRICE_SWING: f64 = 0.5;

// ============================================================================
// LOG ENTRY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub actor: String,
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

impl AuditLogEntry {
    pub fn new(actor: &str, action: &str, timestamp: DateTime<Utc>) -> Self {
        AuditLogEntry {
            actor: actor.to_string(),
            action: action.to_string(),
            timestamp,
        }
    }

    /// Describe a price change as an audit entry
    pub fn from_price_change(entry: &PriceHistoryEntry) -> Self {
        let swing = entry
            .relative_change()
            .map(|r| format!(" ({:+.0}%)", r * 100.0))
            .unwrap_or_default();
        let prefix = if is_price_swing(entry) {
            "price_swing"
        } else {
            "price_change"
        };

        AuditLogEntry {
            actor: entry.changed_by.clone(),
            action: format!(
                "{}: {} {:.2} -> {:.2}{}",
                prefix, entry.item_id, entry.old_price, entry.new_price, swing
            ),
            timestamp: entry.changed_at,
        }
    }

    /// SHA-256 over actor, action and timestamp. Identical entries share it.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!(
            "{}|{}|{}",
            self.actor,
            self.action,
            self.timestamp.to_rfc3339()
        ));
        format!("{:x}", hasher.finalize())
    }
}

fn is_price_swing(entry: &PriceHistoryEntry) -> bool {
    match entry.relative_change() {
        Some(change) => change.abs() >= CRITICAL_PRICE_SWING,
        // From zero to anything non-zero is always a swing
        None => entry.new_price != 0.0,
    }
}

// ============================================================================
// SEVERITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

const CRITICAL_KEYWORDS: &[&str] = &[
    "delete",
    "drop",
    "privilege",
    "grant_admin",
    "price_swing",
    "export_all",
];

const WARNING_KEYWORDS: &[&str] = &[
    "failed_login",
    "login_failed",
    "unauthorized",
    "denied",
    "price_change",
    "role_change",
    "logout_forced",
];

impl AlertSeverity {
    /// Classify an action by keyword (case-insensitive)
    pub fn classify(action: &str) -> AlertSeverity {
        let action = action.to_lowercase();
        if CRITICAL_KEYWORDS.iter().any(|k| action.contains(k)) {
            AlertSeverity::Critical
        } else if WARNING_KEYWORDS.iter().any(|k| action.contains(k)) {
            AlertSeverity::Warning
        } else {
            AlertSeverity::Info
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AlertSeverity::Info => "INFO",
            AlertSeverity::Warning => "WARNING",
            AlertSeverity::Critical => "CRITICAL",
        }
    }

    pub fn is_suspicious(&self) -> bool {
        *self >= AlertSeverity::Warning
    }
}

// ============================================================================
// ALERT
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AuditAlert {
    pub fingerprint: String,
    pub severity: AlertSeverity,
    pub message: String,
    pub entry: AuditLogEntry,
}

impl AuditAlert {
    pub fn from_entry(entry: &AuditLogEntry) -> Self {
        let severity = AlertSeverity::classify(&entry.action);
        AuditAlert {
            fingerprint: entry.fingerprint(),
            severity,
            message: format_alert(entry, severity),
            entry: entry.clone(),
        }
    }
}

/// "[WARNING] 2026-01-05 14:03:00 UTC chef1: failed_login"
pub fn format_alert(entry: &AuditLogEntry, severity: AlertSeverity) -> String {
    format!(
        "[{}] {} {}: {}",
        severity.label(),
        entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        entry.actor,
        entry.action
    )
}

/// Warning and critical alerts, duplicates removed, newest first
pub fn suspicious_alerts(entries: &[AuditLogEntry]) -> Vec<AuditAlert> {
    let mut seen = HashSet::new();
    let mut alerts: Vec<AuditAlert> = entries
        .iter()
        .map(AuditAlert::from_entry)
        .filter(|alert| alert.severity.is_suspicious())
        .filter(|alert| seen.insert(alert.fingerprint.clone()))
        .collect();

    alerts.sort_by(|a, b| b.entry.timestamp.cmp(&a.entry.timestamp));
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, hour, 0, 0).unwrap()
    }

    fn price_change(old: f64, new: f64) -> PriceHistoryEntry {
        PriceHistoryEntry {
            item_id: "pollo-parrilla".to_string(),
            old_price: old,
            new_price: new,
            changed_by: "chef1".to_string(),
            changed_at: at(10),
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(AlertSeverity::classify("DELETE user 42"), AlertSeverity::Critical);
        assert_eq!(AlertSeverity::classify("failed_login"), AlertSeverity::Warning);
        assert_eq!(AlertSeverity::classify("viewed menu"), AlertSeverity::Info);
        assert!(AlertSeverity::Critical > AlertSeverity::Warning);
    }

    #[test]
    fn test_format_alert() {
        let entry = AuditLogEntry::new("chef1", "failed_login", at(14));
        let alert = AuditAlert::from_entry(&entry);
        assert_eq!(alert.message, "[WARNING] 2026-01-05 14:00:00 UTC chef1: failed_login");
        assert_eq!(alert.fingerprint.len(), 64);
    }

    #[test]
    fn test_suspicious_alerts_filters_dedups_and_sorts() {
        let entries = vec![
            AuditLogEntry::new("ana", "viewed menu", at(8)),
            AuditLogEntry::new("ana", "failed_login", at(9)),
            AuditLogEntry::new("ana", "failed_login", at(9)),
            AuditLogEntry::new("root", "delete staff record", at(11)),
        ];

        let alerts = suspicious_alerts(&entries);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(alerts[1].entry.actor, "ana");
    }

    #[test]
    fn test_same_action_at_different_times_is_not_duplicate() {
        let first = AuditLogEntry::new("ana", "failed_login", at(9));
        let mut second = first.clone();
        second.timestamp = second.timestamp + Duration::minutes(1);

        assert_ne!(first.fingerprint(), second.fingerprint());
        assert_eq!(suspicious_alerts(&[first, second]).len(), 2);
    }

    #[test]
    fn test_price_changes_become_entries() {
        let small = AuditLogEntry::from_price_change(&price_change(50.0, 55.0));
        assert_eq!(small.actor, "chef1");
        assert!(small.action.starts_with("price_change: pollo-parrilla 50.00 -> 55.00"));
        assert_eq!(AlertSeverity::classify(&small.action), AlertSeverity::Warning);

        let big = AuditLogEntry::from_price_change(&price_change(50.0, 20.0));
        assert!(big.action.contains("(-60%)"));
        assert_eq!(AlertSeverity::classify(&big.action), AlertSeverity::Critical);

        let from_zero = AuditLogEntry::from_price_change(&price_change(0.0, 10.0));
        assert!(from_zero.action.starts_with("price_swing"));
    }
}
