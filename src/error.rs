// Typed failures for the menu record store
//
// Operations return anyhow::Result so callers can add context freely, but the
// root cause is always one of these variants. Use downcast_ref::<MenuError>()
// to branch on it (the API server maps InvalidPrice to 400).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MenuError {
    /// Price rejected by the configured PricePolicy
    #[error("invalid price {price} for item '{item_id}': {reason}")]
    InvalidPrice {
        item_id: String,
        price: f64,
        reason: String,
    },

    /// Stored value could not be parsed as the expected record sequence
    #[error("corrupt record under key '{key}': {detail}")]
    CorruptRecord { key: String, detail: String },

    /// Storage adapter failure (unavailable, quota, I/O)
    #[error("storage failure: {0}")]
    Storage(String),
}

impl MenuError {
    pub fn is_invalid_price(&self) -> bool {
        matches!(self, MenuError::InvalidPrice { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MenuError::InvalidPrice {
            item_id: "pollo-parrilla".to_string(),
            price: -1.0,
            reason: "price must not be negative".to_string(),
        };
        assert!(err.is_invalid_price());
        assert_eq!(
            err.to_string(),
            "invalid price -1 for item 'pollo-parrilla': price must not be negative"
        );

        let err = MenuError::CorruptRecord {
            key: "menu_items".to_string(),
            detail: "expected value".to_string(),
        };
        assert!(!err.is_invalid_price());
        assert!(err.to_string().contains("menu_items"));
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = MenuError::Storage("disk full".to_string()).into();
        let err = err.context("Failed to persist catalog");

        let root = err.downcast_ref::<MenuError>();
        assert!(matches!(root, Some(MenuError::Storage(_))));
    }
}
