// 💳 Registry Entity - a named monetary account owned by one user
//
// "Registry id is IDENTITY (never changes), amount is the only VALUE that moves"
//
// - UUID identity assigned at creation
// - Owner (user_id) fixed for the registry's lifetime
// - Balance kept as an exact decimal, never a binary float

use crate::error::{LedgerError, LedgerResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fractional digits new balances are normalised to
pub const MONETARY_SCALE: u32 = 2;

pub const BALANCE_LIMIT_MESSAGE: &str = "Resulting amount exceeds the supported range";

// ============================================================================
// REGISTRY ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    /// Stable identity (UUID) - NEVER changes
    pub id: String,

    /// Human-readable name (e.g., "Wallet", "Food expenses")
    pub label: String,

    /// Owning user
    pub user_id: String,

    /// Current balance
    pub amount: Decimal,

    /// System time: when this registry was provisioned
    pub created_at: DateTime<Utc>,
}

impl Registry {
    /// Create new registry with a fresh UUID
    pub fn new(label: &str, user_id: &str, amount: Decimal) -> Self {
        let mut amount = amount;
        if amount.scale() < MONETARY_SCALE {
            amount.rescale(MONETARY_SCALE);
        }

        Registry {
            id: uuid::Uuid::new_v4().to_string(),
            label: label.to_string(),
            user_id: user_id.to_string(),
            amount,
            created_at: Utc::now(),
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    pub fn can_cover(&self, amount: Decimal) -> bool {
        self.amount >= amount
    }

    /// Add `amount`; the balance is left untouched if the sum is out of range
    pub fn credit(&mut self, amount: Decimal) -> LedgerResult<()> {
        self.amount = self.amount.checked_add(amount).ok_or_else(out_of_range)?;
        Ok(())
    }

    pub fn debit(&mut self, amount: Decimal) -> LedgerResult<()> {
        self.amount = self.amount.checked_sub(amount).ok_or_else(out_of_range)?;
        Ok(())
    }

    pub fn view(&self) -> RegistryView {
        RegistryView::from(self)
    }
}

fn out_of_range() -> LedgerError {
    LedgerError::validation("amount", BALANCE_LIMIT_MESSAGE)
}

// ============================================================================
// READ-ONLY PROJECTION
// ============================================================================

/// What callers get to see of a registry. The owner is deliberately absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryView {
    pub id: String,
    pub label: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl From<&Registry> for RegistryView {
    fn from(registry: &Registry) -> Self {
        Self {
            id: registry.id.clone(),
            label: registry.label.clone(),
            amount: registry.amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_registry_creation() {
        let registry = Registry::new("Wallet", "1", dec!(1000));

        assert!(!registry.id.is_empty());
        assert_eq!(registry.label, "Wallet");
        assert_eq!(registry.user_id, "1");
        assert_eq!(registry.amount, dec!(1000));
        assert_eq!(registry.amount.to_string(), "1000.00");
        assert!(registry.is_owned_by("1"));
        assert!(!registry.is_owned_by("2"));
    }

    #[test]
    fn test_registry_keeps_finer_scale() {
        let registry = Registry::new("Change", "1", dec!(0.125));
        assert_eq!(registry.amount.to_string(), "0.125");
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Registry::new("A", "1", dec!(0));
        let b = Registry::new("A", "1", dec!(0));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_credit_debit_exact() {
        let mut registry = Registry::new("Wallet", "1", dec!(0.1));
        registry.credit(dec!(0.2)).unwrap();
        assert_eq!(registry.amount, dec!(0.3));

        assert!(registry.can_cover(dec!(0.3)));
        assert!(!registry.can_cover(dec!(0.31)));

        registry.debit(dec!(0.3)).unwrap();
        assert_eq!(registry.amount, Decimal::ZERO);
    }

    #[test]
    fn test_credit_past_max_leaves_balance() {
        let mut registry = Registry::new("Wallet", "1", dec!(1000));

        let err = registry.credit(Decimal::MAX).unwrap_err();
        assert!(matches!(err, LedgerError::ValidationFailed { ref field, .. } if field == "amount"));
        assert_eq!(err.to_string(), BALANCE_LIMIT_MESSAGE);
        assert_eq!(registry.amount, dec!(1000));
    }

    #[test]
    fn test_debit_past_min_leaves_balance() {
        let mut registry = Registry::new("Wallet", "1", dec!(0));
        registry.amount = Decimal::MIN;
        assert!(registry.debit(dec!(1)).is_err());
        assert_eq!(registry.amount, Decimal::MIN);
    }

    #[test]
    fn test_view_hides_owner() {
        let registry = Registry::new("Savings", "42", dec!(5000));
        let json = serde_json::to_value(registry.view()).unwrap();

        assert_eq!(json["id"], serde_json::json!(registry.id));
        assert_eq!(json["label"], "Savings");
        assert_eq!(json["amount"], serde_json::json!(5000.0));
        assert!(json.get("user_id").is_none());
        assert!(json.get("userId").is_none());
    }
}
