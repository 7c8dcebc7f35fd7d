// 📐 Validation Layer - input constraints checked before any store access
//
// Request bodies arrive with every field optional so that a missing value is
// reported as a validation failure instead of a decoding failure.

use crate::error::{LedgerError, LedgerResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const RECHARGE_AMOUNT_MESSAGE: &str = "Recharge amount must be greater or equal to 0";
pub const TRANSFER_AMOUNT_MESSAGE: &str = "Transfer amount must be greater or equal to 0";
pub const TARGET_REQUIRED_MESSAGE: &str = "TargetRegistryId can not be null";
pub const SELF_TRANSFER_MESSAGE: &str = "Source and target registry must be different";

pub const AMOUNT_FIELD: &str = "amount";
pub const TARGET_FIELD: &str = "targetRegistryId";

// ============================================================================
// REQUESTS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RechargeRequest {
    pub amount: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub amount: Option<Decimal>,
    pub target_registry_id: Option<String>,
}

impl RechargeRequest {
    pub fn validate(&self) -> LedgerResult<Decimal> {
        validate_recharge(self.amount)
    }
}

impl TransferRequest {
    /// Returns the target id and amount once both pass
    pub fn validate(&self, source_registry_id: &str) -> LedgerResult<(&str, Decimal)> {
        validate_transfer(
            source_registry_id,
            self.target_registry_id.as_deref(),
            self.amount,
        )
    }
}

// ============================================================================
// RULES
// ============================================================================

pub fn validate_recharge(amount: Option<Decimal>) -> LedgerResult<Decimal> {
    require_non_negative(amount, RECHARGE_AMOUNT_MESSAGE)
}

/// Target presence is checked first, then the amount, then that the two
/// registries differ.
pub fn validate_transfer<'a>(
    source_registry_id: &str,
    target_registry_id: Option<&'a str>,
    amount: Option<Decimal>,
) -> LedgerResult<(&'a str, Decimal)> {
    let target = require_present(target_registry_id, TARGET_FIELD, TARGET_REQUIRED_MESSAGE)?;
    let amount = require_non_negative(amount, TRANSFER_AMOUNT_MESSAGE)?;

    if target == source_registry_id {
        return Err(LedgerError::validation(TARGET_FIELD, SELF_TRANSFER_MESSAGE));
    }

    Ok((target, amount))
}

pub fn require_non_negative(amount: Option<Decimal>, message: &str) -> LedgerResult<Decimal> {
    match amount {
        Some(value) if value >= Decimal::ZERO => Ok(value),
        _ => Err(LedgerError::validation(AMOUNT_FIELD, message)),
    }
}

pub fn require_present<'a>(value: Option<&'a str>, field: &str, message: &str) -> LedgerResult<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(LedgerError::validation(field, message)),
    }
}
