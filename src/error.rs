// ⚠️ Ledger Errors - typed failures for every ledger operation
//
// Every variant is terminal: the operation that produced it has not touched
// persisted state.

use rust_decimal::Decimal;
use thiserror::Error;

/// Which side of a transfer a missing registry was looked up for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryRole {
    Source,
    Target,
}

impl RegistryRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryRole::Source => "source",
            RegistryRole::Target => "target",
        }
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Lookup failure. `registry_id` is `None` when a whole user came back empty.
    #[error("{}", not_found_message(.registry_id, .user_id, .role))]
    RegistryNotFound {
        registry_id: Option<String>,
        user_id: String,
        role: Option<RegistryRole>,
    },

    #[error("{message}")]
    ValidationFailed { field: String, message: String },

    #[error(
        "Not enough funds for the transfer. Source amount: {available}, requested transfer: {requested}"
    )]
    InsufficientFunds { available: Decimal, requested: Decimal },

    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("registry '{id}' does not exist for its owner")]
    UnknownRegistry { id: String },

    #[error("store lock poisoned")]
    LockPoisoned,

    #[error("store worker failed: {0}")]
    Worker(String),
}

impl From<rusqlite::Error> for LedgerError {
    fn from(err: rusqlite::Error) -> Self {
        LedgerError::Store(StoreError::Sqlite(err))
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    pub fn user_not_found(user_id: &str) -> Self {
        LedgerError::RegistryNotFound {
            registry_id: None,
            user_id: user_id.to_string(),
            role: None,
        }
    }

    pub fn registry_not_found(registry_id: &str, user_id: &str, role: Option<RegistryRole>) -> Self {
        LedgerError::RegistryNotFound {
            registry_id: Some(registry_id.to_string()),
            user_id: user_id.to_string(),
            role,
        }
    }

    pub fn validation(field: &str, message: &str) -> Self {
        LedgerError::ValidationFailed {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// Stable name of the failure class, used on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::RegistryNotFound { .. } => "RegistryNotFound",
            LedgerError::ValidationFailed { .. } => "ValidationFailed",
            LedgerError::InsufficientFunds { .. } => "InsufficientFunds",
            LedgerError::Store(_) => "StoreFailure",
        }
    }
}

fn not_found_message(
    registry_id: &Option<String>,
    user_id: &str,
    role: &Option<RegistryRole>,
) -> String {
    match (registry_id.as_deref(), role) {
        (None, _) => format!("No registries found for userId: '{}'", user_id),
        (Some(id), None) => format!("Registry '{}' not found for user: '{}'", id, user_id),
        (Some(id), Some(RegistryRole::Source)) => {
            format!("Source registry '{}' not found for user: '{}'", id, user_id)
        }
        (Some(id), Some(RegistryRole::Target)) => {
            format!("Target registry '{}' not found for user: '{}'", id, user_id)
        }
    }
}
