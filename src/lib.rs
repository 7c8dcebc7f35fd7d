// Budget Ledger - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod error;
pub mod registry;
pub mod store;          // Store contract + in-memory backend
pub mod db;             // SQLite backend
pub mod validation;
pub mod ledger;         // Recharge / transfer
pub mod query;          // Listing
pub mod provision;      // Creating registries from seed files
pub mod config;
pub mod telemetry;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use error::{LedgerError, LedgerResult, RegistryRole, StoreError};
pub use registry::{Registry, RegistryView, MONETARY_SCALE};
pub use store::{MemoryRegistryStore, RegistryStore, RegistryTx};
pub use db::{setup_database, SqliteRegistryStore};
pub use validation::{RechargeRequest, TransferRequest};
pub use ledger::Ledger;
pub use query::list_by_user;
pub use provision::{load_registries_csv, load_registries_from_reader, provision};
pub use config::{ConfigError, LedgerConfig};
pub use telemetry::init_tracing;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
