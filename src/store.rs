// 🗄️ Registry Store - persistence contract for registries
//
// A store hands out units of work. Everything a ledger operation reads and
// writes happens inside one unit, so concurrent operations on overlapping
// registries never interleave.

use crate::error::{LedgerError, LedgerResult, StoreError};
use crate::registry::Registry;
use rust_decimal::Decimal;
use std::sync::RwLock;

/// Operations available inside a unit of work
pub trait RegistryTx {
    /// All registries owned by `user_id`, in creation order (possibly empty)
    fn find_by_user_id(&self, user_id: &str) -> LedgerResult<Vec<Registry>>;

    /// The registry with this id, only if `user_id` owns it
    fn find_by_id_and_user(&self, id: &str, user_id: &str) -> LedgerResult<Option<Registry>>;

    /// Persist the balances of every given registry, all or nothing.
    /// Labels and owners are never rewritten.
    fn save_atomic(&mut self, registries: &[Registry]) -> LedgerResult<()>;
}

pub trait RegistryStore: Send + Sync {
    /// Run `work` atomically. An `Err` from `work` discards everything it saved.
    fn transaction<T, F>(&self, work: F) -> LedgerResult<T>
    where
        F: FnOnce(&mut dyn RegistryTx) -> LedgerResult<T>;

    /// Add a freshly provisioned registry
    fn insert(&self, registry: &Registry) -> LedgerResult<()> {
        self.insert_all(std::slice::from_ref(registry)).map(|_| ())
    }

    /// Add a batch of registries, all or nothing. Returns how many were added.
    fn insert_all(&self, registries: &[Registry]) -> LedgerResult<usize>;
}

pub(crate) const INITIAL_AMOUNT_MESSAGE: &str = "Initial amount must be greater or equal to 0";

pub(crate) fn check_provisioned(registry: &Registry) -> LedgerResult<()> {
    if registry.amount < Decimal::ZERO {
        return Err(LedgerError::validation("amount", INITIAL_AMOUNT_MESSAGE));
    }
    Ok(())
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// Vec-backed store for tests and embedding.
///
/// Insertion order is creation order. A unit of work runs against a working
/// copy under the write lock and replaces the live data only when it succeeds.
pub struct MemoryRegistryStore {
    registries: RwLock<Vec<Registry>>,
}

impl MemoryRegistryStore {
    pub fn new() -> Self {
        MemoryRegistryStore {
            registries: RwLock::new(Vec::new()),
        }
    }

    /// Snapshot of everything stored, in creation order
    pub fn all(&self) -> LedgerResult<Vec<Registry>> {
        let registries = self.registries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(registries.clone())
    }
}

impl Default for MemoryRegistryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryStore for MemoryRegistryStore {
    fn transaction<T, F>(&self, work: F) -> LedgerResult<T>
    where
        F: FnOnce(&mut dyn RegistryTx) -> LedgerResult<T>,
    {
        let mut live = self.registries.write().map_err(|_| StoreError::LockPoisoned)?;

        let mut unit = MemoryTx {
            registries: live.clone(),
        };
        let outcome = work(&mut unit)?;

        *live = unit.registries;
        Ok(outcome)
    }

    fn insert_all(&self, registries: &[Registry]) -> LedgerResult<usize> {
        for registry in registries {
            check_provisioned(registry)?;
        }

        let mut live = self.registries.write().map_err(|_| StoreError::LockPoisoned)?;
        live.extend_from_slice(registries);
        tracing::debug!(count = registries.len(), "registries provisioned");
        Ok(registries.len())
    }
}

struct MemoryTx {
    registries: Vec<Registry>,
}

impl RegistryTx for MemoryTx {
    fn find_by_user_id(&self, user_id: &str) -> LedgerResult<Vec<Registry>> {
        Ok(self
            .registries
            .iter()
            .filter(|r| r.is_owned_by(user_id))
            .cloned()
            .collect())
    }

    fn find_by_id_and_user(&self, id: &str, user_id: &str) -> LedgerResult<Option<Registry>> {
        Ok(self
            .registries
            .iter()
            .find(|r| r.id == id && r.is_owned_by(user_id))
            .cloned())
    }

    fn save_atomic(&mut self, registries: &[Registry]) -> LedgerResult<()> {
        // Resolve every slot before writing any of them
        let mut slots = Vec::with_capacity(registries.len());
        for registry in registries {
            let slot = self
                .registries
                .iter()
                .position(|r| r.id == registry.id && r.user_id == registry.user_id)
                .ok_or_else(|| StoreError::UnknownRegistry {
                    id: registry.id.clone(),
                })?;
            slots.push(slot);
        }

        for (slot, registry) in slots.into_iter().zip(registries) {
            self.registries[slot].amount = registry.amount;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn seeded_store() -> (MemoryRegistryStore, Registry, Registry) {
        let store = MemoryRegistryStore::new();
        let wallet = Registry::new("Wallet", "1", dec!(1000));
        let food = Registry::new("Food expenses", "1", dec!(0));
        store.insert(&wallet).unwrap();
        store.insert(&Registry::new("Other", "2", dec!(10))).unwrap();
        store.insert(&food).unwrap();
        (store, wallet, food)
    }

    #[test]
    fn test_find_by_user_keeps_insertion_order() {
        let (store, wallet, food) = seeded_store();

        let found = store.transaction(|tx| tx.find_by_user_id("1")).unwrap();
        let ids: Vec<&str> = found.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![wallet.id.as_str(), food.id.as_str()]);

        let none = store.transaction(|tx| tx.find_by_user_id("3")).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_find_by_id_and_user_requires_owner() {
        let (store, wallet, _) = seeded_store();

        let mine = store
            .transaction(|tx| tx.find_by_id_and_user(&wallet.id, "1"))
            .unwrap();
        assert_eq!(mine.unwrap().label, "Wallet");

        let theirs = store
            .transaction(|tx| tx.find_by_id_and_user(&wallet.id, "2"))
            .unwrap();
        assert!(theirs.is_none());
    }

    #[test]
    fn test_save_atomic_rejects_unknown_without_partial_write() {
        let (store, mut wallet, _) = seeded_store();
        wallet.amount = dec!(1);
        let ghost = Registry::new("Ghost", "1", dec!(5));

        let result = store.transaction(|tx| tx.save_atomic(&[wallet.clone(), ghost.clone()]));
        assert!(matches!(
            result,
            Err(LedgerError::Store(StoreError::UnknownRegistry { .. }))
        ));

        let all = store.all().unwrap();
        assert_eq!(all[0].amount, dec!(1000));
    }

    #[test]
    fn test_failed_unit_discards_saved_changes() {
        let (store, mut wallet, _) = seeded_store();
        wallet.amount = dec!(0);

        let result: LedgerResult<()> = store.transaction(|tx| {
            tx.save_atomic(&[wallet.clone()])?;
            Err(LedgerError::validation("amount", "late failure"))
        });
        assert!(result.is_err());

        let all = store.all().unwrap();
        assert_eq!(all[0].amount, dec!(1000));
    }

    #[test]
    fn test_save_atomic_never_moves_owner() {
        let (store, mut wallet, _) = seeded_store();
        wallet.user_id = "2".to_string();

        let result = store.transaction(|tx| tx.save_atomic(&[wallet.clone()]));
        assert!(result.is_err());
    }

    #[test]
    fn test_insert_rejects_negative_balance() {
        let store = MemoryRegistryStore::new();
        let result = store.insert(&Registry::new("Debt", "1", dec!(-5)));

        match result {
            Err(LedgerError::ValidationFailed { field, message }) => {
                assert_eq!(field, "amount");
                assert_eq!(message, INITIAL_AMOUNT_MESSAGE);
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(store.all().unwrap().is_empty());
    }

    #[test]
    fn test_insert_all_is_all_or_nothing() {
        let store = MemoryRegistryStore::new();
        let batch = vec![
            Registry::new("Wallet", "1", dec!(1000)),
            Registry::new("Debt", "1", dec!(-5)),
            Registry::new("Savings", "1", dec!(5000)),
        ];

        assert!(store.insert_all(&batch).is_err());
        assert!(store.all().unwrap().is_empty());

        assert_eq!(store.insert_all(&[batch[0].clone(), batch[2].clone()]).unwrap(), 2);
        assert_eq!(store.all().unwrap().len(), 2);
    }
}
