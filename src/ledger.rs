// 💸 Ledger Operations - recharge and transfer over stored registries
//
// Every operation validates its input first, then does all of its reads and
// writes inside a single store transaction.

use crate::error::{LedgerError, LedgerResult, RegistryRole};
use crate::query;
use crate::registry::RegistryView;
use crate::store::RegistryStore;
use crate::validation;
use rust_decimal::Decimal;

pub struct Ledger<S> {
    store: S,
}

impl<S: RegistryStore> Ledger<S> {
    pub fn new(store: S) -> Self {
        Ledger { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// All registries of `user_id` in creation order
    pub fn list_by_user(&self, user_id: &str) -> LedgerResult<Vec<RegistryView>> {
        query::list_by_user(&self.store, user_id)
    }

    /// Add `amount` to one registry owned by `user_id`
    pub fn recharge(&self, user_id: &str, registry_id: &str, amount: Decimal) -> LedgerResult<()> {
        let amount = validation::validate_recharge(Some(amount))?;

        self.store.transaction(|tx| {
            let mut registry = tx
                .find_by_id_and_user(registry_id, user_id)?
                .ok_or_else(|| LedgerError::registry_not_found(registry_id, user_id, None))?;

            registry.credit(amount)?;
            tx.save_atomic(std::slice::from_ref(&registry))
        })
    }

    /// Move `amount` between two registries owned by `user_id`.
    ///
    /// Both lookups run before either is checked, and a missing source is
    /// reported ahead of a missing target. Nothing is written unless the
    /// source covers the full amount.
    pub fn transfer(
        &self,
        user_id: &str,
        source_registry_id: &str,
        target_registry_id: &str,
        amount: Decimal,
    ) -> LedgerResult<()> {
        let (target_registry_id, amount) =
            validation::validate_transfer(source_registry_id, Some(target_registry_id), Some(amount))?;

        self.store.transaction(|tx| {
            let source = tx.find_by_id_and_user(source_registry_id, user_id)?;
            let target = tx.find_by_id_and_user(target_registry_id, user_id)?;

            let mut source = source.ok_or_else(|| {
                LedgerError::registry_not_found(source_registry_id, user_id, Some(RegistryRole::Source))
            })?;
            let mut target = target.ok_or_else(|| {
                LedgerError::registry_not_found(target_registry_id, user_id, Some(RegistryRole::Target))
            })?;

            if !source.can_cover(amount) {
                return Err(LedgerError::InsufficientFunds {
                    available: source.amount,
                    requested: amount,
                });
            }

            source.debit(amount)?;
            target.credit(amount)?;
            tx.save_atomic(&[source, target])
        })
    }
}
