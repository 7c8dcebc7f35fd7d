// 🔎 Query Service - read-only listing of a user's registries

use crate::error::{LedgerError, LedgerResult};
use crate::registry::RegistryView;
use crate::store::RegistryStore;

/// Every registry owned by `user_id`, in creation order.
///
/// A user with no registries is an error, not an empty list.
pub fn list_by_user<S: RegistryStore>(store: &S, user_id: &str) -> LedgerResult<Vec<RegistryView>> {
    let views: Vec<RegistryView> = store
        .transaction(|tx| tx.find_by_user_id(user_id))?
        .iter()
        .map(RegistryView::from)
        .collect();

    if views.is_empty() {
        return Err(LedgerError::user_not_found(user_id));
    }

    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteRegistryStore;
    use crate::registry::Registry;
    use crate::store::MemoryRegistryStore;
    use rust_decimal_macros::dec;

    fn seed<S: RegistryStore>(store: &S) -> Vec<Registry> {
        let registries = vec![
            Registry::new("Wallet", "1", dec!(1000)),
            Registry::new("Savings", "1", dec!(5000)),
            Registry::new("Someone else's", "2", dec!(3)),
            Registry::new("Insurance policy", "1", dec!(0)),
            Registry::new("Food expenses", "1", dec!(0)),
        ];
        for registry in &registries {
            store.insert(registry).unwrap();
        }
        registries
    }

    fn check_listing<S: RegistryStore>(store: S) {
        let registries = seed(&store);

        let views = list_by_user(&store, "1").unwrap();
        let ids: Vec<&str> = views.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                registries[0].id.as_str(),
                registries[1].id.as_str(),
                registries[3].id.as_str(),
                registries[4].id.as_str(),
            ]
        );
        assert_eq!(views[1].label, "Savings");
        assert_eq!(views[1].amount, dec!(5000));

        // Repeatable
        assert_eq!(list_by_user(&store, "1").unwrap(), views);
    }

    #[test]
    fn test_listing_in_creation_order_memory() {
        check_listing(MemoryRegistryStore::new());
    }

    #[test]
    fn test_listing_in_creation_order_sqlite() {
        check_listing(SqliteRegistryStore::open_in_memory().unwrap());
    }

    #[test]
    fn test_listing_unknown_user_fails() {
        let store = MemoryRegistryStore::new();
        seed(&store);

        let err = list_by_user(&store, "2-and-a-half").unwrap_err();
        assert!(matches!(
            err,
            LedgerError::RegistryNotFound { registry_id: None, .. }
        ));

        let empty = SqliteRegistryStore::open_in_memory().unwrap();
        let err = list_by_user(&empty, "2").unwrap_err();
        assert_eq!(err.to_string(), "No registries found for userId: '2'");
    }
}
