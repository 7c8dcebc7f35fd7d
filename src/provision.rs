// 🌱 Provisioning - registries are created here, never by the ledger itself
//
// CSV layout: label,user_id,amount (header row required)

use crate::error::LedgerResult;
use crate::registry::Registry;
use crate::store::RegistryStore;
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RegistrySeed {
    label: String,
    user_id: String,
    #[serde(with = "rust_decimal::serde::str")]
    amount: Decimal,
}

pub fn load_registries_csv(csv_path: &Path) -> Result<Vec<Registry>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;
    load_registries_from_reader(file)
}

pub fn load_registries_from_reader<R: Read>(reader: R) -> Result<Vec<Registry>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut registries = Vec::new();
    for (line, result) in rdr.deserialize::<RegistrySeed>().enumerate() {
        let seed: RegistrySeed =
            result.with_context(|| format!("Failed to deserialize registry on row {}", line + 1))?;
        registries.push(Registry::new(&seed.label, &seed.user_id, seed.amount));
    }

    Ok(registries)
}

/// Insert `registries` in order as one batch; a rejected row leaves the store untouched
pub fn provision<S: RegistryStore>(store: &S, registries: &[Registry]) -> LedgerResult<usize> {
    let inserted = store.insert_all(registries)?;
    tracing::info!(count = inserted, "registries provisioned");
    Ok(inserted)
}
