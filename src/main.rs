use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

// Use library instead of local modules
use budget_ledger::{
    init_tracing, load_registries_csv, provision, Ledger, LedgerConfig, SqliteRegistryStore,
};

const USAGE: &str = "usage:
  budget-ledger init
  budget-ledger import <registries.csv>
  budget-ledger list <user_id>
  budget-ledger recharge <user_id> <registry_id> <amount>
  budget-ledger transfer <user_id> <source_registry_id> <target_registry_id> <amount>

config: BUDGET_LEDGER_CONFIG=<file.toml>, BUDGET_LEDGER_DB, BUDGET_LEDGER_LOG";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    let config_path = env::var("BUDGET_LEDGER_CONFIG").ok().map(PathBuf::from);
    let config = LedgerConfig::load(config_path.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.log_filter);

    let command: Vec<&str> = args.iter().map(String::as_str).collect();
    match command.as_slice() {
        ["init"] => run_init(&config.database_path),
        ["import", csv_path] => run_import(&config.database_path, Path::new(csv_path)),
        ["list", user_id] => run_list(&config.database_path, user_id),
        ["recharge", user_id, registry_id, amount] => {
            run_recharge(&config.database_path, user_id, registry_id, parse_amount(amount)?)
        }
        ["transfer", user_id, source, target, amount] => {
            run_transfer(&config.database_path, user_id, source, target, parse_amount(amount)?)
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}

fn parse_amount(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw).with_context(|| format!("'{}' is not a decimal amount", raw))
}

fn open_ledger(db_path: &Path) -> Result<Ledger<SqliteRegistryStore>> {
    if !db_path.exists() {
        bail!(
            "database not found at {} (run `budget-ledger init` first)",
            db_path.display()
        );
    }
    let store = SqliteRegistryStore::open(db_path).context("Failed to open database")?;
    Ok(Ledger::new(store))
}

fn run_init(db_path: &Path) -> Result<()> {
    println!("🔧 Setting up database...");
    SqliteRegistryStore::open(db_path).context("Failed to initialise database")?;
    println!("✓ Database ready at {} (WAL mode)", db_path.display());
    Ok(())
}

fn run_import(db_path: &Path, csv_path: &Path) -> Result<()> {
    println!("📂 Loading registries from {}...", csv_path.display());
    let registries = load_registries_csv(csv_path)?;
    println!("✓ Loaded {} registries from CSV", registries.len());

    let store = SqliteRegistryStore::open(db_path).context("Failed to open database")?;
    let inserted = provision(&store, &registries)?;

    for registry in &registries {
        println!("  {}  {}  (user {})  {}", registry.id, registry.label, registry.user_id, registry.amount);
    }
    println!("✅ Provisioned {} registries (database now holds {})", inserted, store.count()?);
    Ok(())
}

fn run_list(db_path: &Path, user_id: &str) -> Result<()> {
    let ledger = open_ledger(db_path)?;

    for view in ledger.list_by_user(user_id)? {
        println!("{}: {}  [{}]", view.label, view.amount, view.id);
    }
    Ok(())
}

fn run_recharge(db_path: &Path, user_id: &str, registry_id: &str, amount: Decimal) -> Result<()> {
    let ledger = open_ledger(db_path)?;
    ledger.recharge(user_id, registry_id, amount)?;
    println!("✅ Recharged {} with {}", registry_id, amount);
    Ok(())
}

fn run_transfer(
    db_path: &Path,
    user_id: &str,
    source: &str,
    target: &str,
    amount: Decimal,
) -> Result<()> {
    let ledger = open_ledger(db_path)?;
    ledger.transfer(user_id, source, target, amount)?;
    println!("✅ Transferred {} from {} to {}", amount, source, target);
    Ok(())
}
