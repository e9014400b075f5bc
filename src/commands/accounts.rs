// ABOUTME: Accounts command implementation.
// ABOUTME: Prints the fee payer inventory without leasing anything.

use zkapp_harness::config::Config;
use zkapp_harness::error::Result;
use zkapp_harness::pool::AccountInventory;

pub fn accounts(config: &Config) -> Result<()> {
    let path = config.inventory_path()?;
    let inventory = AccountInventory::load(&path)?;

    println!("Inventory: {}", path.display());
    println!("Fee payers: {}", inventory.len());
    for account in inventory.iter() {
        println!("  {}", account.public_key());
    }
    println!("Endpoint: {}", config.endpoint()?);
    println!("Key cache: {}", config.key_cache_dir().display());
    Ok(())
}
