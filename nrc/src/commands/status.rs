use anyhow::Result;
use std::path::Path;

use crate::contract::{TOKEN_NAME, TOKEN_SYMBOL};
use crate::store::{decode_u64, StorageKey, Store};

/// Show ledger status
pub fn run(config_path: &Path) -> Result<()> {
    let contract = super::open_contract(config_path)?;
    let params = contract.params();
    let state = contract.state();

    let supply = state.supply()?;
    let pool = state.pool()?;

    // Escrowed credit and account balances are only reachable by scanning
    let mut escrowed = 0u64;
    let mut balances = 0u64;
    let mut accounts = 0usize;
    for (key, value) in contract.store().entries()? {
        match key {
            StorageKey::Credit(_) => escrowed = escrowed.saturating_add(decode_u64(&key, &value)?),
            StorageKey::Balance(_) => {
                balances = balances.saturating_add(decode_u64(&key, &value)?);
                accounts += 1;
            }
            _ => {}
        }
    }

    println!();
    println!("=== {} ({}) Status ===", TOKEN_NAME, TOKEN_SYMBOL);
    println!();
    if supply == 0 {
        println!("  Not deployed. Run 'nrc invoke deploy' as {}.", params.admin);
        println!();
        return Ok(());
    }
    println!("Emission:");
    println!("  Supply: {} / {}", supply, params.maximum_supply);
    println!("  Per block: {}", params.generation_per_block);
    println!();
    println!("Blocks:");
    println!("  Logical block: {}", state.current_block()?);
    match state.last_seen_height()? {
        Some(height) => println!("  Last seen height: {}", height),
        None => println!("  Last seen height: (none)"),
    }
    println!();
    println!("Accounting:");
    println!("  Pool: {}", pool);
    println!("  Accounts: {} holding {}", accounts, balances);
    println!("  Escrowed credit: {}", escrowed);
    let total = balances as u128 + pool as u128 + escrowed as u128;
    if total == supply as u128 {
        println!("  Conservation: ok");
    } else {
        println!("  Conservation: MISMATCH (accounted {}, supply {})", total, supply);
    }
    println!();
    println!("Tickets:");
    println!("  Fee per block: {}", params.fee_per_block);
    println!();

    Ok(())
}
