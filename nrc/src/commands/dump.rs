use anyhow::Result;
use std::path::Path;

use crate::address::Address;
use crate::store::{decode_u64, StorageKey, Store};

/// Print every stored key with its decoded value
pub fn run(config_path: &Path) -> Result<()> {
    let contract = super::open_contract(config_path)?;

    for (key, value) in contract.store().entries()? {
        println!("{:<48} {}", key.to_string(), render(&key, &value)?);
    }

    Ok(())
}

fn render(key: &StorageKey, value: &[u8]) -> Result<String> {
    let rendered = match key {
        StorageKey::EntryReporter(..) => Address::try_from(value)
            .map(|a| a.to_hex())
            .unwrap_or_else(|_| format!("0x{}", hex::encode(value))),
        StorageKey::EntryLocation(..) => match std::str::from_utf8(value) {
            Ok(text) if !text.chars().any(char::is_control) => format!("{:?}", text),
            _ => format!("0x{}", hex::encode(value)),
        },
        _ => decode_u64(key, value)?.to_string(),
    };
    Ok(rendered)
}
