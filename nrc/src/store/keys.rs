// Copyright (c) 2024 Botho Foundation

//! Typed storage keys.
//!
//! Every persisted value lives under exactly one `StorageKey`. Keys are
//! encoded to the textual layout below; block and entry indices are written
//! in canonical decimal and addresses in lowercase hex, which keeps the
//! encoding injective and lets `decode` invert it exactly.
//!
//! | Key                        | Encoding            |
//! |----------------------------|---------------------|
//! | `Supply`                   | `supply`            |
//! | `BlockCounter`             | `block/NRC`         |
//! | `LastSeenHeight`           | `block/height`      |
//! | `PoolBalance`              | `balance/pool`      |
//! | `Balance(addr)`            | `balance/<addr>`    |
//! | `Credit(b)`                | `credit/<b>`        |
//! | `ReporterCount(b)`         | `<b>/cnt`           |
//! | `EntryTimestamp(b, i)`     | `<b>/<i>/ts`        |
//! | `EntryReporter(b, i)`      | `<b>/<i>/addr`      |
//! | `EntryLocation(b, i)`      | `<b>/<i>/geo`       |
//! | `Ticket(addr)`             | `ticket/<addr>`     |

use std::fmt;
use std::str::FromStr;

use super::StoreError;
use crate::address::Address;

const POOL: &str = "pool";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StorageKey {
    /// Total minted supply
    Supply,
    /// Logical block counter
    BlockCounter,
    /// Last chain height that advanced the logical block counter
    LastSeenHeight,
    /// Minted but undistributed supply
    PoolBalance,
    /// Balance of an account
    Balance(Address),
    /// Credit escrowed for a logical block
    Credit(u64),
    /// Number of journal entries (reporters) in a logical block
    ReporterCount(u64),
    /// Timestamp of entry `i` (1-based) in a logical block
    EntryTimestamp(u64, u64),
    /// Reporter of entry `i` (1-based) in a logical block
    EntryReporter(u64, u64),
    /// Location payload of entry `i` (1-based) in a logical block
    EntryLocation(u64, u64),
    /// Last logical block for which an account's ticket is valid
    Ticket(Address),
}

impl StorageKey {
    pub fn encode(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, StoreError> {
        let s = std::str::from_utf8(bytes)
            .map_err(|_| StoreError::UnknownKey(hex::encode(bytes)))?;
        s.parse()
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Supply => f.write_str("supply"),
            Self::BlockCounter => f.write_str("block/NRC"),
            Self::LastSeenHeight => f.write_str("block/height"),
            Self::PoolBalance => write!(f, "balance/{POOL}"),
            Self::Balance(addr) => write!(f, "balance/{addr}"),
            Self::Credit(block) => write!(f, "credit/{block}"),
            Self::ReporterCount(block) => write!(f, "{block}/cnt"),
            Self::EntryTimestamp(block, i) => write!(f, "{block}/{i}/ts"),
            Self::EntryReporter(block, i) => write!(f, "{block}/{i}/addr"),
            Self::EntryLocation(block, i) => write!(f, "{block}/{i}/geo"),
            Self::Ticket(addr) => write!(f, "ticket/{addr}"),
        }
    }
}

impl FromStr for StorageKey {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || StoreError::UnknownKey(s.to_string());
        let parts: Vec<&str> = s.split('/').collect();

        let key = match parts.as_slice() {
            ["supply"] => Self::Supply,
            ["block", "NRC"] => Self::BlockCounter,
            ["block", "height"] => Self::LastSeenHeight,
            ["balance", POOL] => Self::PoolBalance,
            ["balance", addr] => Self::Balance(parse_address(addr).ok_or_else(unknown)?),
            ["ticket", addr] => Self::Ticket(parse_address(addr).ok_or_else(unknown)?),
            ["credit", block] => Self::Credit(parse_index(block).ok_or_else(unknown)?),
            [block, "cnt"] => Self::ReporterCount(parse_index(block).ok_or_else(unknown)?),
            [block, i, field] => {
                let block = parse_index(block).ok_or_else(unknown)?;
                let i = parse_index(i).ok_or_else(unknown)?;
                match *field {
                    "ts" => Self::EntryTimestamp(block, i),
                    "addr" => Self::EntryReporter(block, i),
                    "geo" => Self::EntryLocation(block, i),
                    _ => return Err(unknown()),
                }
            }
            _ => return Err(unknown()),
        };
        Ok(key)
    }
}

/// Canonical decimal only: no sign, no leading zeros.
fn parse_index(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}

/// Canonical lowercase hex only.
fn parse_address(s: &str) -> Option<Address> {
    if s.len() != 2 * crate::address::ADDRESS_LEN
        || !s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return None;
    }
    s.parse().ok()
}
