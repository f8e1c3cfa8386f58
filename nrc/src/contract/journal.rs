// Copyright (c) 2024 Botho Foundation

//! Append-only geolocation journal.
//!
//! Each logical block holds a 1-based list of `(timestamp, reporter,
//! location)` entries. Entries are never rewritten; the per-block count is
//! the only index that changes, and it is the reporter count that settlement
//! divides the block's credit by.

use tracing::debug;

use super::ticket::ticket_valid_at;
use super::{require_witness, ContractError, ContractState, GeoRecord, Signer};
use crate::address::Address;
use crate::store::StorageKey;

/// Append a report to the current logical block. Returns the stored record.
pub fn post(
    state: &mut ContractState<'_>,
    signer: &dyn Signer,
    reporter: &Address,
    location: Vec<u8>,
    timestamp: u64,
) -> Result<GeoRecord, ContractError> {
    require_witness(signer, reporter)?;

    let block = state.current_block()?;
    let index = state
        .reporter_count(block)?
        .checked_add(1)
        .ok_or(ContractError::Overflow(StorageKey::ReporterCount(block)))?;

    let record = GeoRecord {
        block,
        index,
        timestamp,
        reporter: *reporter,
        location,
    };
    state.set_reporter_count(block, index);
    state.put_entry(&record);

    debug!(block, index, %reporter, timestamp, "Geolocation posted");
    Ok(record)
}

/// Open a query over the last `n_blocks` logical blocks, ending at the
/// current one.
///
/// The requester must hold a ticket valid through the current block. Records
/// are read lazily, block by block and in append order within each block.
pub fn query<'a, 's>(
    state: &'a ContractState<'s>,
    signer: &dyn Signer,
    requester: &Address,
    n_blocks: u64,
) -> Result<GeoRecords<'a, 's>, ContractError> {
    require_witness(signer, requester)?;

    if n_blocks == 0 {
        debug!("Invalid nBlocks");
        return Err(ContractError::Validation(
            "query must span at least one block".to_string(),
        ));
    }

    let current = state.current_block()?;
    if !ticket_valid_at(state, requester, current)? {
        debug!(%requester, block = current, "User does not hold a valid ticket");
        return Err(ContractError::TicketExpiredOrMissing(*requester));
    }

    let first = current.saturating_sub(n_blocks - 1).max(1);
    Ok(GeoRecords::new(state, first, current))
}

/// Lazy, single-pass walk over journal entries of an inclusive block range.
pub struct GeoRecords<'a, 's> {
    state: &'a ContractState<'s>,
    block: u64,
    last_block: u64,
    /// Next entry index within `block`
    index: u64,
    /// Entry count of `block`, read on entering the block
    count: Option<u64>,
    done: bool,
}

impl<'a, 's> GeoRecords<'a, 's> {
    fn new(state: &'a ContractState<'s>, first_block: u64, last_block: u64) -> Self {
        Self {
            state,
            block: first_block,
            last_block,
            index: 1,
            count: None,
            done: first_block > last_block,
        }
    }

    fn fail(&mut self, e: ContractError) -> Option<Result<GeoRecord, ContractError>> {
        self.done = true;
        Some(Err(e))
    }
}

impl Iterator for GeoRecords<'_, '_> {
    type Item = Result<GeoRecord, ContractError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let count = match self.count {
                Some(count) => count,
                None => match self.state.reporter_count(self.block) {
                    Ok(count) => *self.count.insert(count),
                    Err(e) => return self.fail(e),
                },
            };

            if self.index <= count {
                let record = self.state.entry(self.block, self.index);
                self.index += 1;
                return match record {
                    Ok(record) => Some(Ok(record)),
                    Err(e) => self.fail(e),
                };
            }

            if self.block >= self.last_block {
                self.done = true;
            } else {
                self.block += 1;
                self.index = 1;
                self.count = None;
            }
        }
        None
    }
}
