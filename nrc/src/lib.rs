// Copyright (c) 2024 Botho Foundation

//! NRC ledger library - a ticket-gated geolocation journal with a capped,
//! block-paced token.
//!
//! This library provides the ledger engine (emission, settlement, tickets,
//! journal and balances), its storage backends, and the CLI commands that
//! drive it against a local LMDB store.

#![deny(clippy::print_stdout)]

pub mod address;
pub mod config;
pub mod contract;
pub mod store;

// Re-export commands module for CLI binary
pub mod commands;
