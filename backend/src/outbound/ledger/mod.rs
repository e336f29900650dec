//! Ledger engine adapters implementing the `LedgerStore` port.

mod dto;
mod http_engine;
mod in_memory;

pub use http_engine::{HttpLedgerEngine, LedgerClientBuildError};
pub use in_memory::InMemoryLedgerEngine;
