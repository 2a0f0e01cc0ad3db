//! Application layer orchestrating the ledger's use cases.
//!
//! Everything is exposed through `LedgerService`; each submodule adds one
//! group of operations to it over the storage ports in `domain::ports`.

pub mod access;
pub mod catalog;
pub mod contests;
pub mod locks;
pub mod payments;
pub mod service;
pub mod teams;
pub mod wallet;

#[cfg(test)]
pub(crate) mod test_support;
