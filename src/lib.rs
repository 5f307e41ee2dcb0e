//! Single-node proof-of-work ledger.
//!
//! The [`blockchain`] module holds the ledger engine, [`api`] exposes it over
//! HTTP, [`wallet`] manages keys and addresses, and [`gateway`] is the wallet
//! service that forwards signed transfers to the ledger.

pub mod api;
pub mod blockchain;
pub mod config;
pub mod gateway;
pub mod wallet;
