// Wallet gateway
//
// A second HTTP service that creates wallets, signs transfers on behalf of
// their owners and forwards them to the ledger server.

pub mod client;
pub mod handlers;
pub mod routes;

pub use client::{GatewayError, LedgerClient};
pub use routes::configure_routes;
