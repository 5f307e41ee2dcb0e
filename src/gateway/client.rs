use reqwest::{Client, StatusCode};
use thiserror::Error;

use std::time::Duration;

use crate::api::handlers::{AmountResponse, TransactionRequest};

/// Errors that can occur while talking to the ledger server
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Ledger responded with status {0}")]
    Ledger(StatusCode),
}

/// HTTP client for the ledger API
#[derive(Debug, Clone)]
pub struct LedgerClient {
    client: Client,
    gateway: String,
}

impl LedgerClient {
    pub fn new(gateway: impl Into<String>) -> Result<Self, GatewayError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(60)).build()?,
            gateway: gateway.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn gateway(&self) -> &str {
        &self.gateway
    }

    /// Posts a signed transaction and returns the ledger's status code
    pub async fn submit_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<StatusCode, GatewayError> {
        let response = self
            .client
            .post(format!("{}/transactions", self.gateway))
            .json(request)
            .send()
            .await?;

        Ok(response.status())
    }

    /// Asks the ledger for the balance of `address`
    pub async fn amount(&self, address: &str) -> Result<f64, GatewayError> {
        let response = self
            .client
            .get(format!("{}/amount", self.gateway))
            .query(&[("address", address)])
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(GatewayError::Ledger(response.status()));
        }

        let body: AmountResponse = response.json().await?;
        Ok(body.amount)
    }
}
