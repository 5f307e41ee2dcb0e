use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, HttpResponseBuilder, Responder};
use log::{error, warn};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::client::{GatewayError, LedgerClient};
use crate::api::handlers::{AmountQuery, TransactionRequest};
use crate::blockchain::Transaction;
use crate::wallet::Wallet;

/// Data structure for the ledger connection
pub type LedgerClientData = web::Data<LedgerClient>;

fn error_response(mut builder: HttpResponseBuilder, message: impl Into<String>) -> HttpResponse {
    builder.json(serde_json::json!({ "error": message.into() }))
}

/// Response for the create wallet endpoint
#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletResponse {
    /// The wallet's private key (hex encoded)
    pub private_key: String,

    /// The wallet's public key (hex of x followed by y)
    pub public_key: String,

    /// The wallet's address
    pub address: String,
}

impl From<&Wallet> for WalletResponse {
    fn from(wallet: &Wallet) -> Self {
        WalletResponse {
            private_key: wallet.private_key_hex(),
            public_key: wallet.public_key_hex(),
            address: wallet.address().to_string(),
        }
    }
}

/// Request for the wallet transaction endpoint
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransactionRequest {
    pub sender_private_key: Option<String>,
    pub sender_public_key: Option<String>,
    pub sender_address: Option<String>,
    pub recipient_address: Option<String>,

    /// Decimal amount, as typed by the user
    pub value: Option<String>,
}

impl WalletTransactionRequest {
    /// Signs the transfer and builds the request the ledger expects
    pub fn into_ledger_request(self) -> Result<TransactionRequest, String> {
        let (
            Some(sender_private_key),
            Some(sender_public_key),
            Some(sender_address),
            Some(recipient_address),
            Some(value),
        ) = (
            self.sender_private_key,
            self.sender_public_key,
            self.sender_address,
            self.recipient_address,
            self.value,
        )
        else {
            return Err("Missing transaction field".to_string());
        };

        let wallet = Wallet::from_private_key_hex(&sender_private_key).map_err(|e| e.to_string())?;
        if !wallet.public_key_hex().eq_ignore_ascii_case(&sender_public_key) {
            return Err("Public key does not match private key".to_string());
        }

        let value: f64 = value
            .trim()
            .parse()
            .map_err(|_| format!("Invalid value: {}", value))?;

        let transaction = Transaction::new(sender_address.as_str(), recipient_address.as_str(), value);
        let signature = wallet.sign(&transaction).map_err(|e| e.to_string())?;

        Ok(TransactionRequest {
            sender_address: Some(sender_address),
            recipient_address: Some(recipient_address),
            sender_public_key: Some(wallet.public_key_hex()),
            value: Some(value),
            signature: Some(signature.to_hex()),
        })
    }
}

/// Response for the wallet balance endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct BalanceResponse {
    pub message: String,
    pub amount: f64,
}

/// Create a new wallet
///
/// Creates a new wallet with a random keypair
///
/// The private key must be stored by your own
#[utoipa::path(
    post,
    path = "/wallet",
    responses(
        (status = 200, description = "Wallet created successfully", body = WalletResponse)
    )
)]
pub async fn create_wallet() -> impl Responder {
    let wallet = Wallet::new();
    HttpResponse::Ok().json(WalletResponse::from(&wallet))
}

/// Sign and submit a transaction
///
/// Signs the transfer with the sender's private key and forwards it to the
/// ledger; the ledger's status code is passed through
#[utoipa::path(
    post,
    path = "/transaction",
    request_body = WalletTransactionRequest,
    responses(
        (status = 201, description = "Transaction accepted by the ledger"),
        (status = 400, description = "Invalid transaction data"),
        (status = 500, description = "Ledger unreachable")
    )
)]
pub async fn create_transaction(
    client: LedgerClientData,
    transaction_req: web::Json<WalletTransactionRequest>,
) -> impl Responder {
    let request = match transaction_req.into_inner().into_ledger_request() {
        Ok(request) => request,
        Err(err) => {
            warn!("Rejected wallet transaction: {}", err);
            return error_response(HttpResponse::BadRequest(), err);
        }
    };

    match client.submit_transaction(&request).await {
        Ok(status) => {
            let status = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
            HttpResponse::build(status).finish()
        }
        Err(err) => {
            error!("Failed to forward transaction to {}: {}", client.gateway(), err);
            error_response(HttpResponse::InternalServerError(), err.to_string())
        }
    }
}

/// Get wallet balance
///
/// Returns the balance of a wallet as computed by the ledger
#[utoipa::path(
    get,
    path = "/wallet/balance",
    params(AmountQuery),
    responses(
        (status = 200, description = "Wallet balance retrieved successfully", body = BalanceResponse),
        (status = 400, description = "Missing address or ledger rejected the query"),
        (status = 500, description = "Ledger unreachable")
    )
)]
pub async fn get_wallet_balance(
    client: LedgerClientData,
    query: web::Query<AmountQuery>,
) -> impl Responder {
    let Some(address) = query.into_inner().address.filter(|address| !address.is_empty()) else {
        return error_response(HttpResponse::BadRequest(), "Missing address");
    };

    match client.amount(&address).await {
        Ok(amount) => HttpResponse::Ok().json(BalanceResponse {
            message: "success".to_string(),
            amount,
        }),
        Err(GatewayError::Ledger(status)) => {
            error_response(HttpResponse::BadRequest(), format!("Ledger responded with {}", status))
        }
        Err(err) => {
            error!("Failed to query balance from {}: {}", client.gateway(), err);
            error_response(HttpResponse::InternalServerError(), err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{Blockchain, MiningScheduler};
    use crate::config::LedgerConfig;
    use crate::gateway::configure_routes;
    use actix_web::{test, App, HttpServer};
    use std::time::Duration;

    /// Serves a fresh ledger on an ephemeral port
    fn spawn_ledger() -> (Blockchain, String) {
        let blockchain = Blockchain::new("miner", LedgerConfig::default()).unwrap();
        let scheduler = web::Data::new(MiningScheduler::new(
            blockchain.clone(),
            Duration::from_secs(60),
        ));
        let data = web::Data::new(blockchain.clone());

        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .app_data(scheduler.clone())
                .configure(crate::api::configure_routes)
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .unwrap();

        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());

        (blockchain, format!("http://{}", addr))
    }

    macro_rules! gateway {
        ($url:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(LedgerClient::new($url).unwrap()))
                    .configure(configure_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_create_wallet() {
        let app = gateway!("http://127.0.0.1:1");

        let req = test::TestRequest::post().uri("/wallet").to_request();
        let body: WalletResponse = test::call_and_read_body_json(&app, req).await;

        let wallet = Wallet::from_private_key_hex(&body.private_key).unwrap();
        assert_eq!(wallet.public_key_hex(), body.public_key);
        assert_eq!(wallet.address(), body.address);
    }

    #[actix_web::test]
    async fn test_transaction_round_trip() {
        let (blockchain, url) = spawn_ledger();
        let app = gateway!(url);
        let wallet = Wallet::new();

        let req = test::TestRequest::post()
            .uri("/transaction")
            .set_json(serde_json::json!({
                "senderPrivateKey": wallet.private_key_hex(),
                "senderPublicKey": wallet.public_key_hex(),
                "senderAddress": wallet.address(),
                "recipientAddress": "bob",
                "value": "5",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(
            blockchain.get_pending_transactions(),
            vec![Transaction::new(wallet.address(), "bob", 5.0)]
        );

        blockchain.mine().await.unwrap().unwrap();

        let req = test::TestRequest::get().uri("/wallet/balance?address=bob").to_request();
        let body: BalanceResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.message, "success");
        assert_eq!(body.amount, 5.0);
    }

    #[actix_web::test]
    async fn test_reject_bad_request() {
        let app = gateway!("http://127.0.0.1:1");
        let wallet = Wallet::new();
        let other = Wallet::new();

        let mismatched = serde_json::json!({
            "senderPrivateKey": wallet.private_key_hex(),
            "senderPublicKey": other.public_key_hex(),
            "senderAddress": wallet.address(),
            "recipientAddress": "bob",
            "value": "5",
        });
        let not_a_number = serde_json::json!({
            "senderPrivateKey": wallet.private_key_hex(),
            "senderPublicKey": wallet.public_key_hex(),
            "senderAddress": wallet.address(),
            "recipientAddress": "bob",
            "value": "five",
        });
        let missing = serde_json::json!({ "recipientAddress": "bob" });

        for body in [mismatched, not_a_number, missing] {
            let req = test::TestRequest::post().uri("/transaction").set_json(body).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }

        let req = test::TestRequest::get().uri("/wallet/balance").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_unreachable_ledger() {
        let app = gateway!("http://127.0.0.1:1");

        let req = test::TestRequest::get().uri("/wallet/balance?address=bob").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let wallet = Wallet::new();
        let req = test::TestRequest::post()
            .uri("/transaction")
            .set_json(serde_json::json!({
                "senderPrivateKey": wallet.private_key_hex(),
                "senderPublicKey": wallet.public_key_hex(),
                "senderAddress": wallet.address(),
                "recipientAddress": "bob",
                "value": "5",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
