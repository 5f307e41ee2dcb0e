use actix_web::{web, HttpResponse, HttpResponseBuilder, Responder};
use log::{error, warn};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::blockchain::{
    Block, Blockchain, MiningScheduler, PublicKey, Transaction, TransactionOrigin,
    TransactionSignature,
};

/// Data structure for the blockchain state
pub type BlockchainData = web::Data<Blockchain>;

/// Data structure for the auto-mining loop
pub type SchedulerData = web::Data<MiningScheduler>;

fn error_response(mut builder: HttpResponseBuilder, message: impl Into<String>) -> HttpResponse {
    builder.json(serde_json::json!({ "error": message.into() }))
}

/// Response for the chain endpoint
#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChainResponse {
    /// The blocks in the chain
    pub chain: Vec<Block>,

    /// The length of the chain
    pub length: usize,

    /// Whether the chain is valid
    pub is_valid: bool,
}

/// Response for the pending transactions endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct TransactionsResponse {
    /// The pending transactions
    pub transactions: Vec<Transaction>,

    /// The number of pending transactions
    pub length: usize,
}

/// Request for the transaction endpoint
///
/// Every field is required; they are optional here so that a missing field is
/// reported as a rejected transaction rather than a parse failure.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// The sender's address
    pub sender_address: Option<String>,

    /// The recipient's address
    pub recipient_address: Option<String>,

    /// The sender's public key (hex of x followed by y)
    pub sender_public_key: Option<String>,

    /// The amount to transfer
    pub value: Option<f64>,

    /// Signature over the transaction (hex of r followed by s)
    pub signature: Option<String>,
}

impl TransactionRequest {
    /// Decodes the request into a transaction and its signed origin
    pub fn into_signed(self) -> Result<(Transaction, TransactionOrigin), String> {
        let (
            Some(sender_address),
            Some(recipient_address),
            Some(sender_public_key),
            Some(value),
            Some(signature),
        ) = (
            self.sender_address,
            self.recipient_address,
            self.sender_public_key,
            self.value,
            self.signature,
        )
        else {
            return Err("Missing transaction field".to_string());
        };

        let public_key = PublicKey::from_hex(&sender_public_key).map_err(|e| e.to_string())?;
        let signature = TransactionSignature::from_hex(&signature).map_err(|e| e.to_string())?;

        Ok((
            Transaction::new(sender_address, recipient_address, value),
            TransactionOrigin::UserSigned {
                public_key,
                signature,
            },
        ))
    }
}

/// Response for the mine endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct MineResponse {
    /// The message
    pub message: String,

    /// The newly mined block
    pub block: Block,
}

/// Query for the amount endpoint
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AmountQuery {
    /// The address whose balance is requested
    pub address: Option<String>,
}

/// Response for the amount endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct AmountResponse {
    /// The balance of the address
    pub amount: f64,
}

/// Get the full blockchain
///
/// Returns every block from genesis to the newest one
#[utoipa::path(
    get,
    path = "/chain",
    responses(
        (status = 200, description = "Blockchain retrieved successfully", body = ChainResponse)
    )
)]
pub async fn get_chain(blockchain: BlockchainData) -> impl Responder {
    let chain = blockchain.get_chain();

    let response = ChainResponse {
        length: chain.len(),
        chain,
        is_valid: blockchain.is_valid(),
    };

    HttpResponse::Ok().json(response)
}

/// Get all pending transactions
///
/// Returns all transactions waiting to be included in a block
#[utoipa::path(
    get,
    path = "/transactions",
    responses(
        (status = 200, description = "Pending transactions retrieved successfully", body = TransactionsResponse)
    )
)]
pub async fn get_transactions(blockchain: BlockchainData) -> impl Responder {
    let transactions = blockchain.get_pending_transactions();

    HttpResponse::Ok().json(TransactionsResponse {
        length: transactions.len(),
        transactions,
    })
}

/// Submit a signed transaction
///
/// Adds the transaction to the pool if its signature verifies
#[utoipa::path(
    post,
    path = "/transactions",
    request_body = TransactionRequest,
    responses(
        (status = 201, description = "Transaction accepted"),
        (status = 400, description = "Missing field or invalid signature")
    )
)]
pub async fn new_transaction(
    blockchain: BlockchainData,
    transaction_req: web::Json<TransactionRequest>,
) -> impl Responder {
    let (transaction, origin) = match transaction_req.into_inner().into_signed() {
        Ok(decoded) => decoded,
        Err(err) => {
            warn!("Malformed transaction request: {}", err);
            return error_response(HttpResponse::BadRequest(), err);
        }
    };

    match blockchain.add_transaction(transaction, &origin) {
        Ok(()) => HttpResponse::Created().json(serde_json::json!({
            "message": "Transaction added to the pool"
        })),
        Err(err) => error_response(
            HttpResponse::BadRequest(),
            format!("Failed to add transaction: {}", err),
        ),
    }
}

/// Mine a new block
///
/// Seals the pending transactions plus the mining reward into a block
#[utoipa::path(
    get,
    path = "/mine",
    responses(
        (status = 200, description = "Block mined successfully", body = MineResponse),
        (status = 400, description = "Transaction pool is empty"),
        (status = 500, description = "Mining failed")
    )
)]
pub async fn mine_block(blockchain: BlockchainData) -> impl Responder {
    match blockchain.mine().await {
        Ok(Some(block)) => HttpResponse::Ok().json(MineResponse {
            message: "Block was mined".to_string(),
            block,
        }),
        Ok(None) => error_response(
            HttpResponse::BadRequest(),
            "Block wasn't mined: transaction pool is empty",
        ),
        Err(err) => {
            error!("Mining failed: {}", err);
            error_response(
                HttpResponse::InternalServerError(),
                format!("Failed to mine block: {}", err),
            )
        }
    }
}

/// Start automatic mining
///
/// Seals the pool periodically until stopped
#[utoipa::path(
    get,
    path = "/mine/start",
    responses(
        (status = 200, description = "Automatic mining is running")
    )
)]
pub async fn start_mining(scheduler: SchedulerData) -> impl Responder {
    let message = if scheduler.start() {
        "Automatic mining started"
    } else {
        "Automatic mining is already running"
    };

    HttpResponse::Ok().json(serde_json::json!({ "message": message }))
}

/// Stop automatic mining
#[utoipa::path(
    get,
    path = "/mine/stop",
    responses(
        (status = 200, description = "Automatic mining is stopped")
    )
)]
pub async fn stop_mining(scheduler: SchedulerData) -> impl Responder {
    let message = if scheduler.stop() {
        "Automatic mining stopped"
    } else {
        "Automatic mining was not running"
    };

    HttpResponse::Ok().json(serde_json::json!({ "message": message }))
}

/// Get the balance of an address
///
/// Replays the whole chain to compute the balance
#[utoipa::path(
    get,
    path = "/amount",
    params(AmountQuery),
    responses(
        (status = 200, description = "Balance computed", body = AmountResponse),
        (status = 400, description = "Missing address")
    )
)]
pub async fn get_amount(blockchain: BlockchainData, query: web::Query<AmountQuery>) -> impl Responder {
    match query.into_inner().address.filter(|address| !address.is_empty()) {
        Some(address) => HttpResponse::Ok().json(AmountResponse {
            amount: blockchain.balance_of(&address),
        }),
        None => error_response(HttpResponse::BadRequest(), "Missing address"),
    }
}
