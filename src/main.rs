use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use clap::Parser;
use log::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use pow_ledger::api;
use pow_ledger::blockchain::{self, Blockchain, BlockchainError, MiningScheduler};
use pow_ledger::config::{LedgerArgs, LedgerConfig};
use pow_ledger::wallet::Wallet;

// Initialize the blockchain with a genesis block, owned by a fresh miner wallet
fn initialize_blockchain(config: LedgerConfig) -> Result<Blockchain, BlockchainError> {
    let miner_wallet = Wallet::new();

    info!("Miner private key: {}", miner_wallet.private_key_hex());
    info!("Miner public key: {}", miner_wallet.public_key_hex());
    info!("Miner address: {}", miner_wallet.address());

    Blockchain::new(miner_wallet.address(), config)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::get_chain,
        api::handlers::get_transactions,
        api::handlers::new_transaction,
        api::handlers::mine_block,
        api::handlers::start_mining,
        api::handlers::stop_mining,
        api::handlers::get_amount
    ),
    components(
        schemas(
            blockchain::Block,
            blockchain::Transaction,
            api::handlers::ChainResponse,
            api::handlers::TransactionsResponse,
            api::handlers::TransactionRequest,
            api::handlers::MineResponse,
            api::handlers::AmountResponse
        )
    ),
    tags(
        (name = "ledger", description = "Ledger API endpoints")
    ),
    info(
        title = "Ledger API",
        version = "1.0.0",
        description = "A single-node proof-of-work ledger",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
struct ApiDoc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = LedgerArgs::parse();
    let config = args.ledger_config();

    let blockchain = initialize_blockchain(config.clone())?;
    let scheduler = web::Data::new(MiningScheduler::new(blockchain.clone(), config.mining_interval));
    let blockchain = web::Data::new(blockchain);

    info!("Starting HTTP server at http://{}:{}", args.host, args.port);

    let app_scheduler = scheduler.clone();
    HttpServer::new(move || {
        // Configure CORS
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .app_data(blockchain.clone())
            .app_data(app_scheduler.clone())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
            .configure(api::configure_routes)
    })
    .bind((args.host.as_str(), args.port))?
    .run()
    .await?;

    scheduler.stop();
    info!("Ledger server stopped");

    Ok(())
}
