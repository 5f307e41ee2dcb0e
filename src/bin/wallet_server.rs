use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use clap::Parser;
use log::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use pow_ledger::api::handlers::TransactionRequest;
use pow_ledger::config::WalletServerArgs;
use pow_ledger::gateway::{self, LedgerClient};

#[derive(OpenApi)]
#[openapi(
    paths(
        gateway::handlers::create_wallet,
        gateway::handlers::create_transaction,
        gateway::handlers::get_wallet_balance
    ),
    components(
        schemas(
            gateway::handlers::WalletResponse,
            gateway::handlers::WalletTransactionRequest,
            gateway::handlers::BalanceResponse,
            TransactionRequest
        )
    ),
    tags(
        (name = "wallet", description = "Wallet gateway endpoints")
    ),
    info(
        title = "Wallet API",
        version = "1.0.0",
        description = "Creates wallets and forwards signed transfers to the ledger"
    )
)]
struct ApiDoc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = WalletServerArgs::parse();
    let client = web::Data::new(LedgerClient::new(args.gateway.as_str())?);

    info!(
        "Starting wallet server at http://{}:{} (ledger at {})",
        args.host,
        args.port,
        client.gateway()
    );

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .app_data(client.clone())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
            .configure(gateway::configure_routes)
    })
    .bind((args.host.as_str(), args.port))?
    .run()
    .await?;

    Ok(())
}
