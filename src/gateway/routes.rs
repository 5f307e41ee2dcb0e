use actix_web::web;

use super::handlers;

/// Configures the wallet gateway routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/wallet", web::post().to(handlers::create_wallet))
        .route("/wallet/balance", web::get().to(handlers::get_wallet_balance))
        .route("/transaction", web::post().to(handlers::create_transaction));
}
