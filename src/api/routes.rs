use actix_web::web;

use super::handlers;

/// Configures the ledger routes
///
/// # Arguments
///
/// * `cfg` - The service configuration
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::get_chain))
        .route("/chain", web::get().to(handlers::get_chain))
        .service(
            web::resource("/transactions")
                .route(web::get().to(handlers::get_transactions))
                .route(web::post().to(handlers::new_transaction)),
        )
        .route("/mine", web::get().to(handlers::mine_block))
        .route("/mine/start", web::get().to(handlers::start_mining))
        .route("/mine/stop", web::get().to(handlers::stop_mining))
        .route("/amount", web::get().to(handlers::get_amount));
}
