use actix_web::{middleware, web, App, HttpServer};

use collab_server::config::Config;
use collab_server::handlers::{cors, root};
use collab_server::server::spawn_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Invalid configuration ({}), using defaults", e);
        Config::default()
    });
    let address = config.server_address();
    let origins = config.cors_origin_list();
    let config = web::Data::new(config);

    let srv_tx = web::Data::new(spawn_server());

    log::info!("Listening on http://{}", address);
    HttpServer::new(move || {
        App::new()
            .wrap(cors(&origins))
            .wrap(middleware::Logger::default())
            .app_data(srv_tx.clone())
            .app_data(config.clone())
            .configure(root)
    })
    .bind(address)?
    .run()
    .await
}
