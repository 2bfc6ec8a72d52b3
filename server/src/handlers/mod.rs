use crate::connection::ws_index;
use crate::handlers::admin::configure_admin_handlers;
use crate::handlers::health::configure_health_handlers;
use actix_cors::Cors;
use actix_web::web;

mod admin;
mod health;

pub fn root(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws/").route(web::get().to(ws_index)));

    configure_health_handlers(cfg);
    configure_admin_handlers(cfg);
}

pub fn cors(origins: &[String]) -> Cors {
    origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST"])
        .allow_any_header()
        .supports_credentials()
}
