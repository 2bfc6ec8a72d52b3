use crate::admin::{AdminCommand, ServerStats};
use crate::server::{ServerCommand, ServerTx};
use actix_web::error;
use actix_web::{web, HttpResponse};
use actix_web::Result;
use system::RoomSnapshot;
use tokio::sync::oneshot;

pub fn configure_admin_handlers(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(web::resource("/rooms").route(web::get().to(list_rooms)))
            .service(web::resource("/stats").route(web::get().to(stats))),
    );
}

async fn ask<T>(
    srv_tx: &ServerTx,
    command: impl FnOnce(oneshot::Sender<T>) -> AdminCommand,
) -> Result<T> {
    let (tx, rx) = oneshot::channel::<T>();

    srv_tx
        .send(ServerCommand::Admin(command(tx)))
        .map_err(|_| error::ErrorInternalServerError("Internal Server Error"))?;

    rx.await
        .map_err(|_| error::ErrorInternalServerError("Receiver await error"))
}

async fn list_rooms(srv_tx: web::Data<ServerTx>) -> Result<HttpResponse> {
    let rooms: Vec<RoomSnapshot> = ask(&srv_tx, |tx| AdminCommand::ListRooms { tx }).await?;
    Ok(HttpResponse::Ok().json(rooms))
}

async fn stats(srv_tx: web::Data<ServerTx>) -> Result<HttpResponse> {
    let stats: ServerStats = ask(&srv_tx, |tx| AdminCommand::GetStats { tx }).await?;
    Ok(HttpResponse::Ok().json(stats))
}
