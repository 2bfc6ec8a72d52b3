use actix::{Actor, ActorContext, AsyncContext, Handler, Message, Running, StreamHandler};
use actix_http::ws::Item;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;

use system::{decode_inbound, encode_outbound, new_connection_id, ConnectionId, OutboundEvent};

use crate::config::Config;
use crate::server::{ServerCommand, ServerTx};

#[derive(Message)]
#[rtype(result = "()")]
struct ConnectionActorMessage(OutboundEvent);

#[derive(Debug, PartialEq)]
enum Reassembled {
    Pending,
    Text(String),
    Binary(usize),
    Invalid(&'static str),
}

/// Joins a fragmented message back together, capped at `limit` bytes in total.
#[derive(Default)]
struct Fragments {
    pending: Option<(bool, Vec<u8>)>,
}

impl Fragments {
    fn push(&mut self, item: Item, limit: usize) -> Reassembled {
        let (first, chunk, last) = match item {
            Item::FirstText(chunk) => (Some(true), chunk, false),
            Item::FirstBinary(chunk) => (Some(false), chunk, false),
            Item::Continue(chunk) => (None, chunk, false),
            Item::Last(chunk) => (None, chunk, true),
        };

        match (first, self.pending.is_some()) {
            (Some(_), true) => {
                self.pending = None;
                return Reassembled::Invalid("new message started before the previous one ended");
            }
            (None, false) => return Reassembled::Invalid("continuation without a first fragment"),
            (Some(is_text), false) => self.pending = Some((is_text, Vec::new())),
            (None, true) => (),
        }

        let buffered = self.pending.as_ref().map_or(0, |(_, buf)| buf.len());
        if buffered + chunk.len() > limit {
            self.pending = None;
            return Reassembled::Invalid("message exceeds the frame size limit");
        }
        if let Some((_, buf)) = self.pending.as_mut() {
            buf.extend_from_slice(&chunk);
        }
        if !last {
            return Reassembled::Pending;
        }

        match self.pending.take() {
            Some((true, buf)) => match String::from_utf8(buf) {
                Ok(text) => Reassembled::Text(text),
                Err(_) => Reassembled::Invalid("text message is not valid UTF-8"),
            },
            Some((false, buf)) => Reassembled::Binary(buf.len()),
            None => Reassembled::Invalid("continuation without a first fragment"),
        }
    }
}

/// One WebSocket link. Ingress goes to the server task, egress comes back
/// through the outbox registered on start.
struct ConnectionActor {
    connection_id: ConnectionId,
    srv_tx: ServerTx,
    outbox_capacity: usize,
    max_frame_size: usize,
    fragments: Fragments,
}

impl ConnectionActor {
    fn submit(&self, command: ServerCommand) {
        if self.srv_tx.send(command).is_err() {
            log::error!(
                "Server task is gone, dropping command from {}",
                self.connection_id
            );
        }
    }

    fn ingest(&self, text: &str) {
        match decode_inbound(text) {
            Ok(event) => {
                log::debug!("Ingress from {}: {:?}", self.connection_id, event);
                self.submit(ServerCommand::Event {
                    from: self.connection_id,
                    event,
                });
            }
            Err(e) => {
                log::warn!("Dropping frame from {}: {}", self.connection_id, e);
            }
        }
    }
}

impl Actor for ConnectionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let (tx, mut rx) = tokio::sync::mpsc::channel::<OutboundEvent>(self.outbox_capacity);

        self.submit(ServerCommand::Connect {
            connection_id: self.connection_id,
            tx,
        });

        let addr = ctx.address();
        let connection_id = self.connection_id;

        // Awaiting the mailbox keeps events in the bounded outbox while the actor is busy.
        actix::spawn(async move {
            log::debug!("Egress for {} started", connection_id);
            while let Some(event) = rx.recv().await {
                if addr.send(ConnectionActorMessage(event)).await.is_err() {
                    break;
                }
            }
            log::debug!("Egress for {} terminated", connection_id);
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        self.submit(ServerCommand::Disconnect {
            from: self.connection_id,
        });

        Running::Stop
    }
}

/// Ingress
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ConnectionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Text(text)) => self.ingest(&text),
            Ok(ws::Message::Binary(bin)) => {
                log::debug!("Ignoring binary frame of {} bytes", bin.len());
            }
            Ok(ws::Message::Continuation(item)) => {
                match self.fragments.push(item, self.max_frame_size) {
                    Reassembled::Pending => (),
                    Reassembled::Text(text) => self.ingest(&text),
                    Reassembled::Binary(len) => {
                        log::debug!("Ignoring binary message of {} bytes", len);
                    }
                    Reassembled::Invalid(reason) => {
                        log::warn!(
                            "Dropping fragmented message from {}: {}",
                            self.connection_id,
                            reason
                        );
                    }
                }
            }
            Ok(ws::Message::Close(reason)) => {
                self.submit(ServerCommand::Disconnect {
                    from: self.connection_id,
                });
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Pong(_)) | Ok(ws::Message::Nop) => (),
            Err(ws::ProtocolError::Overflow) => {
                // The codec cannot resync after an oversized frame.
                log::warn!(
                    "Frame from {} exceeds {} bytes, closing",
                    self.connection_id,
                    self.max_frame_size
                );
                ctx.close(Some(ws::CloseCode::Size.into()));
                ctx.stop();
            }
            Err(e) => {
                log::warn!("Protocol error on {}: {}", self.connection_id, e);
                ctx.stop();
            }
        }
    }
}

/// Egress
impl Handler<ConnectionActorMessage> for ConnectionActor {
    type Result = ();

    fn handle(&mut self, msg: ConnectionActorMessage, ctx: &mut Self::Context) -> Self::Result {
        match encode_outbound(&msg.0) {
            Ok(text) => ctx.text(text),
            Err(e) => log::error!("{}", e),
        }
    }
}

pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    srv_tx: web::Data<ServerTx>,
    config: web::Data<Config>,
) -> Result<HttpResponse, Error> {
    let actor = ConnectionActor {
        connection_id: new_connection_id(),
        srv_tx: srv_tx.get_ref().clone(),
        outbox_capacity: config.outbox_capacity,
        max_frame_size: config.max_frame_size,
        fragments: Fragments::default(),
    };
    ws::WsResponseBuilder::new(actor, &req, stream)
        .frame_size(config.max_frame_size)
        .start()
}
