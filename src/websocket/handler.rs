use actix::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::{debug, info, warn};
use std::sync::Arc;
use uuid::Uuid;

use super::game_handlers::Session;
use crate::models::{AppState, ChessWebSocketMessage, ServerMessage, UserGameCommand};

/// WebSocket actor for one client connection.
pub struct ChessWebSocket {
    pub id: String,
    pub app_state: web::Data<AppState>,
    session: Option<Session>,
}

impl ChessWebSocket {
    pub fn new(app_state: web::Data<AppState>) -> Self {
        ChessWebSocket {
            id: Uuid::new_v4().to_string(),
            app_state,
            session: None,
        }
    }

    fn handle_text(&self, text: &str) {
        let Some(session) = &self.session else {
            return;
        };
        match serde_json::from_str::<UserGameCommand>(text) {
            Ok(command) => session.handle_command(&self.app_state, command),
            Err(e) => {
                warn!("Malformed command from {}: {}", self.id, e);
                session.reply(&ServerMessage::error(format!("malformed command: {}", e)));
            }
        }
    }
}

impl Actor for ChessWebSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let recipient = ctx.address().recipient::<ChessWebSocketMessage>();
        self.session = Some(Session::new(self.id.clone(), Arc::new(recipient)));
        info!("WebSocket connection started: {}", self.id);
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        self.app_state.connections.remove_session(&self.id);
        info!(
            "WebSocket connection closed: {} ({} still connected)",
            self.id,
            self.app_state.connections.len()
        );
        Running::Stop
    }
}

impl Handler<ChessWebSocketMessage> for ChessWebSocket {
    type Result = ();

    fn handle(&mut self, msg: ChessWebSocketMessage, ctx: &mut Self::Context) {
        debug!("Forwarding message to {}: {}", self.id, msg.0);
        ctx.text(msg.0);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ChessWebSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Pong(_)) => {}
            Ok(ws::Message::Text(text)) => self.handle_text(&text),
            Ok(ws::Message::Binary(_)) => {
                warn!("Ignoring binary frame from {}", self.id);
            }
            Ok(ws::Message::Close(reason)) => {
                info!("Client {} closed the connection: {:?}", self.id, reason);
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {}
            Err(e) => {
                warn!("WebSocket protocol error on {}: {}", self.id, e);
                ctx.stop();
            }
        }
    }
}

pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let actor = ChessWebSocket::new(app_state);
    info!("New WebSocket connection request: {}", actor.id);
    ws::start(actor, &req, stream)
}
