use log::{info, warn};
use parking_lot::Mutex;
use std::sync::Arc;

use super::connections::{send_message, Channel};
use crate::game::utils::{describe_move, PositionReport};
use crate::game::{ChessMove, InvalidMove};
use crate::models::{AppState, GameAction, GameId, GameRecord, GameState, ServerMessage, UserGameCommand};
use crate::service::auth::{authenticate, AuthError};
use crate::storage::DataAccessError;

/// Why a command was refused. Reported only to the client that sent it.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("invalid game id {0}")]
    InvalidGameId(GameId),
    #[error("game is over")]
    GameOver,
    #[error("you are not a player in this game")]
    NotAPlayer,
    #[error("wait your turn")]
    WaitYourTurn,
    #[error(transparent)]
    IllegalMove(#[from] InvalidMove),
    #[error("storage failure: {0}")]
    Storage(#[from] DataAccessError),
}

impl From<AuthError> for GateError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Unauthorized => GateError::Unauthorized,
            AuthError::Storage(e) => GateError::Storage(e),
        }
    }
}

/// One WebSocket client as the command handlers see it.
#[derive(Clone)]
pub struct Session {
    pub id: String,
    pub channel: Arc<dyn Channel>,
}

impl Session {
    pub fn new(id: impl Into<String>, channel: Arc<dyn Channel>) -> Self {
        Session {
            id: id.into(),
            channel,
        }
    }

    pub fn handle_command(&self, state: &AppState, command: UserGameCommand) {
        info!(
            "Session {} sent {} for game {}",
            self.id,
            command.action.name(),
            command.game_id
        );
        let UserGameCommand {
            auth_token,
            game_id,
            action,
        } = command;
        let outcome = match action {
            GameAction::Connect => self.handle_connect(state, &auth_token, game_id),
            GameAction::MakeMove { chess_move } => {
                self.handle_move(state, &auth_token, game_id, chess_move)
            }
            GameAction::Resign => self.handle_resign(state, &auth_token, game_id),
            GameAction::Leave => self.handle_leave(state, &auth_token, game_id),
        };
        if let Err(e) = outcome {
            warn!("Rejected command from session {}: {}", self.id, e);
            self.reply(&ServerMessage::error(e));
        }
    }

    /// Sends straight down this session's channel, registered or not.
    pub fn reply(&self, message: &ServerMessage) {
        if send_message(self.channel.as_ref(), message).is_err() {
            warn!("Session {} is closed; reply dropped", self.id);
        }
    }

    fn handle_connect(&self, state: &AppState, auth_token: &str, game_id: GameId) -> Result<(), GateError> {
        let (username, lock) = admit(state, auth_token, game_id)?;
        let _guard = lock.lock();
        let record = load_game(state, game_id)?;

        state
            .connections
            .add(game_id, &username, &self.id, self.channel.clone());
        let notice = format!("{} joined the game as {}\n", username, record.role_of(&username));
        state
            .connections
            .broadcast(game_id, Some(&username), &ServerMessage::notification(notice));
        state
            .connections
            .send_to_one(&username, &ServerMessage::load_game(GameState::from(&record)));
        Ok(())
    }

    fn handle_move(
        &self,
        state: &AppState,
        auth_token: &str,
        game_id: GameId,
        chess_move: ChessMove,
    ) -> Result<(), GateError> {
        let (username, lock) = admit(state, auth_token, game_id)?;
        let _guard = lock.lock();
        let mut record = load_game(state, game_id)?;
        if !record.active {
            return Err(GateError::GameOver);
        }
        let seats = record.seats_of(&username);
        if seats.is_empty() {
            return Err(GateError::NotAPlayer);
        }
        if !seats.contains(&record.game.team_turn()) {
            return Err(GateError::WaitYourTurn);
        }

        let moved = record
            .game
            .board()
            .get_piece(chess_move.start)
            .map(|piece| piece.piece_type);
        record.game.make_move(chess_move)?;

        let report = PositionReport::evaluate(&mut record.game);
        if report.ends_game() {
            record.active = false;
        }
        state.store.put_game(&record)?;
        info!("{} played {} in game {}", username, chess_move, game_id);

        let connections = &state.connections;
        connections.broadcast(game_id, None, &ServerMessage::load_game(GameState::from(&record)));
        if let Some(moved) = moved {
            let mut description = describe_move(&username, moved, &chess_move);
            description.push_str(&report.check_lines());
            connections.broadcast(game_id, Some(&username), &ServerMessage::notification(description));
        }
        if let Some(outcome) = report.outcome() {
            info!("Game {} is over: {}", game_id, outcome.trim_end());
            connections.broadcast(game_id, None, &ServerMessage::notification(outcome));
        }
        Ok(())
    }

    fn handle_resign(&self, state: &AppState, auth_token: &str, game_id: GameId) -> Result<(), GateError> {
        let (username, lock) = admit(state, auth_token, game_id)?;
        let _guard = lock.lock();
        let record = load_game(state, game_id)?;
        if !record.active {
            return Err(GateError::GameOver);
        }
        if record.seats_of(&username).is_empty() {
            return Err(GateError::NotAPlayer);
        }

        state.store.set_active(game_id, false)?;
        info!("{} resigned game {}", username, game_id);
        state.connections.broadcast(
            game_id,
            Some(&username),
            &ServerMessage::notification(format!("{} has resigned\n", username)),
        );
        self.reply(&ServerMessage::notification("You have resigned\n"));
        state.connections.remove(&username);
        Ok(())
    }

    fn handle_leave(&self, state: &AppState, auth_token: &str, game_id: GameId) -> Result<(), GateError> {
        let (username, lock) = admit(state, auth_token, game_id)?;
        let _guard = lock.lock();
        let record = load_game(state, game_id)?;
        for color in record.seats_of(&username) {
            state.store.set_seat(game_id, color, None)?;
            info!("{} gave up the {} seat in game {}", username, color, game_id);
        }

        state.connections.remove(&username);
        state.connections.broadcast(
            game_id,
            Some(&username),
            &ServerMessage::notification(format!("{} has left the game\n", username)),
        );
        Ok(())
    }
}

/// Checks the token and that the game exists, then hands out the game's lock.
/// Unknown games never get a lock entry. Callers re-load the record once they
/// hold the lock.
fn admit(
    state: &AppState,
    auth_token: &str,
    game_id: GameId,
) -> Result<(String, Arc<Mutex<()>>), GateError> {
    let username = authenticate(state.store.as_ref(), auth_token)?;
    load_game(state, game_id)?;
    Ok((username, state.game_locks.for_game(game_id)))
}

fn load_game(state: &AppState, game_id: GameId) -> Result<GameRecord, GateError> {
    state
        .store
        .get_game(game_id)?
        .ok_or(GateError::InvalidGameId(game_id))
}
