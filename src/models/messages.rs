use actix::Message;
use serde::{Deserialize, Serialize};

use super::game_state::{GameId, GameState, GameSummary};
use crate::game::{ChessMove, TeamColor};

/// A command sent by a client over the WebSocket.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserGameCommand {
    pub auth_token: String,
    #[serde(rename = "gameID")]
    pub game_id: GameId,
    #[serde(flatten)]
    pub action: GameAction,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "commandType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameAction {
    Connect,
    MakeMove {
        #[serde(rename = "move")]
        chess_move: ChessMove,
    },
    Resign,
    Leave,
}

impl GameAction {
    pub fn name(&self) -> &'static str {
        match self {
            GameAction::Connect => "CONNECT",
            GameAction::MakeMove { .. } => "MAKE_MOVE",
            GameAction::Resign => "RESIGN",
            GameAction::Leave => "LEAVE",
        }
    }
}

/// A message sent from server to client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "serverMessageType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    Notification {
        message: String,
    },
    Error {
        #[serde(rename = "errorMessage")]
        error_message: String,
    },
    LoadGame {
        game: GameState,
    },
}

impl ServerMessage {
    pub fn notification(message: impl Into<String>) -> Self {
        ServerMessage::Notification {
            message: message.into(),
        }
    }

    /// Prefixes the text with "Error: ".
    pub fn error(reason: impl std::fmt::Display) -> Self {
        ServerMessage::Error {
            error_message: format!("Error: {}", reason),
        }
    }

    pub fn load_game(game: GameState) -> Self {
        ServerMessage::LoadGame { game }
    }
}

/// Serialized text pushed to a WebSocket session actor.
#[derive(Message)]
#[rtype(result = "()")]
pub struct ChessWebSocketMessage(pub String);

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateGameRequest {
    pub game_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateGameResponse {
    #[serde(rename = "gameID")]
    pub game_id: GameId,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct JoinGameRequest {
    pub player_color: Option<TeamColor>,
    #[serde(rename = "gameID")]
    pub game_id: Option<GameId>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ListGamesResponse {
    pub games: Vec<GameSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{ChessPosition, PieceType};

    #[test]
    fn test_decode_commands() {
        let connect: UserGameCommand =
            serde_json::from_str(r#"{"commandType":"CONNECT","authToken":"abc","gameID":4}"#)
                .unwrap();
        assert_eq!(connect.action, GameAction::Connect);
        assert_eq!(connect.game_id, 4);
        assert_eq!(connect.auth_token, "abc");

        let make_move: UserGameCommand = serde_json::from_str(
            r#"{
                "commandType": "MAKE_MOVE",
                "authToken": "abc",
                "gameID": 4,
                "move": {
                    "startPosition": {"row": 7, "col": 5},
                    "endPosition": {"row": 8, "col": 5},
                    "promotionPiece": "KNIGHT"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(
            make_move.action,
            GameAction::MakeMove {
                chess_move: ChessMove::new(
                    ChessPosition::new(7, 5),
                    ChessPosition::new(8, 5),
                    Some(PieceType::Knight)
                )
            }
        );

        let leave: UserGameCommand =
            serde_json::from_str(r#"{"commandType":"LEAVE","authToken":"x","gameID":1}"#).unwrap();
        assert_eq!(leave.action.name(), "LEAVE");
    }

    #[test]
    fn test_reject_malformed_commands() {
        assert!(serde_json::from_str::<UserGameCommand>(
            r#"{"commandType":"DANCE","authToken":"abc","gameID":4}"#
        )
        .is_err());
        assert!(serde_json::from_str::<UserGameCommand>(
            r#"{"commandType":"MAKE_MOVE","authToken":"abc","gameID":4}"#
        )
        .is_err());
        assert!(serde_json::from_str::<UserGameCommand>(
            r#"{"commandType":"MAKE_MOVE","authToken":"abc","gameID":4,
                "move":{"startPosition":{"row":0,"col":1},"endPosition":{"row":1,"col":1}}}"#
        )
        .is_err());
    }

    #[test]
    fn test_encode_server_messages() {
        let error = serde_json::to_value(ServerMessage::error("unauthorized")).unwrap();
        assert_eq!(error["serverMessageType"], "ERROR");
        assert_eq!(error["errorMessage"], "Error: unauthorized");

        let note = serde_json::to_value(ServerMessage::notification("hi")).unwrap();
        assert_eq!(note["serverMessageType"], "NOTIFICATION");
        assert_eq!(note["message"], "hi");
    }
}
