use serde::{Deserialize, Serialize};

use crate::game::{ChessGame, TeamColor};

pub type GameId = u32;

/// A stored game: its seats, its name, the engine state and whether play
/// may continue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    #[serde(rename = "gameID")]
    pub game_id: GameId,
    pub white_username: Option<String>,
    pub black_username: Option<String>,
    pub game_name: String,
    pub game: ChessGame,
    pub active: bool,
}

impl GameRecord {
    /// A new game from the standard setup with both seats empty.
    pub fn new(game_id: GameId, game_name: impl Into<String>) -> Self {
        GameRecord {
            game_id,
            white_username: None,
            black_username: None,
            game_name: game_name.into(),
            game: ChessGame::new(),
            active: true,
        }
    }

    pub fn seat(&self, color: TeamColor) -> Option<&str> {
        match color {
            TeamColor::White => self.white_username.as_deref(),
            TeamColor::Black => self.black_username.as_deref(),
        }
    }

    pub fn set_seat(&mut self, color: TeamColor, username: Option<String>) {
        match color {
            TeamColor::White => self.white_username = username,
            TeamColor::Black => self.black_username = username,
        }
    }

    /// The colors `username` is seated as. Someone who joined both seats plays both.
    pub fn seats_of(&self, username: &str) -> Vec<TeamColor> {
        [TeamColor::White, TeamColor::Black]
            .into_iter()
            .filter(|color| self.seat(*color) == Some(username))
            .collect()
    }

    /// "white", "black" or "an observer", as announced when someone connects.
    pub fn role_of(&self, username: &str) -> &'static str {
        if self.seat(TeamColor::White) == Some(username) {
            "white"
        } else if self.seat(TeamColor::Black) == Some(username) {
            "black"
        } else {
            "an observer"
        }
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            game_id: self.game_id,
            white_username: self.white_username.clone(),
            black_username: self.black_username.clone(),
            game_name: self.game_name.clone(),
        }
    }
}

/// The listing entry for a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    #[serde(rename = "gameID")]
    pub game_id: GameId,
    pub white_username: Option<String>,
    pub black_username: Option<String>,
    pub game_name: String,
}

/// What a client receives in a LOAD_GAME message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    #[serde(rename = "gameID")]
    pub game_id: GameId,
    pub white_username: Option<String>,
    pub black_username: Option<String>,
    pub game_name: String,
    pub active: bool,
    pub turn: TeamColor,
    pub game: ChessGame,
    pub fen: String,
}

impl From<&GameRecord> for GameState {
    fn from(record: &GameRecord) -> Self {
        GameState {
            game_id: record.game_id,
            white_username: record.white_username.clone(),
            black_username: record.black_username.clone(),
            game_name: record.game_name.clone(),
            active: record.active,
            turn: record.game.team_turn(),
            game: record.game.clone(),
            fen: record.game.board().to_placement(),
        }
    }
}
