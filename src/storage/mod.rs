//! The persistence collaborator: users, auth tokens and games behind traits,
//! so the services and the session protocol never depend on a particular
//! storage technology.

mod memory;

pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};

use crate::game::TeamColor;
use crate::models::{GameId, GameRecord, GameSummary};

#[derive(Debug, thiserror::Error)]
pub enum DataAccessError {
    #[error("username {0} is already taken")]
    UsernameTaken(String),
    #[error("game {0} does not exist")]
    GameNotFound(GameId),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    /// PHC-formatted hash, never the plain password.
    pub password_hash: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRecord {
    pub username: String,
    pub auth_token: String,
}

pub trait UserStore: Send + Sync {
    /// Fails with `UsernameTaken` if the username already exists.
    fn create_user(&self, user: UserRecord) -> Result<(), DataAccessError>;
    fn get_user(&self, username: &str) -> Result<Option<UserRecord>, DataAccessError>;
}

pub trait AuthStore: Send + Sync {
    /// Issues a fresh token for `username`.
    fn create_auth(&self, username: &str) -> Result<AuthRecord, DataAccessError>;
    fn resolve_auth(&self, token: &str) -> Result<Option<String>, DataAccessError>;
    fn delete_auth(&self, token: &str) -> Result<(), DataAccessError>;
}

pub trait GameStore: Send + Sync {
    fn create_game(&self, name: &str) -> Result<GameId, DataAccessError>;
    fn get_game(&self, id: GameId) -> Result<Option<GameRecord>, DataAccessError>;
    /// Replaces the stored record with the same id.
    fn put_game(&self, record: &GameRecord) -> Result<(), DataAccessError>;
    fn list_games(&self) -> Result<Vec<GameSummary>, DataAccessError>;
    fn set_active(&self, id: GameId, active: bool) -> Result<(), DataAccessError>;
    /// Seats `username` as `color`, or empties the seat when `None`.
    fn set_seat(
        &self,
        id: GameId,
        color: TeamColor,
        username: Option<String>,
    ) -> Result<(), DataAccessError>;
}

pub trait Store: UserStore + AuthStore + GameStore {
    /// Drops every user, token and game.
    fn clear(&self) -> Result<(), DataAccessError>;
}
