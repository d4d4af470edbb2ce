use log::debug;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use super::{AuthRecord, AuthStore, DataAccessError, GameStore, Store, UserRecord, UserStore};
use crate::game::TeamColor;
use crate::models::{GameId, GameRecord, GameSummary};

struct GameTable {
    next_id: GameId,
    games: BTreeMap<GameId, GameRecord>,
}

impl Default for GameTable {
    fn default() -> Self {
        GameTable {
            next_id: 1,
            games: BTreeMap::new(),
        }
    }
}

/// Keeps everything in process memory. Game ids count up from 1.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
    // token -> record
    auths: RwLock<HashMap<String, AuthRecord>>,
    games: RwLock<GameTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_game<T>(
        &self,
        id: GameId,
        update: impl FnOnce(&mut GameRecord) -> T,
    ) -> Result<T, DataAccessError> {
        let mut table = self.games.write();
        let record = table
            .games
            .get_mut(&id)
            .ok_or(DataAccessError::GameNotFound(id))?;
        Ok(update(record))
    }
}

impl UserStore for MemoryStore {
    fn create_user(&self, user: UserRecord) -> Result<(), DataAccessError> {
        let mut users = self.users.write();
        if users.contains_key(&user.username) {
            return Err(DataAccessError::UsernameTaken(user.username));
        }
        users.insert(user.username.clone(), user);
        Ok(())
    }

    fn get_user(&self, username: &str) -> Result<Option<UserRecord>, DataAccessError> {
        Ok(self.users.read().get(username).cloned())
    }
}

impl AuthStore for MemoryStore {
    fn create_auth(&self, username: &str) -> Result<AuthRecord, DataAccessError> {
        let record = AuthRecord {
            username: username.to_string(),
            auth_token: Uuid::new_v4().simple().to_string(),
        };
        self.auths
            .write()
            .insert(record.auth_token.clone(), record.clone());
        Ok(record)
    }

    fn resolve_auth(&self, token: &str) -> Result<Option<String>, DataAccessError> {
        Ok(self
            .auths
            .read()
            .get(token)
            .map(|record| record.username.clone()))
    }

    fn delete_auth(&self, token: &str) -> Result<(), DataAccessError> {
        self.auths.write().remove(token);
        Ok(())
    }
}

impl GameStore for MemoryStore {
    fn create_game(&self, name: &str) -> Result<GameId, DataAccessError> {
        let mut table = self.games.write();
        let id = table.next_id;
        table.next_id += 1;
        table.games.insert(id, GameRecord::new(id, name));
        debug!("Stored new game {} ({})", id, name);
        Ok(id)
    }

    fn get_game(&self, id: GameId) -> Result<Option<GameRecord>, DataAccessError> {
        Ok(self.games.read().games.get(&id).cloned())
    }

    fn put_game(&self, record: &GameRecord) -> Result<(), DataAccessError> {
        self.with_game(record.game_id, |stored| *stored = record.clone())
    }

    fn list_games(&self) -> Result<Vec<GameSummary>, DataAccessError> {
        Ok(self
            .games
            .read()
            .games
            .values()
            .map(GameRecord::summary)
            .collect())
    }

    fn set_active(&self, id: GameId, active: bool) -> Result<(), DataAccessError> {
        self.with_game(id, |record| record.active = active)
    }

    fn set_seat(
        &self,
        id: GameId,
        color: TeamColor,
        username: Option<String>,
    ) -> Result<(), DataAccessError> {
        self.with_game(id, |record| record.set_seat(color, username))
    }
}

impl Store for MemoryStore {
    fn clear(&self) -> Result<(), DataAccessError> {
        self.users.write().clear();
        self.auths.write().clear();
        *self.games.write() = GameTable::default();
        Ok(())
    }
}
