use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use super::game_state::GameId;
use crate::storage::{MemoryStore, Store};
use crate::websocket::ConnectionRegistry;

/// Application state shared between HTTP handlers and WebSocket sessions.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub connections: ConnectionRegistry,
    pub game_locks: GameLocks,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        AppState {
            store,
            connections: ConnectionRegistry::new(),
            game_locks: GameLocks::default(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }
}

/// One mutex per game, so a load-mutate-store cycle on a game never
/// interleaves with another on the same game. Different games never share
/// a lock.
///
/// Entries are never dropped, so a handler holding a lock and one arriving
/// later always agree on the mutex for a game id. Hand out locks only for
/// games the store knows.
#[derive(Default)]
pub struct GameLocks {
    locks: Mutex<HashMap<GameId, Arc<Mutex<()>>>>,
}

impl GameLocks {
    pub fn for_game(&self, game_id: GameId) -> Arc<Mutex<()>> {
        self.locks.lock().entry(game_id).or_default().clone()
    }

    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
