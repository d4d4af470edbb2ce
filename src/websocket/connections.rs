use actix::Recipient;
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{ChessWebSocketMessage, GameId, ServerMessage};

#[derive(Debug, thiserror::Error)]
#[error("channel is closed")]
pub struct ChannelClosed;

/// The live, outbound half of a client connection.
pub trait Channel: Send + Sync {
    fn is_open(&self) -> bool;
    fn send(&self, text: &str) -> Result<(), ChannelClosed>;
}

impl Channel for Recipient<ChessWebSocketMessage> {
    fn is_open(&self) -> bool {
        self.connected()
    }

    fn send(&self, text: &str) -> Result<(), ChannelClosed> {
        if !self.connected() {
            return Err(ChannelClosed);
        }
        self.do_send(ChessWebSocketMessage(text.to_string()));
        Ok(())
    }
}

/// Serializes `message` and writes it to `channel`.
pub fn send_message(channel: &dyn Channel, message: &ServerMessage) -> Result<(), ChannelClosed> {
    match serde_json::to_string(message) {
        Ok(text) => channel.send(&text),
        Err(e) => {
            error!("Failed to serialize server message: {}", e);
            Ok(())
        }
    }
}

#[derive(Clone)]
pub struct Connection {
    pub game_id: GameId,
    pub username: String,
    pub session_id: String,
    pub channel: Arc<dyn Channel>,
}

/// Who is connected to which game, keyed by username.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<String, Connection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `username`, replacing any earlier connection they had.
    pub fn add(&self, game_id: GameId, username: &str, session_id: &str, channel: Arc<dyn Channel>) {
        let connection = Connection {
            game_id,
            username: username.to_string(),
            session_id: session_id.to_string(),
            channel,
        };
        let previous = self.connections.lock().insert(username.to_string(), connection);
        if let Some(previous) = previous {
            info!(
                "{} reconnected; replaced session {} (game {})",
                username, previous.session_id, previous.game_id
            );
        }
    }

    pub fn remove(&self, username: &str) -> Option<Connection> {
        self.connections.lock().remove(username)
    }

    /// Drops whatever entry still belongs to `session_id`. An entry that a
    /// newer session has replaced is left alone.
    pub fn remove_session(&self, session_id: &str) {
        self.connections
            .lock()
            .retain(|_, connection| connection.session_id != session_id);
    }

    pub fn get(&self, username: &str) -> Option<Connection> {
        self.connections.lock().get(username).cloned()
    }

    pub fn len(&self) -> usize {
        self.connections.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sends `message` to everyone connected to `game_id` except `exclude`.
    /// Closed channels are skipped and pruned; they never stop delivery to
    /// the others.
    pub fn broadcast(&self, game_id: GameId, exclude: Option<&str>, message: &ServerMessage) {
        let text = match serde_json::to_string(message) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to serialize broadcast for game {}: {}", game_id, e);
                return;
            }
        };

        let recipients: Vec<Connection> = self
            .connections
            .lock()
            .values()
            .filter(|c| c.game_id == game_id && Some(c.username.as_str()) != exclude)
            .cloned()
            .collect();
        debug!("Broadcasting to {} connections in game {}", recipients.len(), game_id);

        let mut dead = Vec::new();
        for connection in recipients {
            if !connection.channel.is_open() || connection.channel.send(&text).is_err() {
                dead.push(connection);
            }
        }

        if !dead.is_empty() {
            let mut connections = self.connections.lock();
            for connection in dead {
                warn!(
                    "Pruning closed connection for {} in game {}",
                    connection.username, connection.game_id
                );
                if connections
                    .get(&connection.username)
                    .is_some_and(|current| current.session_id == connection.session_id)
                {
                    connections.remove(&connection.username);
                }
            }
        }
    }

    /// Sends `message` to `username` alone. A failed send is logged and the
    /// connection pruned.
    pub fn send_to_one(&self, username: &str, message: &ServerMessage) {
        let Some(connection) = self.get(username) else {
            warn!("No connection registered for {}", username);
            return;
        };
        if send_message(connection.channel.as_ref(), message).is_err() {
            warn!("Failed to reach {}; dropping their connection", username);
            let mut connections = self.connections.lock();
            if connections
                .get(username)
                .is_some_and(|current| current.session_id == connection.session_id)
            {
                connections.remove(username);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Records everything sent to it; can be closed to simulate a dropped peer.
    #[derive(Default)]
    pub struct RecordingChannel {
        pub sent: Mutex<Vec<String>>,
        pub closed: AtomicBool,
    }

    impl RecordingChannel {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }

        pub fn messages(&self) -> Vec<ServerMessage> {
            self.sent
                .lock()
                .iter()
                .map(|text| serde_json::from_str(text).unwrap())
                .collect()
        }
    }

    impl Channel for RecordingChannel {
        fn is_open(&self) -> bool {
            !self.closed.load(Ordering::SeqCst)
        }

        fn send(&self, text: &str) -> Result<(), ChannelClosed> {
            if !self.is_open() {
                return Err(ChannelClosed);
            }
            self.sent.lock().push(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_broadcast_excludes_sender_and_other_games() {
        let registry = ConnectionRegistry::new();
        let alice = RecordingChannel::new();
        let bob = RecordingChannel::new();
        let carol = RecordingChannel::new();
        registry.add(1, "alice", "s1", alice.clone());
        registry.add(1, "bob", "s2", bob.clone());
        registry.add(2, "carol", "s3", carol.clone());

        registry.broadcast(1, Some("alice"), &ServerMessage::notification("hello"));

        assert!(alice.messages().is_empty());
        assert_eq!(bob.messages(), vec![ServerMessage::notification("hello")]);
        assert!(carol.messages().is_empty());
    }

    #[test]
    fn test_broadcast_prunes_closed_channels() {
        let registry = ConnectionRegistry::new();
        let open = RecordingChannel::new();
        let closed = RecordingChannel::new();
        registry.add(1, "open", "s1", open.clone());
        registry.add(1, "closed", "s2", closed.clone());
        closed.close();

        registry.broadcast(1, None, &ServerMessage::notification("still here"));

        assert_eq!(open.messages().len(), 1);
        assert!(closed.messages().is_empty());
        assert!(registry.get("closed").is_none());
        assert!(registry.get("open").is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reconnect_replaces_previous_entry() {
        let registry = ConnectionRegistry::new();
        let old = RecordingChannel::new();
        let new = RecordingChannel::new();
        registry.add(1, "alice", "old", old.clone());
        registry.add(3, "alice", "new", new.clone());
        assert_eq!(registry.len(), 1);

        registry.send_to_one("alice", &ServerMessage::notification("hi"));
        assert!(old.messages().is_empty());
        assert_eq!(new.messages().len(), 1);

        // The stale session going away must not evict the new one.
        registry.remove_session("old");
        assert_eq!(registry.get("alice").map(|c| c.game_id), Some(3));
        registry.remove_session("new");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_send_to_one_failure_is_contained() {
        let registry = ConnectionRegistry::new();
        let gone = RecordingChannel::new();
        let other = RecordingChannel::new();
        registry.add(1, "gone", "s1", gone.clone());
        registry.add(1, "other", "s2", other.clone());
        gone.close();

        registry.send_to_one("gone", &ServerMessage::notification("anyone?"));
        registry.send_to_one("nobody", &ServerMessage::notification("anyone?"));

        assert!(registry.get("gone").is_none());
        assert!(other.messages().is_empty());
        assert_eq!(registry.len(), 1);
    }
}
