/**
 * Team Room Fan-out
 *
 * `FanoutHub` tracks live client connections and the team rooms they have
 * joined, and delivers `RealtimeEvent`s to every connection in a room.
 *
 * # Model
 *
 * - A connection is registered with `connect`, which returns its id and the
 *   receiving half of a bounded queue. The transport (see `subscription`)
 *   drains that receiver onto the socket.
 * - Rooms map a team id to a set of connection ids. Joining twice is a
 *   no-op; leaving a room the connection is not in is a no-op.
 * - Delivery is best-effort. A send to a closed channel is skipped; the
 *   connection is dropped on `disconnect` or the next `prune_closed`.
 * - A connection whose queue is full is evicted on the spot. Dropping its
 *   sender ends the transport's writer, which closes the socket.
 *
 * # Thread Safety
 *
 * All state sits behind one `std::sync::Mutex`. No lock is held across an
 * `.await`; a poisoned lock is recovered since every mutation leaves the
 * tables consistent.
 */

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use crate::shared::RealtimeEvent;

/// Events a connection may have queued before it is treated as stalled
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Identifier of one live connection
pub type ConnectionId = Uuid;

/// Outbound half of a connection
pub type EventSender = mpsc::Sender<RealtimeEvent>;

/// Inbound half handed to the transport
pub type EventReceiver = mpsc::Receiver<RealtimeEvent>;

enum Delivery {
    Sent,
    Closed,
    Stalled,
}

fn deliver(sender: &EventSender, event: RealtimeEvent) -> Delivery {
    match sender.try_send(event) {
        Ok(()) => Delivery::Sent,
        Err(TrySendError::Closed(_)) => Delivery::Closed,
        Err(TrySendError::Full(_)) => Delivery::Stalled,
    }
}

#[derive(Debug)]
struct Connection {
    user_id: Uuid,
    sender: EventSender,
    teams: HashSet<Uuid>,
}

#[derive(Debug, Default)]
struct HubInner {
    connections: HashMap<ConnectionId, Connection>,
    rooms: HashMap<Uuid, HashSet<ConnectionId>>,
}

impl HubInner {
    fn remove_connection(&mut self, connection_id: ConnectionId) -> Option<Connection> {
        let connection = self.connections.remove(&connection_id)?;
        for team_id in &connection.teams {
            if let Some(room) = self.rooms.get_mut(team_id) {
                room.remove(&connection_id);
                if room.is_empty() {
                    self.rooms.remove(team_id);
                }
            }
        }
        Some(connection)
    }

    fn evict_stalled(&mut self, stalled: &[ConnectionId]) {
        for connection_id in stalled {
            if let Some(connection) = self.remove_connection(*connection_id) {
                tracing::warn!(
                    %connection_id,
                    user_id = %connection.user_id,
                    "Evicted realtime connection with a full queue"
                );
            }
        }
    }
}

/// Registry of live connections and team rooms
///
/// Cheap to clone; all clones share the same tables.
#[derive(Debug, Clone)]
pub struct FanoutHub {
    inner: Arc<Mutex<HubInner>>,
    queue_capacity: usize,
}

impl Default for FanoutHub {
    fn default() -> Self {
        Self::with_queue_capacity(DEFAULT_QUEUE_CAPACITY)
    }
}

impl FanoutHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hub whose connections queue at most `capacity` events
    pub fn with_queue_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HubInner::default())),
            queue_capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a connection for an authenticated user
    ///
    /// # Returns
    /// The new connection id and the receiver its events arrive on
    pub fn connect(&self, user_id: Uuid) -> (ConnectionId, EventReceiver) {
        let (sender, receiver) = mpsc::channel(self.queue_capacity);
        let connection_id = Uuid::new_v4();
        self.lock().connections.insert(
            connection_id,
            Connection {
                user_id,
                sender,
                teams: HashSet::new(),
            },
        );
        tracing::info!(%connection_id, %user_id, "Realtime connection opened");
        (connection_id, receiver)
    }

    /// Add a connection to a team room
    ///
    /// # Returns
    /// `false` if the connection is unknown; joining twice returns `true`
    pub fn join(&self, connection_id: ConnectionId, team_id: Uuid) -> bool {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let Some(connection) = inner.connections.get_mut(&connection_id) else {
            return false;
        };
        connection.teams.insert(team_id);
        inner.rooms.entry(team_id).or_default().insert(connection_id);
        tracing::debug!(%connection_id, %team_id, "Joined team room");
        true
    }

    /// Remove a connection from a team room
    ///
    /// # Returns
    /// `true` if the connection was in the room
    pub fn leave(&self, connection_id: ConnectionId, team_id: Uuid) -> bool {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if let Some(connection) = inner.connections.get_mut(&connection_id) {
            connection.teams.remove(&team_id);
        }
        let removed = match inner.rooms.get_mut(&team_id) {
            Some(room) => {
                let removed = room.remove(&connection_id);
                if room.is_empty() {
                    inner.rooms.remove(&team_id);
                }
                removed
            }
            None => false,
        };
        if removed {
            tracing::debug!(%connection_id, %team_id, "Left team room");
        }
        removed
    }

    /// Drop a connection and remove it from every room
    pub fn disconnect(&self, connection_id: ConnectionId) {
        if let Some(connection) = self.lock().remove_connection(connection_id) {
            tracing::info!(
                %connection_id,
                user_id = %connection.user_id,
                "Realtime connection closed"
            );
        }
    }

    /// Deliver an event to every connection in a team room
    ///
    /// # Returns
    /// Number of connections the event was queued for
    pub fn broadcast(&self, team_id: Uuid, event: &RealtimeEvent) -> usize {
        let mut inner = self.lock();
        let Some(room) = inner.rooms.get(&team_id) else {
            tracing::debug!(%team_id, event = event.event.as_str(), "No listeners in team room");
            return 0;
        };

        let mut delivered = 0;
        let mut stalled = Vec::new();
        for connection_id in room {
            let Some(connection) = inner.connections.get(connection_id) else {
                continue;
            };
            match deliver(&connection.sender, event.clone()) {
                Delivery::Sent => delivered += 1,
                Delivery::Stalled => stalled.push(*connection_id),
                Delivery::Closed => {}
            }
        }
        inner.evict_stalled(&stalled);

        tracing::debug!(%team_id, event = event.event.as_str(), delivered, "Broadcast to team room");
        delivered
    }

    /// Deliver an event to every live connection
    pub fn broadcast_all(&self, event: &RealtimeEvent) -> usize {
        let mut inner = self.lock();
        let mut delivered = 0;
        let mut stalled = Vec::new();
        for (connection_id, connection) in &inner.connections {
            match deliver(&connection.sender, event.clone()) {
                Delivery::Sent => delivered += 1,
                Delivery::Stalled => stalled.push(*connection_id),
                Delivery::Closed => {}
            }
        }
        inner.evict_stalled(&stalled);

        tracing::debug!(event = event.event.as_str(), delivered, "Broadcast to all connections");
        delivered
    }

    /// Deliver an event to a single connection
    pub fn send_to(&self, connection_id: ConnectionId, event: RealtimeEvent) -> bool {
        let mut inner = self.lock();
        let Some(connection) = inner.connections.get(&connection_id) else {
            return false;
        };
        match deliver(&connection.sender, event) {
            Delivery::Sent => true,
            Delivery::Closed => false,
            Delivery::Stalled => {
                inner.evict_stalled(&[connection_id]);
                false
            }
        }
    }

    pub fn room_size(&self, team_id: Uuid) -> usize {
        self.lock().rooms.get(&team_id).map(HashSet::len).unwrap_or(0)
    }

    pub fn connection_count(&self) -> usize {
        self.lock().connections.len()
    }

    /// Remove connections whose receiver has been dropped
    ///
    /// # Returns
    /// Number of connections removed
    pub fn prune_closed(&self) -> usize {
        let mut inner = self.lock();
        let closed: Vec<ConnectionId> = inner
            .connections
            .iter()
            .filter(|(_, connection)| connection.sender.is_closed())
            .map(|(id, _)| *id)
            .collect();
        for id in &closed {
            inner.remove_connection(*id);
        }
        closed.len()
    }
}
