//! Game simulation modules

pub mod combat;
pub mod entity;
pub mod physics;
pub mod snapshot;
pub mod world;

pub use world::{GameWorld, WorldHandle};

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::ws::protocol::{ClientMsg, ServerMsg};

/// Player input received from a WebSocket connection
#[derive(Debug, Clone)]
pub struct PlayerInput {
    pub player_id: Uuid,
    pub kind: InputKind,
    /// Direct channel back to this connection for join results and pongs
    pub reply_tx: mpsc::Sender<ServerMsg>,
    pub received_at: u64,
}

/// What the connection is telling the world
#[derive(Debug, Clone)]
pub enum InputKind {
    Msg(ClientMsg),
    /// The connection closed; remove the player
    Disconnected,
}
