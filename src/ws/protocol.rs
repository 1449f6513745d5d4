//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::entity::{Team, Vec3};

/// Held movement keys for one move message
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MoveDirection {
    #[serde(default)]
    pub forward: bool,
    #[serde(default)]
    pub backward: bool,
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
}

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Request to enter the arena
    JoinGame {
        /// Display name (1-20 chars, alphanumeric plus `_`/`-`)
        name: String,
    },

    /// Movement intent; each held key adds a velocity impulse
    PlayerMove {
        direction: MoveDirection,
        /// Facing angle in radians (cosmetic, trusted as-is)
        #[serde(default)]
        rotation: f32,
        /// Sprint; faster impulse at a stamina cost
        #[serde(default)]
        running: bool,
    },

    /// Throw a punch at whatever is in range
    PlayerPunch,

    /// Legacy explicit kick; kicking is proximity-automatic server-side
    PlayerKick,

    /// Ping for latency measurement
    Ping {
        /// Client timestamp
        t: u64,
    },
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Welcome message after connection
    Welcome {
        player_id: Uuid,
        server_time: u64,
    },

    /// Join accepted (sent to the joining connection only)
    PlayerJoined {
        player_id: Uuid,
        team: Team,
        game_state: GameStateView,
    },

    /// Join rejected: arena at capacity
    GameFull,

    /// Join rejected: invalid request
    JoinError {
        message: String,
    },

    /// Full authoritative snapshot, broadcast every active tick
    GameUpdate {
        state: GameStateView,
    },

    /// Full snapshot pushed outside the tick cadence (roster changes)
    PlayerUpdate {
        state: GameStateView,
    },

    /// A player disconnected
    PlayerLeft {
        player_id: Uuid,
    },

    /// A punch connected
    PlayerHit {
        attacker_id: Uuid,
        target_id: Uuid,
        damage: f32,
        new_health: f32,
        knockout: bool,
    },

    /// One-shot action for client animation (punch swing, hit or miss)
    PlayerAction {
        player_id: Uuid,
        action: String,
        position: Vec3,
    },

    /// A knocked-out player recovered
    PlayerRespawn {
        player_id: Uuid,
        health: f32,
        position: Vec3,
        receive_ko_count: u32,
        give_ko_count: u32,
    },

    /// A goal was scored
    Goal {
        team: Team,
        score: Score,
    },

    /// Match started (enough players connected)
    GameStarted,

    /// Match stopped (player count dropped below minimum)
    GameStopped,

    /// Match ended with a winner; a new match starts after a short delay
    GameEnd {
        winner: Team,
        final_score: Score,
    },

    /// Pong response
    Pong {
        /// Echo back client timestamp
        t: u64,
    },
}

/// Match score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub blue: u32,
    pub red: u32,
}

/// Player state in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: Uuid,
    pub name: String,
    pub team: Team,
    pub position: Vec3,
    pub rotation: f32,
    pub health: f32,
    pub is_knocked_out: bool,
    pub give_ko_count: u32,
    pub receive_ko_count: u32,
}

/// Ball state in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallView {
    pub position: Vec3,
    pub velocity: Vec3,
    pub spin: Vec3,
}

/// Full authoritative game state as broadcast to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStateView {
    pub players: Vec<PlayerView>,
    pub ball: BallView,
    pub score: Score,
    pub game_started: bool,
    /// Simulated seconds since match start (display only)
    pub game_time: f32,
}
