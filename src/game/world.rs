//! World state and authoritative tick loop

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc};
use tokio::time::interval;
use tracing::{info, warn};
use uuid::Uuid;

use crate::util::time::{unix_millis, TICK_DURATION_MICROS};
use crate::ws::protocol::{ClientMsg, MoveDirection, Score, ServerMsg};

use super::combat::CombatSystem;
use super::entity::{Ball, Player, Team, Vec3};
use super::physics::{BallPhysics, PlayerPhysics, RUN_HEALTH_COST};
use super::snapshot;
use super::{InputKind, PlayerInput};

/// First team to this score wins the match
pub const MAX_SCORE: u32 = 3;
/// Delay before the next match starts after a win
pub const RESTART_DELAY_MS: u64 = 5000;
/// Connected players needed for the match to run
pub const MIN_PLAYERS: usize = 2;

/// Cap on per-tick delta so a stalled scheduler cannot teleport entities
const MAX_TICK_DELTA: f32 = 0.25;

/// World state (owned by the world task)
pub struct WorldState {
    pub tick: u64,
    pub players: HashMap<Uuid, Player>,
    pub ball: Ball,
    pub score: Score,
    pub started: bool,
    /// Simulated seconds since match start
    pub game_time: f32,
    /// Deadline for the post-win automatic restart
    pub restart_at: Option<u64>,
    pub max_players: usize,
    pub rng: ChaCha8Rng,
}

impl WorldState {
    pub fn new(max_players: usize, seed: u64) -> Self {
        Self {
            tick: 0,
            players: HashMap::new(),
            ball: Ball::new(),
            score: Score::default(),
            started: false,
            game_time: 0.0,
            restart_at: None,
            max_players,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Spawn point inside the team's defended band, randomized to avoid
    /// exact overlap
    pub fn spawn_position(&mut self, team: Team) -> Vec3 {
        let x = match team {
            Team::Blue => -15.0 + self.rng.gen_range(0.0..5.0),
            Team::Red => 15.0 - self.rng.gen_range(0.0..5.0),
        };
        let z = self.rng.gen_range(-5.0..5.0);
        Vec3::new(x, 1.0, z)
    }

    /// New joiners go to the smaller-or-equal team; ties break toward blue
    pub fn team_for_join(&self) -> Team {
        let blue = self
            .players
            .values()
            .filter(|p| p.team == Team::Blue)
            .count();
        let red = self.players.len() - blue;
        if blue <= red {
            Team::Blue
        } else {
            Team::Red
        }
    }
}

/// Handle to the running world
#[derive(Clone)]
pub struct WorldHandle {
    pub input_tx: mpsc::Sender<PlayerInput>,
    pub event_tx: broadcast::Sender<ServerMsg>,
    pub player_count: Arc<AtomicUsize>,
    pub game_started: Arc<AtomicBool>,
}

impl WorldHandle {
    pub fn player_count(&self) -> usize {
        self.player_count.load(Ordering::Relaxed)
    }

    pub fn game_started(&self) -> bool {
        self.game_started.load(Ordering::Relaxed)
    }
}

/// The authoritative game world. One task owns all mutable state; network
/// handlers reach it only through the input queue.
pub struct GameWorld {
    state: WorldState,
    input_rx: mpsc::Receiver<PlayerInput>,
    event_tx: broadcast::Sender<ServerMsg>,
    player_count: Arc<AtomicUsize>,
    game_started: Arc<AtomicBool>,
}

impl GameWorld {
    pub fn new(max_players: usize) -> (Self, WorldHandle) {
        let (input_tx, input_rx) = mpsc::channel(256);
        let (event_tx, _) = broadcast::channel(256);
        let player_count = Arc::new(AtomicUsize::new(0));
        let game_started = Arc::new(AtomicBool::new(false));

        let handle = WorldHandle {
            input_tx,
            event_tx: event_tx.clone(),
            player_count: player_count.clone(),
            game_started: game_started.clone(),
        };

        let world = Self {
            state: WorldState::new(max_players, rand::random()),
            input_rx,
            event_tx,
            player_count,
            game_started,
        };

        (world, handle)
    }

    /// Run the authoritative tick loop at 60 Hz. Each tick measures the
    /// real elapsed time since the previous one.
    pub async fn run(mut self) {
        info!(max_players = self.state.max_players, "Game world started");

        let tick_duration = Duration::from_micros(TICK_DURATION_MICROS);
        let mut tick_interval = interval(tick_duration);
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut last_tick = Instant::now();

        loop {
            tick_interval.tick().await;

            let dt = last_tick.elapsed().as_secs_f32().min(MAX_TICK_DELTA);
            last_tick = Instant::now();

            // Drain queued intents, then advance the simulation
            self.process_inputs();
            self.run_tick(dt, unix_millis());
        }
    }

    /// Process all pending inputs from connected clients
    fn process_inputs(&mut self) {
        while let Ok(input) = self.input_rx.try_recv() {
            match input.kind {
                InputKind::Msg(ClientMsg::JoinGame { name }) => {
                    self.handle_join(input.player_id, name, &input.reply_tx);
                }
                InputKind::Msg(ClientMsg::PlayerMove {
                    direction,
                    rotation,
                    running,
                }) => {
                    self.handle_move(input.player_id, direction, rotation, running, input.received_at);
                }
                InputKind::Msg(ClientMsg::PlayerPunch) => {
                    self.handle_punch(input.player_id, input.received_at);
                }
                InputKind::Msg(ClientMsg::PlayerKick) => {
                    // Kicking is proximity-automatic; the explicit message
                    // is accepted for old clients and ignored
                }
                InputKind::Msg(ClientMsg::Ping { t }) => {
                    let _ = input.reply_tx.try_send(ServerMsg::Pong { t });
                }
                InputKind::Disconnected => {
                    self.handle_leave(input.player_id);
                }
            }
        }
    }

    /// Handle a join request: validate, check capacity, balance teams
    fn handle_join(&mut self, player_id: Uuid, name: String, reply_tx: &mpsc::Sender<ServerMsg>) {
        if self.state.players.contains_key(&player_id) {
            warn!(player_id = %player_id, "Player already joined");
            return;
        }

        let name = name.trim().to_string();
        if !valid_name(&name) {
            let _ = reply_tx.try_send(ServerMsg::JoinError {
                message: "Name must be 1-20 characters: letters, digits, '_' or '-'".to_string(),
            });
            return;
        }

        if self.state.players.len() >= self.state.max_players {
            let _ = reply_tx.try_send(ServerMsg::GameFull);
            return;
        }

        let team = self.state.team_for_join();
        let spawn = self.state.spawn_position(team);
        self.state
            .players
            .insert(player_id, Player::new(player_id, name, team, spawn));
        self.player_count
            .store(self.state.players.len(), Ordering::Relaxed);

        let _ = reply_tx.try_send(ServerMsg::PlayerJoined {
            player_id,
            team,
            game_state: snapshot::build_game_state(&self.state),
        });

        // Everyone else learns about the new roster via a pushed snapshot
        let _ = self.event_tx.send(ServerMsg::PlayerUpdate {
            state: snapshot::build_game_state(&self.state),
        });

        info!(
            player_id = %player_id,
            ?team,
            player_count = self.state.players.len(),
            "Player joined"
        );

        if self.state.players.len() >= MIN_PLAYERS && !self.state.started {
            self.start_game();
        }
    }

    /// Handle a movement intent. Additive impulses; knocked-out players
    /// are ignored. Running drains health through the damage path.
    fn handle_move(
        &mut self,
        player_id: Uuid,
        direction: MoveDirection,
        rotation: f32,
        running: bool,
        now: u64,
    ) {
        let Some(player) = self.state.players.get_mut(&player_id) else {
            return;
        };
        if player.knocked_out {
            return;
        }

        if running {
            // Stamina drain can itself knock a sprinter out
            CombatSystem::apply_damage(player, RUN_HEALTH_COST, now);
        }

        PlayerPhysics::apply_move(player, &direction, rotation, running);
    }

    /// Handle a punch intent: resolve hits against every target in range.
    /// A whiffed punch still consumes the cooldown and still broadcasts
    /// the swing for animation.
    fn handle_punch(&mut self, player_id: Uuid, now: u64) {
        let (attacker_pos, damage) = match self.state.players.get(&player_id) {
            Some(p) if CombatSystem::can_punch(p, now) => {
                (p.position, CombatSystem::punch_damage(p.health))
            }
            _ => return,
        };

        let mut hits = Vec::new();
        let mut knockouts = 0u32;

        for target in self.state.players.values_mut() {
            if target.id == player_id || target.knocked_out {
                continue;
            }
            if !CombatSystem::in_punch_range(attacker_pos, target) {
                continue;
            }

            let result = CombatSystem::apply_damage(target, damage, now);
            CombatSystem::knockback(attacker_pos, target);
            if result.knocked_out {
                knockouts += 1;
            }

            hits.push(ServerMsg::PlayerHit {
                attacker_id: player_id,
                target_id: target.id,
                damage,
                new_health: result.new_health,
                knockout: result.knocked_out,
            });
        }

        if let Some(attacker) = self.state.players.get_mut(&player_id) {
            attacker.last_punch = now;
            attacker.give_ko_count += knockouts;
        }

        for hit in hits {
            let _ = self.event_tx.send(hit);
        }
        let _ = self.event_tx.send(ServerMsg::PlayerAction {
            player_id,
            action: "punch".to_string(),
            position: attacker_pos,
        });
    }

    /// Handle a disconnect: remove the player and their pending deadlines
    fn handle_leave(&mut self, player_id: Uuid) {
        if self.state.players.remove(&player_id).is_none() {
            return;
        }
        self.player_count
            .store(self.state.players.len(), Ordering::Relaxed);

        let _ = self.event_tx.send(ServerMsg::PlayerLeft { player_id });
        info!(
            player_id = %player_id,
            player_count = self.state.players.len(),
            "Player left"
        );

        if self.state.players.len() < MIN_PLAYERS && self.state.started {
            self.stop_game();
        }
    }

    /// Advance the simulation one tick.
    ///
    /// Ordering invariant: players integrate before contacts resolve, and
    /// the goal check runs against the freshly integrated ball position.
    pub(super) fn run_tick(&mut self, dt: f32, now: u64) {
        self.state.tick += 1;

        for player in self.state.players.values_mut() {
            PlayerPhysics::update(player, dt);
        }

        // Foot-to-ball contact; every player in range kicks, additively
        for player in self.state.players.values() {
            if CombatSystem::in_kick_range(player, &self.state.ball) {
                CombatSystem::kick(player, &mut self.state.ball);
            }
        }

        BallPhysics::update(&mut self.state.ball, dt);

        if self.state.started {
            self.check_goal(now);
            self.state.game_time += dt;
        }

        self.process_respawns(now);

        if self.state.restart_at.is_some_and(|at| at <= now) {
            self.start_game();
        }

        if !self.state.players.is_empty() {
            let _ = self.event_tx.send(ServerMsg::GameUpdate {
                state: snapshot::build_game_state(&self.state),
            });
        }
    }

    /// Score a goal if the ball crossed a line this tick
    fn check_goal(&mut self, now: u64) {
        let Some(team) = CombatSystem::check_goal(&self.state.ball) else {
            return;
        };

        match team {
            Team::Blue => self.state.score.blue += 1,
            Team::Red => self.state.score.red += 1,
        }
        self.state.ball.reset();

        info!(?team, score = ?self.state.score, "Goal");
        let _ = self.event_tx.send(ServerMsg::Goal {
            team,
            score: self.state.score,
        });

        self.check_win_condition(now);
    }

    /// First team at the score limit ends the match; a new one starts
    /// automatically after a fixed delay
    fn check_win_condition(&mut self, now: u64) {
        if self.state.restart_at.is_some() {
            return;
        }
        if self.state.score.blue < MAX_SCORE && self.state.score.red < MAX_SCORE {
            return;
        }

        let winner = if self.state.score.blue >= MAX_SCORE {
            Team::Blue
        } else {
            Team::Red
        };

        info!(?winner, score = ?self.state.score, "Match ended");
        let _ = self.event_tx.send(ServerMsg::GameEnd {
            winner,
            final_score: self.state.score,
        });

        self.state.restart_at = Some(now + RESTART_DELAY_MS);
    }

    /// Recover players whose knockout deadline expired. Deadlines live in
    /// the state, so a disconnected player's respawn is simply gone.
    fn process_respawns(&mut self, now: u64) {
        let due: Vec<Uuid> = self
            .state
            .players
            .values()
            .filter(|p| p.knocked_out && p.respawn_at.is_some_and(|at| at <= now))
            .map(|p| p.id)
            .collect();

        for player_id in due {
            let Some(team) = self.state.players.get(&player_id).map(|p| p.team) else {
                continue;
            };
            let spawn = self.state.spawn_position(team);

            let Some(player) = self.state.players.get_mut(&player_id) else {
                continue;
            };
            player.health = 100.0;
            player.knocked_out = false;
            player.respawn_at = None;
            player.position = spawn;
            player.velocity = Vec3::ZERO;
            player.receive_ko_count += 1;

            let _ = self.event_tx.send(ServerMsg::PlayerRespawn {
                player_id,
                health: player.health,
                position: player.position,
                receive_ko_count: player.receive_ko_count,
                give_ko_count: player.give_ko_count,
            });
        }
    }

    /// Start (or restart) a match: reset score, ball and clock
    fn start_game(&mut self) {
        self.state.started = true;
        self.game_started.store(true, Ordering::Relaxed);
        self.state.game_time = 0.0;
        self.state.score = Score::default();
        self.state.ball.reset();
        self.state.restart_at = None;

        info!("Game started");
        let _ = self.event_tx.send(ServerMsg::GameStarted);
    }

    /// Stop the match when too few players remain
    fn stop_game(&mut self) {
        self.state.started = false;
        self.game_started.store(false, Ordering::Relaxed);

        info!("Game stopped");
        let _ = self.event_tx.send(ServerMsg::GameStopped);
    }
}

/// Display names: 1-20 chars, alphanumeric plus `_`/`-`
fn valid_name(name: &str) -> bool {
    let len = name.chars().count();
    (1..=20).contains(&len)
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
