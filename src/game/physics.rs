//! Player movement integration and ball aerodynamics

use super::entity::{Ball, Player};
use crate::ws::protocol::MoveDirection;

/// Field half-extents; players are clamped, the ball bounces
pub const FIELD_HALF_X: f32 = 40.0;
pub const FIELD_HALF_Z: f32 = 25.0;

/// Per-tick velocity damping for players; coasting stops over a few ticks
pub const PLAYER_FRICTION: f32 = 0.9;
/// Base movement speed (units/s) fed into the per-message impulse
pub const WALK_SPEED: f32 = 10.0;
pub const RUN_SPEED: f32 = 15.0;
/// Fraction of speed added to velocity per move message
pub const MOVE_IMPULSE_FACTOR: f32 = 0.6;
/// Flat health cost per running move message (stamina drain)
pub const RUN_HEALTH_COST: f32 = 0.1;

/// Ball physics constants
pub const GRAVITY: f32 = -22.5;
/// Inelastic bounce coefficient for ground and field edges
pub const BOUNCE: f32 = 0.4;
/// Quadratic air drag coefficient
pub const AIR_DRAG: f32 = 0.015;
/// Vertical drag is reduced to preserve arc height
pub const VERTICAL_DRAG_SCALE: f32 = 0.3;
/// Magnus force scale: spin x velocity curves the flight path
pub const MAGNUS_COEFF: f32 = 0.05;
/// Horizontal damping while resting on the ground (per second)
pub const ROLL_FRICTION: f32 = 2.5;
/// Weaker damping while skimming near the ground
pub const ROLL_DRAG: f32 = 0.4;
/// Height band above rest that counts as near-ground
pub const NEAR_GROUND: f32 = 0.15;
/// Vertical speed below which the ball counts as resting
pub const REST_VERTICAL_SPEED: f32 = 0.5;
pub const MAX_BALL_SPEED: f32 = 42.0;
pub const MAX_BALL_VERTICAL_SPEED: f32 = 13.0;
/// Exponential spin decay rate (per second)
pub const SPIN_DECAY: f32 = 0.8;
pub const MAX_SPIN: f32 = 8.0;

/// Player movement system
pub struct PlayerPhysics;

impl PlayerPhysics {
    /// Advance a player one tick: friction first, then integration, then
    /// clamping to field bounds. No vertical movement.
    pub fn update(player: &mut Player, dt: f32) {
        player.velocity.x *= PLAYER_FRICTION;
        player.velocity.z *= PLAYER_FRICTION;

        player.position.x += player.velocity.x * dt;
        player.position.z += player.velocity.z * dt;

        player.position.x = player.position.x.clamp(-FIELD_HALF_X, FIELD_HALF_X);
        player.position.z = player.position.z.clamp(-FIELD_HALF_Z, FIELD_HALF_Z);
    }

    /// Apply a movement intent: each held key adds an impulse along its
    /// axis. Additive on purpose; the friction factor bounds the steady
    /// state, not the input.
    pub fn apply_move(player: &mut Player, direction: &MoveDirection, rotation: f32, running: bool) {
        let speed = if running { RUN_SPEED } else { WALK_SPEED };
        let impulse = speed * MOVE_IMPULSE_FACTOR;

        if direction.forward {
            player.velocity.z -= impulse;
        }
        if direction.backward {
            player.velocity.z += impulse;
        }
        if direction.left {
            player.velocity.x -= impulse;
        }
        if direction.right {
            player.velocity.x += impulse;
        }

        player.rotation = rotation;
    }
}

/// Ball physics system
pub struct BallPhysics;

impl BallPhysics {
    /// Advance the ball one tick. Order matters: forces, integration,
    /// ground contact, edge bounce, clamps. Goal detection runs afterwards
    /// against the settled position.
    pub fn update(ball: &mut Ball, dt: f32) {
        // Quadratic drag, damped by the ball's own speed
        let speed = ball.velocity.length();
        if speed > 0.0 {
            let drag = AIR_DRAG * speed * dt;
            ball.velocity.x -= ball.velocity.x * drag;
            ball.velocity.z -= ball.velocity.z * drag;
            ball.velocity.y -= ball.velocity.y * drag * VERTICAL_DRAG_SCALE;
        }

        // Magnus curve from spin
        let magnus = ball.spin.cross(ball.velocity).scale(MAGNUS_COEFF * dt);
        ball.velocity = ball.velocity.add(magnus);

        ball.velocity.y += GRAVITY * dt;

        ball.position = ball.position.add(ball.velocity.scale(dt));

        // Ground contact: clamp, inelastic bounce, rolling resistance
        if ball.position.y <= ball.radius {
            ball.position.y = ball.radius;
            if ball.velocity.y < 0.0 {
                ball.velocity.y = -ball.velocity.y * BOUNCE;
            }
            if ball.velocity.y.abs() < REST_VERTICAL_SPEED {
                let damp = (1.0 - ROLL_FRICTION * dt).max(0.0);
                ball.velocity.x *= damp;
                ball.velocity.z *= damp;
            }
        } else if ball.position.y <= ball.radius + NEAR_GROUND {
            let damp = (1.0 - ROLL_DRAG * dt).max(0.0);
            ball.velocity.x *= damp;
            ball.velocity.z *= damp;
        }

        // Field-edge bounce
        if ball.position.x.abs() > FIELD_HALF_X {
            ball.position.x = FIELD_HALF_X.copysign(ball.position.x);
            ball.velocity.x = -ball.velocity.x * BOUNCE;
        }
        if ball.position.z.abs() > FIELD_HALF_Z {
            ball.position.z = FIELD_HALF_Z.copysign(ball.position.z);
            ball.velocity.z = -ball.velocity.z * BOUNCE;
        }

        // Clamp speeds so repeated kicks and bounces cannot compound
        let horizontal = ball.velocity.horizontal_length();
        if horizontal > MAX_BALL_SPEED {
            let scale = MAX_BALL_SPEED / horizontal;
            ball.velocity.x *= scale;
            ball.velocity.z *= scale;
        }
        ball.velocity.y = ball
            .velocity
            .y
            .clamp(-MAX_BALL_VERTICAL_SPEED, MAX_BALL_VERTICAL_SPEED);

        // Spin decays exponentially and is magnitude-clamped
        ball.spin = ball
            .spin
            .scale((-SPIN_DECAY * dt).exp())
            .clamp_length(MAX_SPIN);
    }
}
