//! Combat and contact resolution - punches, kicks, goal detection

use super::entity::{Ball, Player, Team, Vec3};

/// Fist reach for punches
pub const PUNCH_RANGE: f32 = 3.0;
pub const PUNCH_COOLDOWN_MS: u64 = 500;
/// Knockback impulse applied to a punched player
pub const PUNCH_PUSH_FORCE: f32 = 5.0;

/// Foot reach for automatic ball contact
pub const KICK_RANGE: f32 = 1.5;
/// Base kick impulse
pub const KICK_POWER: f32 = 15.0;
/// Fraction of the kicker's horizontal speed added to the impulse
pub const KICK_SPEED_BONUS: f32 = 0.8;
pub const KICK_SPEED_BONUS_MAX: f32 = 10.0;
/// Minimum lift so any contact gets the ball airborne
pub const KICK_LIFT_MIN: f32 = 3.0;
pub const KICK_LIFT_SPEED_BONUS: f32 = 0.15;
/// Sideways player velocity becomes lateral spin (curved shots)
pub const LATERAL_SPIN_FACTOR: f32 = 0.5;
/// Approach speed becomes topspin, dipping fast shots
pub const TOPSPIN_FACTOR: f32 = 0.3;

/// Goal line distance from center and goal mouth half-width
pub const GOAL_LINE_Z: f32 = 24.0;
pub const GOAL_HALF_WIDTH: f32 = 3.0;

/// Time spent knocked out before respawning
pub const KNOCKOUT_DURATION_MS: u64 = 3000;

/// Result of applying damage to a player
#[derive(Debug, Clone, Copy)]
pub struct DamageResult {
    pub new_health: f32,
    /// Damage crossed zero this call and the player just went down
    pub knocked_out: bool,
}

/// Combat system for punches, kicks and damage
pub struct CombatSystem;

impl CombatSystem {
    /// Punch damage scales with how hurt the *attacker* is, a comeback
    /// mechanic. Tiers checked most-damaged-first.
    pub fn punch_damage(attacker_health: f32) -> f32 {
        if attacker_health <= 10.0 {
            50.0
        } else if attacker_health <= 50.0 {
            25.0
        } else {
            20.0
        }
    }

    /// Whether the player may punch right now
    pub fn can_punch(player: &Player, now: u64) -> bool {
        !player.knocked_out && now.saturating_sub(player.last_punch) > PUNCH_COOLDOWN_MS
    }

    /// Apply damage through the single health path. Reaching zero flips the
    /// player into knockout in the same call and arms the respawn deadline.
    pub fn apply_damage(player: &mut Player, damage: f32, now: u64) -> DamageResult {
        if player.knocked_out {
            return DamageResult {
                new_health: player.health,
                knocked_out: false,
            };
        }

        player.health = (player.health - damage).max(0.0);

        let knocked_out = player.health <= 0.0;
        if knocked_out {
            player.knocked_out = true;
            player.respawn_at = Some(now + KNOCKOUT_DURATION_MS);
        }

        DamageResult {
            new_health: player.health,
            knocked_out,
        }
    }

    /// Horizontal distance between a player and the ball
    pub fn ball_distance(player: &Player, ball: &Ball) -> f32 {
        ball.position.sub(player.position).horizontal_length()
    }

    /// Whether this player's feet reach the ball
    pub fn in_kick_range(player: &Player, ball: &Ball) -> bool {
        !player.knocked_out && Self::ball_distance(player, ball) < KICK_RANGE
    }

    /// Resolve one player's foot contact: impulse away from the player,
    /// spin from the tangential/approach components of their velocity, and
    /// a lift floor so contact always gets the ball off the ground.
    pub fn kick(player: &Player, ball: &mut Ball) {
        let mut offset = ball.position.sub(player.position);
        offset.y = 0.0;
        if offset.length() == 0.0 {
            return;
        }

        let dir = offset.normalize();
        let approach = player.velocity.horizontal_length();
        let power = KICK_POWER + (approach * KICK_SPEED_BONUS).min(KICK_SPEED_BONUS_MAX);

        ball.velocity = ball.velocity.add(dir.scale(power / ball.mass));
        ball.velocity.y = ball
            .velocity
            .y
            .max(KICK_LIFT_MIN + approach * KICK_LIFT_SPEED_BONUS);

        // Tangential velocity curls the shot, approach speed dips it
        let tangent = Vec3::new(-dir.z, 0.0, dir.x);
        let lateral = player.velocity.dot(tangent);
        let along = player.velocity.dot(dir);

        ball.spin.y += lateral * LATERAL_SPIN_FACTOR;
        ball.spin = ball
            .spin
            .add(tangent.scale(-along * TOPSPIN_FACTOR))
            .clamp_length(super::physics::MAX_SPIN);
    }

    /// Whether a target stands within punching distance (horizontal)
    pub fn in_punch_range(attacker_pos: Vec3, target: &Player) -> bool {
        let dx = attacker_pos.x - target.position.x;
        let dz = attacker_pos.z - target.position.z;
        dx * dx + dz * dz <= PUNCH_RANGE * PUNCH_RANGE
    }

    /// Knockback impulse for a punched target, along attacker -> target
    pub fn knockback(attacker_pos: Vec3, target: &mut Player) {
        let mut offset = target.position.sub(attacker_pos);
        offset.y = 0.0;
        if offset.length() == 0.0 {
            return;
        }
        let push = offset.normalize().scale(PUNCH_PUSH_FORCE);
        target.velocity.x += push.x;
        target.velocity.z += push.z;
    }

    /// Goal check against the settled ball position. Crossing the +z line
    /// inside the mouth scores for blue, the -z line for red.
    pub fn check_goal(ball: &Ball) -> Option<Team> {
        if ball.position.x.abs() >= GOAL_HALF_WIDTH {
            return None;
        }
        if ball.position.z > GOAL_LINE_Z {
            Some(Team::Blue)
        } else if ball.position.z < -GOAL_LINE_Z {
            Some(Team::Red)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use uuid::Uuid;

    fn test_player(x: f32, z: f32) -> Player {
        Player::new(
            Uuid::new_v4(),
            "tester".to_string(),
            Team::Blue,
            Vec3::new(x, 1.0, z),
        )
    }

    #[test]
    fn punch_damage_tiers_check_most_damaged_first() {
        assert_approx_eq!(CombatSystem::punch_damage(100.0), 20.0);
        assert_approx_eq!(CombatSystem::punch_damage(51.0), 20.0);
        assert_approx_eq!(CombatSystem::punch_damage(50.0), 25.0);
        assert_approx_eq!(CombatSystem::punch_damage(11.0), 25.0);
        assert_approx_eq!(CombatSystem::punch_damage(10.0), 50.0);
        assert_approx_eq!(CombatSystem::punch_damage(1.0), 50.0);
    }

    #[test]
    fn damage_reaching_zero_knocks_out_in_same_call() {
        let mut player = test_player(0.0, 0.0);
        player.health = 20.0;

        let result = CombatSystem::apply_damage(&mut player, 25.0, 1_000);

        assert_approx_eq!(result.new_health, 0.0);
        assert!(result.knocked_out);
        assert!(player.knocked_out);
        assert_eq!(player.respawn_at, Some(1_000 + KNOCKOUT_DURATION_MS));
    }

    #[test]
    fn knocked_out_players_take_no_further_damage() {
        let mut player = test_player(0.0, 0.0);
        player.health = 10.0;
        CombatSystem::apply_damage(&mut player, 10.0, 0);
        assert!(player.knocked_out);

        let result = CombatSystem::apply_damage(&mut player, 50.0, 100);
        assert!(!result.knocked_out);
        assert_approx_eq!(player.health, 0.0);
    }

    #[test]
    fn health_never_goes_negative() {
        let mut player = test_player(0.0, 0.0);
        CombatSystem::apply_damage(&mut player, 500.0, 0);
        assert!(player.health >= 0.0);
    }

    #[test]
    fn punch_cooldown_blocks_rapid_punches() {
        let mut player = test_player(0.0, 0.0);
        player.last_punch = 10_000;

        assert!(!CombatSystem::can_punch(&player, 10_300));
        assert!(CombatSystem::can_punch(&player, 10_501));
    }

    #[test]
    fn knocked_out_players_cannot_punch() {
        let mut player = test_player(0.0, 0.0);
        player.knocked_out = true;
        assert!(!CombatSystem::can_punch(&player, u64::MAX));
    }

    #[test]
    fn kick_pushes_ball_away_from_player() {
        // Ball at rest at the center, player standing just behind it
        let player = test_player(0.0, 1.0);
        let mut ball = Ball::new();

        assert!(CombatSystem::in_kick_range(&player, &ball));
        CombatSystem::kick(&player, &mut ball);

        assert!(ball.velocity.z < 0.0);
        assert!(ball.velocity.y >= KICK_LIFT_MIN);
    }

    #[test]
    fn faster_kicker_hits_harder() {
        let slow = test_player(0.0, 1.0);
        let mut fast = test_player(0.0, 1.0);
        fast.velocity = Vec3::new(0.0, 0.0, -8.0);

        let mut ball_a = Ball::new();
        let mut ball_b = Ball::new();
        CombatSystem::kick(&slow, &mut ball_a);
        CombatSystem::kick(&fast, &mut ball_b);

        assert!(ball_b.velocity.horizontal_length() > ball_a.velocity.horizontal_length());
    }

    #[test]
    fn sideways_motion_imparts_lateral_spin() {
        let mut player = test_player(0.0, 1.0);
        player.velocity = Vec3::new(6.0, 0.0, 0.0);
        let mut ball = Ball::new();

        CombatSystem::kick(&player, &mut ball);

        assert!(ball.spin.y.abs() > 0.0);
    }

    #[test]
    fn knockback_points_away_from_attacker() {
        let attacker = test_player(0.0, 0.0);
        let mut target = test_player(2.0, 0.0);

        CombatSystem::knockback(attacker.position, &mut target);

        assert!(target.velocity.x > 0.0);
        assert_approx_eq!(target.velocity.z, 0.0);
    }

    #[test]
    fn goal_requires_crossing_inside_the_mouth() {
        let mut ball = Ball::new();

        ball.position = Vec3::new(0.0, 0.5, 24.5);
        assert_eq!(CombatSystem::check_goal(&ball), Some(Team::Blue));

        ball.position = Vec3::new(0.0, 0.5, -24.5);
        assert_eq!(CombatSystem::check_goal(&ball), Some(Team::Red));

        // Wide of the posts: no goal
        ball.position = Vec3::new(3.5, 0.5, 24.5);
        assert_eq!(CombatSystem::check_goal(&ball), None);

        // Short of the line: no goal
        ball.position = Vec3::new(0.0, 0.5, 23.5);
        assert_eq!(CombatSystem::check_goal(&ball), None);
    }
}
