//! Entity data records for the arena: vector math, players, ball

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A vector in 3D space. Serializes as `{x, y, z}` for wire compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Magnitude of the horizontal (x/z) components only
    pub fn horizontal_length(&self) -> f32 {
        (self.x * self.x + self.z * self.z).sqrt()
    }

    pub fn normalize(&self) -> Vec3 {
        let len = self.length();
        if len == 0.0 {
            Vec3::ZERO
        } else {
            self.scale(1.0 / len)
        }
    }

    pub fn scale(&self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    pub fn add(&self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }

    pub fn sub(&self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }

    pub fn dot(&self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Scale so the vector's magnitude does not exceed `max`
    pub fn clamp_length(&self, max: f32) -> Vec3 {
        let len = self.length();
        if len > max {
            self.scale(max / len)
        } else {
            *self
        }
    }
}

/// Team assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Blue,
    Red,
}

/// Player state (authoritative)
#[derive(Debug, Clone)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub team: Team,

    // Position and movement
    pub position: Vec3,
    pub velocity: Vec3,
    /// Facing angle in radians, client-supplied, cosmetic only
    pub rotation: f32,

    // Combat
    pub health: f32,
    pub knocked_out: bool,
    /// Wall-clock deadline (unix millis) for recovery from knockout
    pub respawn_at: Option<u64>,
    /// Timestamp of the last accepted punch (unix millis)
    pub last_punch: u64,

    // Scoreboard counters
    pub give_ko_count: u32,
    pub receive_ko_count: u32,
}

impl Player {
    pub fn new(id: Uuid, name: String, team: Team, spawn: Vec3) -> Self {
        Self {
            id,
            name,
            team,
            position: spawn,
            velocity: Vec3::ZERO,
            rotation: 0.0,
            health: 100.0,
            knocked_out: false,
            respawn_at: None,
            last_punch: 0,
            give_ko_count: 0,
            receive_ko_count: 0,
        }
    }
}

/// The shared ball (singleton per world)
#[derive(Debug, Clone)]
pub struct Ball {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Angular rate vector, drives the Magnus curve on spinning shots
    pub spin: Vec3,
    pub radius: f32,
    pub mass: f32,
}

impl Ball {
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, 0.5, 0.0),
            velocity: Vec3::ZERO,
            spin: Vec3::ZERO,
            radius: 0.5,
            mass: 1.0,
        }
    }

    /// Return the ball to the center circle at rest
    pub fn reset(&mut self) {
        self.position = Vec3::new(0.0, self.radius, 0.0);
        self.velocity = Vec3::ZERO;
        self.spin = Vec3::ZERO;
    }
}

impl Default for Ball {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn normalize_zero_vector_is_zero() {
        assert_eq!(Vec3::ZERO.normalize(), Vec3::ZERO);
    }

    #[test]
    fn cross_product_is_perpendicular() {
        let spin = Vec3::new(0.0, 3.0, 0.0);
        let vel = Vec3::new(10.0, 0.0, 0.0);
        let force = spin.cross(vel);
        assert_approx_eq!(force.dot(spin), 0.0);
        assert_approx_eq!(force.dot(vel), 0.0);
        // y-spin on +x motion curves in -z
        assert!(force.z < 0.0);
    }

    #[test]
    fn clamp_length_preserves_direction() {
        let v = Vec3::new(30.0, 0.0, 40.0);
        let clamped = v.clamp_length(10.0);
        assert_approx_eq!(clamped.length(), 10.0, 1e-4);
        assert_approx_eq!(clamped.x / clamped.z, v.x / v.z, 1e-4);
    }

    #[test]
    fn ball_reset_returns_to_center() {
        let mut ball = Ball::new();
        ball.position = Vec3::new(12.0, 4.0, -20.0);
        ball.velocity = Vec3::new(5.0, 1.0, -3.0);
        ball.spin = Vec3::new(0.0, 2.0, 0.0);
        ball.reset();
        assert_eq!(ball.position, Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(ball.velocity, Vec3::ZERO);
        assert_eq!(ball.spin, Vec3::ZERO);
    }
}
