//! Snapshot building for broadcast

use crate::ws::protocol::{BallView, GameStateView, PlayerView};

use super::world::WorldState;

/// Build the full authoritative state view sent to every client
pub fn build_game_state(state: &WorldState) -> GameStateView {
    let players: Vec<PlayerView> = state
        .players
        .values()
        .map(|p| PlayerView {
            id: p.id,
            name: p.name.clone(),
            team: p.team,
            position: p.position,
            rotation: p.rotation,
            health: p.health,
            is_knocked_out: p.knocked_out,
            give_ko_count: p.give_ko_count,
            receive_ko_count: p.receive_ko_count,
        })
        .collect();

    GameStateView {
        players,
        ball: BallView {
            position: state.ball.position,
            velocity: state.ball.velocity,
            spin: state.ball.spin,
        },
        score: state.score,
        game_started: state.started,
        game_time: state.game_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_world_state() {
        let mut state = WorldState::new(8, 7);
        let team = state.team_for_join();
        let spawn = state.spawn_position(team);
        let id = uuid::Uuid::new_v4();
        state.players.insert(
            id,
            crate::game::entity::Player::new(id, "viewer".to_string(), team, spawn),
        );
        state.started = true;
        state.game_time = 12.5;
        state.score.red = 2;

        let view = build_game_state(&state);

        assert_eq!(view.players.len(), 1);
        assert_eq!(view.players[0].id, id);
        assert_eq!(view.players[0].name, "viewer");
        assert!(view.game_started);
        assert_eq!(view.score.red, 2);
        assert_eq!(view.ball.position, state.ball.position);
    }
}
