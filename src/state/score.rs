use super::GameStore;
use crate::types::TeamId;

const F1_TRACK_MIN: f64 = 0.0;
const F1_TRACK_MAX: f64 = 100.0;

impl GameStore {
    /// Overwrite one round's score for a team
    pub fn update_team_score(&mut self, team_id: TeamId, round_index: usize, score: i32) {
        match self.team_mut(team_id) {
            Some(team) => {
                if let Err(e) = team.set_score(round_index, score) {
                    tracing::warn!(team_id, round_index, score, "Ignoring score: {}", e);
                }
            }
            None => tracing::warn!(team_id, "Ignoring score for unknown team"),
        }
    }

    /// Add points to the current round's cell for a team
    pub fn add_to_team_score(&mut self, team_id: TeamId, points: i32) {
        let round_index = self.snapshot.current_round_index;
        match self.team_mut(team_id) {
            Some(team) => {
                if let Err(e) = team.add_score(round_index, points) {
                    tracing::warn!(team_id, round_index, points, "Ignoring points: {}", e);
                }
            }
            None => tracing::warn!(team_id, "Ignoring points for unknown team"),
        }
    }

    /// Move a team's car, clamped to the track
    pub fn advance_f1_car(&mut self, team_id: TeamId, amount: f64) {
        match self.snapshot.f1.positions.get_mut(&team_id) {
            Some(position) if amount.is_finite() => {
                *position = (*position + amount).clamp(F1_TRACK_MIN, F1_TRACK_MAX);
            }
            Some(_) => tracing::warn!(team_id, amount, "Ignoring non-finite F1 advance"),
            None => tracing::warn!(team_id, "Ignoring F1 advance for unknown team"),
        }
    }

    /// Place a team's car at an absolute position, clamped to the track
    pub fn update_f1_position(&mut self, team_id: TeamId, position: f64) {
        match self.snapshot.f1.positions.get_mut(&team_id) {
            Some(current) if position.is_finite() => {
                *current = position.clamp(F1_TRACK_MIN, F1_TRACK_MAX);
            }
            Some(_) => tracing::warn!(team_id, position, "Ignoring non-finite F1 position"),
            None => tracing::warn!(team_id, "Ignoring F1 position for unknown team"),
        }
    }
}
