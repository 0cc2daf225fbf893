use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Opaque ID types for type safety
pub type RoundId = String;
pub type QuestionId = String;
pub type BoardId = String;
pub type TeamId = u32;
pub type ConnectionId = String;

/// Top-level state of the show
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    #[default]
    Welcome,
    RoundTransition,
    Round,
    Scores,
    Final,
}

/// Which presentation component renders a round
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoundComponent {
    Generic,
    WorldRankings,
    PictureBoard,
    OnlyConnect,
    DavesDozen,
    ElliesTellies,
    OneMinuteRound,
    F1GrandPrix,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoundDefinition {
    pub id: RoundId,
    pub name: String,
    pub description: String,
    /// Seconds on the clock; None means the round is untimed
    #[serde(default)]
    pub timer_duration: Option<u32>,
    pub is_team_round: bool,
    pub component: RoundComponent,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Single,
    Ranking,
    Picture,
    Connection,
    Auction,
    Average,
    Wipeout,
    Quickfire,
    F1,
}

/// Structured option entry; any subset of fields may be present
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OptionDetail {
    #[serde(default, alias = "text")]
    pub label: Option<String>,
    #[serde(default)]
    pub sublabel: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Position in the correct ranking (ranking questions)
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default)]
    pub correct_answer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum QuestionOption {
    Label(String),
    Detailed(OptionDetail),
}

impl QuestionOption {
    pub fn label(&self) -> Option<&str> {
        match self {
            QuestionOption::Label(label) => Some(label),
            QuestionOption::Detailed(detail) => detail.label.as_deref(),
        }
    }

    pub fn order(&self) -> Option<u32> {
        match self {
            QuestionOption::Label(_) => None,
            QuestionOption::Detailed(detail) => detail.order,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Answer {
    Single(String),
    List(Vec<String>),
}

/// One of the twelve numbered answers of a Dave's Dozen question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DozenAnswer {
    pub number: u8,
    pub answer: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<QuestionOption>,
    pub answer: Answer,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub points: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub answers: Vec<DozenAnswer>,
}

impl Question {
    /// Options in the order they should be revealed for a ranking question.
    ///
    /// Returns a local ordering of borrowed options; the question itself is
    /// never reordered. Options without an explicit `order` keep their
    /// original position after the ordered ones.
    pub fn options_in_reveal_order(&self) -> Vec<&QuestionOption> {
        let mut indexed: Vec<(usize, &QuestionOption)> = self.options.iter().enumerate().collect();
        indexed.sort_by_key(|(position, option)| (option.order().unwrap_or(u32::MAX), *position));
        indexed.into_iter().map(|(_, option)| option).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Picture {
    pub number: u32,
    pub image_url: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PictureBoard {
    pub id: BoardId,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub pictures: Vec<Picture>,
}

/// A team with one score cell per catalog round.
///
/// The score array is sized once at creation and every write updates the
/// total with it. Writes that would overflow either are refused.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    scores: Vec<i32>,
    total_score: i32,
}

impl Team {
    pub fn new(id: TeamId, round_count: usize) -> Self {
        Self {
            id,
            name: format!("Team {}", id),
            scores: vec![0; round_count],
            total_score: 0,
        }
    }

    pub fn scores(&self) -> &[i32] {
        &self.scores
    }

    pub fn total_score(&self) -> i32 {
        self.total_score
    }

    /// Set one round's score
    pub fn set_score(&mut self, round_index: usize, score: i32) -> Result<(), ScoreError> {
        let current = *self
            .scores
            .get(round_index)
            .ok_or(ScoreError::UnknownRound(round_index))?;
        let total = self.total_with(current, score)?;
        self.scores[round_index] = score;
        self.total_score = total;
        Ok(())
    }

    /// Add to one round's score
    pub fn add_score(&mut self, round_index: usize, points: i32) -> Result<(), ScoreError> {
        let current = *self
            .scores
            .get(round_index)
            .ok_or(ScoreError::UnknownRound(round_index))?;
        let score = current.checked_add(points).ok_or(ScoreError::Overflow)?;
        self.set_score(round_index, score)
    }

    // Total after replacing one cell's `old` value with `new`
    fn total_with(&self, old: i32, new: i32) -> Result<i32, ScoreError> {
        let total = i64::from(self.total_score) - i64::from(old) + i64::from(new);
        i32::try_from(total).map_err(|_| ScoreError::Overflow)
    }
}

/// Why a score write was refused; the team is left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScoreError {
    #[error("no round at index {0}")]
    UnknownRound(usize),
    #[error("score out of range")]
    Overflow,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimerState {
    pub value: u32,
    pub running: bool,
}

/// F1 finale car positions, percent of the track per team
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct F1State {
    pub positions: BTreeMap<TeamId, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PictureBoardState {
    pub available_boards: Vec<BoardId>,
    pub selected_boards: BTreeMap<TeamId, BoardId>,
    /// Team whose turn it is; one past the last team once everyone has gone
    pub current_team_selecting: TeamId,
    pub boards: Vec<PictureBoard>,
    pub current_board: Option<BoardId>,
    pub current_picture_index: usize,
    pub show_all_pictures: bool,
}

impl PictureBoardState {
    pub fn current_board(&self) -> Option<&PictureBoard> {
        let id = self.current_board.as_ref()?;
        self.boards.iter().find(|b| &b.id == id)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OnlyConnectState {
    /// Number of clues on screen, 1 through 4
    pub revealed_options: u8,
}

impl Default for OnlyConnectState {
    fn default() -> Self {
        Self {
            revealed_options: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DavesDozenState {
    pub revealed_answers: BTreeSet<u8>,
    pub show_incorrect: bool,
}

/// Client roles on the relay
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Cohost,
    Display,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_total_tracks_cells() {
        let mut team = Team::new(1, 3);
        team.set_score(0, 7).unwrap();
        team.add_score(0, -2).unwrap();
        team.set_score(2, 10).unwrap();
        assert_eq!(team.scores(), &[5, 0, 10]);
        assert_eq!(team.total_score(), 15);
        assert_eq!(team.set_score(3, 1), Err(ScoreError::UnknownRound(3)));
    }

    #[test]
    fn test_score_overflow_is_refused() {
        let mut team = Team::new(1, 2);
        team.set_score(0, i32::MAX).unwrap();

        assert_eq!(team.set_score(1, 1), Err(ScoreError::Overflow));
        assert_eq!(team.add_score(0, 1), Err(ScoreError::Overflow));
        assert_eq!(team.scores(), &[i32::MAX, 0]);
        assert_eq!(team.total_score(), i32::MAX);

        // lowering a cell is still fine
        team.set_score(1, -5).unwrap();
        assert_eq!(team.total_score(), i32::MAX - 5);
    }
}
