//! Static quiz content: the round catalog and the question repository.
//!
//! Both are loaded once at startup and only ever handed out by shared
//! reference, so nothing downstream can reorder or edit them in place.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::types::{PictureBoard, Question, RoundComponent, RoundDefinition};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid quiz content: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("round catalog must contain at least one round")]
    Empty,
}

fn read_file(path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Ordered list of rounds, addressed by index everywhere else
#[derive(Debug, Clone)]
pub struct RoundCatalog {
    rounds: Vec<RoundDefinition>,
}

impl RoundCatalog {
    pub fn new(rounds: Vec<RoundDefinition>) -> Result<Self, CatalogError> {
        if rounds.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { rounds })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        Self::from_json(&read_file(path.as_ref())?)
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    /// Always false; construction rejects empty catalogs
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RoundDefinition> {
        self.rounds.get(index)
    }

    pub fn rounds(&self) -> &[RoundDefinition] {
        &self.rounds
    }

    pub fn last_index(&self) -> usize {
        self.rounds.len() - 1
    }

    /// First round rendered by the given component
    pub fn find_component(&self, component: RoundComponent) -> Option<&RoundDefinition> {
        self.rounds.iter().find(|r| r.component == component)
    }
}

impl Default for RoundCatalog {
    fn default() -> Self {
        let round = |id: &str,
                     name: &str,
                     description: &str,
                     timer_duration: Option<u32>,
                     is_team_round: bool,
                     component: RoundComponent| RoundDefinition {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            timer_duration,
            is_team_round,
            component,
        };

        Self {
            rounds: vec![
                round("world-rankings", "World Rankings", "Rank items in order", None, true, RoundComponent::WorldRankings),
                round("just-one", "Just One", "Give a unique answer", None, false, RoundComponent::Generic),
                round("picture-board", "Picture Board", "Identify the images", Some(60), true, RoundComponent::PictureBoard),
                round("only-connect", "Only Connect", "Find the connection", None, true, RoundComponent::OnlyConnect),
                round("round-robin", "Round Robin", "Take turns answering", None, false, RoundComponent::Generic),
                round("daves-dozen", "Dave's Dozen", "Name all twelve", None, true, RoundComponent::DavesDozen),
                round("ellies-tellies", "Ellie's Tellies", "Picture round", None, true, RoundComponent::ElliesTellies),
                round("distinctly-average", "Distinctly Average", "Guess the average", None, false, RoundComponent::Generic),
                round("wipeout", "Wipeout", "Risk vs reward", None, true, RoundComponent::Generic),
                round("one-minute-round", "One Minute Round", "Quick fire questions", Some(60), true, RoundComponent::OneMinuteRound),
                round("f1-grand-prix", "F1 Grand Prix Final", "The final race!", None, true, RoundComponent::F1GrandPrix),
            ],
        }
    }
}

/// Content of a single round in the questions file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoundContent {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub boards: Vec<PictureBoard>,
}

/// Read-only lookup of questions and picture boards by round id
#[derive(Debug, Clone, Default)]
pub struct QuestionRepository {
    rounds: HashMap<String, RoundContent>,
}

impl QuestionRepository {
    pub fn new(rounds: HashMap<String, RoundContent>) -> Self {
        Self { rounds }
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        Self::from_json(&read_file(path.as_ref())?)
    }

    /// Questions for a round; empty when the round has no content
    pub fn questions(&self, round_id: &str) -> &[Question] {
        self.rounds
            .get(round_id)
            .map(|r| r.questions.as_slice())
            .unwrap_or(&[])
    }

    pub fn boards(&self, round_id: &str) -> &[PictureBoard] {
        self.rounds
            .get(round_id)
            .map(|r| r.boards.as_slice())
            .unwrap_or(&[])
    }

    pub fn board(&self, round_id: &str, board_id: &str) -> Option<&PictureBoard> {
        self.boards(round_id).iter().find(|b| b.id == board_id)
    }

    pub fn title(&self, round_id: &str) -> Option<&str> {
        self.rounds.get(round_id)?.title.as_deref()
    }

    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }
}
