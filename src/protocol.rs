use crate::state::GameSnapshot;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Every store mutation that travels between replicas.
///
/// The same enum is serialized by the co-host when broadcasting and
/// deserialized by displays when replaying, as `{"action": ..., "data": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "action",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Command {
    StartGame,
    StartRound,
    NextRound,
    PreviousRound,
    GoToRound {
        index: usize,
    },
    ShowScores,
    ShowTransition,
    ShowFinal,
    StartTimer,
    PauseTimer,
    ResetTimer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration: Option<u32>,
    },
    UpdateTeamScore {
        team_id: TeamId,
        round_index: usize,
        score: i32,
    },
    AddToTeamScore {
        team_id: TeamId,
        points: i32,
    },
    AdvanceF1Car {
        team_id: TeamId,
        amount: f64,
    },
    UpdateF1Position {
        team_id: TeamId,
        position: f64,
    },
    ToggleAnswer,
    NextQuestion,
    PreviousQuestion,
    GoToQuestion {
        index: usize,
    },
    SelectBoard {
        team_id: TeamId,
        board_id: BoardId,
    },
    TeamTimeUp,
    NextPicture,
    PreviousPicture,
    ResetPictureBoard,
    RevealOnlyConnectOption,
    ResetOnlyConnect,
    RevealDavesDozenAnswer {
        answer_number: u8,
    },
    ShowIncorrectAnswer,
    ResetDavesDozen,
    ResetGame,
}

impl Command {
    /// Wire name of the command, as carried in the `action` field
    pub fn action(&self) -> &'static str {
        match self {
            Command::StartGame => "startGame",
            Command::StartRound => "startRound",
            Command::NextRound => "nextRound",
            Command::PreviousRound => "previousRound",
            Command::GoToRound { .. } => "goToRound",
            Command::ShowScores => "showScores",
            Command::ShowTransition => "showTransition",
            Command::ShowFinal => "showFinal",
            Command::StartTimer => "startTimer",
            Command::PauseTimer => "pauseTimer",
            Command::ResetTimer { .. } => "resetTimer",
            Command::UpdateTeamScore { .. } => "updateTeamScore",
            Command::AddToTeamScore { .. } => "addToTeamScore",
            Command::AdvanceF1Car { .. } => "advanceF1Car",
            Command::UpdateF1Position { .. } => "updateF1Position",
            Command::ToggleAnswer => "toggleAnswer",
            Command::NextQuestion => "nextQuestion",
            Command::PreviousQuestion => "previousQuestion",
            Command::GoToQuestion { .. } => "goToQuestion",
            Command::SelectBoard { .. } => "selectBoard",
            Command::TeamTimeUp => "teamTimeUp",
            Command::NextPicture => "nextPicture",
            Command::PreviousPicture => "previousPicture",
            Command::ResetPictureBoard => "resetPictureBoard",
            Command::RevealOnlyConnectOption => "revealOnlyConnectOption",
            Command::ResetOnlyConnect => "resetOnlyConnect",
            Command::RevealDavesDozenAnswer { .. } => "revealDavesDozenAnswer",
            Command::ShowIncorrectAnswer => "showIncorrectAnswer",
            Command::ResetDavesDozen => "resetDavesDozen",
            Command::ResetGame => "resetGame",
        }
    }
}

/// Messages sent by clients to the relay
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Co-host only: a command that was just applied locally
    StateUpdate { payload: Command },
    /// Ask for the relay's current snapshot after a missed message
    RequestSync,
}

/// Messages sent by the relay to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        role: Role,
        connection_id: ConnectionId,
        snapshot: Box<GameSnapshot>,
        cohost_connected: bool,
        server_now: String,
    },
    StateUpdate {
        payload: Command,
    },
    Snapshot {
        snapshot: Box<GameSnapshot>,
    },
    CohostStatus {
        connected: bool,
    },
    Error {
        code: String,
        msg: String,
    },
}
