mod daves_dozen;
mod deferred;
mod game;
mod only_connect;
mod picture_board;
mod question;
mod score;
mod timer;

pub use deferred::{EffectKind, ScheduledEffect, SchedulerRequest};
pub use only_connect::ONLY_CONNECT_POINTS;

use crate::catalog::{QuestionRepository, RoundCatalog};
use crate::config::StoreConfig;
use crate::protocol::Command;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use deferred::DeferredTokens;

/// The replicated game state. Identical on the co-host and every display
/// as long as they have applied the same commands in the same order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub phase: Phase,
    pub current_round_index: usize,
    /// True while the previous round's content must not be rendered
    pub is_transitioning: bool,
    pub current_question_index: usize,
    pub active_questions: Vec<Question>,
    pub reveal_answer: bool,
    pub teams: Vec<Team>,
    pub timer: TimerState,
    pub f1: F1State,
    pub picture_board: PictureBoardState,
    pub only_connect: OnlyConnectState,
    pub daves_dozen: DavesDozenState,
}

impl GameSnapshot {
    pub fn initial(
        catalog: &RoundCatalog,
        questions: &QuestionRepository,
        config: &StoreConfig,
    ) -> Self {
        let team_ids = 1..=config.team_count;
        let boards = catalog
            .find_component(RoundComponent::PictureBoard)
            .map(|round| questions.boards(&round.id).to_vec())
            .unwrap_or_default();

        Self {
            phase: Phase::Welcome,
            current_round_index: 0,
            is_transitioning: false,
            current_question_index: 0,
            active_questions: Vec::new(),
            reveal_answer: false,
            teams: team_ids
                .clone()
                .map(|id| Team::new(id, catalog.len()))
                .collect(),
            timer: TimerState {
                value: config.default_timer_seconds,
                running: false,
            },
            f1: F1State {
                positions: team_ids.clone().map(|id| (id, 0.0)).collect(),
            },
            picture_board: PictureBoardState {
                available_boards: boards.iter().map(|b| b.id.clone()).collect(),
                selected_boards: Default::default(),
                current_team_selecting: 1,
                boards,
                current_board: None,
                current_picture_index: 0,
                show_all_pictures: false,
            },
            only_connect: OnlyConnectState::default(),
            daves_dozen: DavesDozenState::default(),
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.active_questions.get(self.current_question_index)
    }

    pub fn team(&self, team_id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }
}

/// Result of applying a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Valid but changed nothing, e.g. navigating past the last question
    Unchanged,
    /// Dropped by a debounce window
    Debounced,
}

impl Outcome {
    /// Whether other replicas need to see the command
    pub fn should_broadcast(self) -> bool {
        self == Outcome::Applied
    }
}

/// Where a command came from. Only locally issued commands are debounced,
/// replayed ones were already filtered by the leader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Local,
    Replay,
}

/// Drops repeats of a presenter action inside a time window
#[derive(Debug, Default)]
struct Debounce {
    last: Option<Instant>,
}

impl Debounce {
    /// True when the last accepted call is less than `window` ago.
    /// Otherwise the call is accepted and its time recorded.
    fn hit(&mut self, window: Duration) -> bool {
        let now = Instant::now();
        if self.last.is_some_and(|last| now.duration_since(last) < window) {
            return true;
        }
        self.last = Some(now);
        false
    }
}

/// Owns one replica of the snapshot and every mutation of it
#[derive(Debug)]
pub struct GameStore {
    catalog: Arc<RoundCatalog>,
    questions: Arc<QuestionRepository>,
    config: StoreConfig,
    snapshot: GameSnapshot,
    deferred: DeferredTokens,
    requests: Vec<SchedulerRequest>,
    team_time_up_guard: Debounce,
    reveal_guard: Debounce,
}

impl GameStore {
    pub fn new(
        catalog: Arc<RoundCatalog>,
        questions: Arc<QuestionRepository>,
        config: StoreConfig,
    ) -> Self {
        let snapshot = GameSnapshot::initial(&catalog, &questions, &config);
        Self {
            catalog,
            questions,
            config,
            snapshot,
            deferred: DeferredTokens::default(),
            requests: Vec::new(),
            team_time_up_guard: Debounce::default(),
            reveal_guard: Debounce::default(),
        }
    }

    pub fn snapshot(&self) -> &GameSnapshot {
        &self.snapshot
    }

    pub fn catalog(&self) -> &RoundCatalog {
        &self.catalog
    }

    pub fn questions(&self) -> &QuestionRepository {
        &self.questions
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn current_round(&self) -> &RoundDefinition {
        // current_round_index is kept within the catalog by every command
        &self.catalog.rounds()[self.snapshot.current_round_index]
    }

    /// Apply a command issued on this replica
    pub fn apply(&mut self, cmd: &Command) -> Outcome {
        self.execute(cmd, Origin::Local)
    }

    /// Apply a command received from the leader
    pub fn replay(&mut self, cmd: &Command) -> Outcome {
        self.execute(cmd, Origin::Replay)
    }

    fn execute(&mut self, cmd: &Command, origin: Origin) -> Outcome {
        tracing::debug!(action = cmd.action(), ?origin, "Applying command");
        if self.debounced(cmd, origin) {
            return Outcome::Debounced;
        }
        let before = self.snapshot.clone();
        let generation = self.deferred.generation();

        match cmd {
            Command::StartGame => self.start_game(),
            Command::StartRound => self.start_round(),
            Command::NextRound => self.next_round(),
            Command::PreviousRound => self.previous_round(),
            Command::GoToRound { index } => self.go_to_round(*index),
            Command::ShowScores => self.show_scores(),
            Command::ShowTransition => self.show_transition(),
            Command::ShowFinal => self.show_final(),
            Command::StartTimer => self.start_timer(),
            Command::PauseTimer => self.pause_timer(),
            Command::ResetTimer { duration } => self.reset_timer(*duration),
            Command::UpdateTeamScore {
                team_id,
                round_index,
                score,
            } => self.update_team_score(*team_id, *round_index, *score),
            Command::AddToTeamScore { team_id, points } => {
                self.add_to_team_score(*team_id, *points)
            }
            Command::AdvanceF1Car { team_id, amount } => self.advance_f1_car(*team_id, *amount),
            Command::UpdateF1Position { team_id, position } => {
                self.update_f1_position(*team_id, *position)
            }
            Command::ToggleAnswer => self.toggle_answer(),
            Command::NextQuestion => self.next_question(),
            Command::PreviousQuestion => self.previous_question(),
            Command::GoToQuestion { index } => self.go_to_question(*index),
            Command::SelectBoard { team_id, board_id } => self.select_board(*team_id, board_id),
            Command::TeamTimeUp => self.advance_selecting_team(),
            Command::NextPicture => self.next_picture(),
            Command::PreviousPicture => self.previous_picture(),
            Command::ResetPictureBoard => self.reset_picture_board(),
            Command::RevealOnlyConnectOption => self.reveal_only_connect_option(),
            Command::ResetOnlyConnect => self.reset_only_connect(),
            Command::RevealDavesDozenAnswer { answer_number } => {
                self.reveal_daves_dozen_answer(*answer_number)
            }
            Command::ShowIncorrectAnswer => self.show_incorrect_answer(),
            Command::ResetDavesDozen => self.reset_daves_dozen(),
            Command::ResetGame => self.reset_game(),
        }

        if self.snapshot == before && self.deferred.generation() == generation {
            Outcome::Unchanged
        } else {
            Outcome::Applied
        }
    }

    // Only locally issued commands are debounced; the leader never
    // broadcasts the dropped ones, so replays must not drop anything
    fn debounced(&mut self, cmd: &Command, origin: Origin) -> bool {
        if origin == Origin::Replay {
            return false;
        }
        let (guard, window) = match cmd {
            Command::TeamTimeUp => (
                &mut self.team_time_up_guard,
                self.config.team_time_up_debounce,
            ),
            Command::RevealOnlyConnectOption => (
                &mut self.reveal_guard,
                self.config.only_connect_reveal_debounce,
            ),
            _ => return false,
        };
        let hit = guard.hit(window);
        if hit {
            tracing::debug!(action = cmd.action(), "Debounced command");
        }
        hit
    }

    /// Replace the whole snapshot, e.g. after a resync.
    ///
    /// Pending delayed effects belong to the old context and are cancelled.
    /// Transient flags set in the restored snapshot get a fresh timer so
    /// they still clear on this replica.
    pub fn restore(&mut self, snapshot: GameSnapshot) {
        self.snapshot = snapshot;
        self.snapshot.current_round_index = self
            .snapshot
            .current_round_index
            .min(self.catalog.last_index());
        self.cancel_all_deferred();
        if self.snapshot.is_transitioning {
            self.schedule(EffectKind::SettleTransition, self.config.transition_settle_delay);
        }
        if self.snapshot.daves_dozen.show_incorrect {
            self.schedule(EffectKind::ClearIncorrect, self.config.incorrect_flash);
        }
        tracing::info!(
            phase = ?self.snapshot.phase,
            round = self.snapshot.current_round_index,
            "Snapshot restored"
        );
    }

    fn team_mut(&mut self, team_id: TeamId) -> Option<&mut Team> {
        self.snapshot.teams.iter_mut().find(|t| t.id == team_id)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::store;
    use super::*;

    #[test]
    fn test_initial_snapshot() {
        let store = store();
        let snapshot = store.snapshot();

        assert_eq!(snapshot.phase, Phase::Welcome);
        assert_eq!(snapshot.current_round_index, 0);
        assert_eq!(snapshot.teams.len(), 3);
        assert!(snapshot.teams.iter().all(|t| t.scores().len() == 11));
        assert_eq!(snapshot.timer, TimerState { value: 60, running: false });
        assert_eq!(snapshot.f1.positions.len(), 3);
        assert_eq!(
            snapshot.picture_board.available_boards,
            vec!["board-1", "board-2", "board-3"]
        );
        assert_eq!(snapshot.picture_board.current_team_selecting, 1);
        assert_eq!(snapshot.only_connect.revealed_options, 1);
        assert!(snapshot.daves_dozen.revealed_answers.is_empty());
    }

    #[test]
    fn test_scenario_start_game_then_round() {
        let mut store = store();

        store.apply(&Command::StartGame);
        assert_eq!(store.snapshot().phase, Phase::RoundTransition);
        assert_eq!(store.snapshot().current_round_index, 0);
        assert!(store.snapshot().active_questions.is_empty());

        store.apply(&Command::StartRound);
        assert_eq!(store.snapshot().phase, Phase::Round);
        assert_eq!(store.snapshot().active_questions.len(), 3);
        assert!(!store.snapshot().is_transitioning);
    }

    #[test]
    fn test_every_command_is_total() {
        let mut store = store();
        let commands = [
            Command::PreviousRound,
            Command::PreviousQuestion,
            Command::NextQuestion,
            Command::GoToQuestion { index: 99 },
            Command::GoToRound { index: 99 },
            Command::UpdateTeamScore {
                team_id: 9,
                round_index: 0,
                score: 1,
            },
            Command::UpdateTeamScore {
                team_id: 1,
                round_index: 99,
                score: 1,
            },
            Command::AddToTeamScore {
                team_id: 0,
                points: 3,
            },
            Command::AdvanceF1Car {
                team_id: 7,
                amount: 10.0,
            },
            Command::SelectBoard {
                team_id: 1,
                board_id: "no-such-board".to_string(),
            },
            Command::NextPicture,
            Command::PreviousPicture,
            Command::RevealDavesDozenAnswer { answer_number: 13 },
        ];
        let before = store.snapshot().clone();
        for cmd in &commands {
            assert_eq!(store.apply(cmd), Outcome::Unchanged, "{:?}", cmd);
        }
        assert_eq!(store.snapshot(), &before);
    }

    #[test]
    fn test_replay_determinism() {
        let commands = vec![
            Command::StartGame,
            Command::StartRound,
            Command::NextQuestion,
            Command::ToggleAnswer,
            Command::AddToTeamScore {
                team_id: 1,
                points: 4,
            },
            Command::GoToRound { index: 2 },
            Command::StartRound,
            Command::SelectBoard {
                team_id: 1,
                board_id: "board-2".to_string(),
            },
            Command::NextPicture,
            Command::TeamTimeUp,
            Command::AdvanceF1Car {
                team_id: 3,
                amount: 35.0,
            },
            Command::RevealDavesDozenAnswer { answer_number: 4 },
            Command::ResetTimer { duration: None },
            Command::StartTimer,
        ];

        let mut leader = store();
        let mut follower = store();
        for cmd in &commands {
            leader.apply(cmd);
            follower.replay(cmd);
        }
        leader.flush_deferred();
        follower.flush_deferred();

        assert_eq!(leader.snapshot(), follower.snapshot());
    }

    #[test]
    fn test_outcome_reports_effective_change() {
        let mut store = store();
        assert_eq!(store.apply(&Command::StartGame), Outcome::Applied);
        // no questions loaded yet
        assert_eq!(store.apply(&Command::NextQuestion), Outcome::Unchanged);
        assert_eq!(store.apply(&Command::ShowTransition), Outcome::Unchanged);

        // re-arming the flash only changes its timer
        assert_eq!(store.apply(&Command::ShowIncorrectAnswer), Outcome::Applied);
        assert_eq!(store.apply(&Command::ShowIncorrectAnswer), Outcome::Applied);

        assert!(Outcome::Applied.should_broadcast());
        assert!(!Outcome::Unchanged.should_broadcast());
        assert!(!Outcome::Debounced.should_broadcast());
    }

    #[test]
    fn test_restore_reschedules_transient_flags() {
        let mut source = store();
        source.apply(&Command::NextRound);
        source.apply(&Command::ShowIncorrectAnswer);
        assert!(source.snapshot().is_transitioning);

        let mut target = store();
        target.restore(source.snapshot().clone());
        let scheduled: Vec<EffectKind> = target
            .drain_scheduler_requests()
            .into_iter()
            .filter_map(|r| match r {
                SchedulerRequest::Schedule(effect) => Some(effect.kind),
                SchedulerRequest::Cancel(_) => None,
            })
            .collect();
        assert!(scheduled.contains(&EffectKind::SettleTransition));
        assert!(scheduled.contains(&EffectKind::ClearIncorrect));

        target.restore(source.snapshot().clone());
        assert_eq!(target.flush_deferred(), 2);
        assert!(!target.snapshot().is_transitioning);
        assert!(!target.snapshot().daves_dozen.show_incorrect);
    }

    #[test]
    fn test_restore_replaces_snapshot_and_cancels_effects() {
        let mut source = store();
        source.apply(&Command::GoToRound { index: 5 });
        source.apply(&Command::StartRound);
        source.apply(&Command::RevealDavesDozenAnswer { answer_number: 2 });

        let mut target = store();
        target.apply(&Command::ShowIncorrectAnswer);
        target.drain_scheduler_requests();

        target.restore(source.snapshot().clone());
        assert_eq!(target.snapshot(), source.snapshot());
        assert!(target
            .drain_scheduler_requests()
            .contains(&SchedulerRequest::Cancel(EffectKind::ClearIncorrect)));
    }
}
