use super::GameStore;
use crate::types::{BoardId, RoundComponent, TeamId};

impl GameStore {
    /// Record a team's board choice.
    ///
    /// A team that changes its mind gets its previous board back on the
    /// available list. Boards another team already holds are refused.
    pub fn select_board(&mut self, team_id: TeamId, board_id: &str) {
        if team_id == 0 || team_id > self.config.team_count {
            tracing::warn!(team_id, board_id, "Ignoring board choice for unknown team");
            return;
        }

        let state = &mut self.snapshot.picture_board;
        if state.selected_boards.get(&team_id).map(String::as_str) == Some(board_id) {
            return;
        }
        let Some(position) = state.available_boards.iter().position(|b| b == board_id) else {
            tracing::warn!(team_id, board_id, "Ignoring unavailable board");
            return;
        };
        state.available_boards.remove(position);

        if let Some(previous) = state.selected_boards.insert(team_id, board_id.to_string()) {
            state.available_boards.push(previous);
            // keep the list in board order
            let boards = &state.boards;
            state
                .available_boards
                .sort_by_key(|id| boards.iter().position(|b| &b.id == id));
        }

        if team_id == state.current_team_selecting {
            state.current_board = Some(board_id.to_string());
            self.reset_picture_board();
        }
        tracing::info!(team_id, board_id, "Board selected");
    }

    /// The active team's time is up; hand over to the next team.
    ///
    /// Once every team has gone the turn rests one past the last team,
    /// which marks the round complete.
    pub fn advance_selecting_team(&mut self) {
        let team_count = self.config.team_count;
        let state = &mut self.snapshot.picture_board;
        if state.current_team_selecting > team_count {
            return;
        }
        state.current_team_selecting += 1;
        state.current_board = state
            .selected_boards
            .get(&state.current_team_selecting)
            .cloned();
        self.reset_picture_board();
        tracing::info!(
            team = self.snapshot.picture_board.current_team_selecting,
            complete = self.picture_board_complete(),
            "Picture board turn advanced"
        );
    }

    /// The team and board whose first picture is on screen, if any.
    ///
    /// The co-host starts the countdown whenever this changes to `Some`.
    pub fn picture_timer_cue(&self) -> Option<(TeamId, BoardId)> {
        if self.current_round().component != RoundComponent::PictureBoard {
            return None;
        }
        let state = &self.snapshot.picture_board;
        if state.current_picture_index != 0 || state.show_all_pictures {
            return None;
        }
        let team = state.current_team_selecting;
        let board = state.selected_boards.get(&team)?;
        Some((team, board.clone()))
    }

    pub fn picture_board_complete(&self) -> bool {
        self.snapshot.picture_board.current_team_selecting > self.config.team_count
    }

    pub fn next_picture(&mut self) {
        let Some(count) = self.active_picture_count() else {
            return;
        };
        let state = &mut self.snapshot.picture_board;
        if state.show_all_pictures || count == 0 {
            return;
        }
        if state.current_picture_index + 1 < count {
            state.current_picture_index += 1;
        } else {
            state.show_all_pictures = true;
        }
    }

    pub fn previous_picture(&mut self) {
        let Some(count) = self.active_picture_count() else {
            return;
        };
        let state = &mut self.snapshot.picture_board;
        if state.show_all_pictures {
            state.show_all_pictures = false;
            state.current_picture_index = count.saturating_sub(1);
        } else if state.current_picture_index > 0 {
            state.current_picture_index -= 1;
        }
    }

    pub fn reset_picture_board(&mut self) {
        let state = &mut self.snapshot.picture_board;
        state.current_picture_index = 0;
        state.show_all_pictures = false;
    }

    fn active_picture_count(&self) -> Option<usize> {
        self.snapshot
            .picture_board
            .current_board()
            .map(|board| board.pictures.len())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::store;
    use super::super::{GameStore, Outcome};
    use crate::protocol::Command;
    use std::time::Duration;

    fn select(store: &mut GameStore, team_id: u32, board_id: &str) {
        store.apply(&Command::SelectBoard {
            team_id,
            board_id: board_id.to_string(),
        });
    }

    fn picture_round() -> GameStore {
        let mut store = store();
        store.apply(&Command::GoToRound { index: 2 });
        store.apply(&Command::StartRound);
        store
    }

    #[test]
    fn test_selection_filters_available_boards() {
        let mut store = picture_round();
        select(&mut store, 1, "board-1");
        assert_eq!(store.snapshot().picture_board.available_boards, vec!["board-2", "board-3"]);
        select(&mut store, 2, "board-2");
        assert_eq!(store.snapshot().picture_board.available_boards, vec!["board-3"]);
        select(&mut store, 3, "board-3");
        assert!(store.snapshot().picture_board.available_boards.is_empty());
    }

    #[test]
    fn test_selecting_team_gets_active_board() {
        let mut store = picture_round();
        select(&mut store, 2, "board-3");
        assert_eq!(store.snapshot().picture_board.current_board, None);

        select(&mut store, 1, "board-1");
        let state = &store.snapshot().picture_board;
        assert_eq!(state.current_board.as_deref(), Some("board-1"));
        assert_eq!(state.current_board().unwrap().pictures.len(), 4);
    }

    #[test]
    fn test_taken_board_is_refused() {
        let mut store = picture_round();
        select(&mut store, 1, "board-2");
        select(&mut store, 2, "board-2");
        assert!(!store.snapshot().picture_board.selected_boards.contains_key(&2));
        assert_eq!(store.snapshot().picture_board.available_boards, vec!["board-1", "board-3"]);
    }

    #[test]
    fn test_reselection_returns_previous_board() {
        let mut store = picture_round();
        select(&mut store, 1, "board-1");
        store.apply(&Command::NextPicture);
        select(&mut store, 1, "board-3");

        let state = &store.snapshot().picture_board;
        assert_eq!(state.available_boards, vec!["board-1", "board-2"]);
        assert_eq!(state.selected_boards[&1], "board-3");
        assert_eq!(state.current_board.as_deref(), Some("board-3"));
        assert_eq!(state.current_picture_index, 0);
    }

    #[test]
    fn test_picture_navigation_and_show_all() {
        let mut store = picture_round();
        select(&mut store, 1, "board-1");

        for _ in 0..3 {
            store.apply(&Command::NextPicture);
        }
        assert_eq!(store.snapshot().picture_board.current_picture_index, 3);
        assert!(!store.snapshot().picture_board.show_all_pictures);

        store.apply(&Command::NextPicture);
        assert!(store.snapshot().picture_board.show_all_pictures);
        assert_eq!(store.snapshot().picture_board.current_picture_index, 3);
        store.apply(&Command::NextPicture);
        assert!(store.snapshot().picture_board.show_all_pictures);

        store.apply(&Command::PreviousPicture);
        assert!(!store.snapshot().picture_board.show_all_pictures);
        assert_eq!(store.snapshot().picture_board.current_picture_index, 3);

        store.apply(&Command::ResetPictureBoard);
        assert_eq!(store.snapshot().picture_board.current_picture_index, 0);
        store.apply(&Command::PreviousPicture);
        assert_eq!(store.snapshot().picture_board.current_picture_index, 0);
    }

    #[test]
    fn test_advance_resolves_preselected_board() {
        let mut store = picture_round();
        select(&mut store, 1, "board-1");
        select(&mut store, 2, "board-3");
        store.apply(&Command::NextPicture);
        store.apply(&Command::NextPicture);

        store.advance_selecting_team();
        let state = &store.snapshot().picture_board;
        assert_eq!(state.current_team_selecting, 2);
        assert_eq!(state.current_board.as_deref(), Some("board-3"));
        assert_eq!(state.current_picture_index, 0);

        store.advance_selecting_team();
        assert_eq!(store.snapshot().picture_board.current_team_selecting, 3);
        assert_eq!(store.snapshot().picture_board.current_board, None);
    }

    #[test]
    fn test_advance_stops_when_all_teams_done() {
        let mut store = picture_round();
        for _ in 0..6 {
            store.advance_selecting_team();
        }
        assert_eq!(store.snapshot().picture_board.current_team_selecting, 4);
        assert!(store.picture_board_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_team_time_up_debounce() {
        let mut store = picture_round();

        assert_eq!(store.apply(&Command::TeamTimeUp), Outcome::Applied);
        assert_eq!(store.apply(&Command::TeamTimeUp), Outcome::Debounced);
        assert_eq!(store.snapshot().picture_board.current_team_selecting, 2);

        tokio::time::advance(Duration::from_millis(999)).await;
        assert_eq!(store.apply(&Command::TeamTimeUp), Outcome::Debounced);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(store.apply(&Command::TeamTimeUp), Outcome::Applied);
        assert_eq!(store.snapshot().picture_board.current_team_selecting, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replayed_team_time_up_is_not_debounced() {
        let mut store = picture_round();
        store.replay(&Command::TeamTimeUp);
        store.replay(&Command::TeamTimeUp);
        assert_eq!(store.snapshot().picture_board.current_team_selecting, 3);
    }

    #[test]
    fn test_timer_cue_follows_first_picture() {
        let mut store = picture_round();
        assert_eq!(store.picture_timer_cue(), None);

        select(&mut store, 1, "board-2");
        assert_eq!(store.picture_timer_cue(), Some((1, "board-2".to_string())));

        store.apply(&Command::NextPicture);
        assert_eq!(store.picture_timer_cue(), None);
        store.apply(&Command::PreviousPicture);
        assert_eq!(store.picture_timer_cue(), Some((1, "board-2".to_string())));

        // team 2 has not chosen yet
        store.advance_selecting_team();
        assert_eq!(store.picture_timer_cue(), None);

        // only in the picture board round
        let mut other = super::super::test_support::store();
        other.apply(&Command::SelectBoard {
            team_id: 1,
            board_id: "board-1".to_string(),
        });
        assert_eq!(other.picture_timer_cue(), None);
    }
}
