use super::GameStore;

impl GameStore {
    pub fn next_question(&mut self) {
        if self.has_next_question() {
            self.enter_question(self.snapshot.current_question_index + 1);
        }
    }

    pub fn has_next_question(&self) -> bool {
        self.snapshot.current_question_index + 1 < self.snapshot.active_questions.len()
    }

    pub fn previous_question(&mut self) {
        let index = self.snapshot.current_question_index;
        if index > 0 {
            self.enter_question(index - 1);
        }
    }

    pub fn go_to_question(&mut self, index: usize) {
        if index < self.snapshot.active_questions.len() {
            self.enter_question(index);
        } else {
            tracing::warn!(
                index,
                questions = self.snapshot.active_questions.len(),
                "Ignoring jump to unknown question"
            );
        }
    }

    pub fn toggle_answer(&mut self) {
        self.snapshot.reveal_answer = !self.snapshot.reveal_answer;
    }

    // Every question change goes through here
    fn enter_question(&mut self, index: usize) {
        self.snapshot.current_question_index = index;
        self.snapshot.reveal_answer = false;
        self.reset_question_reveals();
    }

    /// Per-question reveal state of the round-specific screens
    pub(super) fn reset_question_reveals(&mut self) {
        self.reset_only_connect();
        self.reset_daves_dozen();
    }
}
