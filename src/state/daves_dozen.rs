use super::{EffectKind, GameStore};

/// Answers are numbered 1 through 12
const ANSWER_NUMBERS: std::ops::RangeInclusive<u8> = 1..=12;

impl GameStore {
    pub fn reveal_daves_dozen_answer(&mut self, answer_number: u8) {
        if !ANSWER_NUMBERS.contains(&answer_number) {
            tracing::warn!(answer_number, "Ignoring unknown Dave's Dozen answer");
            return;
        }
        self.snapshot.daves_dozen.revealed_answers.insert(answer_number);
    }

    /// Flash the incorrect indicator; it clears itself after a short delay
    pub fn show_incorrect_answer(&mut self) {
        self.snapshot.daves_dozen.show_incorrect = true;
        self.schedule(EffectKind::ClearIncorrect, self.config.incorrect_flash);
    }

    pub fn reset_daves_dozen(&mut self) {
        self.snapshot.daves_dozen.revealed_answers.clear();
        self.snapshot.daves_dozen.show_incorrect = false;
        self.cancel_deferred(EffectKind::ClearIncorrect);
    }
}
