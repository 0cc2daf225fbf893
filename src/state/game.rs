use super::{EffectKind, GameSnapshot, GameStore};
use crate::types::Phase;

impl GameStore {
    /// Enter the transition screen for round 0.
    ///
    /// Questions stay unloaded until `start_round`, so the transition screen
    /// is always shown before the first question.
    pub fn start_game(&mut self) {
        tracing::info!("Starting game");
        self.enter_round(0);
    }

    /// Reveal the current round's questions
    pub fn start_round(&mut self) {
        self.cancel_deferred(EffectKind::SettleTransition);
        self.snapshot.phase = Phase::Round;
        self.snapshot.is_transitioning = false;
        self.load_questions_for_current_round();
        tracing::info!(
            round = self.snapshot.current_round_index,
            questions = self.snapshot.active_questions.len(),
            "Round started"
        );
    }

    pub fn next_round(&mut self) {
        let index = self.snapshot.current_round_index;
        if index < self.catalog.last_index() {
            self.enter_round(index + 1);
        }
    }

    /// Whether a next round exists and has questions to show
    pub fn can_advance_to_next_round(&self) -> bool {
        self.catalog
            .rounds()
            .get(self.snapshot.current_round_index + 1)
            .is_some_and(|round| !self.questions.questions(&round.id).is_empty())
    }

    pub fn previous_round(&mut self) {
        let index = self.snapshot.current_round_index;
        if index > 0 {
            self.enter_round(index - 1);
        }
    }

    pub fn go_to_round(&mut self, index: usize) {
        if index < self.catalog.len() {
            self.enter_round(index);
        } else {
            tracing::warn!(index, rounds = self.catalog.len(), "Ignoring jump to unknown round");
        }
    }

    pub fn show_scores(&mut self) {
        self.snapshot.phase = Phase::Scores;
    }

    pub fn show_transition(&mut self) {
        self.snapshot.phase = Phase::RoundTransition;
    }

    pub fn show_final(&mut self) {
        self.snapshot.phase = Phase::Final;
    }

    /// Restore every field to its initial value
    pub fn reset_game(&mut self) {
        tracing::info!("Resetting game");
        self.cancel_all_deferred();
        self.team_time_up_guard = Default::default();
        self.reveal_guard = Default::default();
        self.snapshot = GameSnapshot::initial(&self.catalog, &self.questions, &self.config);
    }

    /// Materialize the current round's questions from the repository.
    ///
    /// The question index is kept when it is still valid for the new list.
    pub fn load_questions_for_current_round(&mut self) {
        let round_id = &self.current_round().id;
        let questions = self.questions.questions(round_id).to_vec();
        if questions.is_empty() {
            tracing::warn!(round = %round_id, "Round has no questions");
        }
        self.snapshot.active_questions = questions;
        if self.snapshot.current_question_index >= self.snapshot.active_questions.len() {
            self.snapshot.current_question_index = 0;
        }
    }

    // Shared by every round change; the reset list lives only here
    fn enter_round(&mut self, index: usize) {
        self.snapshot.current_round_index = index;
        self.snapshot.phase = Phase::RoundTransition;
        self.snapshot.current_question_index = 0;
        self.snapshot.reveal_answer = false;
        self.snapshot.active_questions.clear();
        self.snapshot.is_transitioning = true;
        self.reset_question_reveals();
        self.schedule(EffectKind::SettleTransition, self.config.transition_settle_delay);
        tracing::debug!(round = index, "Entered round transition");
    }
}
