//! Delayed effects that belong to the current round/question context.
//!
//! The store never sleeps. Commands that need something to happen later
//! queue a [`SchedulerRequest`]; whoever drives the store (the sync layer)
//! turns it into a timer task. Each effect carries the token it was issued
//! with, and firing is a no-op once the token has moved on, so an effect from
//! an old context can never flip state in a new one.

use super::GameStore;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Clear `is_transitioning` after a round change
    SettleTransition,
    /// Hide the Dave's Dozen incorrect flash
    ClearIncorrect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledEffect {
    pub kind: EffectKind,
    pub delay: Duration,
    pub token: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerRequest {
    Schedule(ScheduledEffect),
    Cancel(EffectKind),
}

impl SchedulerRequest {
    pub fn kind(&self) -> EffectKind {
        match self {
            SchedulerRequest::Schedule(effect) => effect.kind,
            SchedulerRequest::Cancel(kind) => *kind,
        }
    }
}

#[derive(Debug, Default)]
pub(super) struct DeferredTokens {
    settle_transition: u64,
    clear_incorrect: u64,
}

impl DeferredTokens {
    fn slot(&mut self, kind: EffectKind) -> &mut u64 {
        match kind {
            EffectKind::SettleTransition => &mut self.settle_transition,
            EffectKind::ClearIncorrect => &mut self.clear_incorrect,
        }
    }

    /// Moves on with every schedule, cancel or firing of any effect
    pub(super) fn generation(&self) -> u64 {
        self.settle_transition + self.clear_incorrect
    }

    fn bump(&mut self, kind: EffectKind) -> u64 {
        let slot = self.slot(kind);
        *slot += 1;
        *slot
    }
}

impl GameStore {
    pub(super) fn schedule(&mut self, kind: EffectKind, delay: Duration) {
        let token = self.deferred.bump(kind);
        self.push_request(SchedulerRequest::Schedule(ScheduledEffect { kind, delay, token }));
    }

    pub(super) fn cancel_deferred(&mut self, kind: EffectKind) {
        self.deferred.bump(kind);
        self.push_request(SchedulerRequest::Cancel(kind));
    }

    pub(super) fn cancel_all_deferred(&mut self) {
        self.cancel_deferred(EffectKind::SettleTransition);
        self.cancel_deferred(EffectKind::ClearIncorrect);
    }

    // A newer request for the same kind supersedes anything still queued
    fn push_request(&mut self, request: SchedulerRequest) {
        let kind = request.kind();
        self.requests.retain(|r| r.kind() != kind);
        self.requests.push(request);
    }

    /// Take the scheduling work produced by the commands applied so far
    pub fn drain_scheduler_requests(&mut self) -> Vec<SchedulerRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Run a delayed effect whose delay has elapsed.
    ///
    /// Returns false when the effect was superseded or cancelled.
    pub fn fire_deferred(&mut self, effect: &ScheduledEffect) -> bool {
        if *self.deferred.slot(effect.kind) != effect.token {
            tracing::debug!(kind = ?effect.kind, token = effect.token, "Skipping stale deferred effect");
            return false;
        }
        self.deferred.bump(effect.kind);

        match effect.kind {
            EffectKind::SettleTransition => self.snapshot.is_transitioning = false,
            EffectKind::ClearIncorrect => self.snapshot.daves_dozen.show_incorrect = false,
        }
        true
    }

    /// Fire every queued effect immediately, skipping cancelled ones.
    ///
    /// For headless use where no timer runtime drives the store.
    pub fn flush_deferred(&mut self) -> usize {
        self.drain_scheduler_requests()
            .into_iter()
            .filter_map(|request| match request {
                SchedulerRequest::Schedule(effect) => Some(effect),
                SchedulerRequest::Cancel(_) => None,
            })
            .filter(|effect| self.fire_deferred(effect))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::store;
    use super::*;
    use crate::protocol::Command;

    #[test]
    fn test_round_change_schedules_settle() {
        let mut store = store();
        store.apply(&Command::NextRound);

        let requests = store.drain_scheduler_requests();
        let settle = requests
            .iter()
            .find_map(|r| match r {
                SchedulerRequest::Schedule(e) if e.kind == EffectKind::SettleTransition => Some(e.clone()),
                _ => None,
            })
            .expect("settle effect scheduled");
        assert_eq!(settle.delay, Duration::from_millis(100));

        assert!(store.snapshot().is_transitioning);
        assert!(store.fire_deferred(&settle));
        assert!(!store.snapshot().is_transitioning);
    }

    #[test]
    fn test_superseded_effect_does_not_fire() {
        let mut store = store();
        store.apply(&Command::NextRound);
        let first = match store.drain_scheduler_requests().into_iter().find(|r| r.kind() == EffectKind::SettleTransition) {
            Some(SchedulerRequest::Schedule(e)) => e,
            other => panic!("Expected scheduled settle, got {:?}", other),
        };

        store.apply(&Command::NextRound);
        assert!(!store.fire_deferred(&first));
        assert!(store.snapshot().is_transitioning);
        assert_eq!(store.flush_deferred(), 1);
        assert!(!store.snapshot().is_transitioning);
    }

    #[test]
    fn test_incorrect_flash_cancelled_by_question_change() {
        let mut store = store();
        store.apply(&Command::StartGame);
        store.apply(&Command::StartRound);
        store.drain_scheduler_requests();

        store.apply(&Command::ShowIncorrectAnswer);
        let flash = match store.drain_scheduler_requests().pop() {
            Some(SchedulerRequest::Schedule(e)) => e,
            other => panic!("Expected scheduled flash, got {:?}", other),
        };
        assert_eq!(flash.delay, Duration::from_secs(2));

        store.apply(&Command::NextQuestion);
        assert!(store
            .drain_scheduler_requests()
            .contains(&SchedulerRequest::Cancel(EffectKind::ClearIncorrect)));

        // A new flash in the new question must survive the old timer firing
        store.apply(&Command::ShowIncorrectAnswer);
        assert!(!store.fire_deferred(&flash));
        assert!(store.snapshot().daves_dozen.show_incorrect);
    }

    #[test]
    fn test_queue_keeps_latest_request_per_kind() {
        let mut store = store();
        for _ in 0..5 {
            store.apply(&Command::ShowIncorrectAnswer);
        }
        let requests = store.drain_scheduler_requests();
        assert_eq!(requests.len(), 1);
        assert!(store.drain_scheduler_requests().is_empty());
    }
}
