use super::{Publisher, Replica};
use crate::protocol::Command;
use crate::state::Outcome;

/// The co-host: the only side that originates commands
pub struct Leader<P> {
    replica: Replica,
    publisher: P,
}

impl<P: Publisher> Leader<P> {
    pub fn new(replica: Replica, publisher: P) -> Self {
        Self { replica, publisher }
    }

    pub fn replica(&self) -> &Replica {
        &self.replica
    }

    /// Apply locally first, then broadcast.
    ///
    /// Only commands that changed something are broadcast, so a display
    /// never acts on a command the co-host ignored. A failed broadcast is
    /// logged and the local change is kept.
    ///
    /// When the command puts a team's first picture on screen the countdown
    /// is started as well.
    pub async fn dispatch(&self, cmd: Command) -> Outcome {
        let (outcome, timer_started) = self
            .replica
            .mutate(|store| {
                let cue = store.picture_timer_cue();
                let outcome = store.apply(&cmd);
                let next_cue = store.picture_timer_cue();
                let timer_started = next_cue.is_some()
                    && next_cue != cue
                    && store.apply(&Command::StartTimer) == Outcome::Applied;
                (outcome, timer_started)
            })
            .await;

        self.publish(&cmd, outcome);
        if timer_started {
            tracing::info!("First picture on screen, timer started");
            self.publish(&Command::StartTimer, Outcome::Applied);
        }
        outcome
    }

    /// Move to the next question, or into the next round once the last
    /// question is done and that round has questions
    pub async fn advance(&self) -> Outcome {
        let next = self
            .replica
            .inspect(|store| {
                if store.has_next_question() {
                    Some(Command::NextQuestion)
                } else if store.can_advance_to_next_round() {
                    Some(Command::NextRound)
                } else {
                    None
                }
            })
            .await;

        match next {
            Some(cmd) => self.dispatch(cmd).await,
            None => {
                tracing::debug!("No next question or round to advance to");
                Outcome::Unchanged
            }
        }
    }

    fn publish(&self, cmd: &Command, outcome: Outcome) {
        if !outcome.should_broadcast() {
            tracing::debug!(?outcome, "Not broadcasting {}", cmd.action());
            return;
        }
        tracing::info!("Dispatching {}", cmd.action());
        if let Err(e) = self.publisher.publish(cmd) {
            tracing::warn!("Command {} not broadcast: {}", cmd.action(), e);
        }
    }
}
