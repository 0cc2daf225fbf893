use crate::sync::Replica;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const PULSE_INTERVAL: Duration = Duration::from_secs(1);

/// Spawn the once-per-second countdown for a display replica.
///
/// Only the primary display (and the relay's shadow copy) runs a pulse; the
/// co-host never ticks and ticks are never broadcast.
pub fn spawn_timer_pulse(replica: Replica) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PULSE_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;

            if !replica.timer().running {
                continue;
            }

            let timer = replica.tick().await;
            if timer.value == 0 {
                tracing::info!("Timer expired");
            }
        }
    })
}
