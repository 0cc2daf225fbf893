use super::GameStore;

impl GameStore {
    /// Resume the countdown; a timer sitting at zero stays stopped
    pub fn start_timer(&mut self) {
        if self.snapshot.timer.value > 0 {
            self.snapshot.timer.running = true;
        }
    }

    pub fn pause_timer(&mut self) {
        self.snapshot.timer.running = false;
    }

    /// Stop the timer and set it to `duration`, the round's own duration,
    /// or the configured default, in that order of preference
    pub fn reset_timer(&mut self, duration: Option<u32>) {
        let value = duration
            .or(self.current_round().timer_duration)
            .unwrap_or(self.config.default_timer_seconds);
        self.snapshot.timer.value = value;
        self.snapshot.timer.running = false;
    }

    /// One second of countdown. Driven by the display's pulse, never broadcast.
    pub fn tick(&mut self) {
        let timer = &mut self.snapshot.timer;
        if timer.running && timer.value > 0 {
            timer.value -= 1;
        }
        if timer.value == 0 {
            timer.running = false;
        }
    }
}
