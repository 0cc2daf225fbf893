use super::GameStore;
use crate::types::OnlyConnectState;

/// Points on offer for 1, 2, 3 and 4 revealed clues
pub const ONLY_CONNECT_POINTS: [u32; 4] = [5, 3, 2, 1];

const MAX_REVEALED: u8 = ONLY_CONNECT_POINTS.len() as u8;

impl OnlyConnectState {
    /// What a correct answer is worth right now
    pub fn points(&self) -> u32 {
        let index = usize::from(self.revealed_options.clamp(1, MAX_REVEALED)) - 1;
        ONLY_CONNECT_POINTS[index]
    }
}

impl GameStore {
    pub fn reveal_only_connect_option(&mut self) {
        let state = &mut self.snapshot.only_connect;
        if state.revealed_options < MAX_REVEALED {
            state.revealed_options += 1;
        }
    }

    pub fn reset_only_connect(&mut self) {
        self.snapshot.only_connect = OnlyConnectState::default();
    }
}
