use crate::entity::Ghost;
use crate::types::{Coord, Direction, GhostMode};

impl Ghost {
    // Leaving chase or scatter reverses; re-entering frightened only restarts the timer.
    pub fn set_mode(&mut self, mode: GhostMode) {
        if self.config.mode == mode {
            if mode == GhostMode::Frightened {
                self.config.step_index = 0;
            }
            return;
        }
        if mode == GhostMode::Frightened && self.config.mode == GhostMode::House {
            return;
        }
        if matches!(self.config.mode, GhostMode::Chase | GhostMode::Scatter) {
            self.direction = self.direction.opposite();
        }
        self.config.mode = mode;
        self.config.step_index = 0;
    }

    pub fn advance(&mut self, location: Coord, direction: Direction) -> Option<GhostMode> {
        self.location = location;
        self.direction = direction;
        self.config.step_index += 1;

        let from = self.config.mode;
        let step_index = self.config.step_index;
        match from {
            GhostMode::Chase if step_index >= self.config.chase_duration => {
                self.set_mode(GhostMode::Scatter);
            }
            GhostMode::Scatter if step_index >= self.config.scatter_duration => {
                self.set_mode(GhostMode::Chase);
            }
            GhostMode::Frightened if step_index >= self.config.freight_duration => {
                self.set_mode(GhostMode::Chase);
            }
            GhostMode::House if step_index >= self.config.house_duration => {
                self.house_exit_pending = true;
                self.set_mode(GhostMode::Chase);
            }
            _ => {}
        }
        (self.config.mode != from).then_some(from)
    }

    pub fn frighten(&mut self) -> bool {
        if self.config.mode == GhostMode::House {
            return false;
        }
        self.set_mode(GhostMode::Frightened);
        true
    }

    pub fn send_home(&mut self, exit: Coord) {
        self.set_mode(GhostMode::Eaten);
        self.location = exit;
        self.direction = self.config.initial_direction;
        self.house_exit_pending = false;
        self.set_mode(GhostMode::Scatter);
    }
}
