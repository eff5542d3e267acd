use super::utils::manhattan;
use super::Environment;
use crate::types::{Coord, Direction, GhostKind, GhostMode};

// A zero axis delta counts as positive.
pub(crate) fn ambush_target(player: Coord, facing: Direction, offset: i32) -> Coord {
    let (dr, dc) = facing.delta();
    let sign_r = if dr < 0 { -1 } else { 1 };
    let sign_c = if dc < 0 { -1 } else { 1 };
    Coord::new(player.row + offset * sign_r, player.col + offset * sign_c)
}

pub(crate) fn flank_target(player: Coord, blinky: Coord) -> Coord {
    let sign_r = if blinky.row < player.row { 1 } else { -1 };
    let sign_c = if blinky.col < player.col { 1 } else { -1 };
    Coord::new(
        player.row + (player.row - blinky.row).abs() * sign_r,
        player.col + (player.col - blinky.col).abs() * sign_c,
    )
}

pub(crate) fn shy_target(ghost: Coord, player: Coord, corner: Coord, switch_distance: i32) -> Coord {
    if manhattan(ghost, player) < switch_distance {
        corner
    } else {
        player
    }
}

impl Environment {
    pub(crate) fn ghost_target(&self, kind: GhostKind) -> Coord {
        let ghost = &self.ghosts[kind.index()];
        match ghost.mode() {
            GhostMode::Chase => self.chase_target(kind),
            GhostMode::Scatter | GhostMode::Frightened | GhostMode::Eaten => ghost.config.corner,
            GhostMode::House => ghost.config.initial_location,
        }
    }

    fn chase_target(&self, kind: GhostKind) -> Coord {
        let player = &self.player;
        match kind {
            GhostKind::Blinky => player.location,
            GhostKind::Pinky => ambush_target(
                player.location,
                player.direction,
                self.config.pinky_target_offset,
            ),
            GhostKind::Inky => flank_target(
                player.location,
                self.ghosts[GhostKind::Blinky.index()].location,
            ),
            GhostKind::Clyde => {
                let clyde = &self.ghosts[GhostKind::Clyde.index()];
                shy_target(
                    clyde.location,
                    player.location,
                    clyde.config.corner,
                    self.config.clyde_target_switch_distance,
                )
            }
        }
    }
}
