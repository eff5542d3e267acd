use super::utils::manhattan;
use super::Environment;
use crate::grid::EntityRef;
use crate::types::{Coord, Direction, EntityKind, GhostKind, GhostMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Criterion {
    Nearest,
    Farthest,
}

impl Criterion {
    fn improves(self, candidate: i32, best: i32) -> bool {
        match self {
            Self::Nearest => candidate < best,
            Self::Farthest => candidate > best,
        }
    }
}

// Reversing only when nothing else is open; stays put when boxed in.
pub(crate) fn greedy_step(
    from: Coord,
    facing: Direction,
    target: Coord,
    criterion: Criterion,
    is_open: impl Fn(Coord) -> bool,
) -> (Coord, Direction) {
    let reverse = facing.opposite();
    let mut best: Option<(i32, Coord, Direction)> = None;
    for dir in Direction::PRECEDENCE {
        if dir == reverse {
            continue;
        }
        let next = from.step(dir);
        if !is_open(next) {
            continue;
        }
        let distance = manhattan(next, target);
        if best.is_none_or(|(best_distance, _, _)| criterion.improves(distance, best_distance)) {
            best = Some((distance, next, dir));
        }
    }

    if let Some((_, next, dir)) = best {
        return (next, dir);
    }
    if reverse != Direction::None {
        let next = from.step(reverse);
        if is_open(next) {
            return (next, reverse);
        }
    }
    (from, facing)
}

impl Environment {
    pub(crate) fn kind_at(&self, at: Coord) -> Option<EntityKind> {
        match self.grid.get(at)? {
            EntityRef::Player => Some(EntityKind::Player),
            EntityRef::Ghost(kind) => Some(kind.entity_kind()),
            EntityRef::Fixture(handle) => self
                .fixtures
                .get(handle)
                .copied()
                .flatten()
                .map(|fixture| fixture.kind()),
        }
    }

    pub(crate) fn is_open_for_player(&self, at: Coord) -> bool {
        self.grid.contains(at) && !self.kind_at(at).is_some_and(EntityKind::is_obstacle)
    }

    pub(crate) fn is_open_for_ghost(&self, at: Coord, can_cross_gate: bool) -> bool {
        if !self.grid.contains(at) {
            return false;
        }
        match self.kind_at(at) {
            Some(EntityKind::Wall) => false,
            Some(EntityKind::Gate) => can_cross_gate,
            _ => true,
        }
    }

    pub(crate) fn resolve_player_move(&self, requested: Direction) -> (Coord, Direction) {
        let from = self.player.location;
        let next = from.step(requested);
        if self.is_open_for_player(next) {
            (next, requested)
        } else {
            (from, self.player.direction)
        }
    }

    pub(crate) fn resolve_ghost_move(&mut self, kind: GhostKind, target: Coord) -> (Coord, Direction) {
        let exit = self.layout.house_exit();
        let ghost = &mut self.ghosts[kind.index()];
        if ghost.mode() == GhostMode::House {
            return (ghost.location, ghost.direction);
        }

        let mut target = target;
        if ghost.house_exit_pending {
            if ghost.location == exit {
                ghost.house_exit_pending = false;
            }
            target = exit;
        }

        let ghost = &self.ghosts[kind.index()];
        let criterion = if ghost.mode() == GhostMode::Frightened {
            // half speed
            if ghost.config.step_index % 2 == 0 {
                return (ghost.location, ghost.direction);
            }
            Criterion::Farthest
        } else {
            Criterion::Nearest
        };

        let can_cross_gate = ghost.house_exit_pending;
        greedy_step(ghost.location, ghost.direction, target, criterion, |at| {
            self.is_open_for_ghost(at, can_cross_gate)
        })
    }
}
