use crate::config::GameConfig;
use crate::config::GhostConfig;
use crate::types::{Coord, Direction, EntityKind, GhostKind, GhostMode};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub location: Coord,
    pub direction: Direction,
}

impl Player {
    pub fn spawn(location: Coord) -> Self {
        Self {
            location,
            direction: Direction::None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ghost {
    pub kind: GhostKind,
    pub location: Coord,
    pub direction: Direction,
    pub config: GhostConfig,
    pub house_exit_pending: bool,
}

impl Ghost {
    pub fn spawn(kind: GhostKind, config: &GhostConfig) -> Self {
        Self {
            kind,
            location: config.initial_location,
            direction: config.initial_direction,
            config: config.clone(),
            house_exit_pending: false,
        }
    }

    pub fn mode(&self) -> GhostMode {
        self.config.mode
    }

    pub fn is_dangerous(&self) -> bool {
        self.config.mode != GhostMode::Frightened
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fixture {
    Wall { at: Coord },
    Gate { at: Coord },
    Pellet { at: Coord, points: i32 },
    PowerPellet { at: Coord, points: i32 },
}

impl Fixture {
    pub fn from_kind(kind: EntityKind, at: Coord, config: &GameConfig) -> Option<Self> {
        match kind {
            EntityKind::Wall => Some(Self::Wall { at }),
            EntityKind::Gate => Some(Self::Gate { at }),
            EntityKind::Pellet => Some(Self::Pellet {
                at,
                points: config.pellet_points,
            }),
            EntityKind::PowerPellet => Some(Self::PowerPellet {
                at,
                points: config.power_pellet_points,
            }),
            _ => None,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Wall { .. } => EntityKind::Wall,
            Self::Gate { .. } => EntityKind::Gate,
            Self::Pellet { .. } => EntityKind::Pellet,
            Self::PowerPellet { .. } => EntityKind::PowerPellet,
        }
    }

    pub fn location(&self) -> Coord {
        match *self {
            Self::Wall { at }
            | Self::Gate { at }
            | Self::Pellet { at, .. }
            | Self::PowerPellet { at, .. } => at,
        }
    }

    pub fn points(&self) -> Option<i32> {
        match *self {
            Self::Pellet { points, .. } | Self::PowerPellet { points, .. } => Some(points),
            Self::Wall { .. } | Self::Gate { .. } => None,
        }
    }
}
