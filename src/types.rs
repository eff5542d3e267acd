use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: i32,
    pub col: i32,
}

impl Coord {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn step(self, dir: Direction) -> Self {
        let (dr, dc) = dir.delta();
        Self {
            row: self.row + dr,
            col: self.col + dc,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Left,
    Down,
    Right,
    #[default]
    None,
}

impl Direction {
    // Tie-break order for ghost moves.
    pub const PRECEDENCE: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (-1, 0),
            Self::Left => (0, -1),
            Self::Down => (1, 0),
            Self::Right => (0, 1),
            Self::None => (0, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Left => Self::Right,
            Self::Down => Self::Up,
            Self::Right => Self::Left,
            Self::None => Self::None,
        }
    }

    pub fn parse_move(value: &str) -> Option<Self> {
        match value {
            "up" | "w" => Some(Self::Up),
            "left" | "a" => Some(Self::Left),
            "down" | "s" => Some(Self::Down),
            "right" | "d" => Some(Self::Right),
            "none" | "." => Some(Self::None),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostKind {
    Blinky,
    Pinky,
    Inky,
    Clyde,
}

impl GhostKind {
    pub const ALL: [GhostKind; 4] = [
        GhostKind::Blinky,
        GhostKind::Pinky,
        GhostKind::Inky,
        GhostKind::Clyde,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::Blinky => 0,
            Self::Pinky => 1,
            Self::Inky => 2,
            Self::Clyde => 3,
        }
    }

    pub fn entity_kind(self) -> EntityKind {
        match self {
            Self::Blinky => EntityKind::Blinky,
            Self::Pinky => EntityKind::Pinky,
            Self::Inky => EntityKind::Inky,
            Self::Clyde => EntityKind::Clyde,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Player,
    Blinky,
    Pinky,
    Inky,
    Clyde,
    Wall,
    Gate,
    Pellet,
    PowerPellet,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        EntityKind::Player,
        EntityKind::Blinky,
        EntityKind::Pinky,
        EntityKind::Inky,
        EntityKind::Clyde,
        EntityKind::Wall,
        EntityKind::Gate,
        EntityKind::Pellet,
        EntityKind::PowerPellet,
    ];

    pub fn glyph(self) -> char {
        match self {
            Self::Player => 'P',
            Self::Blinky => '0',
            Self::Pinky => '1',
            Self::Inky => '2',
            Self::Clyde => '3',
            Self::Wall => '#',
            Self::Gate => 'G',
            Self::Pellet => '.',
            Self::PowerPellet => '@',
        }
    }

    pub fn from_glyph(glyph: char) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.glyph() == glyph)
    }

    pub fn render_precedence(self) -> u8 {
        match self {
            Self::Pellet | Self::PowerPellet => 0,
            Self::Blinky | Self::Pinky | Self::Inky | Self::Clyde => 1,
            Self::Player => 2,
            Self::Wall | Self::Gate => 3,
        }
    }

    pub fn ghost(self) -> Option<GhostKind> {
        match self {
            Self::Blinky => Some(GhostKind::Blinky),
            Self::Pinky => Some(GhostKind::Pinky),
            Self::Inky => Some(GhostKind::Inky),
            Self::Clyde => Some(GhostKind::Clyde),
            _ => None,
        }
    }

    pub fn is_obstacle(self) -> bool {
        matches!(self, Self::Wall | Self::Gate)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostMode {
    Chase,
    Scatter,
    Frightened,
    Eaten,
    House,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    Text,
    Graphical,
    None,
}

impl RenderMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" | "ascii" => Some(Self::Text),
            "graphical" | "human" => Some(Self::Graphical),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    StepLimit,
    OutOfLives,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct State {
    #[serde(rename = "tickIndex")]
    pub tick_index: u32,
    pub score: i32,
    #[serde(rename = "livesRemaining")]
    pub lives_remaining: u32,
    #[serde(rename = "episodeCompleted")]
    pub episode_completed: bool,
    #[serde(rename = "playerLocation")]
    pub player_location: Coord,
    #[serde(rename = "ghostLocations")]
    pub ghost_locations: [Coord; 4],
    pub grid: Vec<String>,
}

impl State {
    pub fn ghost_location(&self, kind: GhostKind) -> Coord {
        self.ghost_locations[kind.index()]
    }

    pub fn glyph_at(&self, at: Coord) -> Option<char> {
        if at.row < 0 || at.col < 0 {
            return None;
        }
        self.grid
            .get(at.row as usize)
            .and_then(|row| row.chars().nth(at.col as usize))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    PelletEaten {
        at: Coord,
        points: i32,
    },
    PowerPelletEaten {
        at: Coord,
        points: i32,
    },
    GhostEaten {
        ghost: GhostKind,
        points: i32,
    },
    GhostModeChanged {
        ghost: GhostKind,
        from: GhostMode,
        to: GhostMode,
    },
    LifeLost {
        #[serde(rename = "livesRemaining")]
        lives_remaining: u32,
    },
    EpisodeCompleted {
        reason: CompletionReason,
    },
}
