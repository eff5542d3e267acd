use crate::types::{Coord, Direction, GhostKind, GhostMode};

pub const DEFAULT_ROWS: i32 = 21;
pub const DEFAULT_COLS: i32 = 19;
pub const DEFAULT_MAX_EPISODE_STEPS: u32 = 100;
pub const DEFAULT_LIVES: u32 = 3;

pub const PELLET_POINTS: i32 = 10;
pub const POWER_PELLET_POINTS: i32 = 50;
pub const GHOST_POINTS: i32 = 200;

pub const PINKY_TARGET_OFFSET: i32 = 4;
pub const CLYDE_TARGET_SWITCH_DISTANCE: i32 = 8;

pub const CHASE_DURATION: u32 = 30;
pub const SCATTER_DURATION: u32 = 10;
pub const FREIGHT_DURATION: u32 = 12;

pub const EMPTY_GLYPH: char = ' ';

pub const DEFAULT_MAP: [&str; 21] = [
    "###################",
    "#........#........#",
    "#@##.###.#.###.##@#",
    "#.................#",
    "#.##.#.#####.#.##.#",
    "#....#...#...#....#",
    "####.###.#.###.####",
    "####.#...0...#.####",
    "####.#.##G##.#.####",
    "#......#123#......#",
    "####.#.#####.#.####",
    "####.#...P...#.####",
    "####.#.#####.#.####",
    "#........#........#",
    "#.##.###.#.###.##.#",
    "#@.#...........#.@#",
    "##.#.#.#####.#.#.##",
    "#....#...#...#....#",
    "#.######.#.######.#",
    "#.................#",
    "###################",
];

pub fn get_house_duration(kind: GhostKind) -> u32 {
    match kind {
        GhostKind::Blinky => 0,
        GhostKind::Pinky => 20,
        GhostKind::Inky => 40,
        GhostKind::Clyde => 60,
    }
}

pub fn get_initial_direction(kind: GhostKind) -> Direction {
    match kind {
        GhostKind::Blinky => Direction::Left,
        GhostKind::Pinky | GhostKind::Inky | GhostKind::Clyde => Direction::None,
    }
}

pub fn get_initial_mode(kind: GhostKind) -> GhostMode {
    match kind {
        GhostKind::Blinky => GhostMode::Chase,
        GhostKind::Pinky | GhostKind::Inky | GhostKind::Clyde => GhostMode::House,
    }
}

// Off-board, so a scattering ghost circles its corner.
pub fn get_corner(kind: GhostKind, rows: i32, cols: i32) -> Coord {
    match kind {
        GhostKind::Blinky => Coord::new(-2, cols - 2),
        GhostKind::Pinky => Coord::new(-2, 2),
        GhostKind::Inky => Coord::new(rows + 1, cols - 1),
        GhostKind::Clyde => Coord::new(rows + 1, 1),
    }
}
