use crate::config::GameConfig;
use crate::constants::{get_corner, EMPTY_GLYPH};
use crate::error::ConfigError;
use crate::types::{Coord, EntityKind, GhostKind};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapLayout {
    pub rows: i32,
    pub cols: i32,
    pub player_spawn: Coord,
    pub ghost_spawns: [Coord; 4],
    pub fixtures: Vec<(EntityKind, Coord)>,
}

impl MapLayout {
    pub fn ghost_spawn(&self, kind: GhostKind) -> Coord {
        self.ghost_spawns[kind.index()]
    }

    // Every ghost leaves the house through Blinky's spawn cell.
    pub fn house_exit(&self) -> Coord {
        self.ghost_spawn(GhostKind::Blinky)
    }

    pub fn fixture_count(&self, kind: EntityKind) -> usize {
        self.fixtures.iter().filter(|(k, _)| *k == kind).count()
    }
}

pub fn is_within(rows: i32, cols: i32, at: Coord) -> bool {
    at.row >= 0 && at.col >= 0 && at.row < rows && at.col < cols
}

pub fn parse_map(config: &GameConfig) -> Result<MapLayout, ConfigError> {
    if config.rows <= 0 || config.cols <= 0 {
        return Err(ConfigError::InvalidDimensions {
            rows: config.rows,
            cols: config.cols,
        });
    }
    if config.map.len() != config.rows as usize {
        return Err(ConfigError::RowCount {
            expected: config.rows,
            found: config.map.len(),
        });
    }

    let mut player_spawn: Option<Coord> = None;
    let mut ghost_spawns: [Option<Coord>; 4] = [None; 4];
    let mut fixtures = Vec::new();

    for (row, line) in config.map.iter().enumerate() {
        let width = line.chars().count();
        if width != config.cols as usize {
            return Err(ConfigError::RaggedRow {
                row,
                expected: config.cols,
                found: width,
            });
        }
        for (col, glyph) in line.chars().enumerate() {
            if glyph == EMPTY_GLYPH {
                continue;
            }
            let Some(kind) = EntityKind::from_glyph(glyph) else {
                return Err(ConfigError::UnknownGlyph { row, col, glyph });
            };
            let at = Coord::new(row as i32, col as i32);
            match (kind, kind.ghost()) {
                (EntityKind::Player, _) => place_unique(&mut player_spawn, kind, at)?,
                (_, Some(ghost)) => place_unique(&mut ghost_spawns[ghost.index()], kind, at)?,
                _ => fixtures.push((kind, at)),
            }
        }
    }

    let player_spawn = player_spawn.ok_or(ConfigError::MissingEntity(EntityKind::Player))?;
    let mut spawns = [Coord::default(); 4];
    for kind in GhostKind::ALL {
        spawns[kind.index()] =
            ghost_spawns[kind.index()].ok_or(ConfigError::MissingEntity(kind.entity_kind()))?;
    }

    Ok(MapLayout {
        rows: config.rows,
        cols: config.cols,
        player_spawn,
        ghost_spawns: spawns,
        fixtures,
    })
}

fn place_unique(slot: &mut Option<Coord>, kind: EntityKind, at: Coord) -> Result<(), ConfigError> {
    if let Some(first) = *slot {
        return Err(ConfigError::DuplicateEntity {
            kind,
            first,
            second: at,
        });
    }
    *slot = Some(at);
    Ok(())
}

pub fn prepare_config(config: &mut GameConfig) -> Result<MapLayout, ConfigError> {
    if config.lives == 0 {
        return Err(ConfigError::InvalidLives);
    }
    if config.max_episode_steps == 0 {
        return Err(ConfigError::InvalidEpisodeLength);
    }
    let layout = parse_map(config)?;
    let (rows, cols) = (config.rows, config.cols);
    let frightened_duration = config.frightened_duration;
    for kind in GhostKind::ALL {
        let ghost = config.ghost_mut(kind);
        ghost.initial_location = layout.ghost_spawn(kind);
        ghost.corner = get_corner(kind, rows, cols);
        if let Some(duration) = frightened_duration {
            ghost.freight_duration = duration;
        }
    }
    Ok(layout)
}
