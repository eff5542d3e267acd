use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::{Coord, EntityKind, RenderMode};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("grid dimensions must be positive, got {rows}x{cols}")]
    InvalidDimensions { rows: i32, cols: i32 },
    #[error("map has {found} rows but the config declares {expected}")]
    RowCount { expected: i32, found: usize },
    #[error("map row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: i32,
        found: usize,
    },
    #[error("unknown glyph {glyph:?} at ({row}, {col})")]
    UnknownGlyph { row: usize, col: usize, glyph: char },
    #[error("map has no {0:?} glyph")]
    MissingEntity(EntityKind),
    #[error("map places {kind:?} twice, at {first:?} and {second:?}")]
    DuplicateEntity {
        kind: EntityKind,
        first: Coord,
        second: Coord,
    },
    #[error("player must start with at least one life")]
    InvalidLives,
    #[error("episodes must allow at least one step")]
    InvalidEpisodeLength,
}

// The instance must not be stepped again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("index references fixture {handle} at {location:?} that no longer exists")]
    MissingFixture { handle: usize, location: Coord },
    #[error("collectible at {location:?} is not tracked in the fixture list")]
    MissingCollectible { location: Coord },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render mode {0:?} is not supported by the attached renderer")]
    Unsupported(RenderMode),
    #[error("renderer has been closed")]
    Closed,
    #[error("failed to write frame: {0}")]
    Io(#[from] io::Error),
}
