use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    get_house_duration, get_initial_direction, get_initial_mode, CHASE_DURATION,
    CLYDE_TARGET_SWITCH_DISTANCE, DEFAULT_COLS, DEFAULT_LIVES, DEFAULT_MAP,
    DEFAULT_MAX_EPISODE_STEPS, DEFAULT_ROWS, FREIGHT_DURATION, GHOST_POINTS, PELLET_POINTS,
    PINKY_TARGET_OFFSET, POWER_PELLET_POINTS, SCATTER_DURATION,
};
use crate::error::ConfigError;
use crate::types::{Coord, Direction, GhostKind, GhostMode};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GhostConfig {
    #[serde(rename = "stepIndex", default)]
    pub step_index: u32,
    #[serde(rename = "chaseDuration")]
    pub chase_duration: u32,
    #[serde(rename = "scatterDuration")]
    pub scatter_duration: u32,
    #[serde(rename = "freightDuration")]
    pub freight_duration: u32,
    #[serde(rename = "houseDuration")]
    pub house_duration: u32,
    #[serde(rename = "initialDirection")]
    pub initial_direction: Direction,
    #[serde(rename = "initialLocation", default)]
    pub initial_location: Coord,
    #[serde(default)]
    pub corner: Coord,
    pub mode: GhostMode,
}

impl GhostConfig {
    pub fn for_kind(kind: GhostKind) -> Self {
        Self {
            step_index: 0,
            chase_duration: CHASE_DURATION,
            scatter_duration: SCATTER_DURATION,
            freight_duration: FREIGHT_DURATION,
            house_duration: get_house_duration(kind),
            initial_direction: get_initial_direction(kind),
            initial_location: Coord::default(),
            corner: Coord::default(),
            mode: get_initial_mode(kind),
        }
    }
}

fn default_blinky() -> GhostConfig {
    GhostConfig::for_kind(GhostKind::Blinky)
}

fn default_pinky() -> GhostConfig {
    GhostConfig::for_kind(GhostKind::Pinky)
}

fn default_inky() -> GhostConfig {
    GhostConfig::for_kind(GhostKind::Inky)
}

fn default_clyde() -> GhostConfig {
    GhostConfig::for_kind(GhostKind::Clyde)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rows: i32,
    pub cols: i32,
    #[serde(rename = "maxEpisodeSteps")]
    pub max_episode_steps: u32,
    pub map: Vec<String>,
    #[serde(default = "default_blinky")]
    pub blinky: GhostConfig,
    #[serde(default = "default_pinky")]
    pub pinky: GhostConfig,
    #[serde(default = "default_inky")]
    pub inky: GhostConfig,
    #[serde(default = "default_clyde")]
    pub clyde: GhostConfig,
    pub lives: u32,
    #[serde(rename = "pelletPoints")]
    pub pellet_points: i32,
    #[serde(rename = "powerPelletPoints")]
    pub power_pellet_points: i32,
    #[serde(rename = "ghostPoints")]
    pub ghost_points: i32,
    #[serde(rename = "pinkyTargetOffset")]
    pub pinky_target_offset: i32,
    #[serde(rename = "clydeTargetSwitchDistance")]
    pub clyde_target_switch_distance: i32,
    #[serde(rename = "frightenedDuration")]
    pub frightened_duration: Option<u32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            max_episode_steps: DEFAULT_MAX_EPISODE_STEPS,
            map: DEFAULT_MAP.iter().map(|row| row.to_string()).collect(),
            blinky: default_blinky(),
            pinky: default_pinky(),
            inky: default_inky(),
            clyde: default_clyde(),
            lives: DEFAULT_LIVES,
            pellet_points: PELLET_POINTS,
            power_pellet_points: POWER_PELLET_POINTS,
            ghost_points: GHOST_POINTS,
            pinky_target_offset: PINKY_TARGET_OFFSET,
            clyde_target_switch_distance: CLYDE_TARGET_SWITCH_DISTANCE,
            frightened_duration: None,
        }
    }
}

impl GameConfig {
    pub fn with_map<S: AsRef<str>>(map: &[S]) -> Self {
        let map: Vec<String> = map.iter().map(|row| row.as_ref().to_string()).collect();
        Self {
            rows: map.len() as i32,
            cols: map.first().map(|row| row.chars().count()).unwrap_or(0) as i32,
            map,
            ..Self::default()
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn ghost(&self, kind: GhostKind) -> &GhostConfig {
        match kind {
            GhostKind::Blinky => &self.blinky,
            GhostKind::Pinky => &self.pinky,
            GhostKind::Inky => &self.inky,
            GhostKind::Clyde => &self.clyde,
        }
    }

    pub fn ghost_mut(&mut self, kind: GhostKind) -> &mut GhostConfig {
        match kind {
            GhostKind::Blinky => &mut self.blinky,
            GhostKind::Pinky => &mut self.pinky,
            GhostKind::Inky => &mut self.inky,
            GhostKind::Clyde => &mut self.clyde,
        }
    }
}
