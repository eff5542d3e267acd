use super::Environment;
use crate::config::GameConfig;
use crate::constants::EMPTY_GLYPH;
use crate::entity::{Fixture, Ghost, Player};
use crate::grid::EntityRef;
use crate::types::{EntityKind, GhostKind, GhostMode};
use crate::world::MapLayout;

pub(super) fn spawn_fixtures(config: &GameConfig, layout: &MapLayout) -> Vec<Option<Fixture>> {
    layout
        .fixtures
        .iter()
        .map(|(kind, at)| Fixture::from_kind(*kind, *at, config))
        .collect()
}

pub(super) fn spawn_ghosts(config: &GameConfig) -> [Ghost; 4] {
    GhostKind::ALL.map(|kind| Ghost::spawn(kind, config.ghost(kind)))
}

impl Environment {
    // Ghosts already out of the house do not wait there again.
    pub(super) fn respawn_actors(&mut self) {
        self.player = Player::spawn(self.layout.player_spawn);
        for kind in GhostKind::ALL {
            let left_house = self.ghosts[kind.index()].mode() != GhostMode::House;
            let mut ghost = Ghost::spawn(kind, self.config.ghost(kind));
            if left_house {
                ghost.config.step_index = ghost.config.house_duration;
            }
            self.ghosts[kind.index()] = ghost;
        }
    }

    // Lowest draw precedence first so walls and the player end up on top.
    pub(super) fn rebuild_index(&mut self) {
        self.grid.clear();
        let mut placements: Vec<(u8, _, _)> = Vec::with_capacity(self.fixtures.len() + 5);
        for (handle, fixture) in self.fixtures.iter().enumerate() {
            if let Some(fixture) = fixture {
                placements.push((
                    fixture.kind().render_precedence(),
                    fixture.location(),
                    EntityRef::Fixture(handle),
                ));
            }
        }
        for ghost in &self.ghosts {
            placements.push((
                ghost.kind.entity_kind().render_precedence(),
                ghost.location,
                EntityRef::Ghost(ghost.kind),
            ));
        }
        placements.push((
            EntityKind::Player.render_precedence(),
            self.player.location,
            EntityRef::Player,
        ));
        placements.sort_by_key(|(precedence, _, _)| *precedence);
        for (_, at, entity) in placements {
            self.grid.set(at, entity);
        }
    }

    pub(super) fn refresh_state(&mut self) {
        self.state.player_location = self.player.location;
        for ghost in &self.ghosts {
            self.state.ghost_locations[ghost.kind.index()] = ghost.location;
        }
        let cols = self.grid.cols() as usize;
        let mut rows = vec![vec![EMPTY_GLYPH; cols]; self.grid.rows() as usize];
        for (at, _) in self.grid.occupied() {
            if let Some(kind) = self.kind_at(at) {
                rows[at.row as usize][at.col as usize] = kind.glyph();
            }
        }
        self.state.grid = rows.into_iter().map(|row| row.into_iter().collect()).collect();
    }
}
