use crate::config::GameConfig;
use crate::entity::{Fixture, Ghost, Player};
use crate::error::{ConfigError, RenderError, StepError};
use crate::grid::{EntityRef, SpatialIndex};
use crate::render::{Renderer, TextRenderer};
use crate::types::{
    CompletionReason, Coord, Direction, GhostKind, GhostMode, RenderMode, RuntimeEvent, State,
};
use crate::world::{prepare_config, MapLayout};

mod mode_system;
mod movement;
mod spawn_system;
mod targeting;
mod utils;

use self::spawn_system::{spawn_fixtures, spawn_ghosts};

pub struct Environment {
    config: GameConfig,
    layout: MapLayout,
    state: State,
    grid: SpatialIndex,
    player: Player,
    ghosts: [Ghost; 4],
    fixtures: Vec<Option<Fixture>>,
    events: Vec<RuntimeEvent>,
    renderer: Box<dyn Renderer + Send>,
    closed: bool,
}

impl Environment {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let mut config = config;
        let layout = prepare_config(&mut config)?;
        let grid = SpatialIndex::new(config.rows, config.cols);
        let player = Player::spawn(layout.player_spawn);
        let ghosts = spawn_ghosts(&config);
        let fixtures = spawn_fixtures(&config, &layout);
        let state = State {
            tick_index: 0,
            score: 0,
            lives_remaining: config.lives,
            episode_completed: false,
            player_location: layout.player_spawn,
            ghost_locations: layout.ghost_spawns,
            grid: Vec::new(),
        };

        let mut env = Self {
            config,
            layout,
            state,
            grid,
            player,
            ghosts,
            fixtures,
            events: Vec::new(),
            renderer: Box::new(TextRenderer::stdout()),
            closed: false,
        };
        env.reset();
        Ok(env)
    }

    pub fn with_renderer(mut self, renderer: impl Renderer + Send + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn reset(&mut self) -> State {
        self.player = Player::spawn(self.layout.player_spawn);
        self.ghosts = spawn_ghosts(&self.config);
        self.fixtures = spawn_fixtures(&self.config, &self.layout);
        self.events.clear();
        self.state.tick_index = 0;
        self.state.score = 0;
        self.state.lives_remaining = self.config.lives;
        self.state.episode_completed = false;
        self.rebuild_index();
        self.refresh_state();
        self.state.clone()
    }

    pub fn step(&mut self, requested: Direction) -> Result<State, StepError> {
        if self.state.episode_completed {
            return Ok(self.state.clone());
        }

        let targets = GhostKind::ALL.map(|kind| self.ghost_target(kind));
        let (player_to, player_dir) = self.resolve_player_move(requested);
        let mut ghost_moves = [(Coord::default(), Direction::None); 4];
        for kind in GhostKind::ALL {
            ghost_moves[kind.index()] = self.resolve_ghost_move(kind, targets[kind.index()]);
        }

        // Any ghost landing on the player's new cell catches it, even a
        // frightened one.
        if ghost_moves.iter().any(|(to, _)| *to == player_to) {
            self.lose_life();
            self.finish_tick();
            return Ok(self.state.clone());
        }

        // Whatever the player walks into, ghosts included, is judged by
        // where it stood at the start of the tick.
        let mut power_triggered = false;
        if let Some(EntityRef::Fixture(handle)) = self.grid.get(player_to) {
            power_triggered = self.consume_fixture(handle, player_to)?;
        }
        let passed: Vec<GhostKind> = GhostKind::ALL
            .into_iter()
            .filter(|kind| self.ghosts[kind.index()].location == player_to)
            .collect();
        if passed.iter().any(|kind| self.ghosts[kind.index()].is_dangerous()) {
            self.lose_life();
            self.finish_tick();
            return Ok(self.state.clone());
        }
        let mut frozen = [false; 4];
        for kind in passed {
            self.eat_ghost(kind);
            frozen[kind.index()] = true;
        }

        let caged =
            GhostKind::ALL.map(|kind| self.ghosts[kind.index()].mode() == GhostMode::House);
        self.player.location = player_to;
        self.player.direction = player_dir;
        for kind in GhostKind::ALL {
            if frozen[kind.index()] {
                continue;
            }
            let (to, dir) = ghost_moves[kind.index()];
            if let Some(from) = self.ghosts[kind.index()].advance(to, dir) {
                self.record_mode_change(kind, from);
            }
        }
        if power_triggered {
            self.frighten_ghosts(caged);
        }

        self.finish_tick();
        Ok(self.state.clone())
    }

    pub fn get_state(&self) -> State {
        self.state.clone()
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn render(&mut self, mode: RenderMode) -> Result<(), RenderError> {
        if mode == RenderMode::None {
            return Ok(());
        }
        if self.closed {
            return Err(RenderError::Closed);
        }
        if !self.renderer.supports(mode) {
            return Err(RenderError::Unsupported(mode));
        }
        self.renderer.render(&self.state, mode)
    }

    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.renderer.close();
        self.closed = true;
    }

    pub fn drain_events(&mut self) -> Vec<RuntimeEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn layout(&self) -> &MapLayout {
        &self.layout
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn ghost(&self, kind: GhostKind) -> &Ghost {
        &self.ghosts[kind.index()]
    }

    pub fn remaining_collectibles(&self) -> usize {
        self.fixtures
            .iter()
            .flatten()
            .filter(|fixture| fixture.points().is_some())
            .count()
    }

    fn consume_fixture(&mut self, handle: usize, at: Coord) -> Result<bool, StepError> {
        let fixture = self
            .fixtures
            .get(handle)
            .copied()
            .flatten()
            .ok_or(StepError::MissingFixture {
                handle,
                location: at,
            })?;
        let Some(points) = fixture.points() else {
            return Ok(false);
        };
        if fixture.location() != at {
            return Err(StepError::MissingCollectible { location: at });
        }

        self.fixtures[handle] = None;
        self.grid.unset(at);
        self.state.score += points;
        match fixture {
            Fixture::PowerPellet { .. } => {
                self.events.push(RuntimeEvent::PowerPelletEaten { at, points });
                Ok(true)
            }
            _ => {
                self.events.push(RuntimeEvent::PelletEaten { at, points });
                Ok(false)
            }
        }
    }

    fn eat_ghost(&mut self, kind: GhostKind) {
        let exit = self.layout.house_exit();
        let from = self.ghosts[kind.index()].mode();
        self.ghosts[kind.index()].send_home(exit);
        self.state.score += self.config.ghost_points;
        self.events.push(RuntimeEvent::GhostEaten {
            ghost: kind,
            points: self.config.ghost_points,
        });
        self.record_mode_change(kind, from);
    }

    // `caged` is taken before the house timers tick.
    fn frighten_ghosts(&mut self, caged: [bool; 4]) {
        for kind in GhostKind::ALL {
            if caged[kind.index()] {
                continue;
            }
            let from = self.ghosts[kind.index()].mode();
            if self.ghosts[kind.index()].frighten() {
                self.record_mode_change(kind, from);
            }
        }
    }

    fn lose_life(&mut self) {
        self.state.lives_remaining = self.state.lives_remaining.saturating_sub(1);
        self.events.push(RuntimeEvent::LifeLost {
            lives_remaining: self.state.lives_remaining,
        });
        if self.state.lives_remaining == 0 {
            self.complete(CompletionReason::OutOfLives);
        }
        self.respawn_actors();
    }

    fn finish_tick(&mut self) {
        self.state.tick_index += 1;
        if !self.state.episode_completed && self.state.tick_index >= self.config.max_episode_steps
        {
            self.complete(CompletionReason::StepLimit);
        }
        self.rebuild_index();
        self.refresh_state();
    }

    fn complete(&mut self, reason: CompletionReason) {
        self.state.episode_completed = true;
        self.events.push(RuntimeEvent::EpisodeCompleted { reason });
    }

    fn record_mode_change(&mut self, kind: GhostKind, from: GhostMode) {
        let to = self.ghosts[kind.index()].mode();
        if to != from {
            self.events
                .push(RuntimeEvent::GhostModeChanged { ghost: kind, from, to });
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::GameConfig;
    use crate::engine::utils::manhattan;
    use crate::engine::Environment;
    use crate::error::{RenderError, StepError};
    use crate::grid::EntityRef;
    use crate::render::{NullRenderer, TextRenderer};
    use crate::types::{
        CompletionReason, Coord, Direction, GhostKind, GhostMode, RenderMode, RuntimeEvent,
    };

    const CHASE_MAP: [&str; 7] = [
        "#########",
        "#.......#",
        "#.P.0...#",
        "#.......#",
        "#########",
        "#123#####",
        "#########",
    ];

    const BOXED_GHOSTS_MAP: [&str; 6] = [
        "#########",
        "#.P.@...#",
        "#.......#",
        "#########",
        "#0#1#2#3#",
        "#########",
    ];

    const CORRIDOR_MAP: [&str; 5] = [
        "#########",
        "#P.....0#",
        "#########",
        "#1#2#3###",
        "#########",
    ];

    const HOUSE_MAP: [&str; 7] = [
        "#########",
        "#...0...#",
        "####G####",
        "###123###",
        "#########",
        "####P####",
        "#########",
    ];

    fn make_env(map: &[&str]) -> Environment {
        Environment::new(GameConfig::with_map(map)).expect("valid test map")
    }

    fn step(env: &mut Environment, dir: Direction) -> crate::types::State {
        env.step(dir).expect("step succeeds")
    }

    #[test]
    fn reset_state_mirrors_configured_map() {
        let mut env = Environment::new(GameConfig::default()).expect("default config");
        step(&mut env, Direction::Left);
        step(&mut env, Direction::Left);

        let state = env.reset();
        assert_eq!(state.tick_index, 0);
        assert_eq!(state.lives_remaining, 3);
        assert_eq!(state.score, 0);
        assert!(!state.episode_completed);
        assert_eq!(state.grid, env.config().map);
        assert_eq!(state.player_location, Coord::new(11, 9));
        assert_eq!(state.ghost_location(GhostKind::Blinky), Coord::new(7, 9));
        assert_eq!(env.get_state(), state);
    }

    #[test]
    fn get_state_is_idempotent() {
        let mut env = make_env(&CHASE_MAP);
        step(&mut env, Direction::Down);
        let first = env.get_state();
        let second = env.get_state();
        assert_eq!(first, second);
    }

    #[test]
    fn tick_index_advances_by_one_until_completion() {
        let mut env = Environment::new(GameConfig::default()).expect("default config");
        let moves = [
            Direction::Left,
            Direction::Up,
            Direction::Right,
            Direction::Down,
        ];
        let mut previous = env.get_state().tick_index;
        let mut turn = 0;
        while !env.state().episode_completed {
            let state = step(&mut env, moves[(turn / 3) % moves.len()]);
            assert_eq!(state.tick_index, previous + 1);
            previous = state.tick_index;
            turn += 1;
        }
        let state = env.get_state();
        assert!(state.tick_index == 100 || state.lives_remaining == 0);
    }

    #[test]
    fn step_limit_completes_episode_and_freezes_it() {
        let mut config = GameConfig::with_map(&BOXED_GHOSTS_MAP);
        config.max_episode_steps = 3;
        let mut env = Environment::new(config).expect("valid map");
        for expected in 1..=3 {
            let state = step(&mut env, Direction::None);
            assert_eq!(state.tick_index, expected);
            assert_eq!(state.episode_completed, expected == 3);
        }
        let events = env.drain_events();
        assert!(events.contains(&RuntimeEvent::EpisodeCompleted {
            reason: CompletionReason::StepLimit
        }));

        let frozen = step(&mut env, Direction::Left);
        assert_eq!(frozen.tick_index, 3);
        assert_eq!(frozen.player_location, Coord::new(1, 2));
    }

    #[test]
    fn moving_onto_chasing_ghost_costs_a_life_and_resets_actors() {
        let mut env = make_env(&CHASE_MAP);
        let state = step(&mut env, Direction::Right);

        assert_eq!(state.lives_remaining, 2);
        assert_eq!(state.tick_index, 1);
        assert_eq!(state.score, 0);
        assert!(!state.episode_completed);
        assert_eq!(state.player_location, Coord::new(2, 2));
        assert_eq!(state.ghost_location(GhostKind::Blinky), Coord::new(2, 4));
        assert_eq!(state.grid[2], "#.P.0...#");
        assert_eq!(env.player().direction, Direction::None);
        assert_eq!(env.ghost(GhostKind::Blinky).direction, Direction::Left);
        assert!(env
            .drain_events()
            .contains(&RuntimeEvent::LifeLost { lives_remaining: 2 }));
    }

    #[test]
    fn swapping_cells_with_a_chasing_ghost_costs_a_life() {
        let mut env = make_env(&CORRIDOR_MAP);
        env.ghosts[0].location = Coord::new(1, 2);
        env.rebuild_index();
        env.refresh_state();

        let state = step(&mut env, Direction::Right);
        assert_eq!(state.lives_remaining, 2);
        assert_eq!(state.player_location, Coord::new(1, 1));
        assert_eq!(state.ghost_location(GhostKind::Blinky), Coord::new(1, 7));
    }

    #[test]
    fn last_life_lost_completes_episode() {
        let mut config = GameConfig::with_map(&CHASE_MAP);
        config.lives = 1;
        let mut env = Environment::new(config).expect("valid map");
        let state = step(&mut env, Direction::Right);
        assert_eq!(state.lives_remaining, 0);
        assert!(state.episode_completed);
        assert!(env.drain_events().contains(&RuntimeEvent::EpisodeCompleted {
            reason: CompletionReason::OutOfLives
        }));
        assert_eq!(step(&mut env, Direction::Right), state);
    }

    #[test]
    fn life_loss_reseeds_house_timer_for_released_ghosts() {
        let mut env = make_env(&CHASE_MAP);
        env.ghosts[GhostKind::Pinky.index()].set_mode(GhostMode::Scatter);
        step(&mut env, Direction::Right);

        let pinky = env.ghost(GhostKind::Pinky);
        assert_eq!(pinky.mode(), GhostMode::House);
        assert_eq!(pinky.config.step_index, pinky.config.house_duration);
        assert_eq!(env.ghost(GhostKind::Inky).config.step_index, 0);

        step(&mut env, Direction::None);
        let pinky = env.ghost(GhostKind::Pinky);
        assert_eq!(pinky.mode(), GhostMode::Chase);
        assert!(pinky.house_exit_pending);
        assert_eq!(env.ghost(GhostKind::Inky).mode(), GhostMode::House);
        assert_eq!(env.ghost(GhostKind::Inky).config.step_index, 1);
    }

    #[test]
    fn pellets_score_once_and_disappear() {
        let mut env = make_env(&BOXED_GHOSTS_MAP);
        let before = env.remaining_collectibles();

        let state = step(&mut env, Direction::Left);
        assert_eq!(state.score, 10);
        assert_eq!(state.glyph_at(Coord::new(1, 1)), Some('P'));
        assert_eq!(env.remaining_collectibles(), before - 1);

        let state = step(&mut env, Direction::Right);
        assert_eq!(state.score, 10);
        assert_eq!(state.glyph_at(Coord::new(1, 1)), Some(' '));

        let state = step(&mut env, Direction::Left);
        assert_eq!(state.score, 10);
        let events = env.drain_events();
        assert_eq!(
            events
                .iter()
                .filter(|event| matches!(event, RuntimeEvent::PelletEaten { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn power_pellet_frightens_released_ghosts_in_same_step() {
        let mut env = make_env(&BOXED_GHOSTS_MAP);
        assert_eq!(env.ghost(GhostKind::Blinky).direction, Direction::Left);

        step(&mut env, Direction::Right);
        let state = step(&mut env, Direction::Right);
        assert_eq!(state.score, 60);
        assert_eq!(state.glyph_at(Coord::new(1, 4)), Some('P'));

        let blinky = env.ghost(GhostKind::Blinky);
        assert_eq!(blinky.mode(), GhostMode::Frightened);
        assert_eq!(blinky.direction, Direction::Right);
        assert_eq!(blinky.config.step_index, 0);
        for kind in [GhostKind::Pinky, GhostKind::Inky, GhostKind::Clyde] {
            assert_eq!(env.ghost(kind).mode(), GhostMode::House);
        }
        let events = env.drain_events();
        assert!(events.contains(&RuntimeEvent::PowerPelletEaten {
            at: Coord::new(1, 4),
            points: 50
        }));
        assert!(events.contains(&RuntimeEvent::GhostModeChanged {
            ghost: GhostKind::Blinky,
            from: GhostMode::Chase,
            to: GhostMode::Frightened
        }));
    }

    #[test]
    fn ghost_released_on_power_pellet_tick_is_not_frightened() {
        let mut config = GameConfig::with_map(&BOXED_GHOSTS_MAP);
        config.pinky.house_duration = 2;
        let mut env = Environment::new(config).expect("valid map");

        step(&mut env, Direction::Right);
        let state = step(&mut env, Direction::Right);
        assert_eq!(state.score, 60);
        assert_eq!(env.ghost(GhostKind::Blinky).mode(), GhostMode::Frightened);
        let pinky = env.ghost(GhostKind::Pinky);
        assert_eq!(pinky.mode(), GhostMode::Chase);
        assert!(pinky.house_exit_pending);
        assert!(!env.drain_events().contains(&RuntimeEvent::GhostModeChanged {
            ghost: GhostKind::Pinky,
            from: GhostMode::Chase,
            to: GhostMode::Frightened
        }));
    }

    #[test]
    fn frightened_ghost_moves_at_half_speed_and_can_be_eaten() {
        let mut env = make_env(&CORRIDOR_MAP);
        {
            let blinky = &mut env.ghosts[GhostKind::Blinky.index()];
            blinky.location = Coord::new(1, 3);
            blinky.frighten();
            blinky.direction = Direction::Right;
        }
        env.rebuild_index();
        env.refresh_state();

        let state = step(&mut env, Direction::Right);
        assert_eq!(state.score, 10);
        assert_eq!(state.ghost_location(GhostKind::Blinky), Coord::new(1, 3));

        let state = step(&mut env, Direction::Right);
        assert_eq!(state.lives_remaining, 3);
        assert_eq!(state.score, 210);
        assert_eq!(state.player_location, Coord::new(1, 3));
        assert_eq!(state.ghost_location(GhostKind::Blinky), Coord::new(1, 7));

        let blinky = env.ghost(GhostKind::Blinky);
        assert_eq!(blinky.mode(), GhostMode::Scatter);
        assert_eq!(blinky.direction, Direction::Left);
        assert!(env.drain_events().contains(&RuntimeEvent::GhostEaten {
            ghost: GhostKind::Blinky,
            points: 200
        }));
    }

    #[test]
    fn frightened_ghost_landing_on_player_still_costs_a_life() {
        let mut env = make_env(&CORRIDOR_MAP);
        {
            let blinky = &mut env.ghosts[GhostKind::Blinky.index()];
            blinky.location = Coord::new(1, 3);
            blinky.frighten();
            blinky.direction = Direction::Left;
            blinky.config.step_index = 1;
        }
        env.rebuild_index();
        env.refresh_state();

        let state = step(&mut env, Direction::Right);
        assert_eq!(state.lives_remaining, 2);
        assert_eq!(state.score, 0);
        assert_eq!(state.player_location, Coord::new(1, 1));
        assert_eq!(env.ghost(GhostKind::Blinky).mode(), GhostMode::Chase);
    }

    #[test]
    fn chasing_ghost_closes_distance_preferring_up() {
        let mut config = GameConfig::with_map(&[
            "P......", ".......", "..0....", ".......", "123....",
        ]);
        config.blinky.chase_duration = 1_000;
        let mut env = Environment::new(config).expect("open map");
        let player = env.get_state().player_location;
        let before = manhattan(env.get_state().ghost_location(GhostKind::Blinky), player);

        let state = step(&mut env, Direction::None);
        let blinky = state.ghost_location(GhostKind::Blinky);
        assert_eq!(state.player_location, player);
        assert_eq!(blinky, Coord::new(1, 2));
        assert_eq!(manhattan(blinky, player), before - 1);
        assert_eq!(env.ghost(GhostKind::Blinky).direction, Direction::Up);
    }

    #[test]
    fn released_ghost_crosses_gate_to_blinky_spawn() {
        let mut config = GameConfig::with_map(&HOUSE_MAP);
        config.pinky.house_duration = 1;
        let mut env = Environment::new(config).expect("valid map");
        let gate = Coord::new(2, 4);
        assert!(!env.is_open_for_player(gate));
        assert!(!env.is_open_for_ghost(gate, false));
        assert!(env.is_open_for_ghost(gate, true));

        step(&mut env, Direction::None);
        let pinky = env.ghost(GhostKind::Pinky);
        assert_eq!(pinky.mode(), GhostMode::Chase);
        assert!(pinky.house_exit_pending);
        assert_eq!(pinky.location, Coord::new(3, 3));

        step(&mut env, Direction::None);
        assert_eq!(env.ghost(GhostKind::Pinky).location, Coord::new(3, 4));

        let state = step(&mut env, Direction::None);
        assert_eq!(state.ghost_location(GhostKind::Pinky), gate);
        assert_eq!(state.glyph_at(gate), Some('G'));

        step(&mut env, Direction::None);
        let pinky = env.ghost(GhostKind::Pinky);
        assert_eq!(pinky.location, Coord::new(1, 4));
        assert!(pinky.house_exit_pending);

        step(&mut env, Direction::None);
        let pinky = env.ghost(GhostKind::Pinky);
        assert!(!pinky.house_exit_pending);
        assert_eq!(pinky.location, Coord::new(1, 3));
    }

    #[test]
    fn corrupted_fixture_list_aborts_step() {
        let mut env = make_env(&BOXED_GHOSTS_MAP);
        let Some(EntityRef::Fixture(handle)) = env.grid.get(Coord::new(1, 1)) else {
            panic!("expected pellet fixture at (1, 1)");
        };
        env.fixtures[handle] = None;
        let err = env.step(Direction::Left).unwrap_err();
        assert_eq!(
            err,
            StepError::MissingFixture {
                handle,
                location: Coord::new(1, 1)
            }
        );
    }

    #[test]
    fn identical_instances_stay_in_lockstep() {
        let mut a = Environment::new(GameConfig::default()).expect("default config");
        let mut b = Environment::new(GameConfig::default()).expect("default config");
        let moves = [
            Direction::Left,
            Direction::Left,
            Direction::Up,
            Direction::Right,
            Direction::Down,
        ];
        for idx in 0..80 {
            let dir = moves[idx % moves.len()];
            assert_eq!(step(&mut a, dir), step(&mut b, dir));
        }
    }

    #[test]
    fn independent_instances_run_on_separate_threads() {
        fn assert_send<T: Send>() {}
        assert_send::<Environment>();

        let handles: Vec<_> = (0..2)
            .map(|_| {
                std::thread::spawn(|| {
                    let mut env = Environment::new(GameConfig::default())
                        .expect("default config")
                        .with_renderer(NullRenderer);
                    for _ in 0..50 {
                        env.step(Direction::Left).expect("step succeeds");
                    }
                    env.get_state()
                })
            })
            .collect();
        let states: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().expect("worker thread"))
            .collect();
        assert_eq!(states[0], states[1]);
    }

    #[test]
    fn render_modes_follow_renderer_support() {
        let mut env = make_env(&CHASE_MAP).with_renderer(TextRenderer::new(Vec::new()));
        assert!(env.render(RenderMode::None).is_ok());
        assert!(env.render(RenderMode::Text).is_ok());
        assert!(matches!(
            env.render(RenderMode::Graphical),
            Err(RenderError::Unsupported(RenderMode::Graphical))
        ));

        env.close();
        env.close();
        assert!(matches!(
            env.render(RenderMode::Text),
            Err(RenderError::Closed)
        ));
        assert!(env.render(RenderMode::None).is_ok());
    }

    #[test]
    fn rejects_invalid_configuration() {
        let mut config = GameConfig::with_map(&CHASE_MAP);
        config.map[1].pop();
        assert!(Environment::new(config).is_err());
    }
}
