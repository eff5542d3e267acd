use clap::Parser;
use packman_rl_env::config::GameConfig;
use packman_rl_env::engine::Environment;
use packman_rl_env::logging::{emit_log, log_events};
use packman_rl_env::render::NullRenderer;
use packman_rl_env::types::{CompletionReason, Direction, RenderMode, RuntimeEvent, State};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// JSON game configuration; the classic maze when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    episodes: Option<u32>,
    #[arg(long)]
    seed: Option<u64>,
    /// random | wall-follow | still
    #[arg(long)]
    policy: Option<String>,
    /// text | none
    #[arg(long)]
    render: Option<String>,
    #[arg(long)]
    run_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
    /// Forward every engine event to the log.
    #[arg(long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
enum Policy {
    Random,
    WallFollow,
    Still,
}

impl Policy {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "random" => Some(Self::Random),
            "wall-follow" | "wall_follow" => Some(Self::WallFollow),
            "still" => Some(Self::Still),
            _ => None,
        }
    }
}

const MOVES: [Direction; 4] = [
    Direction::Up,
    Direction::Left,
    Direction::Down,
    Direction::Right,
];

struct Agent {
    policy: Policy,
    rng: StdRng,
    heading: Direction,
}

impl Agent {
    fn new(policy: Policy, seed: u64) -> Self {
        Self {
            policy,
            rng: StdRng::seed_from_u64(seed),
            heading: Direction::None,
        }
    }

    fn random_move(&mut self) -> Direction {
        MOVES[self.rng.random_range(0..MOVES.len())]
    }

    fn choose(&mut self, moved: bool) -> Direction {
        match self.policy {
            Policy::Still => Direction::None,
            Policy::Random => self.random_move(),
            Policy::WallFollow => {
                if !moved || self.heading == Direction::None {
                    self.heading = self.random_move();
                }
                self.heading
            }
        }
    }
}

#[derive(Clone, Debug, Serialize)]
struct EpisodeResultLine {
    episode: u32,
    seed: u64,
    policy: Policy,
    reason: Option<CompletionReason>,
    ticks: u32,
    score: i32,
    #[serde(rename = "livesRemaining")]
    lives_remaining: u32,
    #[serde(rename = "pelletsEaten")]
    pellets_eaten: u32,
    #[serde(rename = "powerPelletsEaten")]
    power_pellets_eaten: u32,
    #[serde(rename = "ghostsEaten")]
    ghosts_eaten: u32,
    #[serde(rename = "livesLost")]
    lives_lost: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u32,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct EpisodeRunResult {
    #[serde(flatten)]
    result: EpisodeResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
    step_failed: bool,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "episodeCount")]
    episode_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageScore")]
    average_score: f64,
    #[serde(rename = "averageTicks")]
    average_ticks: f64,
    #[serde(rename = "reasonCounts")]
    reason_counts: BTreeMap<String, usize>,
    episodes: Vec<EpisodeResultLine>,
}

struct EpisodeSettings<'a> {
    run_id: &'a str,
    episode: u32,
    seed: u64,
    policy: Policy,
    render: RenderMode,
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    let run_started_at_ms = now_ms();
    let seed = cli.seed.unwrap_or(run_started_at_ms);
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(seed, run_started_at_ms));

    let Some(policy) = Policy::parse(cli.policy.as_deref().unwrap_or("random")) else {
        fail_startup(&run_id, "invalid_policy", json!({ "policy": cli.policy }))
    };
    let render = match cli.render.as_deref().map(RenderMode::parse) {
        None => RenderMode::None,
        Some(Some(mode @ (RenderMode::Text | RenderMode::None))) => mode,
        Some(_) => fail_startup(&run_id, "invalid_render_mode", json!({ "render": cli.render })),
    };

    let config = match cli.config.as_deref() {
        Some(path) => match GameConfig::load(path) {
            Ok(config) => config,
            Err(error) => fail_startup(
                &run_id,
                "config_load_failed",
                json!({ "path": path.to_string_lossy(), "error": error.to_string() }),
            ),
        },
        None => GameConfig::default(),
    };
    let mut env = match Environment::new(config) {
        Ok(env) => env,
        Err(error) => fail_startup(
            &run_id,
            "config_invalid",
            json!({ "error": error.to_string() }),
        ),
    };
    if render == RenderMode::None {
        env = env.with_renderer(NullRenderer);
    }

    let episodes = cli.episodes.unwrap_or(1).max(1);
    emit_log(
        "info",
        "run_started",
        &run_id,
        None,
        None,
        json!({
            "episodes": episodes,
            "seed": seed,
            "policy": policy,
            "rows": env.config().rows,
            "cols": env.config().cols,
            "maxEpisodeSteps": env.config().max_episode_steps,
        }),
    );

    let mut has_anomaly = false;
    let mut episode_results = Vec::new();
    let mut reason_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_anomalies = 0usize;

    for episode in 0..episodes {
        let settings = EpisodeSettings {
            run_id: &run_id,
            episode,
            seed: seed.wrapping_add(episode as u64),
            policy,
            render,
            verbose: cli.verbose,
        };
        emit_log(
            "info",
            "episode_started",
            &run_id,
            Some(episode),
            None,
            json!({ "seed": settings.seed }),
        );
        let episode_run = run_episode(&mut env, &settings);

        for anomaly in &episode_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &run_id,
                Some(episode),
                Some(anomaly.tick),
                json!({ "message": anomaly.message }),
            );
        }
        if !episode_run.result.anomalies.is_empty() || episode_run.step_failed {
            has_anomaly = true;
        }
        total_anomalies += episode_run.anomaly_records.len();
        *reason_counts
            .entry(reason_key(episode_run.result.reason))
            .or_insert(0) += 1;

        emit_log(
            "info",
            "episode_finished",
            &run_id,
            Some(episode),
            Some(episode_run.result.ticks),
            json!({
                "reason": episode_run.result.reason,
                "score": episode_run.result.score,
                "livesRemaining": episode_run.result.lives_remaining,
                "anomalyCount": episode_run.anomaly_records.len(),
            }),
        );

        match serde_json::to_string(&episode_run.result) {
            Ok(line) => println!("{line}"),
            Err(error) => emit_log(
                "error",
                "result_encode_failed",
                &run_id,
                Some(episode),
                None,
                json!({ "error": error.to_string() }),
            ),
        }
        episode_results.push(episode_run.result);
        if episode_run.step_failed {
            break;
        }
    }
    env.close();

    let summary = build_run_summary(
        run_id.clone(),
        run_started_at_ms,
        now_ms(),
        episode_results,
        reason_counts,
        total_anomalies,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        None,
        None,
        json!({
            "episodeCount": summary.episode_count,
            "anomalyCount": summary.anomaly_count,
            "averageScore": summary.average_score,
            "averageTicks": summary.average_ticks,
            "reasonCounts": summary.reason_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn fail_startup(run_id: &str, event: &str, details: serde_json::Value) -> ! {
    emit_log("error", event, run_id, None, None, details);
    std::process::exit(2);
}

fn run_episode(env: &mut Environment, settings: &EpisodeSettings<'_>) -> EpisodeRunResult {
    let mut agent = Agent::new(settings.policy, settings.seed);
    let mut previous = env.reset();
    let max_steps = env.config().max_episode_steps;
    let expected_rows = env.config().rows as usize;
    let expected_cols = env.config().cols as usize;

    let mut reason = None;
    let mut pellets_eaten = 0;
    let mut power_pellets_eaten = 0;
    let mut ghosts_eaten = 0;
    let mut lives_lost = 0;
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut step_failed = false;
    let mut moved = true;

    while !previous.episode_completed {
        let requested = agent.choose(moved);
        let state = match env.step(requested) {
            Ok(state) => state,
            Err(error) => {
                emit_log(
                    "error",
                    "step_failed",
                    settings.run_id,
                    Some(settings.episode),
                    Some(previous.tick_index),
                    json!({ "error": error.to_string() }),
                );
                push_anomaly(
                    &mut anomalies,
                    &mut anomaly_records,
                    &mut anomaly_seen,
                    previous.tick_index,
                    format!("step failed: {error}"),
                );
                step_failed = true;
                break;
            }
        };

        let events = env.drain_events();
        if settings.verbose {
            log_events(settings.run_id, settings.episode, state.tick_index, &events);
        }
        for event in &events {
            match event {
                RuntimeEvent::PelletEaten { .. } => pellets_eaten += 1,
                RuntimeEvent::PowerPelletEaten { .. } => power_pellets_eaten += 1,
                RuntimeEvent::GhostEaten { .. } => ghosts_eaten += 1,
                RuntimeEvent::LifeLost { .. } => lives_lost += 1,
                RuntimeEvent::EpisodeCompleted { reason: done } => reason = Some(*done),
                RuntimeEvent::GhostModeChanged { .. } => {}
            }
        }

        for message in collect_state_anomalies(&previous, &state, max_steps, expected_rows, expected_cols) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                state.tick_index,
                message,
            );
        }

        if settings.render == RenderMode::Text {
            if let Err(error) = env.render(RenderMode::Text) {
                emit_log(
                    "warn",
                    "render_failed",
                    settings.run_id,
                    Some(settings.episode),
                    Some(state.tick_index),
                    json!({ "error": error.to_string() }),
                );
            }
        }

        moved = state.player_location != previous.player_location;
        previous = state;
    }

    EpisodeRunResult {
        result: EpisodeResultLine {
            episode: settings.episode,
            seed: settings.seed,
            policy: settings.policy,
            reason,
            ticks: previous.tick_index,
            score: previous.score,
            lives_remaining: previous.lives_remaining,
            pellets_eaten,
            power_pellets_eaten,
            ghosts_eaten,
            lives_lost,
            anomalies,
        },
        anomaly_records,
        step_failed,
    }
}

fn collect_state_anomalies(
    previous: &State,
    state: &State,
    max_steps: u32,
    expected_rows: usize,
    expected_cols: usize,
) -> Vec<String> {
    let mut anomalies = Vec::new();
    if state.tick_index != previous.tick_index + 1 {
        anomalies.push(format!(
            "tick did not advance by one: {} -> {}",
            previous.tick_index, state.tick_index
        ));
    }
    if state.score < previous.score {
        anomalies.push(format!(
            "score decreased: {} -> {}",
            previous.score, state.score
        ));
    }
    if state.lives_remaining > previous.lives_remaining {
        anomalies.push(format!(
            "lives increased: {} -> {}",
            previous.lives_remaining, state.lives_remaining
        ));
    }
    let should_complete = state.tick_index >= max_steps || state.lives_remaining == 0;
    if state.episode_completed != should_complete {
        anomalies.push(format!(
            "completion flag {} at tick {} with {} lives",
            state.episode_completed, state.tick_index, state.lives_remaining
        ));
    }
    if state.grid.len() != expected_rows
        || state
            .grid
            .iter()
            .any(|row| row.chars().count() != expected_cols)
    {
        anomalies.push("snapshot grid has wrong dimensions".to_string());
    }
    let player_glyphs: usize = state
        .grid
        .iter()
        .map(|row| row.chars().filter(|glyph| *glyph == 'P').count())
        .sum();
    if player_glyphs != 1 {
        anomalies.push(format!("expected one player glyph, found {player_glyphs}"));
    }
    if state.glyph_at(state.player_location) != Some('P') {
        anomalies.push(format!(
            "player glyph missing at ({}, {})",
            state.player_location.row, state.player_location.col
        ));
    }
    anomalies
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u32,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_run_id(seed: u64, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    run_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    episodes: Vec<EpisodeResultLine>,
    reason_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
) -> RunSummary {
    let episode_count = episodes.len();
    let (average_score, average_ticks) = if episode_count == 0 {
        (0.0, 0.0)
    } else {
        let total_score: i64 = episodes.iter().map(|ep| ep.score as i64).sum();
        let total_ticks: u64 = episodes.iter().map(|ep| ep.ticks as u64).sum();
        (
            total_score as f64 / episode_count as f64,
            total_ticks as f64 / episode_count as f64,
        )
    };
    RunSummary {
        run_id,
        started_at_ms,
        finished_at_ms,
        episode_count,
        anomaly_count,
        average_score,
        average_ticks,
        reason_counts,
        episodes,
    }
}

fn reason_key(reason: Option<CompletionReason>) -> String {
    match reason {
        Some(CompletionReason::StepLimit) => "step_limit",
        Some(CompletionReason::OutOfLives) => "out_of_lives",
        None => "aborted",
    }
    .to_string()
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}
