use clap::Parser;
use packman_rl_env::config::GameConfig;
use packman_rl_env::engine::Environment;
use packman_rl_env::logging::{emit_log, log_events};
use packman_rl_env::types::{Direction, RenderMode};
use serde_json::json;
use std::io::{self, BufRead};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// JSON game configuration; the classic maze when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Forward every engine event to the log.
    #[arg(long)]
    verbose: bool,
}

const RUN_ID: &str = "play";

fn main() {
    let cli = Cli::parse();
    let config = match cli.config.as_deref() {
        Some(path) => match GameConfig::load(path) {
            Ok(config) => config,
            Err(error) => {
                emit_log(
                    "error",
                    "config_load_failed",
                    RUN_ID,
                    None,
                    None,
                    json!({ "path": path.to_string_lossy(), "error": error.to_string() }),
                );
                std::process::exit(2);
            }
        },
        None => GameConfig::default(),
    };
    let mut env = match Environment::new(config) {
        Ok(env) => env,
        Err(error) => {
            emit_log(
                "error",
                "config_invalid",
                RUN_ID,
                None,
                None,
                json!({ "error": error.to_string() }),
            );
            std::process::exit(2);
        }
    };

    if let Err(error) = env.render(RenderMode::Text) {
        emit_log("warn", "render_failed", RUN_ID, Some(0), Some(0), json!({ "error": error.to_string() }));
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                emit_log("error", "stdin_failed", RUN_ID, Some(0), None, json!({ "error": error.to_string() }));
                break;
            }
        };
        let input = line.trim();
        if input == "q" || input == "quit" {
            break;
        }
        let requested = if input.is_empty() {
            Direction::None
        } else {
            match Direction::parse_move(input) {
                Some(direction) => direction,
                None => {
                    eprintln!("unknown move {input:?}; use w/a/s/d, '.' or q");
                    continue;
                }
            }
        };

        let state = match env.step(requested) {
            Ok(state) => state,
            Err(error) => {
                emit_log("error", "step_failed", RUN_ID, Some(0), None, json!({ "error": error.to_string() }));
                std::process::exit(1);
            }
        };
        let events = env.drain_events();
        if cli.verbose {
            log_events(RUN_ID, 0, state.tick_index, &events);
        }
        if let Err(error) = env.render(RenderMode::Text) {
            emit_log(
                "warn",
                "render_failed",
                RUN_ID,
                Some(0),
                Some(state.tick_index),
                json!({ "error": error.to_string() }),
            );
        }
        if state.episode_completed {
            emit_log(
                "info",
                "episode_finished",
                RUN_ID,
                Some(0),
                Some(state.tick_index),
                json!({ "score": state.score, "livesRemaining": state.lives_remaining }),
            );
            break;
        }
    }
    env.close();
}
