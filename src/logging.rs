use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::types::RuntimeEvent;

#[derive(Clone, Debug, Serialize)]
pub struct StructuredLogLine {
    pub timestamp: String,
    pub level: String,
    pub event: String,
    #[serde(rename = "runId")]
    pub run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick: Option<u32>,
    pub details: Value,
}

impl StructuredLogLine {
    pub fn new(
        level: &str,
        event: &str,
        run_id: &str,
        episode: Option<u32>,
        tick: Option<u32>,
        details: Value,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            level: level.to_string(),
            event: event.to_string(),
            run_id: run_id.to_string(),
            episode,
            tick,
            details,
        }
    }
}

pub fn emit_log(
    level: &str,
    event: &str,
    run_id: &str,
    episode: Option<u32>,
    tick: Option<u32>,
    details: Value,
) {
    let log_line = StructuredLogLine::new(level, event, run_id, episode, tick, details);
    match serde_json::to_string(&log_line) {
        Ok(text) => eprintln!("{text}"),
        Err(error) => eprintln!("failed to encode log line for {event}: {error}"),
    }
}

pub fn event_name(event: &RuntimeEvent) -> &'static str {
    match event {
        RuntimeEvent::PelletEaten { .. } => "pellet_eaten",
        RuntimeEvent::PowerPelletEaten { .. } => "power_pellet_eaten",
        RuntimeEvent::GhostEaten { .. } => "ghost_eaten",
        RuntimeEvent::GhostModeChanged { .. } => "ghost_mode_changed",
        RuntimeEvent::LifeLost { .. } => "life_lost",
        RuntimeEvent::EpisodeCompleted { .. } => "episode_completed",
    }
}

pub fn log_events(run_id: &str, episode: u32, tick: u32, events: &[RuntimeEvent]) {
    for event in events {
        let details = serde_json::to_value(event).unwrap_or(Value::Null);
        emit_log("debug", event_name(event), run_id, Some(episode), Some(tick), details);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CompletionReason, Coord};
    use serde_json::json;

    #[test]
    fn log_line_uses_camel_case_and_skips_missing_context() {
        let line = StructuredLogLine::new("info", "run_started", "sim-1", None, Some(3), json!({}));
        let value = serde_json::to_value(&line).expect("log line serializes");
        assert_eq!(value["runId"], "sim-1");
        assert_eq!(value["tick"], 3);
        assert!(value.get("episode").is_none());
        assert!(value["timestamp"].as_str().is_some_and(|ts| ts.ends_with('Z')));
    }

    #[test]
    fn event_names_are_snake_case() {
        assert_eq!(
            event_name(&RuntimeEvent::PelletEaten {
                at: Coord::new(1, 1),
                points: 10
            }),
            "pellet_eaten"
        );
        assert_eq!(
            event_name(&RuntimeEvent::EpisodeCompleted {
                reason: CompletionReason::StepLimit
            }),
            "episode_completed"
        );
    }
}
