//! Travel time lookups for individual legs.
//!
//! Each lookup is one bridge query. Failures degrade to
//! [`LegDuration::Unknown`]; nothing here returns an error.

use std::sync::OnceLock;

use rayon::prelude::*;
use regex::Regex;

use crate::model::{CanvasGraph, ConnectionKey, LegDuration};
use crate::traits::AiBridge;

const SYSTEM_INSTRUCTION: &str = "You are a travel assistant with access to a maps tool. \
Look up real driving times with the tool instead of estimating from memory. \
Reply with only the duration, for example \"15 mins\" or \"1 hour 30 mins\". No other text.";

/// One leg waiting for a travel time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegLookup {
    pub key: ConnectionKey,
    pub from_address: String,
    pub to_address: String,
}

#[derive(Debug, Clone)]
pub struct TravelTimeResolver<B> {
    bridge: B,
}

impl<B: AiBridge> TravelTimeResolver<B> {
    pub fn new(bridge: B) -> Self {
        Self { bridge }
    }

    /// Driving time between two addresses, or `Unknown`.
    ///
    /// Blank addresses never reach the bridge.
    pub fn resolve(&self, from_address: &str, to_address: &str) -> LegDuration {
        let (from, to) = (from_address.trim(), to_address.trim());
        if from.is_empty() || to.is_empty() {
            return LegDuration::Unknown;
        }

        let prompt = format!(
            "How long does it take to drive from \"{from}\" to \"{to}\"? \
             Respond with only the duration."
        );

        match self.bridge.query(&prompt, SYSTEM_INSTRUCTION) {
            Ok(text) => match parse_duration(&text) {
                Some(label) => LegDuration::Known(label),
                None => {
                    tracing::debug!(response = %text, "no duration in travel time response");
                    LegDuration::Unknown
                }
            },
            Err(err) => {
                tracing::warn!(from, to, error = %err, "travel time lookup failed");
                LegDuration::Unknown
            }
        }
    }

    /// Resolves many legs concurrently. Results are paired with their key so
    /// they can be applied regardless of completion order.
    pub fn resolve_all(&self, lookups: &[LegLookup]) -> Vec<(LegLookup, LegDuration)> {
        lookups
            .par_iter()
            .map(|lookup| {
                let duration = self.resolve(&lookup.from_address, &lookup.to_address);
                (lookup.clone(), duration)
            })
            .collect()
    }

    /// Fills every pending or missing duration on the canvas.
    ///
    /// Legs without two addresses are set to `Unknown` without a lookup.
    /// Returns the number of legs that received a looked-up value.
    pub fn refresh(&self, graph: &mut CanvasGraph) -> usize {
        let lookups = collect_lookups(graph);
        let results = self.resolve_all(&lookups);
        apply_durations(graph, results)
    }
}

/// Legs that need a duration. Unresolvable ones are cleared to `Unknown`.
pub fn collect_lookups(graph: &mut CanvasGraph) -> Vec<LegLookup> {
    let mut lookups = Vec::new();
    let mut unresolvable = Vec::new();

    for connection in graph.connections() {
        let needs_lookup = connection.duration.as_ref().is_none_or(LegDuration::is_pending);
        if !needs_lookup {
            continue;
        }
        match graph.leg_addresses(connection) {
            Some((from, to)) => lookups.push(LegLookup {
                key: connection.key(),
                from_address: from.to_string(),
                to_address: to.to_string(),
            }),
            None => unresolvable.push(connection.key()),
        }
    }

    for key in unresolvable {
        graph.set_duration(&key, LegDuration::Unknown);
    }
    lookups
}

/// Applies lookup results by connection identity.
///
/// A result is dropped when its leg was removed or an endpoint's address
/// changed after the lookup started.
pub fn apply_durations(graph: &mut CanvasGraph, results: Vec<(LegLookup, LegDuration)>) -> usize {
    let mut applied = 0;
    for (lookup, duration) in results {
        let unchanged = graph
            .connections()
            .iter()
            .find(|connection| connection.key() == lookup.key)
            .and_then(|connection| graph.leg_addresses(connection))
            .is_some_and(|(from, to)| from == lookup.from_address && to == lookup.to_address);

        if unchanged {
            graph.set_duration(&lookup.key, duration);
            applied += 1;
        } else {
            tracing::debug!(
                from = %lookup.key.from,
                to = %lookup.key.to,
                "discarding travel time for a leg that changed"
            );
        }
    }
    applied
}

/// Anything longer is not a drive between two stops.
const MAX_DURATION_MINUTES: u64 = 10_000 * 60;

fn hours_pattern() -> &'static Regex {
    static HOURS: OnceLock<Regex> = OnceLock::new();
    HOURS.get_or_init(|| {
        Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:hours?\b|hrs?\b|h\b)").expect("hours pattern is valid")
    })
}

fn minutes_pattern() -> &'static Regex {
    static MINUTES: OnceLock<Regex> = OnceLock::new();
    MINUTES.get_or_init(|| {
        Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:minutes?\b|mins?\b|m\b)").expect("minutes pattern is valid")
    })
}

/// Pulls an hour/minute duration out of free text and normalises it,
/// e.g. "About 1 hour and 30 minutes." becomes "1 hour 30 mins".
pub fn parse_duration(text: &str) -> Option<String> {
    let hours = hours_pattern()
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok());
    let minutes = minutes_pattern()
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok());

    if hours.is_none() && minutes.is_none() {
        return None;
    }

    let total = (hours.unwrap_or(0.0) * 60.0 + minutes.unwrap_or(0.0)).round();
    if !total.is_finite() || total > MAX_DURATION_MINUTES as f64 {
        return None;
    }
    Some(format_minutes(total as u64))
}

fn format_minutes(total: u64) -> String {
    let (hours, minutes) = (total / 60, total % 60);
    let hour_part = match hours {
        0 => None,
        1 => Some("1 hour".to_string()),
        n => Some(format!("{n} hours")),
    };
    let minute_part = match minutes {
        1 => "1 min".to_string(),
        n => format!("{n} mins"),
    };

    match hour_part {
        Some(hour_part) if minutes == 0 => hour_part,
        Some(hour_part) => format!("{hour_part} {minute_part}"),
        None => minute_part,
    }
}
