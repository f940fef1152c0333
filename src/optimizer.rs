//! AI-backed route optimizer.
//!
//! One bounded query per request. The answer is extracted, parsed against a
//! strict schema, and checked to be a permutation of the stops with the
//! requested endpoints. Anything else falls back to [`fallback_route`].

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use serde_json::Value;

use crate::error::{BridgeError, PlanError, RequestError};
use crate::fallback::fallback_route;
use crate::model::{LegDuration, RouteRequest, RouteResult};
use crate::travel_time::parse_duration;
use crate::traits::AiBridge;

/// Upper bound for the whole bridge exchange.
pub const DEFAULT_OPTIMIZE_TIMEOUT: Duration = Duration::from_secs(15);

/// Above this many stops the model is told to go greedy.
const EXHAUSTIVE_STOP_LIMIT: usize = 5;

const SYSTEM_INSTRUCTION: &str = "You are a trip route optimizer with access to a maps tool. \
Always use the maps tool to get real driving times between stops; never estimate them from memory. \
Respond with a single JSON object in exactly the requested format and nothing else.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteSource {
    Ai,
    Fallback,
}

/// A route that satisfies every route invariant, and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizedRoute {
    pub route: RouteResult,
    pub source: RouteSource,
}

pub struct Optimizer {
    bridge: Arc<dyn AiBridge>,
    timeout: Duration,
}

impl Optimizer {
    pub fn new(bridge: impl AiBridge + 'static) -> Self {
        Self::from_shared(Arc::new(bridge))
    }

    pub fn from_shared(bridge: Arc<dyn AiBridge>) -> Self {
        Self {
            bridge,
            timeout: DEFAULT_OPTIMIZE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Orders the stops of `request`.
    ///
    /// Fails only when the request itself is invalid. Bridge trouble and bad
    /// answers produce the fallback route instead.
    pub fn optimize(&self, request: &RouteRequest) -> Result<OptimizedRoute, RequestError> {
        request.validate()?;

        match self.request_plan(request) {
            Ok(route) => {
                tracing::info!(node_count = request.nodes.len(), "accepted AI route");
                Ok(OptimizedRoute {
                    route,
                    source: RouteSource::Ai,
                })
            }
            Err(err) => {
                tracing::warn!(
                    node_count = request.nodes.len(),
                    error = %err,
                    "AI route rejected, using fallback order"
                );
                Ok(OptimizedRoute {
                    route: fallback_route(request),
                    source: RouteSource::Fallback,
                })
            }
        }
    }

    /// Single attempt: query, extract, validate. No retries.
    pub fn request_plan(&self, request: &RouteRequest) -> Result<RouteResult, PlanError> {
        let text = self.query_bounded(build_prompt(request))?;
        parse_plan(&text, request)
    }

    fn query_bounded(&self, prompt: String) -> Result<String, BridgeError> {
        let (tx, rx) = mpsc::channel();
        let bridge = Arc::clone(&self.bridge);

        std::thread::Builder::new()
            .name("route-optimizer".to_string())
            .spawn(move || {
                // The receiver is gone once the caller timed out; late answers are dropped.
                let _ = tx.send(bridge.query(&prompt, SYSTEM_INSTRUCTION));
            })
            .map_err(|err| BridgeError::Unavailable(err.to_string()))?;

        match rx.recv_timeout(self.timeout) {
            Ok(reply) => reply,
            Err(RecvTimeoutError::Timeout) => Err(BridgeError::Timeout(self.timeout)),
            Err(RecvTimeoutError::Disconnected) => {
                Err(BridgeError::Unavailable("bridge worker exited without answering".to_string()))
            }
        }
    }
}

fn quoted(text: &str) -> String {
    Value::from(text).to_string()
}

/// Natural-language optimization request listing every stop.
pub fn build_prompt(request: &RouteRequest) -> String {
    let count = request.nodes.len();
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "Find the fastest driving order for the stops below. The route is an open path: \
         it must start at stop {}, end at stop {}, and visit every other stop exactly once.",
        quoted(&request.start_node_id),
        quoted(&request.end_node_id),
    );
    prompt.push_str("\nStops:\n");
    for node in &request.nodes {
        let _ = writeln!(
            prompt,
            "- id: {} | title: {} | address: {}",
            quoted(&node.id),
            quoted(node.title.trim()),
            quoted(node.place_label()),
        );
    }
    prompt.push('\n');

    if count > EXHAUSTIVE_STOP_LIMIT {
        let _ = writeln!(
            prompt,
            "There are {count} stops, so do not compare every ordering. Use the nearest \
             unvisited neighbor heuristic: from the current stop always drive to the closest \
             stop not yet visited, keeping the end stop for last."
        );
    } else {
        let _ = writeln!(prompt, "There are only {count} stops, so you may compare every ordering.");
    }

    let _ = write!(
        prompt,
        "\nRespond with exactly this JSON format:\n\
         {{\"orderedNodeIds\": [\"<id>\", ...], \"legs\": [{{\"from\": \"<id>\", \"to\": \"<id>\", \"duration\": \"15 mins\"}}, ...]}}\n\
         orderedNodeIds must list all {count} ids exactly once. legs must hold {} entries, \
         one per consecutive pair, each with the driving time from the maps tool.",
        count.saturating_sub(1),
    );

    prompt
}

/// First balanced `{ ... }` in `text`, honouring JSON string escapes.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

fn list_field<'v>(payload: &'v Value, field: &'static str) -> Result<&'v Vec<Value>, PlanError> {
    payload
        .get(field)
        .ok_or(PlanError::MissingField(field))?
        .as_array()
        .ok_or(PlanError::NotAList(field))
}

/// Parses and validates a raw bridge answer. All-or-nothing.
pub fn parse_plan(text: &str, request: &RouteRequest) -> Result<RouteResult, PlanError> {
    let json = extract_json_object(text).ok_or(PlanError::NoPayload)?;
    let payload: Value = serde_json::from_str(json)?;

    let ordered = list_field(&payload, "orderedNodeIds")?;
    let legs = list_field(&payload, "legs")?;

    let ordered_ids = ordered
        .iter()
        .enumerate()
        .map(|(index, id)| id.as_str().ok_or(PlanError::NonStringId(index)))
        .collect::<Result<Vec<&str>, _>>()?;

    validate_order(&ordered_ids, request)?;

    let durations = leg_durations(legs);
    let order = ordered_ids.iter().map(|id| id.to_string()).collect();
    Ok(RouteResult::chain(order, |from, to| {
        durations
            .get(&(from.to_string(), to.to_string()))
            .cloned()
            .unwrap_or(LegDuration::Pending)
    }))
}

/// Permutation check: length, endpoints, and exact id coverage.
pub fn validate_order(ordered_ids: &[&str], request: &RouteRequest) -> Result<(), PlanError> {
    if ordered_ids.len() != request.nodes.len() {
        return Err(PlanError::LengthMismatch {
            expected: request.nodes.len(),
            actual: ordered_ids.len(),
        });
    }

    let (Some(first), Some(last)) = (ordered_ids.first(), ordered_ids.last()) else {
        return Err(PlanError::LengthMismatch {
            expected: request.nodes.len(),
            actual: 0,
        });
    };
    if *first != request.start_node_id {
        return Err(PlanError::WrongStart {
            expected: request.start_node_id.clone(),
            actual: first.to_string(),
        });
    }
    if *last != request.end_node_id {
        return Err(PlanError::WrongEnd {
            expected: request.end_node_id.clone(),
            actual: last.to_string(),
        });
    }

    let seen: HashSet<&str> = ordered_ids.iter().copied().collect();
    if seen.len() != request.nodes.len() || !request.node_ids().all(|id| seen.contains(id)) {
        return Err(PlanError::IdSetMismatch);
    }

    Ok(())
}

/// Durations the model attached to legs, keyed by `(from, to)`.
/// Malformed entries and self-loops carry no duration.
fn leg_durations(legs: &[Value]) -> HashMap<(String, String), LegDuration> {
    legs.iter()
        .filter_map(|leg| {
            let from = leg.get("from")?.as_str()?;
            let to = leg.get("to")?.as_str()?;
            if from == to {
                return None;
            }
            let label = parse_duration(leg.get("duration")?.as_str()?)?;
            Some(((from.to_string(), to.to_string()), LegDuration::Known(label)))
        })
        .collect()
}
