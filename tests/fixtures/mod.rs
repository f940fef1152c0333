//! Test fixtures for trip-planner.
//!
//! Provides:
//! - Real Las Vegas area stops with street addresses
//! - Scripted, failing, and slow AI bridges

#![allow(dead_code)]

pub mod las_vegas_stops;

use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use trip_planner::error::BridgeError;
use trip_planner::model::Node;
use trip_planner::traits::AiBridge;

pub use las_vegas_stops::*;

/// Answers every prompt through a closure and records what it was asked.
pub struct ScriptedBridge<F> {
    answer: F,
    prompts: Mutex<Vec<String>>,
}

impl<F> ScriptedBridge<F>
where
    F: Fn(&str) -> Result<String, BridgeError> + Send + Sync,
{
    pub fn new(answer: F) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

impl<F> AiBridge for ScriptedBridge<F>
where
    F: Fn(&str) -> Result<String, BridgeError> + Send + Sync,
{
    fn query(&self, prompt: &str, _system_instruction: &str) -> Result<String, BridgeError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.answer)(prompt)
    }
}

/// Bridge that always replies with `text`.
pub fn replying(text: &str) -> ScriptedBridge<impl Fn(&str) -> Result<String, BridgeError> + Send + Sync + use<>> {
    let text = text.to_string();
    ScriptedBridge::new(move |_| Ok(text.clone()))
}

/// Bridge that can never be reached.
pub fn unreachable() -> ScriptedBridge<impl Fn(&str) -> Result<String, BridgeError> + Send + Sync + use<>> {
    ScriptedBridge::new(|_| Err(BridgeError::Unavailable("connection refused".to_string())))
}

/// Bridge that answers `text` only after `delay`.
pub struct SlowBridge {
    pub delay: Duration,
    pub text: String,
}

impl AiBridge for SlowBridge {
    fn query(&self, _prompt: &str, _system_instruction: &str) -> Result<String, BridgeError> {
        thread::sleep(self.delay);
        Ok(self.text.clone())
    }
}

/// Optimizer answer in the requested JSON shape, wrapped in chatter.
pub fn plan_reply(order: &[&str]) -> String {
    let legs: Vec<String> = order
        .windows(2)
        .map(|pair| format!(r#"{{"from": "{}", "to": "{}", "duration": "15 mins"}}"#, pair[0], pair[1]))
        .collect();
    let ids: Vec<String> = order.iter().map(|id| format!("\"{id}\"")).collect();
    format!(
        "Here is the optimized route:\n{{\"orderedNodeIds\": [{}], \"legs\": [{}]}}\nSafe travels!",
        ids.join(", "),
        legs.join(", ")
    )
}

/// Four stops `A`..`D` on the Strip.
pub fn abcd() -> Vec<Node> {
    ["A", "B", "C", "D"]
        .iter()
        .zip(STRIP)
        .map(|(id, stop)| Node::new(*id, stop.name, stop.address))
        .collect()
}
