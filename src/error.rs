//! Error taxonomy for the planning core.
//!
//! Only [`RequestError`] and [`ExportError`] ever reach the caller of an
//! exposed operation. Bridge and plan errors are recovered locally.

use std::time::Duration;

use thiserror::Error;

/// Caller handed the optimizer an unusable request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("route needs at least 2 stops, got {0}")]
    TooFewNodes(usize),
    #[error("start stop {0:?} is not part of the trip")]
    UnknownStart(String),
    #[error("end stop {0:?} is not part of the trip")]
    UnknownEnd(String),
    #[error("start and end must be different stops")]
    SameStartAndEnd,
    #[error("stop id {0:?} appears more than once")]
    DuplicateNode(String),
}

/// Failure talking to the AI bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("bridge request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("bridge rejected credentials (status {0})")]
    Unauthorized(u16),
    #[error("bridge returned status {0}")]
    Status(u16),
    #[error("bridge did not answer within {0:?}")]
    Timeout(Duration),
    #[error("bridge unavailable: {0}")]
    Unavailable(String),
}

/// The AI answer could not be turned into a trustworthy route.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error("response contains no JSON object")]
    NoPayload,
    #[error("response payload is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("payload field `{0}` is missing")]
    MissingField(&'static str),
    #[error("payload field `{0}` is not a list")]
    NotAList(&'static str),
    #[error("ordered id at position {0} is not a string")]
    NonStringId(usize),
    #[error("expected {expected} ordered ids, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("route starts at {actual:?} instead of {expected:?}")]
    WrongStart { expected: String, actual: String },
    #[error("route ends at {actual:?} instead of {expected:?}")]
    WrongEnd { expected: String, actual: String },
    #[error("ordered ids do not cover every stop exactly once")]
    IdSetMismatch,
}

/// Graph edit refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("stop {0:?} already exists")]
    DuplicateNode(String),
    #[error("stop {0:?} does not exist")]
    UnknownNode(String),
    #[error("cannot connect stop {0:?} to itself")]
    SelfLoop(String),
}

/// Export refused; the user has to fix the canvas first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("add at least one stop before exporting")]
    Empty,
    #[error("not fully connected: link every stop into one route first")]
    NotConnected,
    #[error("stops must form a single path without branches or loops")]
    NotSimplePath,
}

/// Trip document could not be read or written.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("trip document must be a JSON object")]
    NotAnObject,
    #[error("canvas payload is invalid: {0}")]
    Canvas(#[from] serde_json::Error),
}

/// An environment value could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} must be an absolute URL, got {value:?}")]
    InvalidUrl { key: &'static str, value: String },
}

/// A result arrived for a graph revision that no longer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("result for revision {stale} discarded, graph is at revision {current}")]
pub struct StaleResult {
    pub stale: u64,
    pub current: u64,
}
