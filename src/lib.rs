//! trip-planner core
//!
//! Canvas graph model, AI-assisted route ordering with a deterministic
//! fallback, travel time lookups, and route export.

pub mod traits;
pub mod error;
pub mod model;
pub mod bridge;
pub mod travel_time;
pub mod optimizer;
pub mod fallback;
pub mod linearize;
pub mod session;
pub mod document;
pub mod config;
