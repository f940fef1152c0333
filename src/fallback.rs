//! Deterministic route used whenever the AI answer can't be trusted.
//!
//! Start, then every other stop in input order, then end. Always valid.

use crate::model::{LegDuration, RouteRequest, RouteResult};

/// Builds the fallback order. Legs start out pending.
///
/// Assumes a request that passed [`RouteRequest::validate`].
pub fn fallback_route(request: &RouteRequest) -> RouteResult {
    let start = request.start_node_id.as_str();
    let end = request.end_node_id.as_str();

    let mut order = Vec::with_capacity(request.nodes.len());
    order.push(start.to_string());
    order.extend(
        request
            .node_ids()
            .filter(|id| *id != start && *id != end)
            .map(str::to_string),
    );
    order.push(end.to_string());

    RouteResult::chain(order, |_, _| LegDuration::Pending)
}
