//! One user's editing session over a trip canvas.
//!
//! Every structural edit bumps the revision. Routes computed against an older
//! revision are refused, so an abandoned optimize never overwrites newer work.

use crate::error::{RequestError, StaleResult};
use crate::model::{CanvasGraph, LegDuration, RouteRequest, RouteResult};
use crate::optimizer::{OptimizedRoute, Optimizer};
use crate::traits::AiBridge;
use crate::travel_time::{LegLookup, TravelTimeResolver, apply_durations, collect_lookups};

/// Graph revision a computation started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Revision(u64);

/// Where to stack stops after a route is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnLayout {
    pub x: f64,
    pub top: f64,
    pub spacing: f64,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            x: 200.0,
            top: 100.0,
            spacing: 160.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlanningSession {
    graph: CanvasGraph,
    revision: u64,
}

impl PlanningSession {
    pub fn new(graph: CanvasGraph) -> Self {
        Self { graph, revision: 0 }
    }

    pub fn graph(&self) -> &CanvasGraph {
        &self.graph
    }

    pub fn into_graph(self) -> CanvasGraph {
        self.graph
    }

    pub fn revision(&self) -> Revision {
        Revision(self.revision)
    }

    /// Runs a structural edit. Only an accepted edit bumps the revision.
    pub fn edit<T, E>(&mut self, change: impl FnOnce(&mut CanvasGraph) -> Result<T, E>) -> Result<T, E> {
        let value = change(&mut self.graph)?;
        self.revision += 1;
        Ok(value)
    }

    /// Snapshot request for the current stops.
    pub fn route_request(&self, start: &str, end: &str) -> (RouteRequest, Revision) {
        let request = RouteRequest::new(self.graph.nodes().to_vec(), start, end);
        (request, self.revision())
    }

    /// Replaces all legs with `route` if the graph is still at `revision`.
    pub fn apply_route(
        &mut self,
        revision: Revision,
        route: &RouteResult,
        layout: Option<ColumnLayout>,
    ) -> Result<(), StaleResult> {
        if revision.0 != self.revision {
            tracing::debug!(stale = revision.0, current = self.revision, "discarding stale route");
            return Err(StaleResult {
                stale: revision.0,
                current: self.revision,
            });
        }

        self.install(route, layout);
        Ok(())
    }

    fn install(&mut self, route: &RouteResult, layout: Option<ColumnLayout>) {
        self.graph.apply_route(route);
        if let Some(layout) = layout {
            self.graph
                .arrange_column(&route.ordered_node_ids, layout.x, layout.top, layout.spacing);
        }
        self.revision += 1;
    }

    /// Optimizes the current stops and applies the result.
    pub fn optimize(
        &mut self,
        optimizer: &Optimizer,
        start: &str,
        end: &str,
        layout: Option<ColumnLayout>,
    ) -> Result<OptimizedRoute, RequestError> {
        let (request, _) = self.route_request(start, end);
        let optimized = optimizer.optimize(&request)?;
        self.install(&optimized.route, layout);
        Ok(optimized)
    }

    /// Legs waiting for a travel time. Legs that can't be looked up are
    /// marked `Unknown` right away.
    pub fn pending_lookups(&mut self) -> Vec<LegLookup> {
        collect_lookups(&mut self.graph)
    }

    /// Applies finished lookups by leg identity; stale ones are dropped.
    pub fn apply_durations(&mut self, results: Vec<(LegLookup, LegDuration)>) -> usize {
        apply_durations(&mut self.graph, results)
    }

    pub fn refresh_durations<B: AiBridge>(&mut self, resolver: &TravelTimeResolver<B>) -> usize {
        resolver.refresh(&mut self.graph)
    }
}
