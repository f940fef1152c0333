//! Flattens the user-drawn canvas into one ordered route for export.

use reqwest::Url;

use crate::error::ExportError;
use crate::model::{Adjacency, CanvasGraph, Connection, Node, is_connected, is_single_connected_path};

/// Directions page the exported stops are appended to.
pub const DEFAULT_MAPS_BASE_URL: &str = "https://www.google.com/maps/dir/";

/// Walks the legs as undirected edges and returns the visiting order.
///
/// Starts at the first stop with exactly one neighbour, or the first stop
/// when there is none (a loop). At each step moves to the first unvisited
/// neighbour. Stops early at a dead end, so on branching or disconnected
/// canvases the result is a strict prefix; compare lengths before use.
pub fn linearize<'a>(nodes: &'a [Node], connections: &[Connection]) -> Vec<&'a str> {
    if nodes.is_empty() {
        return Vec::new();
    }

    let adjacency = Adjacency::build(nodes, connections);
    let start = (0..nodes.len())
        .find(|&node| adjacency.degree(node) == 1)
        .unwrap_or(0);

    let mut visited = vec![false; nodes.len()];
    let mut order = Vec::with_capacity(nodes.len());
    let mut current = Some(start);

    while let Some(node) = current {
        visited[node] = true;
        order.push(adjacency.ids[node]);
        current = adjacency.neighbors[node]
            .iter()
            .copied()
            .find(|&next| !visited[next]);
    }

    order
}

/// Ordered stops of a canvas that forms exactly one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteExport {
    pub node_ids: Vec<String>,
    /// Address per stop, or its title when the address is blank.
    pub addresses: Vec<String>,
}

impl RouteExport {
    /// Directions link visiting `addresses` in order.
    ///
    /// `None` when `base` is not a usable URL.
    pub fn directions_url(&self, base: &str) -> Option<Url> {
        let mut url = Url::parse(base).ok()?;
        {
            let mut segments = url.path_segments_mut().ok()?;
            segments.pop_if_empty();
            for address in &self.addresses {
                segments.push(address);
            }
        }
        Some(url)
    }
}

/// Export operation: refuses unless the canvas is one connected path.
pub fn export_route(graph: &CanvasGraph) -> Result<RouteExport, ExportError> {
    let nodes = graph.nodes();
    let connections = graph.connections();

    if nodes.is_empty() {
        return Err(ExportError::Empty);
    }
    if nodes.len() > 1 && (connections.is_empty() || !is_connected(nodes, connections)) {
        return Err(ExportError::NotConnected);
    }
    if !is_single_connected_path(nodes, connections) {
        return Err(ExportError::NotSimplePath);
    }

    let order = linearize(nodes, connections);
    let mut node_ids = Vec::with_capacity(order.len());
    let mut addresses = Vec::with_capacity(order.len());
    for id in order {
        if let Some(node) = graph.node(id) {
            node_ids.push(node.id.clone());
            addresses.push(node.place_label().to_string());
        }
    }

    tracing::debug!(stops = node_ids.len(), "exported route");
    Ok(RouteExport { node_ids, addresses })
}
