//! Trip canvas data model: stops, legs, and the queries over them.
//!
//! Positions are layout only. Nothing in here reads them except
//! [`CanvasGraph::arrange_column`].

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, RequestError};

/// Label shown while a leg's travel time is still being looked up.
pub const PENDING_LABEL: &str = "Calculating...";

/// Label shown when a leg's travel time could not be determined.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// A planned location on the trip canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub position_x: f64,
    #[serde(default)]
    pub position_y: f64,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "freeTextDescription", alias = "description")]
    pub description: String,
    #[serde(default)]
    pub address: String,
}

impl Node {
    pub fn new(id: impl Into<String>, title: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position_x: 0.0,
            position_y: 0.0,
            title: title.into(),
            description: String::new(),
            address: address.into(),
        }
    }

    /// Trimmed address, if there is one to look up.
    pub fn lookup_address(&self) -> Option<&str> {
        let address = self.address.trim();
        (!address.is_empty()).then_some(address)
    }

    /// Address for display and map links; falls back to the title.
    pub fn place_label(&self) -> &str {
        self.lookup_address().unwrap_or_else(|| self.title.trim())
    }
}

/// Connection pole on a stop. Rendering only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentSide {
    Top,
    Bottom,
}

/// Travel time annotation on a leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LegDuration {
    /// Lookup requested but not finished.
    Pending,
    /// Lookup impossible or failed.
    Unknown,
    /// Human readable, e.g. "1 hour 30 mins".
    Known(String),
}

impl LegDuration {
    pub fn label(&self) -> &str {
        match self {
            LegDuration::Pending => PENDING_LABEL,
            LegDuration::Unknown => UNKNOWN_LABEL,
            LegDuration::Known(label) => label,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, LegDuration::Pending)
    }
}

impl From<String> for LegDuration {
    fn from(label: String) -> Self {
        match label.trim() {
            // Older documents stored the pending label with a unicode ellipsis.
            PENDING_LABEL | "Calculating\u{2026}" => LegDuration::Pending,
            UNKNOWN_LABEL | "" => LegDuration::Unknown,
            _ => LegDuration::Known(label),
        }
    }
}

impl From<LegDuration> for String {
    fn from(duration: LegDuration) -> Self {
        match duration {
            LegDuration::Known(label) => label,
            other => other.label().to_string(),
        }
    }
}

impl fmt::Display for LegDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Directed travel leg between two stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    #[serde(rename = "fromNodeId")]
    pub from: String,
    #[serde(rename = "fromAttachmentSide")]
    pub from_side: AttachmentSide,
    #[serde(rename = "toNodeId")]
    pub to: String,
    #[serde(rename = "toAttachmentSide")]
    pub to_side: AttachmentSide,
    #[serde(rename = "durationLabel", default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<LegDuration>,
}

impl Connection {
    /// Route leg using the "exit bottom, enter top" convention.
    pub fn leg(from: impl Into<String>, to: impl Into<String>, duration: Option<LegDuration>) -> Self {
        Self {
            from: from.into(),
            from_side: AttachmentSide::Bottom,
            to: to.into(),
            to_side: AttachmentSide::Top,
            duration,
        }
    }

    pub fn key(&self) -> ConnectionKey {
        ConnectionKey {
            from: self.from.clone(),
            from_side: self.from_side,
            to: self.to.clone(),
            to_side: self.to_side,
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.from == node_id || self.to == node_id
    }
}

/// Identity of a connection, stable across duration updates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionKey {
    pub from: String,
    pub from_side: AttachmentSide,
    pub to: String,
    pub to_side: AttachmentSide,
}

/// Input of the optimize operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    pub nodes: Vec<Node>,
    pub start_node_id: String,
    pub end_node_id: String,
}

impl RouteRequest {
    pub fn new(nodes: Vec<Node>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            nodes,
            start_node_id: start.into(),
            end_node_id: end.into(),
        }
    }

    /// Checks the caller contract: 2+ unique stops, distinct known endpoints.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.nodes.len() < 2 {
            return Err(RequestError::TooFewNodes(self.nodes.len()));
        }

        let mut seen = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(RequestError::DuplicateNode(node.id.clone()));
            }
        }

        if !seen.contains(self.start_node_id.as_str()) {
            return Err(RequestError::UnknownStart(self.start_node_id.clone()));
        }
        if !seen.contains(self.end_node_id.as_str()) {
            return Err(RequestError::UnknownEnd(self.end_node_id.clone()));
        }
        if self.start_node_id == self.end_node_id {
            return Err(RequestError::SameStartAndEnd);
        }

        Ok(())
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|node| node.id.as_str())
    }
}

/// Accepted visiting order plus one leg per consecutive pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    pub ordered_node_ids: Vec<String>,
    pub connections: Vec<Connection>,
}

impl RouteResult {
    /// Chains `order` into legs, asking `duration_for` for each leg's label.
    pub fn chain<F>(ordered_node_ids: Vec<String>, mut duration_for: F) -> Self
    where
        F: FnMut(&str, &str) -> LegDuration,
    {
        let connections = ordered_node_ids
            .windows(2)
            .map(|pair| Connection::leg(&pair[0], &pair[1], Some(duration_for(&pair[0], &pair[1]))))
            .collect();

        Self {
            ordered_node_ids,
            connections,
        }
    }
}

/// The `{ boxes, connections }` payload of a trip canvas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasGraph {
    #[serde(default)]
    boxes: Vec<Node>,
    #[serde(default)]
    connections: Vec<Connection>,
}

impl CanvasGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a loaded snapshot as-is; nothing is validated.
    pub fn from_parts(boxes: Vec<Node>, connections: Vec<Connection>) -> Self {
        Self { boxes, connections }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.boxes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.boxes.iter().find(|node| node.id == id)
    }

    fn node_mut(&mut self, id: &str) -> Result<&mut Node, GraphError> {
        self.boxes
            .iter_mut()
            .find(|node| node.id == id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))
    }

    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.node(&node.id).is_some() {
            return Err(GraphError::DuplicateNode(node.id));
        }
        self.boxes.push(node);
        Ok(())
    }

    /// Removes a stop together with every leg touching it.
    pub fn remove_node(&mut self, id: &str) -> Result<Node, GraphError> {
        let index = self
            .boxes
            .iter()
            .position(|node| node.id == id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;
        self.connections.retain(|connection| !connection.touches(id));
        Ok(self.boxes.remove(index))
    }

    pub fn set_title(&mut self, id: &str, title: impl Into<String>) -> Result<(), GraphError> {
        self.node_mut(id)?.title = title.into();
        Ok(())
    }

    pub fn set_description(&mut self, id: &str, description: impl Into<String>) -> Result<(), GraphError> {
        self.node_mut(id)?.description = description.into();
        Ok(())
    }

    pub fn move_node(&mut self, id: &str, x: f64, y: f64) -> Result<(), GraphError> {
        let node = self.node_mut(id)?;
        node.position_x = x;
        node.position_y = y;
        Ok(())
    }

    /// Changes an address and invalidates the durations of incident legs.
    pub fn set_address(&mut self, id: &str, address: impl Into<String>) -> Result<(), GraphError> {
        self.node_mut(id)?.address = address.into();

        let incident: Vec<usize> = self
            .connections
            .iter()
            .enumerate()
            .filter(|(_, connection)| connection.touches(id))
            .map(|(index, _)| index)
            .collect();
        for index in incident {
            let duration = self.initial_duration(&self.connections[index]);
            self.connections[index].duration = Some(duration);
        }
        Ok(())
    }

    /// Links two attachment points. Self-loops and unknown stops are refused;
    /// linking an already linked pair of poles returns the existing key.
    pub fn connect(
        &mut self,
        from: &str,
        from_side: AttachmentSide,
        to: &str,
        to_side: AttachmentSide,
    ) -> Result<ConnectionKey, GraphError> {
        if from == to {
            return Err(GraphError::SelfLoop(from.to_string()));
        }
        for id in [from, to] {
            if self.node(id).is_none() {
                return Err(GraphError::UnknownNode(id.to_string()));
            }
        }

        let mut connection = Connection {
            from: from.to_string(),
            from_side,
            to: to.to_string(),
            to_side,
            duration: None,
        };
        let key = connection.key();
        if self.connections.iter().any(|existing| existing.key() == key) {
            return Ok(key);
        }

        connection.duration = Some(self.initial_duration(&connection));
        self.connections.push(connection);
        Ok(key)
    }

    pub fn clear_connections(&mut self) {
        self.connections.clear();
    }

    /// Swaps in the legs of an accepted route, dropping every previous leg.
    pub fn apply_route(&mut self, route: &RouteResult) {
        self.connections = route.connections.clone();
    }

    /// Stacks the route's stops top to bottom at `x`. Unlisted stops stay put.
    pub fn arrange_column(&mut self, ordered_node_ids: &[String], x: f64, top: f64, spacing: f64) {
        for (row, id) in ordered_node_ids.iter().enumerate() {
            if let Some(node) = self.boxes.iter_mut().find(|node| &node.id == id) {
                node.position_x = x;
                node.position_y = top + spacing * row as f64;
            }
        }
    }

    /// Stores a looked-up duration. Returns false when the leg is gone.
    pub fn set_duration(&mut self, key: &ConnectionKey, duration: LegDuration) -> bool {
        match self.connections.iter_mut().find(|connection| &connection.key() == key) {
            Some(connection) => {
                connection.duration = Some(duration);
                true
            }
            None => false,
        }
    }

    /// Trimmed addresses of both endpoints, when both have one.
    pub fn leg_addresses(&self, connection: &Connection) -> Option<(&str, &str)> {
        let from = self.node(&connection.from)?.lookup_address()?;
        let to = self.node(&connection.to)?.lookup_address()?;
        Some((from, to))
    }

    fn initial_duration(&self, connection: &Connection) -> LegDuration {
        if self.leg_addresses(connection).is_some() {
            LegDuration::Pending
        } else {
            LegDuration::Unknown
        }
    }

    pub fn is_connected(&self) -> bool {
        is_connected(&self.boxes, &self.connections)
    }

    pub fn is_single_connected_path(&self) -> bool {
        is_single_connected_path(&self.boxes, &self.connections)
    }
}

/// Undirected, deduplicated adjacency over a snapshot.
///
/// Self-loops and legs pointing at unknown stops are ignored. Neighbour
/// order follows connection order.
pub(crate) struct Adjacency<'a> {
    pub ids: Vec<&'a str>,
    pub neighbors: Vec<Vec<usize>>,
    pub edge_count: usize,
}

impl<'a> Adjacency<'a> {
    pub fn build(nodes: &'a [Node], connections: &[Connection]) -> Self {
        let ids: Vec<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
        let index: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let mut neighbors = vec![Vec::new(); ids.len()];
        let mut seen = HashSet::new();
        for connection in connections {
            if connection.is_self_loop() {
                continue;
            }
            let (Some(&a), Some(&b)) = (
                index.get(connection.from.as_str()),
                index.get(connection.to.as_str()),
            ) else {
                continue;
            };
            if seen.insert((a.min(b), a.max(b))) {
                neighbors[a].push(b);
                neighbors[b].push(a);
            }
        }

        Self {
            ids,
            neighbors,
            edge_count: seen.len(),
        }
    }

    pub fn degree(&self, node: usize) -> usize {
        self.neighbors[node].len()
    }

    /// Count of nodes reachable from `start`, edges taken as undirected.
    pub fn reachable_from(&self, start: usize) -> usize {
        let mut visited = vec![false; self.ids.len()];
        let mut queue = VecDeque::from([start]);
        visited[start] = true;
        let mut count = 1;

        while let Some(current) = queue.pop_front() {
            for &next in &self.neighbors[current] {
                if !visited[next] {
                    visited[next] = true;
                    count += 1;
                    queue.push_back(next);
                }
            }
        }

        count
    }
}

/// True iff every stop can reach every other stop, ignoring direction.
pub fn is_connected(nodes: &[Node], connections: &[Connection]) -> bool {
    if nodes.is_empty() {
        return false;
    }
    let adjacency = Adjacency::build(nodes, connections);
    adjacency.reachable_from(0) == nodes.len()
}

/// True iff the legs join all stops into one simple path.
///
/// Connected, `n - 1` distinct edges, and no stop with more than two
/// neighbours. Cycles and branches both fail.
pub fn is_single_connected_path(nodes: &[Node], connections: &[Connection]) -> bool {
    if nodes.is_empty() {
        return false;
    }
    let adjacency = Adjacency::build(nodes, connections);
    adjacency.edge_count == nodes.len() - 1
        && (0..nodes.len()).all(|node| adjacency.degree(node) <= 2)
        && adjacency.reachable_from(0) == nodes.len()
}
