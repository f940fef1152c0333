//! Route export over user-drawn canvases.

mod fixtures;

use trip_planner::error::ExportError;
use trip_planner::fallback::fallback_route;
use trip_planner::linearize::{DEFAULT_MAPS_BASE_URL, export_route, linearize};
use trip_planner::model::{
    AttachmentSide, CanvasGraph, Connection, Node, RouteRequest, is_connected, is_single_connected_path,
};

use fixtures::sample_nodes;

fn chained(nodes: &[Node], order: &[usize]) -> Vec<Connection> {
    order
        .windows(2)
        .map(|pair| Connection::leg(&nodes[pair[0]].id, &nodes[pair[1]].id, None))
        .collect()
}

#[test]
fn chain_linearizes_from_either_endpoint() {
    let nodes = sample_nodes(5);
    let connections = chained(&nodes, &[0, 1, 2, 3, 4]);
    let forward: Vec<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
    let mut backward = forward.clone();
    backward.reverse();

    assert_eq!(linearize(&nodes, &connections), forward);

    // Listing the far end first makes it the traversal start.
    let mut reordered = nodes.clone();
    reordered.rotate_right(1);
    assert_eq!(linearize(&reordered, &connections), backward);
}

#[test]
fn scrambled_chain_is_followed_by_links_not_list_order() {
    let nodes = sample_nodes(5);
    let connections = chained(&nodes, &[3, 0, 4, 1, 2]);

    let order = linearize(&nodes, &connections);
    let expected: Vec<&str> = [3, 0, 4, 1, 2].iter().map(|&i| nodes[i].id.as_str()).collect();
    let mut reversed = expected.clone();
    reversed.reverse();

    assert_eq!(order.len(), 5);
    assert!(order == expected || order == reversed, "unexpected order {order:?}");
}

#[test]
fn disconnected_canvas_is_reported_and_truncated() {
    let nodes = sample_nodes(3);
    let connections = chained(&nodes, &[0, 1]);

    assert!(!is_connected(&nodes, &connections));
    assert!(!is_single_connected_path(&nodes, &connections));
    assert!(linearize(&nodes, &connections).len() < nodes.len());

    let graph = CanvasGraph::from_parts(nodes, connections);
    assert_eq!(export_route(&graph), Err(ExportError::NotConnected));
}

#[test]
fn drawn_route_exports_addresses_in_order() {
    let mut graph = CanvasGraph::new();
    for node in sample_nodes(4) {
        graph.add_node(node).unwrap();
    }
    // Drawn out of order and against the arrow direction.
    graph.connect("n2", AttachmentSide::Bottom, "n3", AttachmentSide::Top).unwrap();
    graph.connect("n1", AttachmentSide::Bottom, "n0", AttachmentSide::Top).unwrap();
    graph.connect("n1", AttachmentSide::Top, "n2", AttachmentSide::Bottom).unwrap();

    let export = export_route(&graph).unwrap();
    assert_eq!(export.node_ids, vec!["n0", "n1", "n2", "n3"]);
    assert_eq!(export.addresses[0], "3600 S Las Vegas Blvd, Las Vegas, NV 89109");

    let url = export.directions_url(DEFAULT_MAPS_BASE_URL).unwrap();
    assert!(url.as_str().starts_with("https://www.google.com/maps/dir/3600%20S%20Las%20Vegas%20Blvd"));
    assert_eq!(url.path_segments().unwrap().count(), 2 + 4);
}

#[test]
fn exported_addresses_reimport_in_the_same_order() {
    let nodes = sample_nodes(5);
    let graph = CanvasGraph::from_parts(nodes.clone(), chained(&nodes, &[0, 1, 2, 3, 4]));
    let export = export_route(&graph).unwrap();

    let reimported: Vec<Node> = export
        .addresses
        .iter()
        .enumerate()
        .map(|(i, address)| Node::new(address.clone(), format!("Stop {i}"), address.clone()))
        .collect();
    let first = export.addresses.first().unwrap().clone();
    let last = export.addresses.last().unwrap().clone();

    let route = fallback_route(&RouteRequest::new(reimported, first, last));
    assert_eq!(route.ordered_node_ids, export.addresses);
}
