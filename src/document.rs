//! Canvas payload inside an otherwise opaque trip document.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::DocumentError;
use crate::model::CanvasGraph;

/// Key the web client stores the canvas under.
pub const DEFAULT_CANVAS_KEY: &str = "canvas";

/// Reads `{ boxes, connections }` from `document[key]`.
///
/// A missing or `null` entry is an empty canvas.
pub fn read_canvas(document: &Value, key: &str) -> Result<CanvasGraph, DocumentError> {
    let object = document.as_object().ok_or(DocumentError::NotAnObject)?;
    match object.get(key) {
        None | Some(Value::Null) => Ok(CanvasGraph::new()),
        Some(canvas) => Ok(CanvasGraph::deserialize(canvas)?),
    }
}

/// Stores `graph` under `document[key]`, leaving every other key untouched.
pub fn write_canvas(document: &mut Value, key: &str, graph: &CanvasGraph) -> Result<(), DocumentError> {
    if document.is_null() {
        *document = Value::Object(Map::new());
    }
    let object = document.as_object_mut().ok_or(DocumentError::NotAnObject)?;
    object.insert(key.to_string(), serde_json::to_value(graph)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttachmentSide, LegDuration, Node};
    use serde_json::json;

    #[test]
    fn test_read_web_client_payload() {
        let document = json!({
            "title": "Vegas weekend",
            "canvas": {
                "boxes": [
                    {"id": "a", "positionX": 10.0, "positionY": 20.0, "title": "Hotel",
                     "freeTextDescription": "check in", "address": "3600 S Las Vegas Blvd"},
                    {"id": "b", "title": "Dam"}
                ],
                "connections": [
                    {"fromNodeId": "a", "fromAttachmentSide": "bottom",
                     "toNodeId": "b", "toAttachmentSide": "top", "durationLabel": "Calculating..."}
                ]
            }
        });

        let graph = read_canvas(&document, DEFAULT_CANVAS_KEY).unwrap();
        assert_eq!(graph.nodes().len(), 2);
        assert_eq!(graph.node("a").unwrap().position_y, 20.0);
        assert_eq!(graph.node("a").unwrap().description, "check in");
        assert_eq!(graph.node("b").unwrap().address, "");
        assert_eq!(graph.connections()[0].to_side, AttachmentSide::Top);
        assert_eq!(graph.connections()[0].duration, Some(LegDuration::Pending));
    }

    #[test]
    fn test_descriptions_survive_round_trip() {
        let mut document = json!({
            "canvas": {
                "boxes": [{"id": "a", "title": "Hotel", "freeTextDescription": "keep me"}],
                "connections": []
            }
        });

        let graph = read_canvas(&document, DEFAULT_CANVAS_KEY).unwrap();
        write_canvas(&mut document, DEFAULT_CANVAS_KEY, &graph).unwrap();

        let boxes = &document["canvas"]["boxes"];
        assert_eq!(boxes[0]["freeTextDescription"], "keep me");
        assert!(boxes[0].get("description").is_none());
    }

    #[test]
    fn test_legacy_description_key_is_read() {
        let document = json!({"canvas": {"boxes": [{"id": "a", "description": "old"}]}});
        let graph = read_canvas(&document, DEFAULT_CANVAS_KEY).unwrap();
        assert_eq!(graph.node("a").unwrap().description, "old");
    }

    #[test]
    fn test_missing_canvas_is_empty() {
        let graph = read_canvas(&json!({"title": "new trip"}), DEFAULT_CANVAS_KEY).unwrap();
        assert!(graph.nodes().is_empty());
        let graph = read_canvas(&json!({"canvas": null}), DEFAULT_CANVAS_KEY).unwrap();
        assert!(graph.connections().is_empty());
    }

    #[test]
    fn test_non_object_document() {
        assert!(matches!(
            read_canvas(&json!([1, 2]), DEFAULT_CANVAS_KEY),
            Err(DocumentError::NotAnObject)
        ));
        assert!(matches!(
            read_canvas(&json!({"canvas": {"boxes": 3}}), DEFAULT_CANVAS_KEY),
            Err(DocumentError::Canvas(_))
        ));
    }

    #[test]
    fn test_write_preserves_other_keys() {
        let mut document = json!({"title": "Vegas weekend", "members": ["x"], "canvas": {"old": true}});
        let mut graph = CanvasGraph::new();
        graph.add_node(Node::new("a", "Hotel", "")).unwrap();

        write_canvas(&mut document, "canvas", &graph).unwrap();

        assert_eq!(document["title"], "Vegas weekend");
        assert_eq!(document["members"][0], "x");
        assert_eq!(document["canvas"]["boxes"][0]["id"], "a");
        assert!(document["canvas"]["connections"].as_array().unwrap().is_empty());
        assert_eq!(read_canvas(&document, "canvas").unwrap(), graph);
    }

    #[test]
    fn test_write_into_null_document() {
        let mut document = Value::Null;
        write_canvas(&mut document, "plan", &CanvasGraph::new()).unwrap();
        assert!(document["plan"].is_object());
    }
}
