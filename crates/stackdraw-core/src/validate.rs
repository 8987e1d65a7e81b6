use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;

use crate::{
    infer_category, make_edge_id, Category, Graph, MarkerEnd, Position, TechEdge, TechNode,
    TechNodeData, DEFAULT_EDGE_TYPE, DEFAULT_NODE_TYPE,
};

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("graph must be a JSON object")]
    NotAnObject,

    #[error("graph is missing the `{0}` array")]
    MissingField(&'static str),

    #[error("graph field `{0}` must be an array")]
    NotAnArray(&'static str),

    #[error("node {index} is invalid: {reason}")]
    InvalidNode { index: usize, reason: &'static str },

    #[error("edge {index} is invalid: {reason}")]
    InvalidEdge { index: usize, reason: &'static str },

    #[error("edge `{edge}` references unknown node `{node}`")]
    DanglingEdge { edge: String, node: String },
}

/// How edges pointing at undeclared node ids are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeCheck {
    /// Leave them in place; derived views prune on their own.
    Keep,
    /// Drop them and log a warning.
    Prune,
    /// Fail the whole graph.
    Reject,
}

/// Structural check: an object with `nodes` and `edges` arrays.
pub fn check_shape(value: &Value) -> Result<(&[Value], &[Value]), SchemaError> {
    let obj = value.as_object().ok_or(SchemaError::NotAnObject)?;
    let nodes = array_field(obj, "nodes")?;
    let edges = array_field(obj, "edges")?;
    Ok((nodes, edges))
}

fn array_field<'a>(obj: &'a Map<String, Value>, key: &'static str) -> Result<&'a [Value], SchemaError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(SchemaError::MissingField(key)),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(SchemaError::NotAnArray(key)),
    }
}

/// Validate a JSON value and decode it into a [`Graph`].
///
/// Shape failures are always errors. Individual fields are decoded leniently:
/// numeric ids become strings, missing render tags take their defaults, an
/// empty label falls back to the id, and an unknown category is inferred
/// from the label.
pub fn parse_graph(value: &Value, check: EdgeCheck) -> Result<Graph, SchemaError> {
    let (raw_nodes, raw_edges) = check_shape(value)?;

    let nodes = raw_nodes
        .iter()
        .enumerate()
        .map(|(i, v)| decode_node(i, v))
        .collect::<Result<Vec<_>, _>>()?;
    let mut edges = raw_edges
        .iter()
        .enumerate()
        .map(|(i, v)| decode_edge(i, v))
        .collect::<Result<Vec<_>, _>>()?;

    if check != EdgeCheck::Keep {
        let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        let unknown = |e: &TechEdge| -> Option<String> {
            [&e.source, &e.target]
                .into_iter()
                .find(|id| !ids.contains(id.as_str()))
                .cloned()
        };

        if check == EdgeCheck::Reject {
            if let Some((edge, node)) = edges.iter().find_map(|e| unknown(e).map(|n| (e.id.clone(), n))) {
                return Err(SchemaError::DanglingEdge { edge, node });
            }
        } else {
            edges.retain(|e| match unknown(e) {
                Some(node) => {
                    tracing::warn!("dropping edge {} referencing unknown node {}", e.id, node);
                    false
                }
                None => true,
            });
        }
    }

    Ok(Graph { nodes, edges })
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn decode_node(index: usize, value: &Value) -> Result<TechNode, SchemaError> {
    let invalid = |reason| SchemaError::InvalidNode { index, reason };
    let obj = value.as_object().ok_or_else(|| invalid("not an object"))?;
    let id = obj
        .get("id")
        .and_then(id_string)
        .ok_or_else(|| invalid("missing id"))?;

    let node_type = obj
        .get("type")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_NODE_TYPE)
        .to_string();

    let position = obj
        .get("position")
        .map(|p| Position {
            x: p.get("x").and_then(Value::as_f64).unwrap_or(0.0),
            y: p.get("y").and_then(Value::as_f64).unwrap_or(0.0),
        })
        .unwrap_or_default();

    let data = obj.get("data").and_then(Value::as_object);
    let field = |key: &str| data.and_then(|d| d.get(key));

    let label = field("label")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| id.clone());

    let details = match field("details") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    let category = field("type")
        .and_then(Value::as_str)
        .and_then(Category::parse)
        .unwrap_or_else(|| infer_category(&label));

    Ok(TechNode {
        id,
        node_type,
        position,
        data: TechNodeData {
            label,
            category,
            details,
        },
    })
}

fn decode_edge(index: usize, value: &Value) -> Result<TechEdge, SchemaError> {
    let invalid = |reason| SchemaError::InvalidEdge { index, reason };
    let obj = value.as_object().ok_or_else(|| invalid("not an object"))?;
    let source = obj
        .get("source")
        .and_then(id_string)
        .ok_or_else(|| invalid("missing source"))?;
    let target = obj
        .get("target")
        .and_then(id_string)
        .ok_or_else(|| invalid("missing target"))?;
    let id = obj
        .get("id")
        .and_then(id_string)
        .unwrap_or_else(|| make_edge_id(&source, &target));

    let edge_type = obj
        .get("type")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_EDGE_TYPE)
        .to_string();
    let marker_end = obj
        .get("markerEnd")
        .and_then(|m| m.get("type"))
        .and_then(Value::as_str)
        .map(|t| MarkerEnd {
            marker_type: t.to_string(),
        })
        .unwrap_or_default();

    Ok(TechEdge {
        id,
        source,
        target,
        edge_type,
        marker_end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_non_objects() {
        assert_eq!(check_shape(&json!([1, 2])).unwrap_err(), SchemaError::NotAnObject);
        assert_eq!(check_shape(&json!("graph")).unwrap_err(), SchemaError::NotAnObject);
    }

    #[test]
    fn nodes_without_edges_is_rejected() {
        let err = check_shape(&json!({"nodes": []})).unwrap_err();
        assert_eq!(err, SchemaError::MissingField("edges"));
    }

    #[test]
    fn non_array_fields_are_rejected() {
        let err = check_shape(&json!({"nodes": {}, "edges": []})).unwrap_err();
        assert_eq!(err, SchemaError::NotAnArray("nodes"));
    }

    #[test]
    fn empty_arrays_are_structurally_valid() {
        let graph = parse_graph(&json!({"nodes": [], "edges": []}), EdgeCheck::Reject).unwrap();
        assert!(graph.is_empty());
    }

    #[test]
    fn decodes_lenient_fields() {
        let value = json!({
            "nodes": [
                {"id": 1, "data": {"label": "PostgreSQL"}},
                {"id": "api", "type": "techNode", "position": {"x": 10, "y": 20},
                 "data": {"label": "Gemini API", "type": "API", "details": {"model": "pro"}}},
                {"id": "n3", "data": {"label": "  ", "type": "mystery"}}
            ],
            "edges": [{"source": 1, "target": "api"}],
            "mocked": true
        });
        let graph = parse_graph(&value, EdgeCheck::Reject).unwrap();

        assert_eq!(graph.nodes[0].id, "1");
        assert_eq!(graph.nodes[0].node_type, "techNode");
        assert_eq!(graph.nodes[0].data.category, Category::Database);
        assert_eq!(graph.nodes[0].data.details, "");

        assert_eq!(graph.nodes[1].data.category, Category::Api);
        assert_eq!(graph.nodes[1].position, Position { x: 10.0, y: 20.0 });
        assert_eq!(graph.nodes[1].data.details, r#"{"model":"pro"}"#);

        assert_eq!(graph.nodes[2].data.label, "n3");
        assert_eq!(graph.nodes[2].data.category, Category::Custom);

        assert_eq!(graph.edges[0].id, "edge_1_api");
        assert_eq!(graph.edges[0].marker_end.marker_type, "arrowclosed");
    }

    #[test]
    fn node_without_id_is_invalid() {
        let err = parse_graph(&json!({"nodes": [{"data": {"label": "x"}}], "edges": []}), EdgeCheck::Keep)
            .unwrap_err();
        assert_eq!(err, SchemaError::InvalidNode { index: 0, reason: "missing id" });
    }

    #[test]
    fn edge_check_levels() {
        let value = json!({
            "nodes": [{"id": "a", "data": {"label": "A"}}, {"id": "b", "data": {"label": "B"}}],
            "edges": [
                {"id": "ok", "source": "a", "target": "b"},
                {"id": "bad", "source": "a", "target": "zzz"}
            ]
        });

        assert_eq!(parse_graph(&value, EdgeCheck::Keep).unwrap().edges.len(), 2);

        let pruned = parse_graph(&value, EdgeCheck::Prune).unwrap();
        assert_eq!(pruned.edges.len(), 1);
        assert_eq!(pruned.edges[0].id, "ok");

        assert_eq!(
            parse_graph(&value, EdgeCheck::Reject).unwrap_err(),
            SchemaError::DanglingEdge {
                edge: "bad".into(),
                node: "zzz".into()
            }
        );
    }

    #[test]
    fn duplicate_ids_are_kept() {
        let value = json!({
            "nodes": [{"id": "a", "data": {"label": "First"}}, {"id": "a", "data": {"label": "Second"}}],
            "edges": []
        });
        let graph = parse_graph(&value, EdgeCheck::Reject).unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.label_of("a"), Some("First"));
    }
}
