pub mod category;
pub mod fallback;
pub mod rules;
pub mod validate;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

pub use category::{infer_category, Category};
pub use fallback::{mock_graph, tag_fallback, Tagged};
pub use validate::{parse_graph, EdgeCheck, SchemaError};

// --- Types (matching the React Flow payload the frontend renders) ---

pub const DEFAULT_NODE_TYPE: &str = "techNode";
pub const DEFAULT_EDGE_TYPE: &str = "default";
pub const DEFAULT_MARKER: &str = "arrowclosed";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, schemars::JsonSchema)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
pub struct TechNodeData {
    /// Display name, e.g. "React" or "PostgreSQL"
    pub label: String,
    #[serde(rename = "type", default = "default_category")]
    pub category: Category,
    /// Versions, configuration keys and other concrete specifics
    #[serde(default)]
    pub details: String,
}

/// A vertex of the diagram. Matches ReactFlow's Node structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
pub struct TechNode {
    pub id: String,
    #[serde(rename = "type", default = "default_node_type")]
    pub node_type: String,
    #[serde(default)]
    pub position: Position,
    pub data: TechNodeData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
pub struct MarkerEnd {
    #[serde(rename = "type")]
    pub marker_type: String,
}

impl Default for MarkerEnd {
    fn default() -> Self {
        Self {
            marker_type: DEFAULT_MARKER.to_string(),
        }
    }
}

/// A connector between two nodes. Matches ReactFlow's Edge structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TechEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type", default = "default_edge_type")]
    pub edge_type: String,
    #[serde(default)]
    pub marker_end: MarkerEnd,
}

/// The tech stack diagram exchanged with callers.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, schemars::JsonSchema)]
pub struct Graph {
    pub nodes: Vec<TechNode>,
    pub edges: Vec<TechEdge>,
}

fn default_node_type() -> String {
    DEFAULT_NODE_TYPE.to_string()
}

fn default_edge_type() -> String {
    DEFAULT_EDGE_TYPE.to_string()
}

fn default_category() -> Category {
    Category::Custom
}

impl TechNode {
    pub fn new(id: &str, label: &str, category: Category, details: &str, x: f64, y: f64) -> Self {
        Self {
            id: id.to_string(),
            node_type: default_node_type(),
            position: Position { x, y },
            data: TechNodeData {
                label: label.to_string(),
                category,
                details: details.to_string(),
            },
        }
    }
}

impl TechEdge {
    pub fn new(id: &str, source: &str, target: &str) -> Self {
        Self {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            edge_type: default_edge_type(),
            marker_end: MarkerEnd::default(),
        }
    }
}

impl Graph {
    /// True when there is nothing to modify: no nodes and no edges.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Look up a node by id. With duplicate ids the first occurrence wins.
    pub fn node(&self, id: &str) -> Option<&TechNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn label_of(&self, id: &str) -> Option<&str> {
        self.node(id).map(|n| n.data.label.as_str())
    }

    /// Edges whose source or target is not a declared node id.
    pub fn dangling_edges(&self) -> impl Iterator<Item = &TechEdge> {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.edges
            .iter()
            .filter(move |e| !ids.contains(e.source.as_str()) || !ids.contains(e.target.as_str()))
    }

    /// The graph without dangling edges. Borrows when nothing needs dropping.
    pub fn pruned(&self) -> Cow<'_, Graph> {
        if self.dangling_edges().next().is_none() {
            return Cow::Borrowed(self);
        }
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        Cow::Owned(Graph {
            nodes: self.nodes.clone(),
            edges: self
                .edges
                .iter()
                .filter(|e| ids.contains(e.source.as_str()) && ids.contains(e.target.as_str()))
                .cloned()
                .collect(),
        })
    }
}

/// Generate an edge ID from source and target node IDs.
pub fn make_edge_id(source: &str, target: &str) -> String {
    format!("edge_{}_{}", source, target)
}

// --- AI Settings ---

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    pub provider: String,
    pub api_key: String,
    pub model: String,
}

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Resolve the global config directory (~/.stackdraw/).
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".stackdraw")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Read settings from ~/.stackdraw/settings.json. Missing or unreadable files yield defaults.
pub fn read_settings() -> AiSettings {
    let path = settings_path();
    if !path.exists() {
        return AiSettings::default();
    }
    match fs::read_to_string(&path).map(|s| serde_json::from_str(&s)) {
        Ok(Ok(settings)) => settings,
        Ok(Err(e)) => {
            tracing::warn!("ignoring malformed {}: {}", path.display(), e);
            AiSettings::default()
        }
        Err(e) => {
            tracing::warn!("could not read {}: {}", path.display(), e);
            AiSettings::default()
        }
    }
}

/// Layer environment variables over `base`.
///
/// `STACKDRAW_PROVIDER`, `STACKDRAW_MODEL` and `STACKDRAW_API_KEY` override their
/// fields. A bare `GEMINI_API_KEY` is honoured when no key is set otherwise and
/// selects the Google backend if no provider was chosen.
pub fn apply_env<F>(mut base: AiSettings, var: F) -> AiSettings
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| var(name).filter(|v| !v.trim().is_empty());

    if let Some(provider) = non_empty("STACKDRAW_PROVIDER") {
        base.provider = provider;
    }
    if let Some(model) = non_empty("STACKDRAW_MODEL") {
        base.model = model;
    }
    if let Some(key) = non_empty("STACKDRAW_API_KEY") {
        base.api_key = key;
    }

    if base.api_key.is_empty() {
        if let Some(key) = non_empty("GEMINI_API_KEY") {
            base.api_key = key;
            if base.provider.is_empty() {
                base.provider = "google".to_string();
            }
        }
    }
    if base.provider == "google" && base.model.is_empty() {
        base.model = DEFAULT_GEMINI_MODEL.to_string();
    }
    base
}

/// Settings file overlaid with the process environment.
pub fn load_settings() -> AiSettings {
    apply_env(read_settings(), |name| std::env::var(name).ok())
}

pub fn ai_configured(settings: &AiSettings) -> bool {
    !settings.provider.is_empty()
        && !settings.model.is_empty()
        && (settings.provider == "ollama" || !settings.api_key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn gemini_key_selects_google_backend() {
        let settings = apply_env(AiSettings::default(), env(&[("GEMINI_API_KEY", "k")]));
        assert_eq!(settings.provider, "google");
        assert_eq!(settings.model, DEFAULT_GEMINI_MODEL);
        assert!(ai_configured(&settings));
    }

    #[test]
    fn explicit_env_overrides_file_settings() {
        let base = AiSettings {
            provider: "openai".into(),
            api_key: "file-key".into(),
            model: "gpt-4o".into(),
        };
        let settings = apply_env(
            base,
            env(&[("STACKDRAW_MODEL", "gpt-4.1"), ("GEMINI_API_KEY", "ignored")]),
        );
        assert_eq!(settings.provider, "openai");
        assert_eq!(settings.model, "gpt-4.1");
        assert_eq!(settings.api_key, "file-key");
    }

    #[test]
    fn missing_key_is_not_configured() {
        let settings = apply_env(AiSettings::default(), env(&[("STACKDRAW_PROVIDER", "openai")]));
        assert!(!ai_configured(&settings));

        let ollama = AiSettings {
            provider: "ollama".into(),
            api_key: String::new(),
            model: "llama3".into(),
        };
        assert!(ai_configured(&ollama));
    }

    #[test]
    fn pruned_drops_only_dangling_edges() {
        let graph = Graph {
            nodes: vec![
                TechNode::new("a", "React", Category::Frontend, "18.x", 0.0, 0.0),
                TechNode::new("b", "API", Category::Backend, "REST", 0.0, 200.0),
            ],
            edges: vec![TechEdge::new("e1", "a", "b"), TechEdge::new("e2", "a", "ghost")],
        };
        assert_eq!(graph.dangling_edges().count(), 1);

        let pruned = graph.pruned();
        assert!(matches!(pruned, Cow::Owned(_)));
        assert_eq!(pruned.edges.len(), 1);
        assert_eq!(pruned.edges[0].id, "e1");
        // the input is untouched
        assert_eq!(graph.edges.len(), 2);
    }

    #[test]
    fn pruned_borrows_clean_graph() {
        let graph = mock_graph();
        assert!(matches!(graph.pruned(), Cow::Borrowed(_)));
    }

    #[test]
    fn serializes_react_flow_shape() {
        let node = TechNode::new("n1", "React", Category::Frontend, "18.2", 100.0, 50.0);
        let val = serde_json::to_value(&node).unwrap();
        assert_eq!(val["type"], "techNode");
        assert_eq!(val["data"]["type"], "frontend");
        assert_eq!(val["position"]["x"], 100.0);

        let edge = TechEdge::new("e1", "n1", "n2");
        let val = serde_json::to_value(&edge).unwrap();
        assert_eq!(val["type"], "default");
        assert_eq!(val["markerEnd"]["type"], "arrowclosed");
    }
}
