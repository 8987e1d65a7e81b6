use crate::{Category, Graph, TechEdge, TechNode};

pub const MOCK_FRONTEND_ID: &str = "mock_node_react";
pub const MOCK_BACKEND_ID: &str = "mock_node_flask";
pub const MOCK_DATABASE_ID: &str = "mock_node_postgres";

/// The fixed safe default: React → Flask → PostgreSQL.
pub fn mock_graph() -> Graph {
    Graph {
        nodes: vec![
            TechNode::new(MOCK_FRONTEND_ID, "React", Category::Frontend, "", 100.0, 100.0),
            TechNode::new(MOCK_BACKEND_ID, "Flask", Category::Backend, "PORT=5001", 100.0, 300.0),
            TechNode::new(
                MOCK_DATABASE_ID,
                "PostgreSQL",
                Category::Database,
                "DB_URL=...",
                400.0,
                300.0,
            ),
        ],
        edges: vec![
            TechEdge::new("mock_edge_react_flask", MOCK_FRONTEND_ID, MOCK_BACKEND_ID),
            TechEdge::new("mock_edge_flask_postgres", MOCK_BACKEND_ID, MOCK_DATABASE_ID),
        ],
    }
}

/// A graph plus the internal marker saying whether it is synthetic.
///
/// The marker never reaches the wire: callers get the graph through
/// [`Tagged::strip_marker`], and `Graph` has no field to carry it.
#[derive(Debug, Clone, PartialEq)]
pub struct Tagged {
    graph: Graph,
    mocked: bool,
}

impl Tagged {
    pub fn real(graph: Graph) -> Self {
        Self {
            graph,
            mocked: false,
        }
    }

    pub fn is_mocked(&self) -> bool {
        self.mocked
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn strip_marker(self) -> Graph {
        self.graph
    }
}

pub fn tag_fallback(graph: Graph) -> Tagged {
    Tagged {
        graph,
        mocked: true,
    }
}

/// The mock graph, tagged as synthetic.
pub fn fallback() -> Tagged {
    tag_fallback(mock_graph())
}
