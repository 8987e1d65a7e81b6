use stackdraw_core::{Category, Graph};

const NO_COMPONENTS: &str = "- No specific components defined.";
const NO_RELATIONSHIPS: &str = "- No specific relationships defined.";
const NO_REQUIREMENTS: &str = "- No specific user requirements provided.";

/// A directory the scaffold should contain and the components that live there.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEntry {
    pub path: String,
    pub components: Vec<String>,
}

/// Lowercase ASCII slug for directory names ("Stripe API" -> "stripe-api").
pub fn slug(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for ch in label.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("component");
    }
    out
}

/// Top-level directories implied by the graph, in first-seen order.
pub fn suggested_layout(graph: &Graph) -> Vec<LayoutEntry> {
    let mut entries: Vec<LayoutEntry> = Vec::new();
    for node in &graph.nodes {
        let label = &node.data.label;
        let path = match node.data.category {
            Category::Frontend => "frontend/".to_string(),
            Category::Backend => "backend/".to_string(),
            Category::Database => "database/".to_string(),
            Category::Api => format!("services/{}/", slug(label)),
            Category::Deployment => "deploy/".to_string(),
            Category::Custom => format!("packages/{}/", slug(label)),
        };
        match entries.iter_mut().find(|e| e.path == path) {
            Some(entry) => entry.components.push(label.clone()),
            None => entries.push(LayoutEntry {
                path,
                components: vec![label.clone()],
            }),
        }
    }
    entries
}

fn render_layout(layout: &[LayoutEntry]) -> String {
    let mut out = String::from("```text\n");
    for entry in layout {
        out.push_str(&format!("{:<28}# {}\n", entry.path, entry.components.join(", ")));
    }
    out.push_str("README.md\n.gitignore\n```");
    out
}

/// Turn free-form context into a bullet list, one bullet per non-blank line.
fn format_context(user_context: Option<&str>) -> String {
    let lines: Vec<String> = user_context
        .unwrap_or_default()
        .lines()
        .map(|line| {
            let line = line.trim();
            line.strip_prefix("- ")
                .or_else(|| line.strip_prefix("* "))
                .unwrap_or(line)
                .trim()
        })
        .filter(|line| !line.is_empty())
        .map(|line| format!("- {line}"))
        .collect();

    if lines.is_empty() {
        NO_REQUIREMENTS.to_string()
    } else {
        lines.join("\n")
    }
}

/// Markdown instructions for a builder agent. Pure templating, no model call.
///
/// Edges whose endpoints are not declared nodes are left out. With duplicate
/// node ids, edge lines use the label of the first node carrying that id.
pub fn agent_prompt(graph: &Graph, user_context: Option<&str>) -> String {
    let graph = graph.pruned();

    let stack_list = if graph.nodes.is_empty() {
        NO_COMPONENTS.to_string()
    } else {
        graph
            .nodes
            .iter()
            .map(|n| format!("- {}: {}", n.data.label, n.data.details))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let edge_list = if graph.edges.is_empty() {
        NO_RELATIONSHIPS.to_string()
    } else {
        graph
            .edges
            .iter()
            .filter_map(|e| {
                let source = graph.label_of(&e.source)?;
                let target = graph.label_of(&e.target)?;
                Some(format!("- {source} ➡️ {target}"))
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let file_structure = render_layout(&suggested_layout(&graph));
    let requirements = format_context(user_context);

    format!(
        "# 🛠 Tech Stack Builder Instructions

You are a powerful, agentic AI developer working inside an IDE environment capable of file system operations and code generation.

You are tasked with setting up a complete project based on the following tech stack, architecture, file structure guidelines, and user goals. Your output should be primarily the necessary code and file structure modifications.

## 📦 Project Tech Stack

The core components for this project are:
{stack_list}

## 🔗 Architecture Overview

The components should interact as follows:
{edge_list}

## 🛠 File Structure Overview

Generate a project structure that logically organizes the components listed above. Follow common conventions for the specified technologies. A suggested starting point is:
{file_structure}

Refine this structure based on the specific components and their relationships.

## 🧠 User Requirements and Goals

The primary goals and features requested by the user are:
{requirements}

## 🎯 Mission for AI

Execute the following steps to build the project:

1.  **Create Project Structure:** Establish the main directories and subdirectories based on the tech stack and best practices (referencing the File Structure Overview).
2.  **Generate Starter Files:** Create essential configuration files (`package.json`, `requirements.txt`, `.env.example`, `Dockerfile`, etc.) and basic entry point files (`app.py`, `main.js`, `index.html`, etc.) for each service/component.
3.  **Implement Boilerplate Code:** Add initial, functional code for basic setup (e.g., server initialization, database connection setup, simple API endpoint, basic frontend component).
4.  **Establish Connections:** Implement basic communication patterns based on the Architecture Overview (e.g., a sample API call from the frontend to the backend, backend query to the database).
5.  **Add Documentation:** Generate a `README.md` file outlining the project structure, setup instructions (dependencies, environment variables), and how to run each component. Include a `.gitignore` file.

**Critical Instructions:**
- Prioritize generating runnable, clean, and modular code.
- Assume the target environment has necessary tools (Node.js, Python, Docker, etc.) installed.
- Use the details provided in the \"Project Tech Stack\" section (e.g., specific versions, libraries) when generating configurations and code.
- If specific details are missing, make reasonable assumptions based on modern best practices for the given technologies.
- Minimize explanatory text in your response; focus on the code and file structure output. Output explanations only if critical for understanding a complex decision.
- Ensure authentication/authorization flows are considered if mentioned in the requirements."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackdraw_core::{TechEdge, TechNode};

    fn sample() -> Graph {
        Graph {
            nodes: vec![
                TechNode::new("a", "React", Category::Frontend, "18.x", 0.0, 0.0),
                TechNode::new("b", "API", Category::Backend, "REST", 0.0, 200.0),
            ],
            edges: vec![TechEdge::new("e1", "a", "b")],
        }
    }

    #[test]
    fn lists_nodes_edges_and_context() {
        let md = agent_prompt(&sample(), Some("needs login"));
        let lines: Vec<&str> = md.lines().collect();
        assert!(lines.contains(&"- React: 18.x"));
        assert!(lines.contains(&"- API: REST"));
        assert!(lines.contains(&"- React ➡️ API"));
        assert!(lines.contains(&"- needs login"));
    }

    #[test]
    fn is_byte_stable() {
        let graph = sample();
        assert_eq!(
            agent_prompt(&graph, Some("a\nb")),
            agent_prompt(&graph, Some("a\nb"))
        );
    }

    #[test]
    fn omits_dangling_edges() {
        let mut graph = sample();
        graph.edges.push(TechEdge::new("e2", "a", "ghost"));
        let md = agent_prompt(&graph, None);
        assert!(md.contains("- React ➡️ API"));
        assert!(!md.contains("ghost"));
    }

    #[test]
    fn empty_graph_uses_placeholders() {
        let md = agent_prompt(&Graph::default(), None);
        assert!(md.contains(NO_COMPONENTS));
        assert!(md.contains(NO_RELATIONSHIPS));
        assert!(md.contains(NO_REQUIREMENTS));
    }

    #[test]
    fn multi_line_context_becomes_bullets() {
        let ctx = "\n  Implement login via Auth0.\n- Admin dashboard\n* /users endpoint\n\n";
        assert_eq!(
            format_context(Some(ctx)),
            "- Implement login via Auth0.\n- Admin dashboard\n- /users endpoint"
        );
        assert_eq!(format_context(Some("   ")), NO_REQUIREMENTS);
    }

    #[test]
    fn empty_details_render_as_is() {
        let graph = Graph {
            nodes: vec![TechNode::new("r", "Redis", Category::Database, "", 0.0, 0.0)],
            edges: vec![],
        };
        let md = agent_prompt(&graph, None);
        assert!(md.lines().any(|l| l == "- Redis: "));
        assert!(!md.contains("No details provided"));
    }

    #[test]
    fn layout_groups_by_category() {
        let graph = Graph {
            nodes: vec![
                TechNode::new("1", "React", Category::Frontend, "", 0.0, 0.0),
                TechNode::new("2", "Tailwind", Category::Frontend, "", 0.0, 0.0),
                TechNode::new("3", "Stripe API", Category::Api, "", 0.0, 0.0),
                TechNode::new("4", "ML Pipeline!", Category::Custom, "", 0.0, 0.0),
            ],
            edges: vec![],
        };
        let layout = suggested_layout(&graph);
        let paths: Vec<&str> = layout.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["frontend/", "services/stripe-api/", "packages/ml-pipeline/"]);
        assert_eq!(layout[0].components, ["React", "Tailwind"]);
    }

    #[test]
    fn slug_handles_symbols() {
        assert_eq!(slug("Next.js  App"), "next-js-app");
        assert_eq!(slug("¿¿"), "component");
    }
}
