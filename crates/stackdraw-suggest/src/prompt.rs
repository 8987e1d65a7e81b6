use stackdraw_core::{rules::RULES, Graph};

use crate::script::SHEBANG;

const NO_CONTEXT: &str = "No specific user requirements provided.";

const SCHEMA_EXAMPLE: &str = r#"{
  "nodes": [
    {
      "id": "node_react",
      "type": "techNode",
      "position": { "x": 100, "y": 200 },
      "data": {
        "label": "React",
        "type": "frontend|backend|database|api|deployment|custom",
        "details": "18.2, Vite build, React Router 6"
      }
    }
  ],
  "edges": [
    {
      "id": "edge_react_to_api",
      "source": "node_react",
      "target": "node_api",
      "type": "default",
      "markerEnd": { "type": "arrowclosed" }
    }
  ]
}"#;

/// Pretty JSON of a graph for embedding in prompts.
pub fn graph_json(graph: &Graph) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(graph)
}

pub fn generate_prompt(description: &str) -> String {
    format!(
        "You are a senior software architect designing a tech stack diagram for a web application.\n\
Based on the project description below, generate a tech stack graph.\n\n\
Project description: {description}\n\n\
Return ONLY a valid JSON object with this exact structure (React Flow format):\n\
{SCHEMA_EXAMPLE}\n\n\
## Rules\n{RULES}\n\n\
Output ONLY the JSON object, with no surrounding text or explanation. \
Check that it is valid JSON before returning it."
    )
}

/// Modify-or-replace. Whether the instruction is an edit or a redesign is left to the model.
pub fn modify_prompt(graph: &Graph, instruction: &str) -> Result<String, serde_json::Error> {
    let current = graph_json(graph)?;
    Ok(format!(
        "You are a senior software architect maintaining a tech stack diagram.\n\n\
Current diagram (React Flow JSON):\n\
```json\n{current}\n```\n\n\
User instruction: {instruction}\n\n\
Decide which of these applies:\n\
- The instruction is an incremental change (add, remove, swap or relabel components or \
connections). Apply it as a minimal edit: keep every unaffected node and edge exactly as it \
is, including its id, position and details. New nodes and edges get new unique ids.\n\
- The instruction describes a different or unrelated project. Discard the current diagram \
and design a fresh one for the new description.\n\n\
Either way, return the COMPLETE resulting diagram with this exact structure:\n\
{SCHEMA_EXAMPLE}\n\n\
## Rules\n{RULES}\n\n\
Output ONLY the JSON object, with no surrounding text or explanation."
    ))
}

pub fn explain_prompt(graph: &Graph, original_prompt: &str) -> Result<String, serde_json::Error> {
    let diagram = graph_json(graph)?;
    Ok(format!(
        "You are a helpful AI assistant explaining a generated tech stack diagram.\n\
The diagram was generated from this user request:\n\
\"\"\"{original_prompt}\"\"\"\n\n\
Here is the diagram (React Flow JSON):\n\
```json\n{diagram}\n```\n\n\
Explain the choices made for the components in this tech stack in the context of the \
original request. Describe why each component (node) might have been chosen and how the \
connections (edges) fulfil the user's goal. Focus on the relationships and the overall \
architecture. Keep it concise and easy to understand.\n\
Do not output JSON, only the textual explanation."
    ))
}

pub fn repo_script_prompt(
    graph: &Graph,
    user_context: Option<&str>,
    layout: &[String],
) -> Result<String, serde_json::Error> {
    let diagram = graph_json(graph)?;
    let context = user_context
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(NO_CONTEXT);
    let layout_hint = if layout.is_empty() {
        "(none)".to_string()
    } else {
        layout
            .iter()
            .map(|p| format!("- {p}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    Ok(format!(
        "You are an expert system administrator and software developer writing a Bash script.\n\
The script scaffolds a basic project structure on the user's machine from a tech stack \
diagram and the user's requirements.\n\n\
Input tech stack (React Flow JSON):\n\
```json\n{diagram}\n```\n\n\
User requirements:\n\"{context}\"\n\n\
Suggested top-level layout derived from the diagram:\n{layout_hint}\n\n\
Generate ONLY a valid Bash script that:\n\
1. Starts with `{SHEBANG}` followed by `set -e`.\n\
2. Creates the directory structure for the components in the diagram (e.g. `frontend/`, \
`backend/`, `frontend/src/`, `services/<name>/`), using names derived from node labels and types.\n\
3. Creates every directory with `mkdir -p` before creating any file inside it.\n\
4. Creates essential placeholder files with `touch` (e.g. `frontend/package.json`, \
`backend/app.py`, `README.md`, `.gitignore`, `.env.example`) chosen from node labels and types.\n\
5. Single-quotes EVERY file and directory path (e.g. `mkdir -p 'backend service'`, \
`touch 'backend service/main.py'`). This is critical.\n\
6. Writes common entries to `.gitignore` (node_modules/, venv/, .env*, !.env.example, __pycache__/) \
and a basic `README.md` containing the user requirements, using `cat << 'EOF'` heredocs.\n\
7. Ends with `echo 'Project structure created successfully!'`.\n\n\
Return ONLY the raw script, starting precisely with `{SHEBANG}` and ending with the final echo. \
No explanations and no markdown code fences."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackdraw_core::mock_graph;

    #[test]
    fn generate_prompt_embeds_description_and_rules() {
        let p = generate_prompt("a simple blog with comments");
        assert!(p.contains("Project description: a simple blog with comments"));
        assert!(p.contains("frontend|backend|database|api|deployment|custom"));
        assert!(p.contains("0-1000"));
        assert!(p.contains("data.details"));
    }

    #[test]
    fn modify_prompt_embeds_current_graph() {
        let p = modify_prompt(&mock_graph(), "swap Flask for FastAPI").unwrap();
        assert!(p.contains("\"id\": \"mock_node_flask\""));
        assert!(p.contains("User instruction: swap Flask for FastAPI"));
        assert!(p.contains("Discard the current diagram"));
    }

    #[test]
    fn explain_prompt_asks_for_prose() {
        let p = explain_prompt(&mock_graph(), "todo app").unwrap();
        assert!(p.contains("\"\"\"todo app\"\"\""));
        assert!(p.contains("Do not output JSON"));
    }

    #[test]
    fn repo_script_prompt_defaults_context() {
        let p = repo_script_prompt(&mock_graph(), None, &["frontend/".to_string()]).unwrap();
        assert!(p.contains(NO_CONTEXT));
        assert!(p.contains("- frontend/"));
        assert!(p.contains("#!/bin/bash"));
        assert!(p.contains("mkdir -p"));
    }
}
