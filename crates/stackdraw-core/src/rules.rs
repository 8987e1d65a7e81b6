/// Constraints every generated or modified graph must follow. Spliced into both prompts.
pub const RULES: &str = "\
1. Include the logical components of the stack: frontend frameworks, backend frameworks, databases, \
important APIs or third-party services, and deployment targets.\n\
2. Give every node a categorical `data.type`: one of frontend, backend, database, api, deployment, custom. \
No other values are allowed.\n\
3. Position nodes logically with numeric `position.x` and `position.y` inside a 0-1000 canvas. \
Lay the flow out left to right or top to bottom so edges do not cross needlessly.\n\
4. Create edges between related components (frontend -> backend, backend -> database, backend -> api). \
The arrow points from the caller toward the dependency. `source` and `target` must be the exact string \
`id`s of nodes in the same graph.\n\
5. Use descriptive, unique STRING `id`s for nodes and edges (e.g. \"node_react\", \"edge_react_to_api\"). \
Never reuse an id.\n\
6. `data.details` holds key technical specifications for this project: versions, specific configuration, \
or sub-components. Avoid generic descriptions. Examples:\n\
   - API node (e.g. Gemini API): model name ('gemini-1.5-pro-latest'), the specific endpoint used.\n\
   - Database node (e.g. MongoDB): version ('7.0'), a collection name ('orders'), a key configuration ('sharded cluster').\n\
   - Backend node (e.g. Node.js): runtime version ('v20.x'), key framework ('Express 5').\n\
   - Frontend node (e.g. React): library version ('18.2'), build setup ('Vite build', 'Next.js App Router').\n\
   - Deployment node (e.g. AWS): service and tier ('EC2 t3.medium', 'S3 Standard bucket').\n\
   Keep details concise. When the description implies no specific version, use a typical or latest stable one.\n\
7. One node per real thing. Do not duplicate a component to show it twice.";
