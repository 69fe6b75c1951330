use crate::graph::diagram::SchemaGraph;

/// Text format for rendering a schema graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Mermaid,
    Dot,
}

impl std::str::FromStr for GraphFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mermaid" => Ok(GraphFormat::Mermaid),
            "dot" | "graphviz" => Ok(GraphFormat::Dot),
            other => Err(format!("unknown graph format '{}' (expected mermaid or dot)", other)),
        }
    }
}

/// Render a schema graph as Mermaid or Graphviz DOT.
pub fn visualize(graph: &SchemaGraph, format: GraphFormat) -> String {
    match format {
        GraphFormat::Mermaid => generate_mermaid(graph),
        GraphFormat::Dot => generate_dot(graph),
    }
}

fn generate_mermaid(graph: &SchemaGraph) -> String {
    let mut output = String::from("graph TD\n");

    for node in &graph.nodes {
        output.push_str(&format!("    {}[{}]\n", mermaid_id(&node.id), node.name));
    }

    output.push('\n');

    for edge in &graph.edges {
        output.push_str(&format!(
            "    {} -->|{}| {}\n",
            mermaid_id(&edge.from),
            edge.from_column,
            mermaid_id(&edge.to)
        ));
    }

    output
}

fn generate_dot(graph: &SchemaGraph) -> String {
    let mut output = String::from("digraph schema {\n");
    output.push_str("    rankdir=TB;\n");
    output.push_str("    node [shape=box, style=rounded];\n\n");

    for node in &graph.nodes {
        output.push_str(&format!("    \"{}\";\n", dot_escape(&node.id)));
    }

    output.push('\n');

    for edge in &graph.edges {
        output.push_str(&format!(
            "    \"{}\" -> \"{}\" [label=\"{} -> {}\"];\n",
            dot_escape(&edge.from),
            dot_escape(&edge.to),
            dot_escape(&edge.from_column),
            dot_escape(&edge.to_column)
        ));
    }

    output.push_str("}\n");
    output
}

/// Mermaid node ids must be plain words.
fn mermaid_id(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn dot_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
