use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use crate::graph::diagram::SchemaGraph;

/// Directed graph of table references.
/// Edges point from the referencing table to the referenced one (child → parent).
pub struct RelationGraph {
    pub graph: DiGraph<String, EdgeInfo>,
    pub node_indices: HashMap<String, NodeIndex>,
}

/// One foreign-key column pair.
#[derive(Debug, Clone)]
pub struct EdgeInfo {
    pub constraint_name: String,
    pub source_column: String,
    pub target_column: String,
}

impl RelationGraph {
    /// Build from a schema graph. Edges whose target is not a node are skipped.
    pub fn from_schema_graph(schema: &SchemaGraph) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for node in &schema.nodes {
            let idx = graph.add_node(node.id.clone());
            node_indices.insert(node.id.clone(), idx);
        }

        for edge in &schema.edges {
            if let (Some(&from_idx), Some(&to_idx)) =
                (node_indices.get(&edge.from), node_indices.get(&edge.to))
            {
                graph.add_edge(
                    from_idx,
                    to_idx,
                    EdgeInfo {
                        constraint_name: edge.label.clone(),
                        source_column: edge.from_column.clone(),
                        target_column: edge.to_column.clone(),
                    },
                );
            }
        }

        Self {
            graph,
            node_indices,
        }
    }

    /// Get the table name for a node index.
    pub fn table_name(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    /// Tables `table` references directly, self excluded.
    pub fn parents(&self, table: &str) -> Vec<&str> {
        let Some(&idx) = self.node_indices.get(table) else {
            return Vec::new();
        };
        let mut parents: Vec<&str> = self
            .graph
            .neighbors(idx)
            .filter(|&n| n != idx)
            .map(|n| self.table_name(n))
            .collect();
        parents.sort_unstable();
        parents.dedup();
        parents
    }

    pub fn table_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::diagram::{SchemaEdge, SchemaNode};

    fn node(id: &str) -> SchemaNode {
        SchemaNode {
            id: id.to_string(),
            name: id.to_string(),
            columns: Vec::new(),
        }
    }

    fn edge(from: &str, to: &str, column: &str) -> SchemaEdge {
        SchemaEdge {
            from: from.to_string(),
            to: to.to_string(),
            from_column: column.to_string(),
            to_column: "id".to_string(),
            label: format!("fk_{}_{}", from, column),
        }
    }

    #[test]
    fn test_build_graph() {
        let schema = SchemaGraph {
            nodes: vec![node("users"), node("posts"), node("comments")],
            edges: vec![
                edge("posts", "users", "user_id"),
                edge("comments", "posts", "post_id"),
                edge("comments", "users", "user_id"),
                edge("comments", "ghost", "ghost_id"),
            ],
        };
        let graph = RelationGraph::from_schema_graph(&schema);
        assert_eq!(graph.table_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.parents("comments"), vec!["posts", "users"]);
        assert!(graph.parents("users").is_empty());
        assert!(graph.parents("missing").is_empty());
    }
}
