//! # Schema Graph
//!
//! Turns catalog metadata into a node/edge description of the schema: one
//! node per table with its columns, one edge per foreign-key column pair.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::provider::MetadataProvider;
use crate::schema::types::TableMetadata;

/// Node/edge graph of all tables and their foreign keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaGraph {
    pub nodes: Vec<SchemaNode>,
    pub edges: Vec<SchemaEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaNode {
    /// Table name; tables are unique per catalog.
    pub id: String,
    pub name: String,
    pub columns: Vec<SchemaColumn>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
}

/// A foreign key from `from.from_column` to `to.to_column`, labeled with
/// the constraint name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaEdge {
    pub from: String,
    pub to: String,
    pub from_column: String,
    pub to_column: String,
    pub label: String,
}

impl SchemaGraph {
    /// Graph over already-fetched tables, in the given order.
    pub fn from_tables(tables: &[TableMetadata]) -> Self {
        let mut graph = SchemaGraph::default();
        for table in tables {
            graph.push_table(table);
        }
        graph
    }

    fn push_table(&mut self, table: &TableMetadata) {
        let columns = table
            .columns
            .iter()
            .map(|c| SchemaColumn {
                name: c.name.clone(),
                data_type: c.data_type.to_string(),
                is_primary_key: c.is_primary_key(),
                is_foreign_key: table.outgoing_for(&c.name).is_some(),
            })
            .collect();

        self.nodes.push(SchemaNode {
            id: table.name.clone(),
            name: table.name.clone(),
            columns,
        });

        for edge in &table.outgoing {
            self.edges.push(SchemaEdge {
                from: table.name.clone(),
                to: edge.target_table.clone(),
                from_column: edge.source_column.clone(),
                to_column: edge.target_column.clone(),
                label: edge.constraint_name.clone(),
            });
        }
    }

    pub fn node(&self, id: &str) -> Option<&SchemaNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Build the schema graph of every table the catalog lists, in listing order.
///
/// Read-only; edges pointing at tables the catalog does not list are kept
/// as reported.
pub async fn build_schema_graph<P: MetadataProvider>(provider: &P) -> Result<SchemaGraph> {
    let mut tables = Vec::new();
    for name in provider.list_tables().await? {
        tables.push(provider.table_metadata(&name).await?);
    }
    tracing::debug!("Building schema graph over {} tables", tables.len());
    Ok(SchemaGraph::from_tables(&tables))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::*;

    fn blog_tables() -> Vec<TableMetadata> {
        let mut user_id = ColumnDescriptor::new("id", DataType::Integer);
        user_id.key = KeyRole::Primary;
        let users = TableMetadata::new(
            "users".to_string(),
            vec![user_id.clone(), ColumnDescriptor::new("email", DataType::VarChar)],
            TableRelations::default(),
        );

        let mut author = ColumnDescriptor::new("user_id", DataType::Integer);
        author.key = KeyRole::Foreign;
        let posts = TableMetadata::new(
            "posts".to_string(),
            vec![user_id, author],
            TableRelations {
                outgoing: vec![ForeignKeyEdge {
                    source_table: "posts".to_string(),
                    source_column: "user_id".to_string(),
                    target_table: "users".to_string(),
                    target_column: "id".to_string(),
                    constraint_name: "posts_user_fk".to_string(),
                }],
                incoming: Vec::new(),
            },
        );
        vec![users, posts]
    }

    #[test]
    fn test_nodes_and_edges() {
        let graph = SchemaGraph::from_tables(&blog_tables());
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[0].id, "users");
        assert_eq!(graph.nodes[1].id, "posts");

        let posts = graph.node("posts").unwrap();
        assert!(posts.columns[0].is_primary_key);
        assert!(!posts.columns[0].is_foreign_key);
        assert!(posts.columns[1].is_foreign_key);

        assert_eq!(graph.edges.len(), 1);
        let edge = &graph.edges[0];
        assert_eq!(edge.from, "posts");
        assert_eq!(edge.to, "users");
        assert_eq!(edge.label, "posts_user_fk");
    }

    #[test]
    fn test_json_field_names() {
        let graph = SchemaGraph::from_tables(&blog_tables());
        let json = serde_json::to_value(&graph).unwrap();
        let column = &json["nodes"][1]["columns"][1];
        assert_eq!(column["type"], "int");
        assert_eq!(column["isForeignKey"], true);
        assert_eq!(column["isPrimaryKey"], false);
        let edge = &json["edges"][0];
        assert_eq!(edge["fromColumn"], "user_id");
        assert_eq!(edge["toColumn"], "id");
    }

    #[test]
    fn test_empty_catalog() {
        let graph = SchemaGraph::from_tables(&[]);
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
    }
}
