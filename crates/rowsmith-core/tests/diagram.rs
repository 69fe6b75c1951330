use rowsmith_core::graph::cycle::find_cycles;
use rowsmith_core::graph::dag::RelationGraph;
use rowsmith_core::graph::diagram::build_schema_graph;
use rowsmith_core::graph::visualize::{visualize, GraphFormat};
use rowsmith_testutil::*;

#[tokio::test]
async fn test_blog_graph_nodes_and_edges() {
    let catalog = blog_catalog();
    let graph = build_schema_graph(&catalog).await.unwrap();

    let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["users", "posts"]);
    assert_eq!(graph.edges.len(), 1);

    let edge = &graph.edges[0];
    assert_eq!(edge.from, "posts");
    assert_eq!(edge.to, "users");
    assert_eq!(edge.from_column, "user_id");
    assert_eq!(edge.to_column, "id");
    assert_eq!(edge.label, "posts_user_id_fk");

    let users = graph.node("users").unwrap();
    assert!(users.columns[0].is_primary_key);
    assert!(!users.columns[0].is_foreign_key);
    assert_eq!(users.columns[1].data_type, "varchar");
}

#[tokio::test]
async fn test_graph_json_shape() {
    let catalog = blog_catalog();
    let graph = build_schema_graph(&catalog).await.unwrap();
    let json = serde_json::to_value(&graph).unwrap();

    assert_eq!(json["nodes"][1]["id"], "posts");
    assert_eq!(json["nodes"][1]["columns"][1]["name"], "user_id");
    assert_eq!(json["nodes"][1]["columns"][1]["isForeignKey"], true);
    assert_eq!(json["nodes"][1]["columns"][0]["isPrimaryKey"], true);
    assert_eq!(json["edges"][0]["fromColumn"], "user_id");
    assert_eq!(json["edges"][0]["toColumn"], "id");
}

#[tokio::test]
async fn test_graph_is_read_only() {
    let catalog = blog_catalog();
    build_schema_graph(&catalog).await.unwrap();
    assert!(catalog.insert_log().is_empty());
}

#[tokio::test]
async fn test_empty_catalog_graph() {
    let catalog = MemoryCatalog::new();
    let graph = build_schema_graph(&catalog).await.unwrap();
    assert!(graph.nodes.is_empty());
    assert!(graph.edges.is_empty());
}

#[tokio::test]
async fn test_diamond_parents() {
    let graph = build_schema_graph(&diamond_catalog()).await.unwrap();
    let relations = RelationGraph::from_schema_graph(&graph);

    assert_eq!(relations.table_count(), 4);
    assert_eq!(relations.edge_count(), 4);
    assert_eq!(relations.parents("tasks"), vec!["projects", "teams"]);
    assert_eq!(relations.parents("teams"), vec!["orgs"]);
    assert!(relations.parents("orgs").is_empty());
    assert!(find_cycles(&relations).is_empty());
}

#[tokio::test]
async fn test_cycles_found() {
    let graph = build_schema_graph(&cycle_catalog()).await.unwrap();
    let cycles = find_cycles(&RelationGraph::from_schema_graph(&graph));
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].tables, vec!["alpha", "beta"]);
    assert_eq!(cycles[0].columns, vec!["alpha.beta_id", "beta.alpha_id"]);

    let graph = build_schema_graph(&required_self_reference_catalog()).await.unwrap();
    let cycles = find_cycles(&RelationGraph::from_schema_graph(&graph));
    assert_eq!(cycles.len(), 1);
    assert!(cycles[0].is_self_reference());
    assert_eq!(cycles[0].columns, vec!["employees.manager_id"]);
}

#[tokio::test]
async fn test_render_formats() {
    let graph = build_schema_graph(&blog_catalog()).await.unwrap();

    let mermaid = visualize(&graph, GraphFormat::Mermaid);
    assert!(mermaid.contains("posts -->|user_id| users"));

    let format: GraphFormat = "graphviz".parse().unwrap();
    let dot = visualize(&graph, format);
    assert!(dot.starts_with("digraph schema {"));
    assert!(dot.contains("\"posts\" -> \"users\" [label=\"user_id -> id\"];"));
}
