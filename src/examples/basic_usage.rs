//! Basic Usage Example
//!
//! Walks through the driver against a running NenDB server: health check,
//! node and edge CRUD, the three server-side algorithms, a free-form query
//! and statistics.
//!
//! Run with: cargo run -p nendb-rs --example basic_usage

use nendb_rs::{ClientConfig, Context, NenClient, PropertyMap};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::new("http://localhost:8080")
        .with_timeout(Duration::from_secs(30))
        .with_max_retries(3);

    let client = NenClient::new(Some(config)).await?;
    let ctx = Context::with_timeout(Duration::from_secs(60));

    println!("=== NenDB Rust Driver Basic Usage Example ===\n");

    println!("1. Checking server health...");
    client.health(&ctx).await?;
    println!("✓ Server is healthy\n");

    println!("2. Creating nodes...");
    let mut alice_props = PropertyMap::new();
    alice_props.insert("name".to_string(), "Alice".into());
    alice_props.insert("age".to_string(), 30.into());
    alice_props.insert("email".to_string(), "alice@example.com".into());
    let alice = client
        .create_node(&ctx, vec!["Person".to_string()], alice_props)
        .await?;
    println!("✓ Created person node with ID: {}", alice.id);

    let mut bob_props = PropertyMap::new();
    bob_props.insert("name".to_string(), "Bob".into());
    bob_props.insert("age".to_string(), 25.into());
    let bob = client
        .create_node(&ctx, vec!["Person".to_string()], bob_props)
        .await?;
    println!("✓ Created person node with ID: {}", bob.id);

    let mut company_props = PropertyMap::new();
    company_props.insert("name".to_string(), "TechCorp".into());
    company_props.insert("industry".to_string(), "Technology".into());
    let company = client
        .create_node(&ctx, vec!["Company".to_string()], company_props)
        .await?;
    println!("✓ Created company node with ID: {}\n", company.id);

    println!("3. Creating edges...");
    let mut knows_props = PropertyMap::new();
    knows_props.insert("since".to_string(), "2020-01-01".into());
    let knows = client
        .create_edge(&ctx, alice.id, bob.id, "KNOWS", knows_props)
        .await?;
    println!("✓ Created KNOWS edge with ID: {}", knows.id);

    let mut works_props = PropertyMap::new();
    works_props.insert("role".to_string(), "Engineer".into());
    let works_at = client
        .create_edge(&ctx, alice.id, company.id, "WORKS_AT", works_props)
        .await?;
    println!("✓ Created WORKS_AT edge with ID: {}\n", works_at.id);

    println!("4. Reading data back...");
    let node = client.get_node(&ctx, alice.id).await?;
    println!("✓ Node {}: labels={:?}, properties={:?}", node.id, node.labels, node.properties);
    let edge = client.get_edge(&ctx, knows.id).await?;
    println!(
        "✓ Edge {}: {} -[{}]-> {}\n",
        edge.id, edge.source, edge.edge_type, edge.target
    );

    println!("5. Running graph algorithms...");
    let bfs = client.run_bfs(&ctx, alice.id, company.id, 5).await?;
    println!("✓ BFS visited {} nodes, path {:?}", bfs.visited_nodes.len(), bfs.path);

    let dijkstra = client.run_dijkstra(&ctx, alice.id, company.id).await?;
    println!(
        "✓ Dijkstra path {:?} with cost {}",
        dijkstra.shortest_path, dijkstra.total_cost
    );

    let pagerank = client.run_pagerank(&ctx, 100, 0.001).await?;
    println!(
        "✓ PageRank converged={} after {} iterations",
        pagerank.convergence, pagerank.iterations
    );
    for (node_id, score) in pagerank.ranked().iter().take(3) {
        println!("   node {}: {:.4}", node_id, score);
    }
    println!();

    println!("6. Running a query...");
    let result = client
        .query(&ctx, "MATCH (n:Person) RETURN n.name", None)
        .await?;
    println!("✓ Query result: {}\n", serde_json::to_string_pretty(&result)?);

    println!("7. Fetching statistics...");
    let stats = client.statistics(&ctx).await?;
    println!("✓ Statistics: {}\n", serde_json::to_string_pretty(&stats)?);

    println!("8. Cleaning up...");
    client.delete_edge(&ctx, works_at.id).await?;
    client.delete_edge(&ctx, knows.id).await?;
    for id in [company.id, bob.id, alice.id] {
        client.delete_node(&ctx, id).await?;
    }
    println!("✓ Removed example data");

    Ok(())
}
