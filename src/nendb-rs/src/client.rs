use nendb_core::models::{validate_id, validate_not_empty};
use nendb_core::{
    BfsRequest, BfsResult, CreateEdgeRequest, DijkstraRequest, DijkstraResult, Edge, EdgeId,
    NenError, Node, NodeId, NodeRequest, PageRankRequest, PageRankResult, PropertyMap,
    QueryRequest, Result, Statistics, UpdateEdgeRequest,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::context::Context;
use crate::retry::RetryPolicy;
use crate::transport::Transport;

/// Health probe path
const HEALTH_PATH: &str = "/health";

/// NenDB REST API Client
///
/// Cheap to clone; clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct NenClient {
    transport: Transport,
    timeout: Duration,
}

fn decode<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| {
        NenError::response(format!("Failed to parse {} response", what))
            .with_detail("error", e.to_string())
    })
}

impl NenClient {
    /// Create a client, probing `/health` unless `skip_validation` is set.
    ///
    /// `None` uses [`ClientConfig::default`].
    pub async fn new(config: Option<ClientConfig>) -> Result<Self> {
        let config = config.unwrap_or_default();
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let http = match config.http_client {
            Some(http) => http,
            None => reqwest::Client::builder()
                .timeout(config.timeout)
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .map_err(|e| {
                    NenError::validation("Failed to build HTTP client")
                        .with_detail("error", e.to_string())
                })?,
        };

        let client = Self {
            transport: Transport::new(
                http,
                base_url,
                RetryPolicy::new(config.max_retries, config.retry_delay),
            ),
            timeout: config.timeout,
        };

        if !config.skip_validation {
            if let Err(e) = client.health(&Context::background()).await {
                tracing::error!(base_url = %client.base_url(), error = %e, "NenDB health probe failed");
                return Err(NenError::connection(format!(
                    "Failed to connect to NenDB server at {}",
                    client.base_url()
                ))
                .with_detail("error", e.to_string()));
            }
            tracing::info!(base_url = %client.base_url(), "Connected to NenDB");
        }

        Ok(client)
    }

    /// Create a client for `base_url` with default settings
    pub async fn connect(base_url: impl Into<String>) -> Result<Self> {
        Self::new(Some(ClientConfig::new(base_url))).await
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Health check, bounded by the configured timeout on top of `ctx`
    pub async fn health(&self, ctx: &Context) -> Result<()> {
        let ctx = ctx.child_with_timeout(self.timeout);
        self.transport
            .request::<()>(&ctx, Method::GET, HEALTH_PATH, None, None)
            .await?;
        Ok(())
    }

    /// Get a node by ID
    #[tracing::instrument(skip(self, ctx))]
    pub async fn get_node(&self, ctx: &Context, node_id: NodeId) -> Result<Node> {
        validate_id(node_id, "node ID")?;
        let body = self
            .transport
            .request::<()>(ctx, Method::GET, &format!("/nodes/{}", node_id), None, None)
            .await?;
        decode(&body, "node")
    }

    /// Create a node
    #[tracing::instrument(skip(self, ctx, properties))]
    pub async fn create_node(
        &self,
        ctx: &Context,
        labels: Vec<String>,
        properties: PropertyMap,
    ) -> Result<Node> {
        let req = NodeRequest { labels, properties };
        let body = self
            .transport
            .request(ctx, Method::POST, "/nodes", Some(&req), None)
            .await?;
        decode(&body, "node")
    }

    /// Replace a node's labels and properties
    #[tracing::instrument(skip(self, ctx, properties))]
    pub async fn update_node(
        &self,
        ctx: &Context,
        node_id: NodeId,
        labels: Vec<String>,
        properties: PropertyMap,
    ) -> Result<Node> {
        validate_id(node_id, "node ID")?;
        let req = NodeRequest { labels, properties };
        let body = self
            .transport
            .request(ctx, Method::PUT, &format!("/nodes/{}", node_id), Some(&req), None)
            .await?;
        decode(&body, "node")
    }

    /// Delete a node by ID
    #[tracing::instrument(skip(self, ctx))]
    pub async fn delete_node(&self, ctx: &Context, node_id: NodeId) -> Result<()> {
        validate_id(node_id, "node ID")?;
        self.transport
            .request::<()>(ctx, Method::DELETE, &format!("/nodes/{}", node_id), None, None)
            .await?;
        Ok(())
    }

    /// Get an edge by ID
    #[tracing::instrument(skip(self, ctx))]
    pub async fn get_edge(&self, ctx: &Context, edge_id: EdgeId) -> Result<Edge> {
        validate_id(edge_id, "edge ID")?;
        let body = self
            .transport
            .request::<()>(ctx, Method::GET, &format!("/edges/{}", edge_id), None, None)
            .await?;
        decode(&body, "edge")
    }

    /// Create an edge from `source` to `target`
    #[tracing::instrument(skip(self, ctx, properties))]
    pub async fn create_edge(
        &self,
        ctx: &Context,
        source: NodeId,
        target: NodeId,
        edge_type: &str,
        properties: PropertyMap,
    ) -> Result<Edge> {
        validate_id(source, "source node ID")?;
        validate_id(target, "target node ID")?;
        validate_not_empty(edge_type, "edge type")?;

        let req = CreateEdgeRequest {
            source,
            target,
            edge_type: edge_type.to_string(),
            properties,
        };
        let body = self
            .transport
            .request(ctx, Method::POST, "/edges", Some(&req), None)
            .await?;
        decode(&body, "edge")
    }

    /// Replace an edge's type and properties
    #[tracing::instrument(skip(self, ctx, properties))]
    pub async fn update_edge(
        &self,
        ctx: &Context,
        edge_id: EdgeId,
        edge_type: &str,
        properties: PropertyMap,
    ) -> Result<Edge> {
        validate_id(edge_id, "edge ID")?;
        validate_not_empty(edge_type, "edge type")?;

        let req = UpdateEdgeRequest {
            edge_type: edge_type.to_string(),
            properties,
        };
        let body = self
            .transport
            .request(ctx, Method::PUT, &format!("/edges/{}", edge_id), Some(&req), None)
            .await?;
        decode(&body, "edge")
    }

    /// Delete an edge by ID
    #[tracing::instrument(skip(self, ctx))]
    pub async fn delete_edge(&self, ctx: &Context, edge_id: EdgeId) -> Result<()> {
        validate_id(edge_id, "edge ID")?;
        self.transport
            .request::<()>(ctx, Method::DELETE, &format!("/edges/{}", edge_id), None, None)
            .await?;
        Ok(())
    }

    /// Run a breadth-first search on the server
    #[tracing::instrument(skip(self, ctx))]
    pub async fn run_bfs(
        &self,
        ctx: &Context,
        start_node: NodeId,
        target_node: NodeId,
        max_depth: i64,
    ) -> Result<BfsResult> {
        let req = BfsRequest {
            start_node,
            target_node,
            max_depth,
        };
        let body = self
            .transport
            .request(ctx, Method::POST, "/algorithms/bfs", Some(&req), None)
            .await?;
        decode(&body, "BFS")
    }

    /// Run Dijkstra's shortest path on the server
    #[tracing::instrument(skip(self, ctx))]
    pub async fn run_dijkstra(
        &self,
        ctx: &Context,
        start_node: NodeId,
        target_node: NodeId,
    ) -> Result<DijkstraResult> {
        let req = DijkstraRequest {
            start_node,
            target_node,
        };
        let body = self
            .transport
            .request(ctx, Method::POST, "/algorithms/dijkstra", Some(&req), None)
            .await?;
        decode(&body, "Dijkstra")
    }

    /// Run PageRank on the server
    #[tracing::instrument(skip(self, ctx))]
    pub async fn run_pagerank(
        &self,
        ctx: &Context,
        max_iterations: i64,
        tolerance: f64,
    ) -> Result<PageRankResult> {
        let req = PageRankRequest {
            max_iterations,
            tolerance,
        };
        let body = self
            .transport
            .request(ctx, Method::POST, "/algorithms/pagerank", Some(&req), None)
            .await?;
        decode(&body, "PageRank")
    }

    /// Execute a free-form query; the result shape is owned by the server
    #[tracing::instrument(skip(self, ctx, params))]
    pub async fn query(
        &self,
        ctx: &Context,
        query: &str,
        params: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<serde_json::Value> {
        validate_not_empty(query, "query")?;
        let req = QueryRequest {
            query: query.to_string(),
            params,
        };
        let body = self
            .transport
            .request(ctx, Method::POST, "/query", Some(&req), None)
            .await?;
        decode(&body, "query")
    }

    /// Database statistics
    #[tracing::instrument(skip(self, ctx))]
    pub async fn statistics(&self, ctx: &Context) -> Result<Statistics> {
        let body = self
            .transport
            .request::<()>(ctx, Method::GET, "/statistics", None, None)
            .await?;
        decode(&body, "statistics")
    }
}
