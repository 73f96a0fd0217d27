use actix_web::{
    http::StatusCode, web, HttpRequest, HttpResponse, ResponseError, Result as ActixResult,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

use nendb_core::{properties_from_json, ErrorKind, NenError};
use nendb_rs::{Context, NenClient};

use crate::config::GatewayConfig;

/// Shared application state
pub struct AppState {
    pub client: NenClient,
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    fn request_context(&self) -> Context {
        Context::with_timeout(self.config.request_timeout())
    }

    fn algorithm_context(&self) -> Context {
        Context::with_timeout(self.config.algorithm_timeout())
    }
}

/// Successful response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }
}

/// Error response envelope
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{context}: {source}")]
    Upstream {
        context: &'static str,
        #[source]
        source: NenError,
    },
}

fn upstream(context: &'static str) -> impl FnOnce(NenError) -> ApiError {
    move |source| {
        tracing::warn!(kind = %source.kind(), "{}: {}", context, source);
        ApiError::Upstream { context, source }
    }
}

/// HTTP status for a client error
pub fn status_for(err: &NenError) -> StatusCode {
    match err.kind() {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Response if err.status() == Some(404) => StatusCode::NOT_FOUND,
        ErrorKind::Response => StatusCode::BAD_GATEWAY,
        ErrorKind::Connection => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Algorithm => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream { source, .. } => status_for(source),
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::BadRequest(message) => ErrorResponse {
                success: false,
                error: message.clone(),
                details: None,
            },
            ApiError::Upstream { context, source } => ErrorResponse {
                success: false,
                error: context.to_string(),
                details: serde_json::to_value(source).ok(),
            },
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

fn parse_id(raw: &str, what: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {} ID format", what)))
}

/// Node create/update body
#[derive(Debug, Deserialize)]
pub struct NodeBody {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

/// Edge create body
#[derive(Debug, Deserialize)]
pub struct CreateEdgeBody {
    pub source: i64,
    pub target: i64,
    #[serde(rename = "type", default)]
    pub edge_type: String,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

/// Edge update body
#[derive(Debug, Deserialize)]
pub struct UpdateEdgeBody {
    #[serde(rename = "type", default)]
    pub edge_type: String,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
pub struct BfsBody {
    pub start_node: i64,
    #[serde(default)]
    pub target_node: i64,
    #[serde(default = "default_max_depth")]
    pub max_depth: i64,
}

fn default_max_depth() -> i64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct DijkstraBody {
    pub start_node: i64,
    #[serde(alias = "target_node")]
    pub end_node: i64,
}

/// Zero values fall back to the defaults
#[derive(Debug, Default, Deserialize)]
pub struct PageRankBody {
    #[serde(default, alias = "max_iterations")]
    pub iterations: i64,
    #[serde(default)]
    pub tolerance: f64,
}

impl PageRankBody {
    fn resolved(&self) -> (i64, f64) {
        let iterations = if self.iterations == 0 { 100 } else { self.iterations };
        let tolerance = if self.tolerance == 0.0 { 0.001 } else { self.tolerance };
        (iterations, tolerance)
    }
}

#[derive(Debug, Deserialize)]
pub struct QueryBody {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
}

/// Endpoint index
/// GET /
pub async fn index() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "message": "NenDB gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "GET  /health": "Gateway and upstream health",
            "GET  /graph": "Get graph overview",
            "GET  /nodes": "Get all nodes",
            "GET  /nodes/{id}": "Get node by ID",
            "POST /nodes": "Create new node",
            "PUT  /nodes/{id}": "Update node",
            "DELETE /nodes/{id}": "Delete node",
            "GET  /edges": "Get all edges",
            "GET  /edges/{id}": "Get edge by ID",
            "POST /edges": "Create new edge",
            "PUT  /edges/{id}": "Update edge",
            "DELETE /edges/{id}": "Delete edge",
            "POST /algorithms/bfs": "Run BFS algorithm",
            "POST /algorithms/dijkstra": "Run Dijkstra algorithm",
            "POST /algorithms/pagerank": "Run PageRank algorithm",
            "POST /query": "Execute custom query",
            "GET  /stats": "Get graph statistics",
        }
    })))
}

/// Health check, including the upstream server
/// GET /health
#[tracing::instrument(skip(state))]
pub async fn health(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let ctx = state.request_context();
    state
        .client
        .health(&ctx)
        .await
        .map_err(upstream("NenDB server is unhealthy"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::data(json!({
        "status": "ok",
        "upstream": state.client.base_url(),
        "timestamp": Utc::now(),
    }))))
}

/// GET /graph
#[tracing::instrument(skip(state))]
pub async fn graph(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let ctx = state.request_context();
    let stats = state
        .client
        .statistics(&ctx)
        .await
        .map_err(upstream("Failed to get graph statistics"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::data(json!({
        "statistics": stats,
        "message": "Graph structure retrieved successfully",
    }))))
}

/// GET /stats
#[tracing::instrument(skip(state))]
pub async fn stats(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let ctx = state.request_context();
    let stats = state
        .client
        .statistics(&ctx)
        .await
        .map_err(upstream("Failed to get graph statistics"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::data(stats)))
}

// ===== Node Endpoints =====

/// GET /nodes
pub async fn list_nodes() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::<()> {
        success: true,
        data: None,
        message: Some(
            "Listing all nodes is not supported; fetch nodes by ID or use /query".to_string(),
        ),
    }))
}

/// GET /nodes/{id}
#[tracing::instrument(skip(path, state))]
pub async fn get_node(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let id = parse_id(&path, "node")?;
    let ctx = state.request_context();
    let node = state
        .client
        .get_node(&ctx, id)
        .await
        .map_err(upstream("Failed to get node"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::data(node)))
}

/// POST /nodes
#[tracing::instrument(skip(req, state))]
pub async fn create_node(
    req: web::Json<NodeBody>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let NodeBody { labels, properties } = req.into_inner();
    if labels.is_empty() {
        return Err(ApiError::BadRequest("At least one label is required".to_string()).into());
    }
    let properties = properties_from_json(properties.unwrap_or_default())
        .map_err(upstream("Invalid node properties"))?;

    let ctx = state.request_context();
    let node = state
        .client
        .create_node(&ctx, labels, properties)
        .await
        .map_err(upstream("Failed to create node"))?;

    tracing::info!(node_id = node.id, "Node created");
    Ok(HttpResponse::Created().json(ApiResponse::data(node).with_message("Node created successfully")))
}

/// PUT /nodes/{id}
#[tracing::instrument(skip(path, req, state))]
pub async fn update_node(
    path: web::Path<String>,
    req: web::Json<NodeBody>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let id = parse_id(&path, "node")?;
    let NodeBody { labels, properties } = req.into_inner();
    let properties = properties_from_json(properties.unwrap_or_default())
        .map_err(upstream("Invalid node properties"))?;

    let ctx = state.request_context();
    let node = state
        .client
        .update_node(&ctx, id, labels, properties)
        .await
        .map_err(upstream("Failed to update node"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::data(node).with_message("Node updated successfully")))
}

/// DELETE /nodes/{id}
#[tracing::instrument(skip(path, state))]
pub async fn delete_node(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let id = parse_id(&path, "node")?;
    let ctx = state.request_context();
    state
        .client
        .delete_node(&ctx, id)
        .await
        .map_err(upstream("Failed to delete node"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::<()> {
        success: true,
        data: None,
        message: Some("Node deleted successfully".to_string()),
    }))
}

// ===== Edge Endpoints =====

/// GET /edges
pub async fn list_edges() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::<()> {
        success: true,
        data: None,
        message: Some(
            "Listing all edges is not supported; fetch edges by ID or use /query".to_string(),
        ),
    }))
}

/// GET /edges/{id}
#[tracing::instrument(skip(path, state))]
pub async fn get_edge(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let id = parse_id(&path, "edge")?;
    let ctx = state.request_context();
    let edge = state
        .client
        .get_edge(&ctx, id)
        .await
        .map_err(upstream("Failed to get edge"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::data(edge)))
}

/// POST /edges
#[tracing::instrument(skip(req, state))]
pub async fn create_edge(
    req: web::Json<CreateEdgeBody>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let body = req.into_inner();
    if body.edge_type.trim().is_empty() {
        return Err(ApiError::BadRequest("Edge type is required".to_string()).into());
    }
    let properties = properties_from_json(body.properties.unwrap_or_default())
        .map_err(upstream("Invalid edge properties"))?;

    let ctx = state.request_context();
    let edge = state
        .client
        .create_edge(&ctx, body.source, body.target, &body.edge_type, properties)
        .await
        .map_err(upstream("Failed to create edge"))?;

    tracing::info!(edge_id = edge.id, "Edge created");
    Ok(HttpResponse::Created().json(ApiResponse::data(edge).with_message("Edge created successfully")))
}

/// PUT /edges/{id}
#[tracing::instrument(skip(path, req, state))]
pub async fn update_edge(
    path: web::Path<String>,
    req: web::Json<UpdateEdgeBody>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let id = parse_id(&path, "edge")?;
    let body = req.into_inner();
    let properties = properties_from_json(body.properties.unwrap_or_default())
        .map_err(upstream("Invalid edge properties"))?;

    let ctx = state.request_context();
    let edge = state
        .client
        .update_edge(&ctx, id, &body.edge_type, properties)
        .await
        .map_err(upstream("Failed to update edge"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::data(edge).with_message("Edge updated successfully")))
}

/// DELETE /edges/{id}
#[tracing::instrument(skip(path, state))]
pub async fn delete_edge(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let id = parse_id(&path, "edge")?;
    let ctx = state.request_context();
    state
        .client
        .delete_edge(&ctx, id)
        .await
        .map_err(upstream("Failed to delete edge"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::<()> {
        success: true,
        data: None,
        message: Some("Edge deleted successfully".to_string()),
    }))
}

// ===== Algorithm Endpoints =====

/// POST /algorithms/bfs
#[tracing::instrument(skip(state))]
pub async fn run_bfs(
    req: web::Json<BfsBody>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let ctx = state.algorithm_context();
    let result = state
        .client
        .run_bfs(&ctx, req.start_node, req.target_node, req.max_depth)
        .await
        .map_err(upstream("BFS algorithm failed"))?;
    result
        .base
        .ensure_succeeded()
        .map_err(upstream("BFS algorithm failed"))?;

    Ok(HttpResponse::Ok().json(
        ApiResponse::data(result).with_message("BFS algorithm completed successfully"),
    ))
}

/// POST /algorithms/dijkstra
#[tracing::instrument(skip(state))]
pub async fn run_dijkstra(
    req: web::Json<DijkstraBody>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let ctx = state.algorithm_context();
    let result = state
        .client
        .run_dijkstra(&ctx, req.start_node, req.end_node)
        .await
        .map_err(upstream("Dijkstra algorithm failed"))?;
    result
        .base
        .ensure_succeeded()
        .map_err(upstream("Dijkstra algorithm failed"))?;

    Ok(HttpResponse::Ok().json(
        ApiResponse::data(result).with_message("Dijkstra algorithm completed successfully"),
    ))
}

/// POST /algorithms/pagerank
#[tracing::instrument(skip(state))]
pub async fn run_pagerank(
    req: web::Json<PageRankBody>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let (iterations, tolerance) = req.resolved();
    let ctx = state.algorithm_context();
    let result = state
        .client
        .run_pagerank(&ctx, iterations, tolerance)
        .await
        .map_err(upstream("PageRank algorithm failed"))?;
    result
        .base
        .ensure_succeeded()
        .map_err(upstream("PageRank algorithm failed"))?;

    Ok(HttpResponse::Ok().json(
        ApiResponse::data(result).with_message("PageRank algorithm completed successfully"),
    ))
}

/// POST /query
#[tracing::instrument(skip(req, state))]
pub async fn query(
    req: web::Json<QueryBody>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let QueryBody { query, params } = req.into_inner();
    if query.trim().is_empty() {
        return Err(ApiError::BadRequest("Query is required".to_string()).into());
    }

    let ctx = state.request_context();
    let result = state
        .client
        .query(&ctx, &query, params)
        .await
        .map_err(upstream("Query execution failed"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::data(result).with_message("Query executed successfully")))
}

fn json_error(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::BadRequest(format!("Invalid request body: {}", err)).into()
}

/// Configure API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .route("/", web::get().to(index))
        .route("/health", web::get().to(health))
        .route("/graph", web::get().to(graph))
        .route("/stats", web::get().to(stats))
        .route("/query", web::post().to(query))
        .service(
            web::scope("/nodes")
                .route("", web::get().to(list_nodes))
                .route("", web::post().to(create_node))
                .route("/{id}", web::get().to(get_node))
                .route("/{id}", web::put().to(update_node))
                .route("/{id}", web::delete().to(delete_node)),
        )
        .service(
            web::scope("/edges")
                .route("", web::get().to(list_edges))
                .route("", web::post().to(create_edge))
                .route("/{id}", web::get().to(get_edge))
                .route("/{id}", web::put().to(update_edge))
                .route("/{id}", web::delete().to(delete_edge)),
        )
        .service(
            web::scope("/algorithms")
                .route("/bfs", web::post().to(run_bfs))
                .route("/dijkstra", web::post().to(run_dijkstra))
                .route("/pagerank", web::post().to(run_pagerank)),
        );
}
