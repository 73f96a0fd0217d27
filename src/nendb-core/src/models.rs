use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::error::{NenError, Result};
use crate::property::PropertyMap;

pub type NodeId = i64;
pub type EdgeId = i64;

/// Free-form metadata attached to algorithm results
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Database statistics as reported by `GET /statistics`
pub type Statistics = BTreeMap<String, serde_json::Value>;

/// Treat an explicit JSON `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reject negative identifiers with a validation error naming `what`
pub fn validate_id(value: i64, what: &str) -> Result<()> {
    if value < 0 {
        return Err(
            NenError::validation(format!("{} must be a non-negative integer", what))
                .with_detail("value", value),
        );
    }
    Ok(())
}

/// Reject empty required strings with a validation error naming `what`
pub fn validate_not_empty(value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        return Err(NenError::validation(format!("{} cannot be empty", what)));
    }
    Ok(())
}

/// Node represents a vertex in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: PropertyMap,
}

impl Node {
    /// Create a validated node. Missing labels or properties become empty.
    pub fn new(
        id: NodeId,
        labels: Option<Vec<String>>,
        properties: Option<PropertyMap>,
    ) -> Result<Self> {
        let node = Self {
            id,
            labels: labels.unwrap_or_default(),
            properties: properties.unwrap_or_default(),
        };
        node.validate()?;
        Ok(node)
    }

    pub fn validate(&self) -> Result<()> {
        validate_id(self.id, "node ID")
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// Edge represents a directed, typed relationship between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "type")]
    pub edge_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: PropertyMap,
}

impl Edge {
    pub fn new(
        id: EdgeId,
        source: NodeId,
        target: NodeId,
        edge_type: impl Into<String>,
        properties: Option<PropertyMap>,
    ) -> Result<Self> {
        let edge = Self {
            id,
            source,
            target,
            edge_type: edge_type.into(),
            properties: properties.unwrap_or_default(),
        };
        edge.validate()?;
        Ok(edge)
    }

    pub fn validate(&self) -> Result<()> {
        validate_id(self.id, "edge ID")?;
        validate_id(self.source, "source node ID")?;
        validate_id(self.target, "target node ID")?;
        validate_not_empty(&self.edge_type, "edge type")
    }
}

/// AlgorithmStatus represents the execution state of a server-side algorithm
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmStatus {
    Queued,
    Running,
    #[default]
    Completed,
    Failed,
    Cancelled,
}

impl AlgorithmStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmStatus::Queued => "queued",
            AlgorithmStatus::Running => "running",
            AlgorithmStatus::Completed => "completed",
            AlgorithmStatus::Failed => "failed",
            AlgorithmStatus::Cancelled => "cancelled",
        }
    }

    /// True once the run can no longer change state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AlgorithmStatus::Completed | AlgorithmStatus::Failed | AlgorithmStatus::Cancelled
        )
    }
}

/// AlgorithmResult holds the fields shared by every algorithm response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmResult {
    #[serde(default)]
    pub algorithm: String,
    #[serde(default)]
    pub status: AlgorithmStatus,
    #[serde(default)]
    pub message: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub metadata: Metadata,
}

impl AlgorithmResult {
    pub fn new(
        algorithm: impl Into<String>,
        status: AlgorithmStatus,
        message: impl Into<String>,
        metadata: Option<Metadata>,
    ) -> Result<Self> {
        let result = Self {
            algorithm: algorithm.into(),
            status,
            message: message.into(),
            metadata: metadata.unwrap_or_default(),
        };
        result.validate()?;
        Ok(result)
    }

    pub fn validate(&self) -> Result<()> {
        validate_not_empty(&self.algorithm, "algorithm name")?;
        validate_not_empty(&self.message, "message")
    }

    /// Surface a failed or cancelled run as an algorithm error
    pub fn ensure_succeeded(&self) -> Result<()> {
        match self.status {
            AlgorithmStatus::Failed | AlgorithmStatus::Cancelled => {
                let message = if self.message.is_empty() {
                    format!("{} algorithm {}", self.algorithm, self.status.as_str())
                } else {
                    self.message.clone()
                };
                Err(NenError::algorithm(message)
                    .with_detail("algorithm", self.algorithm.clone())
                    .with_detail("algorithm_status", self.status.as_str())
                    .with_details(self.metadata.clone()))
            }
            _ => Ok(()),
        }
    }
}

/// BfsResult is the outcome of a breadth-first search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BfsResult {
    #[serde(flatten)]
    pub base: AlgorithmResult,
    #[serde(default, deserialize_with = "null_as_default")]
    pub visited_nodes: Vec<NodeId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: Vec<NodeId>,
    #[serde(default)]
    pub depth: i64,
}

impl BfsResult {
    pub fn new(
        base: AlgorithmResult,
        visited_nodes: Option<Vec<NodeId>>,
        path: Option<Vec<NodeId>>,
        depth: i64,
    ) -> Self {
        Self {
            base,
            visited_nodes: visited_nodes.unwrap_or_default(),
            path: path.unwrap_or_default(),
            depth,
        }
    }
}

/// DijkstraResult is the outcome of a weighted shortest-path search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DijkstraResult {
    #[serde(flatten)]
    pub base: AlgorithmResult,
    #[serde(default, deserialize_with = "null_as_default")]
    pub shortest_path: Vec<NodeId>,
    #[serde(default)]
    pub total_cost: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path_details: Vec<Metadata>,
}

impl DijkstraResult {
    pub fn new(
        base: AlgorithmResult,
        shortest_path: Option<Vec<NodeId>>,
        total_cost: f64,
        path_details: Option<Vec<Metadata>>,
    ) -> Self {
        Self {
            base,
            shortest_path: shortest_path.unwrap_or_default(),
            total_cost,
            path_details: path_details.unwrap_or_default(),
        }
    }
}

/// PageRankResult maps every node to its rank score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRankResult {
    #[serde(flatten)]
    pub base: AlgorithmResult,
    #[serde(default, deserialize_with = "node_scores")]
    pub node_scores: BTreeMap<NodeId, f64>,
    #[serde(default)]
    pub iterations: i64,
    #[serde(default)]
    pub convergence: bool,
}

// JSON object keys are strings; parse them back into node ids explicitly
// since `flatten` buffers the map before the key type is known.
fn node_scores<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<NodeId, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, f64>> = Option::deserialize(deserializer)?;
    raw.unwrap_or_default()
        .into_iter()
        .map(|(k, v)| {
            k.parse::<NodeId>()
                .map(|id| (id, v))
                .map_err(|_| serde::de::Error::custom(format!("invalid node id key: {}", k)))
        })
        .collect()
}

impl PageRankResult {
    pub fn new(
        base: AlgorithmResult,
        node_scores: Option<BTreeMap<NodeId, f64>>,
        iterations: i64,
        convergence: bool,
    ) -> Self {
        Self {
            base,
            node_scores: node_scores.unwrap_or_default(),
            iterations,
            convergence,
        }
    }

    /// Nodes ordered by descending score
    pub fn ranked(&self) -> Vec<(NodeId, f64)> {
        let mut ranked: Vec<(NodeId, f64)> = self.node_scores.iter().map(|(k, v)| (*k, *v)).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

/// Body of `POST /nodes` and `PUT /nodes/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRequest {
    pub labels: Vec<String>,
    pub properties: PropertyMap,
}

/// Body of `POST /edges`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEdgeRequest {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "type")]
    pub edge_type: String,
    pub properties: PropertyMap,
}

/// Body of `PUT /edges/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEdgeRequest {
    #[serde(rename = "type")]
    pub edge_type: String,
    pub properties: PropertyMap,
}

/// Body of `POST /algorithms/bfs`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BfsRequest {
    pub start_node: NodeId,
    pub target_node: NodeId,
    pub max_depth: i64,
}

/// Body of `POST /algorithms/dijkstra`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DijkstraRequest {
    pub start_node: NodeId,
    pub target_node: NodeId,
}

/// Body of `POST /algorithms/pagerank`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRankRequest {
    pub max_iterations: i64,
    pub tolerance: f64,
}

/// Body of `POST /query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub params: Option<serde_json::Map<String, serde_json::Value>>,
}
