//! NenDB Client Library
//!
//! HTTP client for connecting to NenDB REST API servers, with bounded
//! retries, cooperative cancellation and typed results.
//!
//! ```rust,no_run
//! use nendb_rs::{ClientConfig, Context, NenClient};
//!
//! #[tokio::main]
//! async fn main() -> nendb_rs::Result<()> {
//!     let client = NenClient::new(Some(ClientConfig::default())).await?;
//!     let ctx = Context::with_timeout(std::time::Duration::from_secs(10));
//!     let node = client.get_node(&ctx, 1).await?;
//!     println!("{:?}", node.labels);
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod context;
pub mod retry;
mod transport;

#[cfg(test)]
mod test_support;

pub use client::NenClient;
pub use config::ClientConfig;
pub use context::Context;
pub use transport::USER_AGENT;

pub use nendb_core::{
    is_valid_property_value, AlgorithmResult, AlgorithmStatus, BfsResult, DijkstraResult, Edge,
    EdgeId, ErrorKind, NenError, Node, NodeId, PageRankResult, PropertyMap, PropertyValue,
    Result, Statistics,
};
