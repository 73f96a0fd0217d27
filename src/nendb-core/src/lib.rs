//! NenDB Core Library
//!
//! This crate provides the transport-independent pieces of the NenDB driver:
//! - Graph entities (nodes, edges) with validating constructors
//! - Algorithm result types (BFS, Dijkstra, PageRank)
//! - Scalar property values
//! - The classified error taxonomy shared by every NenDB crate
//! - Serializable connection settings

pub mod config;
pub mod error;
pub mod models;
pub mod property;

// Re-export commonly used types
pub use config::ConnectionSettings;
pub use error::{ErrorKind, NenError, Result};
pub use models::*;
pub use property::{is_valid_property_value, properties_from_json, PropertyMap, PropertyValue};
