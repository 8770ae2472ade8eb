//! Core of an [xDS](https://www.envoyproxy.io/docs/envoy/latest/api-docs/xds_protocol)
//! conformance harness.
//!
//! This crate sits between the gRPC transport that talks to a control plane
//! under test and the scenarios that check its behavior. It handles:
//! - Decoding discovery responses into a stable summary of version, nonce and
//!   resource names
//! - Synthesizing fixture resources from plain name lists
//! - Recording every request and response exchanged, at most once each
//!
//! It does NOT contain:
//! - The ADS stream or any other gRPC plumbing
//! - Subscription, ACK or NACK state tracking
//! - Assertions on the decoded summaries
//!
//! # Example
//!
//! ```
//! use xds_harness::{DiscoveryResponse, ExchangeStore, StoreConfig, parse_response};
//!
//! let store = ExchangeStore::open(&StoreConfig::in_memory())?;
//! store.migrate()?;
//!
//! let response = DiscoveryResponse {
//!     version_info: "1".to_string(),
//!     type_url: "type.googleapis.com/envoy.config.cluster.v3.Cluster".to_string(),
//!     nonce: "n".to_string(),
//!     ..Default::default()
//! };
//! store.record_response(&response)?;
//!
//! let simple = parse_response(&response)?;
//! assert_eq!(simple.version, "1");
//! # Ok::<(), xds_harness::Error>(())
//! ```

pub mod codec;
pub mod error;
pub mod fixture;
pub mod message;
pub mod parser;
pub mod resource;
pub mod store;

pub use codec::{ProstCodec, XdsCodec};
pub use error::{DecodeCause, Error, ExchangeKind, Result};
pub use fixture::{FixtureKind, ResourceSet, Synthesizer};
pub use message::{
    BuildVersion, ControlPlane, DiscoveryRequest, DiscoveryResponse, ErrorDetail, Extension,
    Locality, Metadata, Node, ResourceAny, ResourceLocator, SemanticVersion,
};
pub use parser::{SimpleResponse, parse_response, parse_wire_response};
pub use resource::{Resource, ResourceKind, service_type_url};
pub use store::{ExchangeStore, StoreConfig, StoreLocation};
