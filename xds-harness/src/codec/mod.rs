//! Codec for encoding/decoding xDS messages.
//!
//! The codec layer converts between crate-owned message types
//! ([`DiscoveryRequest`], [`DiscoveryResponse`]) and serialized bytes, so the
//! transport in front of the harness can hand over raw protobuf as well as
//! decoded messages.

use crate::error::Result;
use crate::message::{DiscoveryRequest, DiscoveryResponse};
use bytes::Bytes;

pub mod prost;

pub use self::prost::ProstCodec;

/// Trait for encoding/decoding xDS discovery messages.
///
/// Implementations convert between the crate-owned message types
/// and their serialized wire format.
pub trait XdsCodec: Send + Sync + 'static {
    /// Encode a [`DiscoveryRequest`] to bytes.
    fn encode_request(&self, request: &DiscoveryRequest) -> Result<Bytes>;

    /// Decode bytes into a [`DiscoveryRequest`].
    fn decode_request(&self, bytes: Bytes) -> Result<DiscoveryRequest>;

    /// Decode bytes into a [`DiscoveryResponse`].
    fn decode_response(&self, bytes: Bytes) -> Result<DiscoveryResponse>;
}
