//! Reduces discovery responses to the summary conformance checks assert on.

use bytes::Bytes;
use tracing::{debug, trace};

use crate::codec::XdsCodec;
use crate::error::{Error, Result};
use crate::message::DiscoveryResponse;
use crate::resource::ResourceKind;

/// The stable summary of a discovery response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleResponse {
    /// The response's `version_info`.
    pub version: String,
    /// The response's nonce.
    pub nonce: String,
    /// The name of every resource in the response, in payload order.
    ///
    /// Load assignments contribute their cluster name.
    pub resources: Vec<String>,
}

/// Parses a decoded discovery response into a [`SimpleResponse`].
///
/// A type URL that is not one of the four known resource kinds yields an
/// empty resource list rather than an error. Any payload that fails to decode
/// aborts the parse with [`Error::Decode`].
///
/// # Example
///
/// ```
/// use xds_harness::{DiscoveryResponse, parse_response};
///
/// let response = DiscoveryResponse {
///     version_info: "1".to_string(),
///     nonce: "a".to_string(),
///     type_url: "type.googleapis.com/envoy.service.runtime.v3.Runtime".to_string(),
///     ..Default::default()
/// };
///
/// let simple = parse_response(&response)?;
/// assert_eq!(simple.version, "1");
/// assert!(simple.resources.is_empty());
/// # Ok::<(), xds_harness::Error>(())
/// ```
pub fn parse_response(response: &DiscoveryResponse) -> Result<SimpleResponse> {
    let kind = ResourceKind::from_type_url(&response.type_url);

    let Some(decode) = kind.decoder() else {
        debug!(
            type_url = %response.type_url,
            count = response.resources.len(),
            "skipping resources of unrecognized type"
        );
        return Ok(SimpleResponse {
            version: response.version_info.clone(),
            nonce: response.nonce.clone(),
            resources: Vec::new(),
        });
    };

    let resources = response
        .resources
        .iter()
        .enumerate()
        .map(|(index, any)| {
            decode(&any.type_url, any.value.clone()).map_err(|cause| Error::Decode {
                index,
                type_url: response.type_url.clone(),
                cause,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    trace!(?kind, names = ?resources, "parsed discovery response");

    Ok(SimpleResponse {
        version: response.version_info.clone(),
        nonce: response.nonce.clone(),
        resources,
    })
}

/// Decodes a serialized envoy `DiscoveryResponse` with `codec` and parses it.
pub fn parse_wire_response<C: XdsCodec>(codec: &C, bytes: Bytes) -> Result<SimpleResponse> {
    let response = codec.decode_response(bytes)?;
    parse_response(&response)
}
