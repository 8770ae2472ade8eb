//! Crate-owned xDS message types.
//!
//! These types are codegen-agnostic and serve as the interface between the
//! harness and whatever transport produced the messages. The codec converts
//! these to/from the wire format (e.g., prost/envoy-types).
//!
//! All messages serialize to their canonical JSON form, following the proto3
//! JSON mapping: lowerCamelCase field names, empty fields omitted and `Any`
//! payloads rendered as `{"@type": ..., "value": <base64>}`. Field order is
//! fixed by declaration order and map keys are sorted, so equal messages always
//! yield byte-identical text.
//!
//! Every field of the wire messages has a home here, so two messages that
//! differ anywhere on the wire also differ in canonical text.

use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::{Serialize, Serializer};

use crate::error::Result;

/// A discovery request sent to the xDS server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryRequest {
    /// The version_info provided in the most recent successfully processed
    /// response for this type, or empty for the first request.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version_info: String,
    /// The node making the request.
    pub node: Node,
    /// List of resource names to subscribe to.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resource_names: Vec<String>,
    /// Resource names carrying dynamic parameters.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resource_locators: Vec<ResourceLocator>,
    /// Type URL of the resource being requested.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub type_url: String,
    /// The nonce from the most recent successfully processed response,
    /// or empty for the first request.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub response_nonce: String,
    /// Error details if this is a NACK (negative acknowledgment).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<ErrorDetail>,
}

impl DiscoveryRequest {
    /// Create an initial request for `type_url` with no version or nonce.
    pub fn new(node: Node, type_url: impl Into<String>) -> Self {
        Self {
            version_info: String::new(),
            node,
            resource_names: Vec::new(),
            resource_locators: Vec::new(),
            type_url: type_url.into(),
            response_nonce: String::new(),
            error_detail: None,
        }
    }

    /// Set the subscribed resource names.
    pub fn with_resource_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resource_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the version and nonce being acknowledged.
    pub fn with_ack(mut self, version_info: impl Into<String>, nonce: impl Into<String>) -> Self {
        self.version_info = version_info.into();
        self.response_nonce = nonce.into();
        self
    }

    /// Attach error details, turning this request into a NACK.
    pub fn with_error_detail(mut self, error_detail: ErrorDetail) -> Self {
        self.error_detail = Some(error_detail);
        self
    }

    /// Canonical JSON text of this request.
    ///
    /// Every member serializes to a string-keyed JSON value, so this only
    /// fails if `serde_json` itself does.
    pub fn to_canonical_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A discovery response from the xDS server.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResponse {
    /// The version of the response data.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version_info: String,
    /// The response resources wrapped as Any protos.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceAny>,
    /// Whether this is a canary configuration.
    #[serde(skip_serializing_if = "is_false")]
    pub canary: bool,
    /// Type URL of the resources.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub type_url: String,
    /// Nonce for this response, to be echoed back in the next request.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub nonce: String,
    /// The control plane instance that sent the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_plane: Option<ControlPlane>,
    /// Protobuf encoding of the per-resource errors.
    ///
    /// Kept opaque; the codec writes it back unchanged.
    #[serde(
        skip_serializing_if = "Bytes::is_empty",
        serialize_with = "serialize_base64"
    )]
    pub other_fields: Bytes,
}

impl DiscoveryResponse {
    /// Canonical JSON text of this response.
    ///
    /// See [`DiscoveryRequest::to_canonical_json`].
    pub fn to_canonical_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A resource wrapped as google.protobuf.Any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceAny {
    /// Type URL of the resource.
    #[serde(rename = "@type")]
    pub type_url: String,
    /// Serialized resource bytes.
    #[serde(serialize_with = "serialize_base64")]
    pub value: Bytes,
}

impl ResourceAny {
    /// Wrap serialized resource bytes.
    pub fn new(type_url: impl Into<String>, value: impl Into<Bytes>) -> Self {
        Self {
            type_url: type_url.into(),
            value: value.into(),
        }
    }
}

fn serialize_base64<S>(value: &Bytes, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&STANDARD.encode(value))
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Identifies the control plane instance behind a response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ControlPlane {
    /// Opaque identifier of the instance.
    pub identifier: String,
}

/// A resource name with the dynamic parameters it is requested under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLocator {
    /// Resource name.
    pub name: String,
    /// Parameters matched against the resource's constraints.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub dynamic_parameters: BTreeMap<String, String>,
}

/// Free-form metadata, as a JSON object with sorted keys.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// A semantic version triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticVersion {
    /// Major version.
    pub major_number: u32,
    /// Minor version.
    pub minor_number: u32,
    /// Patch version.
    pub patch: u32,
}

/// Structured version of a client build or extension.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildVersion {
    /// Semantic version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<SemanticVersion>,
    /// Free-form build information.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// An extension supported by a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    /// Extension name, e.g. `envoy.filters.http.router`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Extension category, e.g. `envoy.filters.http`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub category: String,
    /// Deprecated type descriptor.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub type_descriptor: String,
    /// Version of the extension build.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<BuildVersion>,
    /// Whether the extension is disabled.
    #[serde(skip_serializing_if = "is_false")]
    pub disabled: bool,
    /// Config type URLs the extension accepts.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub type_urls: Vec<String>,
}

/// Node identification for the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// An opaque node identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The cluster the node belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    /// Opaque metadata extending the node identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Dynamic context parameters, keyed by resource type URL.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub dynamic_parameters: BTreeMap<String, BTreeMap<String, String>>,
    /// Locality specifying where the node is running.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<Locality>,
    /// Free-form string identifying the client type (e.g., "envoy", "grpc").
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_agent_name: String,
    /// Version of the client.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_agent_version: String,
    /// Structured version of the client. Sent instead of
    /// `user_agent_version` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent_build_version: Option<BuildVersion>,
    /// Extensions supported by the client.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<Extension>,
    /// Well-known client features, e.g. `envoy.lb.does_not_support_overprovisioning`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub client_features: Vec<String>,
    /// Protobuf encoding of the node's listening addresses.
    ///
    /// Kept opaque; the codec writes it back unchanged.
    #[serde(
        skip_serializing_if = "Bytes::is_empty",
        serialize_with = "serialize_base64"
    )]
    pub other_fields: Bytes,
}

impl Node {
    /// Create a new Node with the required user agent fields.
    ///
    /// Other fields (id, cluster, locality) can be set using builder methods.
    pub fn new(user_agent_name: impl Into<String>, user_agent_version: impl Into<String>) -> Self {
        Self {
            id: None,
            cluster: None,
            metadata: None,
            dynamic_parameters: BTreeMap::new(),
            locality: None,
            user_agent_name: user_agent_name.into(),
            user_agent_version: user_agent_version.into(),
            user_agent_build_version: None,
            extensions: Vec::new(),
            client_features: Vec::new(),
            other_fields: Bytes::new(),
        }
    }

    /// Set the node ID.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the cluster.
    pub fn with_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = Some(cluster.into());
        self
    }

    /// Set the locality.
    pub fn with_locality(mut self, locality: Locality) -> Self {
        self.locality = Some(locality);
        self
    }

    /// Set the advertised client features.
    pub fn with_client_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.client_features = features.into_iter().map(Into::into).collect();
        self
    }

    /// Set the node metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Locality information identifying where a node is running.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Locality {
    /// Region the node is in.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub region: String,
    /// Zone within the region.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub zone: String,
    /// Sub-zone within the zone.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sub_zone: String,
}

/// Error details for NACK requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorDetail {
    /// gRPC status code.
    pub code: i32,
    /// Error message.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// Additional typed error payloads.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ResourceAny>,
}

impl ErrorDetail {
    /// Create error details with no typed payloads.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Vec::new(),
        }
    }
}
