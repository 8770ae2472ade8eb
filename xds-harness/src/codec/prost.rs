//! Prost-based codec using envoy-types.
//!
//! Map fields arrive as `HashMap`s; they are moved into sorted maps here so
//! the canonical text of a message does not depend on hash order.

use crate::codec::XdsCodec;
use crate::error::{Error, Result};
use crate::message::{
    BuildVersion, ControlPlane, DiscoveryRequest, DiscoveryResponse, ErrorDetail, Extension,
    Locality, Metadata, Node, ResourceAny, ResourceLocator, SemanticVersion,
};
use bytes::Bytes;
use envoy_types::pb::envoy::config::core::v3 as core;
use envoy_types::pb::envoy::r#type::v3 as types;
use envoy_types::pb::envoy::service::discovery::v3 as discovery;
use envoy_types::pb::google::protobuf::{Any, ListValue, NullValue, Struct, Value, value::Kind};
use envoy_types::pb::google::rpc::Status;
use envoy_types::pb::xds::core::v3::ContextParams;
use prost::Message;

/// A codec that uses prost/envoy-types for serialization.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProstCodec;

impl XdsCodec for ProstCodec {
    fn encode_request(&self, request: &DiscoveryRequest) -> Result<Bytes> {
        let proto_request = discovery::DiscoveryRequest {
            version_info: request.version_info.clone(),
            node: Some(encode_node(&request.node)?),
            resource_names: request.resource_names.clone(),
            resource_locators: request
                .resource_locators
                .iter()
                .map(|locator| discovery::ResourceLocator {
                    name: locator.name.clone(),
                    dynamic_parameters: locator.dynamic_parameters.clone().into_iter().collect(),
                })
                .collect(),
            type_url: request.type_url.clone(),
            response_nonce: request.response_nonce.clone(),
            error_detail: request.error_detail.as_ref().map(|e| Status {
                code: e.code,
                message: e.message.clone(),
                details: e.details.iter().map(encode_any).collect(),
            }),
        };

        Ok(proto_request.encode_to_vec().into())
    }

    fn decode_request(&self, bytes: Bytes) -> Result<DiscoveryRequest> {
        let proto_request = discovery::DiscoveryRequest::decode(bytes).map_err(Error::Wire)?;
        Ok(proto_request.into())
    }

    fn decode_response(&self, bytes: Bytes) -> Result<DiscoveryResponse> {
        let proto_response = discovery::DiscoveryResponse::decode(bytes).map_err(Error::Wire)?;
        Ok(proto_response.into())
    }
}

#[allow(deprecated)]
fn encode_node(node: &Node) -> Result<core::Node> {
    let user_agent_version_type = match &node.user_agent_build_version {
        Some(build) => core::node::UserAgentVersionType::UserAgentBuildVersion(
            encode_build_version(build),
        ),
        None => core::node::UserAgentVersionType::UserAgentVersion(node.user_agent_version.clone()),
    };

    let mut proto_node = core::Node {
        id: node.id.clone().unwrap_or_default(),
        cluster: node.cluster.clone().unwrap_or_default(),
        metadata: node.metadata.as_ref().map(encode_struct),
        dynamic_parameters: node
            .dynamic_parameters
            .iter()
            .map(|(type_url, params)| {
                let params = params.clone().into_iter().collect();
                (type_url.clone(), ContextParams { params })
            })
            .collect(),
        locality: node.locality.as_ref().map(|l| core::Locality {
            region: l.region.clone(),
            zone: l.zone.clone(),
            sub_zone: l.sub_zone.clone(),
        }),
        user_agent_name: node.user_agent_name.clone(),
        extensions: node.extensions.iter().map(encode_extension).collect(),
        client_features: node.client_features.clone(),
        listening_addresses: Vec::new(),
        user_agent_version_type: Some(user_agent_version_type),
    };
    proto_node
        .merge(node.other_fields.clone())
        .map_err(Error::Wire)?;
    Ok(proto_node)
}

fn encode_any(any: &ResourceAny) -> Any {
    Any {
        type_url: any.type_url.clone(),
        value: any.value.to_vec(),
    }
}

fn encode_build_version(build: &BuildVersion) -> core::BuildVersion {
    core::BuildVersion {
        version: build.version.map(|v| types::SemanticVersion {
            major_number: v.major_number,
            minor_number: v.minor_number,
            patch: v.patch,
        }),
        metadata: build.metadata.as_ref().map(encode_struct),
    }
}

#[allow(deprecated)]
fn encode_extension(extension: &Extension) -> core::Extension {
    core::Extension {
        name: extension.name.clone(),
        category: extension.category.clone(),
        type_descriptor: extension.type_descriptor.clone(),
        version: extension.version.as_ref().map(encode_build_version),
        disabled: extension.disabled,
        type_urls: extension.type_urls.clone(),
    }
}

fn encode_struct(metadata: &Metadata) -> Struct {
    Struct {
        fields: metadata
            .iter()
            .map(|(key, value)| (key.clone(), encode_value(value)))
            .collect(),
    }
}

fn encode_value(value: &serde_json::Value) -> Value {
    use serde_json::Value as Json;

    let kind = match value {
        Json::Null => Kind::NullValue(NullValue::NullValue as i32),
        Json::Bool(b) => Kind::BoolValue(*b),
        Json::Number(n) => Kind::NumberValue(n.as_f64().unwrap_or_default()),
        Json::String(s) => Kind::StringValue(s.clone()),
        Json::Array(values) => Kind::ListValue(ListValue {
            values: values.iter().map(encode_value).collect(),
        }),
        Json::Object(fields) => Kind::StructValue(Struct {
            fields: fields
                .iter()
                .map(|(key, value)| (key.clone(), encode_value(value)))
                .collect(),
        }),
    };
    Value { kind: Some(kind) }
}

impl From<discovery::DiscoveryResponse> for DiscoveryResponse {
    fn from(proto_response: discovery::DiscoveryResponse) -> Self {
        let other_fields = if proto_response.resource_errors.is_empty() {
            Bytes::new()
        } else {
            discovery::DiscoveryResponse {
                resource_errors: proto_response.resource_errors,
                ..Default::default()
            }
            .encode_to_vec()
            .into()
        };

        DiscoveryResponse {
            version_info: proto_response.version_info,
            resources: proto_response
                .resources
                .into_iter()
                .map(ResourceAny::from)
                .collect(),
            canary: proto_response.canary,
            type_url: proto_response.type_url,
            nonce: proto_response.nonce,
            control_plane: proto_response.control_plane.map(|cp| ControlPlane {
                identifier: cp.identifier,
            }),
            other_fields,
        }
    }
}

impl From<Any> for ResourceAny {
    fn from(any: Any) -> Self {
        ResourceAny {
            type_url: any.type_url,
            value: any.value.into(),
        }
    }
}

impl From<discovery::DiscoveryRequest> for DiscoveryRequest {
    fn from(proto_request: discovery::DiscoveryRequest) -> Self {
        DiscoveryRequest {
            version_info: proto_request.version_info,
            node: proto_request
                .node
                .map(Node::from)
                .unwrap_or_else(|| Node::new("", "")),
            resource_names: proto_request.resource_names,
            resource_locators: proto_request
                .resource_locators
                .into_iter()
                .map(|locator| ResourceLocator {
                    name: locator.name,
                    dynamic_parameters: locator.dynamic_parameters.into_iter().collect(),
                })
                .collect(),
            type_url: proto_request.type_url,
            response_nonce: proto_request.response_nonce,
            error_detail: proto_request.error_detail.map(|status| ErrorDetail {
                code: status.code,
                message: status.message,
                details: status.details.into_iter().map(ResourceAny::from).collect(),
            }),
        }
    }
}

#[allow(deprecated)]
impl From<core::Node> for Node {
    fn from(node: core::Node) -> Self {
        let (user_agent_version, user_agent_build_version) = match node.user_agent_version_type {
            Some(core::node::UserAgentVersionType::UserAgentVersion(version)) => (version, None),
            Some(core::node::UserAgentVersionType::UserAgentBuildVersion(build)) => {
                (String::new(), Some(build.into()))
            }
            None => (String::new(), None),
        };
        let other_fields = if node.listening_addresses.is_empty() {
            Bytes::new()
        } else {
            core::Node {
                listening_addresses: node.listening_addresses,
                ..Default::default()
            }
            .encode_to_vec()
            .into()
        };

        Node {
            id: Some(node.id).filter(|id| !id.is_empty()),
            cluster: Some(node.cluster).filter(|cluster| !cluster.is_empty()),
            metadata: node.metadata.map(decode_struct),
            dynamic_parameters: node
                .dynamic_parameters
                .into_iter()
                .map(|(type_url, context)| (type_url, context.params.into_iter().collect()))
                .collect(),
            locality: node.locality.map(|l| Locality {
                region: l.region,
                zone: l.zone,
                sub_zone: l.sub_zone,
            }),
            user_agent_name: node.user_agent_name,
            user_agent_version,
            user_agent_build_version,
            extensions: node.extensions.into_iter().map(Extension::from).collect(),
            client_features: node.client_features,
            other_fields,
        }
    }
}

impl From<core::BuildVersion> for BuildVersion {
    fn from(build: core::BuildVersion) -> Self {
        BuildVersion {
            version: build.version.map(|v| SemanticVersion {
                major_number: v.major_number,
                minor_number: v.minor_number,
                patch: v.patch,
            }),
            metadata: build.metadata.map(decode_struct),
        }
    }
}

#[allow(deprecated)]
impl From<core::Extension> for Extension {
    fn from(extension: core::Extension) -> Self {
        Extension {
            name: extension.name,
            category: extension.category,
            type_descriptor: extension.type_descriptor,
            version: extension.version.map(BuildVersion::from),
            disabled: extension.disabled,
            type_urls: extension.type_urls,
        }
    }
}

fn decode_struct(proto_struct: Struct) -> Metadata {
    proto_struct
        .fields
        .into_iter()
        .map(|(key, value)| (key, decode_value(value)))
        .collect()
}

// NaN and the infinities have no JSON number form; they are kept as the
// strings the proto3 JSON mapping uses for them.
fn decode_value(value: Value) -> serde_json::Value {
    use serde_json::Value as Json;

    match value.kind {
        None | Some(Kind::NullValue(_)) => Json::Null,
        Some(Kind::NumberValue(n)) => match serde_json::Number::from_f64(n) {
            Some(number) => Json::Number(number),
            None if n.is_nan() => Json::String("NaN".to_string()),
            None if n > 0.0 => Json::String("Infinity".to_string()),
            None => Json::String("-Infinity".to_string()),
        },
        Some(Kind::StringValue(s)) => Json::String(s),
        Some(Kind::BoolValue(b)) => Json::Bool(b),
        // Inserted in key order, so the object stays sorted whatever map
        // backs `serde_json::Map`.
        Some(Kind::StructValue(s)) => Json::Object(decode_struct(s).into_iter().collect()),
        Some(Kind::ListValue(list)) => {
            Json::Array(list.values.into_iter().map(decode_value).collect())
        }
    }
}
