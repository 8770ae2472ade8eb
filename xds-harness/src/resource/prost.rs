//! [`Resource`] implementations for the prost-generated envoy-types.

use bytes::Bytes;
use envoy_types::pb::envoy::config::cluster::v3::Cluster;
use envoy_types::pb::envoy::config::endpoint::v3::ClusterLoadAssignment;
use envoy_types::pb::envoy::config::listener::v3::Listener;
use envoy_types::pb::envoy::config::route::v3::RouteConfiguration;
use prost::{DecodeError, Message};

use super::{
    CLUSTER_LOAD_ASSIGNMENT_TYPE_URL, CLUSTER_TYPE_URL, LISTENER_TYPE_URL,
    ROUTE_CONFIGURATION_TYPE_URL, Resource,
};

impl Resource for Listener {
    const TYPE_URL: &'static str = LISTENER_TYPE_URL;

    fn decode(bytes: Bytes) -> Result<Self, DecodeError> {
        <Self as Message>::decode(bytes)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Resource for Cluster {
    const TYPE_URL: &'static str = CLUSTER_TYPE_URL;

    fn decode(bytes: Bytes) -> Result<Self, DecodeError> {
        <Self as Message>::decode(bytes)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Resource for RouteConfiguration {
    const TYPE_URL: &'static str = ROUTE_CONFIGURATION_TYPE_URL;

    fn decode(bytes: Bytes) -> Result<Self, DecodeError> {
        <Self as Message>::decode(bytes)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A load assignment has no name of its own; it is identified by the cluster
/// it serves.
impl Resource for ClusterLoadAssignment {
    const TYPE_URL: &'static str = CLUSTER_LOAD_ASSIGNMENT_TYPE_URL;

    fn decode(bytes: Bytes) -> Result<Self, DecodeError> {
        <Self as Message>::decode(bytes)
    }

    fn name(&self) -> &str {
        &self.cluster_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeCause;
    use crate::resource::decode_name;

    #[test]
    fn test_decode_listener_name() {
        let listener = Listener {
            name: "listener-1".to_string(),
            ..Default::default()
        };
        let bytes: Bytes = listener.encode_to_vec().into();

        let name = decode_name::<Listener>(LISTENER_TYPE_URL, bytes).unwrap();
        assert_eq!(name, "listener-1");
    }

    #[test]
    fn test_load_assignment_named_after_cluster() {
        let assignment = ClusterLoadAssignment {
            cluster_name: "backend".to_string(),
            ..Default::default()
        };
        let bytes: Bytes = assignment.encode_to_vec().into();

        let name =
            decode_name::<ClusterLoadAssignment>(CLUSTER_LOAD_ASSIGNMENT_TYPE_URL, bytes).unwrap();
        assert_eq!(name, "backend");
    }

    #[test]
    fn test_decode_rejects_mismatched_type_url() {
        let cluster = Cluster {
            name: "c".to_string(),
            ..Default::default()
        };
        let bytes: Bytes = cluster.encode_to_vec().into();

        let err = decode_name::<Listener>(CLUSTER_TYPE_URL, bytes).unwrap_err();
        match err {
            DecodeCause::TypeMismatch { expected, actual } => {
                assert_eq!(expected, LISTENER_TYPE_URL);
                assert_eq!(actual, CLUSTER_TYPE_URL);
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_truncated_payload() {
        // Field 1, length-delimited, claims 5 bytes but carries one.
        let bytes = Bytes::from_static(&[0x0a, 0x05, b'a']);

        let err = decode_name::<RouteConfiguration>(ROUTE_CONFIGURATION_TYPE_URL, bytes)
            .unwrap_err();
        assert!(matches!(err, DecodeCause::Protobuf(_)));
    }
}
