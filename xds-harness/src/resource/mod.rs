//! Provides abstraction for xDS resources.

use bytes::Bytes;

use crate::error::{DecodeCause, Error, Result};

pub mod prost;

/// Type URL of envoy v3 listener resources.
pub const LISTENER_TYPE_URL: &str = "type.googleapis.com/envoy.config.listener.v3.Listener";
/// Type URL of envoy v3 cluster resources.
pub const CLUSTER_TYPE_URL: &str = "type.googleapis.com/envoy.config.cluster.v3.Cluster";
/// Type URL of envoy v3 route configuration resources.
pub const ROUTE_CONFIGURATION_TYPE_URL: &str =
    "type.googleapis.com/envoy.config.route.v3.RouteConfiguration";
/// Type URL of envoy v3 cluster load assignment (endpoint) resources.
pub const CLUSTER_LOAD_ASSIGNMENT_TYPE_URL: &str =
    "type.googleapis.com/envoy.config.endpoint.v3.ClusterLoadAssignment";

/// Trait for xDS resources.
///
/// `decode` parses the raw bytes of a single `Any` payload; `name` returns the
/// name the resource is identified by in a response summary.
///
/// # Example
///
/// ```ignore
/// impl Resource for Listener {
///     const TYPE_URL: &'static str = "type.googleapis.com/envoy.config.listener.v3.Listener";
///
///     fn decode(bytes: Bytes) -> Result<Self, prost::DecodeError> {
///         <Listener as prost::Message>::decode(bytes)
///     }
///
///     fn name(&self) -> &str {
///         &self.name
///     }
/// }
/// ```
pub trait Resource: Sized {
    /// The xDS type URL for this resource type.
    const TYPE_URL: &'static str;

    /// Decode a resource from its serialized bytes.
    fn decode(bytes: Bytes) -> std::result::Result<Self, ::prost::DecodeError>;

    /// Returns the name identifying this resource.
    fn name(&self) -> &str;
}

/// Decodes one payload as `R` and returns its name.
///
/// Payloads whose own type URL differs from `R::TYPE_URL` are rejected.
pub fn decode_name<R: Resource>(
    type_url: &str,
    value: Bytes,
) -> std::result::Result<String, DecodeCause> {
    if type_url != R::TYPE_URL {
        return Err(DecodeCause::TypeMismatch {
            expected: R::TYPE_URL.to_string(),
            actual: type_url.to_string(),
        });
    }
    let resource = R::decode(value)?;
    Ok(resource.name().to_string())
}

/// Signature of a per-kind payload decoder.
pub type NameDecoder = fn(&str, Bytes) -> std::result::Result<String, DecodeCause>;

/// The closed set of resource kinds a discovery response can carry.
///
/// Every type URL maps to exactly one variant; anything that is not one of the
/// four known URLs becomes [`ResourceKind::Unrecognized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// `envoy.config.listener.v3.Listener`
    Listener,
    /// `envoy.config.cluster.v3.Cluster`
    Cluster,
    /// `envoy.config.route.v3.RouteConfiguration`
    RouteConfiguration,
    /// `envoy.config.endpoint.v3.ClusterLoadAssignment`
    ClusterLoadAssignment,
    /// Any other type URL.
    Unrecognized,
}

impl ResourceKind {
    /// Maps a type URL to its kind by exact match.
    pub fn from_type_url(type_url: &str) -> Self {
        match type_url {
            LISTENER_TYPE_URL => ResourceKind::Listener,
            CLUSTER_TYPE_URL => ResourceKind::Cluster,
            ROUTE_CONFIGURATION_TYPE_URL => ResourceKind::RouteConfiguration,
            CLUSTER_LOAD_ASSIGNMENT_TYPE_URL => ResourceKind::ClusterLoadAssignment,
            _ => ResourceKind::Unrecognized,
        }
    }

    /// Maps a service mnemonic (`lds`, `cds`, `rds`, `eds`) to its kind,
    /// ignoring case.
    pub fn from_service(service: &str) -> Result<Self> {
        service_type_url(service).map(Self::from_type_url)
    }

    /// The canonical type URL, or `None` for [`ResourceKind::Unrecognized`].
    pub fn type_url(self) -> Option<&'static str> {
        match self {
            ResourceKind::Listener => Some(LISTENER_TYPE_URL),
            ResourceKind::Cluster => Some(CLUSTER_TYPE_URL),
            ResourceKind::RouteConfiguration => Some(ROUTE_CONFIGURATION_TYPE_URL),
            ResourceKind::ClusterLoadAssignment => Some(CLUSTER_LOAD_ASSIGNMENT_TYPE_URL),
            ResourceKind::Unrecognized => None,
        }
    }

    /// The decoder that turns one payload of this kind into its name.
    ///
    /// Load assignments are named after the cluster they serve.
    pub fn decoder(self) -> Option<NameDecoder> {
        use envoy_types::pb::envoy::config::{cluster, endpoint, listener, route};

        let decoder: NameDecoder = match self {
            ResourceKind::Listener => decode_name::<listener::v3::Listener>,
            ResourceKind::Cluster => decode_name::<cluster::v3::Cluster>,
            ResourceKind::RouteConfiguration => decode_name::<route::v3::RouteConfiguration>,
            ResourceKind::ClusterLoadAssignment => {
                decode_name::<endpoint::v3::ClusterLoadAssignment>
            }
            ResourceKind::Unrecognized => return None,
        };
        Some(decoder)
    }
}

/// Resolves a service mnemonic to the type URL of the resources it serves.
///
/// # Example
///
/// ```
/// use xds_harness::service_type_url;
///
/// assert_eq!(
///     service_type_url("LDS").unwrap(),
///     "type.googleapis.com/envoy.config.listener.v3.Listener",
/// );
/// assert!(service_type_url("xyz").is_err());
/// ```
pub fn service_type_url(service: &str) -> Result<&'static str> {
    match service.to_ascii_lowercase().as_str() {
        "lds" => Ok(LISTENER_TYPE_URL),
        "cds" => Ok(CLUSTER_TYPE_URL),
        "rds" => Ok(ROUTE_CONFIGURATION_TYPE_URL),
        "eds" => Ok(CLUSTER_LOAD_ASSIGNMENT_TYPE_URL),
        _ => Err(Error::UnknownService(service.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_type_url_ignores_case() {
        let lower = service_type_url("lds").unwrap();
        assert_eq!(lower, LISTENER_TYPE_URL);
        assert_eq!(service_type_url("LDS").unwrap(), lower);
        assert_eq!(service_type_url("Lds").unwrap(), lower);
    }

    #[test]
    fn test_service_type_url_all_services() {
        assert_eq!(service_type_url("cds").unwrap(), CLUSTER_TYPE_URL);
        assert_eq!(service_type_url("rds").unwrap(), ROUTE_CONFIGURATION_TYPE_URL);
        assert_eq!(service_type_url("eds").unwrap(), CLUSTER_LOAD_ASSIGNMENT_TYPE_URL);
    }

    #[test]
    fn test_service_type_url_unknown() {
        let err = service_type_url("xyz").unwrap_err();
        match &err {
            Error::UnknownService(service) => assert_eq!(service, "xyz"),
            other => panic!("expected UnknownService, got {other:?}"),
        }
        assert!(err.to_string().contains("xyz"));
    }

    #[test]
    fn test_kind_from_service_is_always_known() {
        for service in ["lds", "CDS", "rds", "Eds"] {
            let kind = ResourceKind::from_service(service).unwrap();
            assert_ne!(kind, ResourceKind::Unrecognized);
            assert_eq!(kind.type_url(), service_type_url(service).ok());
        }
        assert!(matches!(
            ResourceKind::from_service("ads"),
            Err(Error::UnknownService(_))
        ));
    }

    #[test]
    fn test_kind_from_type_url_round_trips_known_kinds() {
        for kind in [
            ResourceKind::Listener,
            ResourceKind::Cluster,
            ResourceKind::RouteConfiguration,
            ResourceKind::ClusterLoadAssignment,
        ] {
            let url = kind.type_url().unwrap();
            assert_eq!(ResourceKind::from_type_url(url), kind);
            assert!(kind.decoder().is_some());
        }
    }

    #[test]
    fn test_kind_from_type_url_unrecognized() {
        let kind =
            ResourceKind::from_type_url("type.googleapis.com/envoy.service.runtime.v3.Runtime");
        assert_eq!(kind, ResourceKind::Unrecognized);
        assert!(kind.type_url().is_none());
        assert!(kind.decoder().is_none());
        // Matching is exact, not case-insensitive.
        assert_eq!(
            ResourceKind::from_type_url(&LISTENER_TYPE_URL.to_uppercase()),
            ResourceKind::Unrecognized
        );
    }
}
