//! Synthetic resources handed to a control plane as test fixtures.
//!
//! A scenario names the resources it wants; the [`Synthesizer`] turns those
//! names into a [`ResourceSet`] of one kind, filling in plausible attribute
//! values. Names are kept in input order and are not deduplicated, so a
//! scenario can deliberately send colliding names.
//!
//! # Example
//!
//! ```
//! use xds_harness::fixture::{FixtureKind, Synthesizer};
//!
//! let mut synthesizer = Synthesizer::new();
//! let set = synthesizer.synthesize(FixtureKind::Endpoint, &["backend", "frontend"]);
//!
//! assert_eq!(set.kind(), FixtureKind::Endpoint);
//! assert_eq!(set.names(), vec!["backend", "frontend"]);
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

mod address;

pub use address::{RandomSource, random_address};

/// Connect timeout given to every synthesized cluster, in seconds.
pub const CLUSTER_CONNECT_TIMEOUT_SECS: i32 = 5;

/// The kinds of fixture a [`Synthesizer`] can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FixtureKind {
    /// Endpoints, linked to the cluster of the same name.
    Endpoint,
    /// Clusters.
    Cluster,
    /// Routes.
    Route,
    /// Listeners.
    Listener,
    /// Runtimes.
    Runtime,
    /// Secrets.
    Secret,
}

/// A synthesized endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    /// Endpoint name.
    pub name: String,
    /// Name of the cluster this endpoint belongs to.
    pub cluster: String,
    /// Hostname the endpoint points at.
    pub address: String,
}

/// A synthesized cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Cluster name.
    pub name: String,
    /// Connect timeout keyed by unit, mirroring the JSON form of a duration.
    pub connect_timeout: BTreeMap<String, i32>,
}

/// A synthesized route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    /// Route name.
    pub name: String,
}

/// A synthesized listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listener {
    /// Listener name.
    pub name: String,
    /// Hostname the listener binds.
    pub address: String,
}

/// A synthesized runtime layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Runtime {
    /// Runtime name.
    pub name: String,
}

/// A synthesized secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Secret {
    /// Secret name.
    pub name: String,
}

/// An ordered collection of fixtures of a single kind.
///
/// Serializes as `{"kind": "<Kind>", "items": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "items")]
pub enum ResourceSet {
    /// Endpoint fixtures.
    Endpoint(Vec<Endpoint>),
    /// Cluster fixtures.
    Cluster(Vec<Cluster>),
    /// Route fixtures.
    Route(Vec<Route>),
    /// Listener fixtures.
    Listener(Vec<Listener>),
    /// Runtime fixtures.
    Runtime(Vec<Runtime>),
    /// Secret fixtures.
    Secret(Vec<Secret>),
}

impl ResourceSet {
    /// The kind of every item in the set.
    pub fn kind(&self) -> FixtureKind {
        match self {
            ResourceSet::Endpoint(_) => FixtureKind::Endpoint,
            ResourceSet::Cluster(_) => FixtureKind::Cluster,
            ResourceSet::Route(_) => FixtureKind::Route,
            ResourceSet::Listener(_) => FixtureKind::Listener,
            ResourceSet::Runtime(_) => FixtureKind::Runtime,
            ResourceSet::Secret(_) => FixtureKind::Secret,
        }
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        match self {
            ResourceSet::Endpoint(items) => items.len(),
            ResourceSet::Cluster(items) => items.len(),
            ResourceSet::Route(items) => items.len(),
            ResourceSet::Listener(items) => items.len(),
            ResourceSet::Runtime(items) => items.len(),
            ResourceSet::Secret(items) => items.len(),
        }
    }

    /// Returns `true` if the set holds no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Item names, in order.
    pub fn names(&self) -> Vec<&str> {
        match self {
            ResourceSet::Endpoint(items) => items.iter().map(|i| i.name.as_str()).collect(),
            ResourceSet::Cluster(items) => items.iter().map(|i| i.name.as_str()).collect(),
            ResourceSet::Route(items) => items.iter().map(|i| i.name.as_str()).collect(),
            ResourceSet::Listener(items) => items.iter().map(|i| i.name.as_str()).collect(),
            ResourceSet::Runtime(items) => items.iter().map(|i| i.name.as_str()).collect(),
            ResourceSet::Secret(items) => items.iter().map(|i| i.name.as_str()).collect(),
        }
    }
}

/// Builds fixture resource sets from resource names.
///
/// Addresses are drawn from the synthesizer's [`RandomSource`]. The default
/// source is a [`fastrand::Rng`] freshly seeded from fastrand's global
/// generator, so addresses differ between runs; use [`Synthesizer::with_seed`] or
/// [`Synthesizer::with_source`] when a test needs reproducible output.
#[derive(Debug, Clone)]
pub struct Synthesizer<R = fastrand::Rng> {
    rng: R,
}

impl Synthesizer {
    /// Create a synthesizer with a freshly seeded random source.
    pub fn new() -> Self {
        Self::with_source(fastrand::Rng::new())
    }

    /// Create a synthesizer whose output is fully determined by `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_source(fastrand::Rng::with_seed(seed))
    }
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RandomSource> Synthesizer<R> {
    /// Create a synthesizer drawing from `rng`.
    pub fn with_source(rng: R) -> Self {
        Self { rng }
    }

    /// Build a set of `kind` with one item per name, in order.
    pub fn synthesize<S: AsRef<str>>(&mut self, kind: FixtureKind, names: &[S]) -> ResourceSet {
        match kind {
            FixtureKind::Endpoint => ResourceSet::Endpoint(self.endpoints(names)),
            FixtureKind::Cluster => ResourceSet::Cluster(clusters(names)),
            FixtureKind::Route => ResourceSet::Route(routes(names)),
            FixtureKind::Listener => ResourceSet::Listener(self.listeners(names)),
            FixtureKind::Runtime => ResourceSet::Runtime(runtimes(names)),
            FixtureKind::Secret => ResourceSet::Secret(secrets(names)),
        }
    }

    /// Endpoints, each linked to the cluster of the same name.
    pub fn endpoints<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<Endpoint> {
        names
            .iter()
            .map(|name| Endpoint {
                name: name.as_ref().to_string(),
                cluster: name.as_ref().to_string(),
                address: random_address(&mut self.rng),
            })
            .collect()
    }

    /// Listeners, each with its own address.
    pub fn listeners<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<Listener> {
        names
            .iter()
            .map(|name| Listener {
                name: name.as_ref().to_string(),
                address: random_address(&mut self.rng),
            })
            .collect()
    }
}

/// Clusters with a five second connect timeout.
pub fn clusters<S: AsRef<str>>(names: &[S]) -> Vec<Cluster> {
    names
        .iter()
        .map(|name| Cluster {
            name: name.as_ref().to_string(),
            connect_timeout: BTreeMap::from([(
                "seconds".to_string(),
                CLUSTER_CONNECT_TIMEOUT_SECS,
            )]),
        })
        .collect()
}

/// Routes.
pub fn routes<S: AsRef<str>>(names: &[S]) -> Vec<Route> {
    names
        .iter()
        .map(|name| Route {
            name: name.as_ref().to_string(),
        })
        .collect()
}

/// Runtimes.
pub fn runtimes<S: AsRef<str>>(names: &[S]) -> Vec<Runtime> {
    names
        .iter()
        .map(|name| Runtime {
            name: name.as_ref().to_string(),
        })
        .collect()
}

/// Secrets.
pub fn secrets<S: AsRef<str>>(names: &[S]) -> Vec<Secret> {
    names
        .iter()
        .map(|name| Secret {
            name: name.as_ref().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [FixtureKind; 6] = [
        FixtureKind::Endpoint,
        FixtureKind::Cluster,
        FixtureKind::Route,
        FixtureKind::Listener,
        FixtureKind::Runtime,
        FixtureKind::Secret,
    ];

    #[test]
    fn test_synthesize_keeps_names_in_order() {
        let names = ["zeta", "alpha", "mid"];
        let mut synthesizer = Synthesizer::new();

        for kind in ALL_KINDS {
            let set = synthesizer.synthesize(kind, &names);
            assert_eq!(set.kind(), kind);
            assert_eq!(set.len(), names.len());
            assert_eq!(set.names(), names);
        }
    }

    #[test]
    fn test_synthesize_keeps_duplicates() {
        let names = vec!["dup".to_string(), "dup".to_string()];
        let set = Synthesizer::new().synthesize(FixtureKind::Listener, &names[..]);
        assert_eq!(set.names(), vec!["dup", "dup"]);
    }

    #[test]
    fn test_synthesize_empty() {
        let names: [&str; 0] = [];
        let mut synthesizer = Synthesizer::new();
        for kind in ALL_KINDS {
            let set = synthesizer.synthesize(kind, &names);
            assert!(set.is_empty());
            assert_eq!(set.kind(), kind);
        }
    }

    #[test]
    fn test_endpoints_link_cluster_and_address() {
        let endpoints = Synthesizer::new().endpoints(&["backend"]);
        let endpoint = &endpoints[0];
        assert_eq!(endpoint.cluster, "backend");
        assert!(!endpoint.address.is_empty());
        assert!(endpoint.address.contains('.'));
    }

    #[test]
    fn test_seeded_synthesizers_agree() {
        let names = ["a", "b", "c"];
        let first = Synthesizer::with_seed(42).synthesize(FixtureKind::Endpoint, &names);
        let second = Synthesizer::with_seed(42).synthesize(FixtureKind::Endpoint, &names);
        assert_eq!(first, second);
    }

    #[test]
    fn test_cluster_connect_timeout_json() {
        let set = Synthesizer::new().synthesize(FixtureKind::Cluster, &["c1"]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(
            json,
            r#"{"kind":"Cluster","items":[{"name":"c1","connectTimeout":{"seconds":5}}]}"#
        );
    }
}
