//! On-disk behavior of the exchange store across handles and threads.

use std::sync::{Arc, Barrier};
use std::thread;

use envoy_types::pb::envoy::config::core::v3 as core;
use envoy_types::pb::envoy::config::endpoint::v3::ClusterLoadAssignment;
use envoy_types::pb::envoy::service::discovery::v3 as discovery;
use envoy_types::pb::google::protobuf::Any;
use prost::Message;
use tempfile::TempDir;
use xds_harness::resource::CLUSTER_LOAD_ASSIGNMENT_TYPE_URL;
use xds_harness::{
    DiscoveryRequest, DiscoveryResponse, Error, ExchangeKind, ExchangeStore, Node, StoreConfig,
    parse_response, service_type_url,
};

fn open(config: &StoreConfig) -> ExchangeStore {
    let store = ExchangeStore::open(config).unwrap();
    store.migrate().unwrap();
    store
}

fn eds_response(clusters: &[&str]) -> discovery::DiscoveryResponse {
    discovery::DiscoveryResponse {
        version_info: "3".to_string(),
        type_url: CLUSTER_LOAD_ASSIGNMENT_TYPE_URL.to_string(),
        nonce: "nonce-3".to_string(),
        resources: clusters
            .iter()
            .map(|name| Any {
                type_url: CLUSTER_LOAD_ASSIGNMENT_TYPE_URL.to_string(),
                value: ClusterLoadAssignment {
                    cluster_name: name.to_string(),
                    ..Default::default()
                }
                .encode_to_vec(),
            })
            .collect(),
        ..Default::default()
    }
}

#[test]
fn records_survive_reopening_the_file() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::new(dir.path().join("exchanges.db"));

    let node = Node::new("envoy", "1.30");
    let request = DiscoveryRequest::new(node, service_type_url("eds").unwrap())
        .with_resource_names(["a", "b"]);

    open(&config).record_request(&request).unwrap();

    // A fresh handle on the same file still sees the first record.
    let store = open(&config);
    let err = store.record_request(&request).unwrap_err();
    assert!(matches!(err, Error::DuplicateRecord(ExchangeKind::Request)));

    store.clear_all().unwrap();
    store.record_request(&request).unwrap();
}

#[test]
fn proto_response_is_parsed_and_recorded() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let dir = TempDir::new().unwrap();
    let store = open(&StoreConfig::new(dir.path().join("exchanges.db")));

    let response = DiscoveryResponse::from(eds_response(&["a", "b"]));
    let simple = parse_response(&response).unwrap();
    assert_eq!(simple.version, "3");
    assert_eq!(simple.nonce, "nonce-3");
    assert_eq!(simple.resources, vec!["a", "b"]);

    store.record_response(&response).unwrap();
    assert!(store.record_response(&response).unwrap_err().is_duplicate());

    // A different resource order is a different exchange.
    let reordered = DiscoveryResponse::from(eds_response(&["b", "a"]));
    store.record_response(&reordered).unwrap();
}

#[test]
fn concurrent_identical_inserts_store_once() {
    const WRITERS: usize = 4;

    let dir = TempDir::new().unwrap();
    let config = StoreConfig::new(dir.path().join("exchanges.db"));
    open(&config);

    let node = Node::new("envoy", "1.30");
    let request =
        DiscoveryRequest::new(node, service_type_url("cds").unwrap()).with_ack("1", "nonce-1");
    let barrier = Arc::new(Barrier::new(WRITERS));

    let handles: Vec<_> = (0..WRITERS)
        .map(|_| {
            let config = config.clone();
            let request = request.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let store = ExchangeStore::open(&config).unwrap();
                barrier.wait();
                store.record_request(&request)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.is_duplicate()))
        .count();

    assert_eq!(succeeded, 1);
    assert_eq!(duplicates, WRITERS - 1);
}

#[test]
fn requests_differing_only_in_client_features_are_distinct() {
    let dir = TempDir::new().unwrap();
    let store = open(&StoreConfig::new(dir.path().join("exchanges.db")));

    let request = |feature: &str| {
        DiscoveryRequest::from(discovery::DiscoveryRequest {
            node: Some(core::Node {
                id: "node-1".to_string(),
                client_features: vec![feature.to_string()],
                ..Default::default()
            }),
            type_url: service_type_url("lds").unwrap().to_string(),
            ..Default::default()
        })
    };

    store.record_request(&request("a")).unwrap();
    store.record_request(&request("b")).unwrap();
    assert!(store.record_request(&request("b")).unwrap_err().is_duplicate());
}

#[test]
fn responses_differing_only_in_canary_or_control_plane_are_distinct() {
    let dir = TempDir::new().unwrap();
    let store = open(&StoreConfig::new(dir.path().join("exchanges.db")));

    let base = eds_response(&["a"]);
    let canary = discovery::DiscoveryResponse {
        canary: true,
        ..base.clone()
    };
    let control_plane = |identifier: &str| discovery::DiscoveryResponse {
        control_plane: Some(core::ControlPlane {
            identifier: identifier.to_string(),
        }),
        ..base.clone()
    };

    for response in [base.clone(), canary, control_plane("cp-1"), control_plane("cp-2")] {
        store.record_response(&DiscoveryResponse::from(response)).unwrap();
    }
    let err = store
        .record_response(&DiscoveryResponse::from(control_plane("cp-1")))
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateRecord(ExchangeKind::Response)));
}
