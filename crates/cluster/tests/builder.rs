//! End-to-end session building against an in-memory server inventory.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use edgeauth_cluster::{
    AvailabilityError, ClusterConfig, ClusterError, ClusterNode, ConfigError, InfraError,
    get_cluster, list_cluster_nodes,
    testutil::{
        EDGE_SERVER_TYPE, OFFLINE_STATUS, add_cluster_node, add_server, empty_pool,
        inventory_pool, test_config,
    },
};

#[tokio::test]
async fn single_online_node_yields_session() {
    let db = inventory_pool().await;
    add_cluster_node(&db, "www", "devnull.com").await;

    let session = get_cluster(&db, &test_config()).await.expect("session should build");

    let urls: Vec<_> = session.nodes().iter().map(|u| u.as_str()).collect();
    assert_eq!(urls, ["https://www.devnull.com:8098/"]);
    session.close();
}

#[tokio::test]
async fn no_online_nodes_is_availability_error() {
    let db = inventory_pool().await;

    let err = get_cluster(&db, &test_config()).await.unwrap_err();

    assert!(matches!(err, ClusterError::Availability(AvailabilityError::NoNodesAvailable)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn missing_auth_is_config_error_even_with_nodes() {
    let db = inventory_pool().await;
    add_cluster_node(&db, "www", "devnull.com").await;

    let err = get_cluster(&db, &ClusterConfig::default()).await.unwrap_err();

    assert!(matches!(err, ClusterError::Config(ConfigError::AuthMissing)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn missing_auth_wins_over_broken_store() {
    // The store has no tables; the auth check must fail first.
    let db = empty_pool().await;

    let err = get_cluster(&db, &ClusterConfig::default()).await.unwrap_err();

    assert!(matches!(err, ClusterError::Config(ConfigError::AuthMissing)));
}

#[tokio::test]
async fn query_failure_is_infra_error() {
    let db = empty_pool().await;

    let err = get_cluster(&db, &test_config()).await.unwrap_err();

    assert!(matches!(err, ClusterError::Infra(InfraError::Query(_))));
}

#[tokio::test]
async fn discovery_ignores_non_cluster_and_offline_servers() {
    let db = inventory_pool().await;
    add_cluster_node(&db, "riak-1", "cdn.test").await;
    add_server(&db, "edge-1", "cdn.test", EDGE_SERVER_TYPE, "ONLINE").await;
    add_server(&db, "riak-2", "cdn.test", "RIAK", OFFLINE_STATUS).await;
    add_cluster_node(&db, "riak-3", "cdn.test").await;

    let mut nodes = list_cluster_nodes(&db).await.expect("discovery should succeed");
    nodes.sort_by(|a, b| a.host_name.cmp(&b.host_name));

    assert_eq!(
        nodes,
        [ClusterNode::new("riak-1", "cdn.test"), ClusterNode::new("riak-3", "cdn.test")]
    );
}

#[tokio::test]
async fn only_offline_members_is_availability_error() {
    let db = inventory_pool().await;
    add_server(&db, "riak-1", "cdn.test", "RIAK", OFFLINE_STATUS).await;

    let err = get_cluster(&db, &test_config()).await.unwrap_err();

    assert!(matches!(err, ClusterError::Availability(AvailabilityError::NoNodesAvailable)));
}

#[tokio::test]
async fn each_build_rereads_inventory() {
    let db = inventory_pool().await;
    add_cluster_node(&db, "riak-1", "cdn.test").await;
    let first = get_cluster(&db, &test_config()).await.unwrap();

    add_cluster_node(&db, "riak-2", "cdn.test").await;
    let second = get_cluster(&db, &test_config()).await.unwrap();

    assert_eq!(first.nodes().len(), 1);
    assert_eq!(second.nodes().len(), 2);
}

#[tokio::test]
async fn configured_port_applies_to_every_node() {
    let db = inventory_pool().await;
    add_cluster_node(&db, "riak-1", "cdn.test").await;
    add_cluster_node(&db, "riak-2", "").await;

    let config = ClusterConfig::builder()
        .auth_options(edgeauth_cluster::testutil::test_auth_options())
        .port(8443)
        .build();
    let session = get_cluster(&db, &config).await.unwrap();

    let mut urls: Vec<_> = session.nodes().iter().map(|u| u.as_str().to_owned()).collect();
    urls.sort();
    assert_eq!(urls, ["https://riak-1.cdn.test:8443/", "https://riak-2:8443/"]);
}
