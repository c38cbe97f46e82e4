//! Shared test utilities for cluster session testing.
//!
//! Provides an in-memory relational store with the server inventory schema,
//! fixtures for auth options and configuration, and plaintext sessions that
//! can talk to a local mock HTTP server. Feature-gated behind `testutil`.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! edgeauth-cluster = { path = "../cluster", features = ["testutil"] }
//! ```
//!
//! ```no_run
//! // Requires the `testutil` feature to be enabled.
//! use edgeauth_cluster::testutil::{add_cluster_node, inventory_pool};
//! ```

use std::{
    net::TcpListener,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use reqwest::{Client, Url};
use sqlx::{AnyPool, any::AnyPoolOptions};

use crate::{
    builder::SessionSource,
    config::{ClusterAuthOptions, ClusterConfig},
    discovery::{CLUSTER_SERVER_TYPE, ONLINE_STATUS},
    error::Result,
    session::ClusterSession,
};

/// Test cluster user.
pub const TEST_USER: &str = "riakuser";

/// Test cluster password.
pub const TEST_PASSWORD: &str = "password";

/// A server type that is not a cluster member.
pub const EDGE_SERVER_TYPE: &str = "EDGE";

/// A status that excludes a server from discovery.
pub const OFFLINE_STATUS: &str = "OFFLINE";

const SCHEMA: [&str; 3] = [
    "CREATE TABLE type (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE)",
    "CREATE TABLE status (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE)",
    "CREATE TABLE server (
        id INTEGER PRIMARY KEY,
        host_name TEXT NOT NULL,
        domain_name TEXT NOT NULL,
        type INTEGER NOT NULL REFERENCES type (id),
        status INTEGER NOT NULL REFERENCES status (id)
    )",
];

/// Opens an empty in-memory store with no tables.
///
/// Discovery against it fails, which exercises the infrastructure error path.
///
/// # Panics
///
/// Panics if the in-memory database cannot be opened.
pub async fn empty_pool() -> AnyPool {
    sqlx::any::install_default_drivers();

    // A single connection that never expires keeps the in-memory database alive.
    AnyPoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite should open")
}

/// Opens an in-memory store with the server inventory schema and the
/// cluster, edge, online, and offline lookup rows.
///
/// # Panics
///
/// Panics if the schema cannot be created.
pub async fn inventory_pool() -> AnyPool {
    let pool = empty_pool().await;

    for statement in SCHEMA {
        sqlx::query(statement).execute(&pool).await.expect("schema should apply");
    }
    for name in [CLUSTER_SERVER_TYPE, EDGE_SERVER_TYPE] {
        sqlx::query("INSERT INTO type (name) VALUES (?)")
            .bind(name)
            .execute(&pool)
            .await
            .expect("type row should insert");
    }
    for name in [ONLINE_STATUS, OFFLINE_STATUS] {
        sqlx::query("INSERT INTO status (name) VALUES (?)")
            .bind(name)
            .execute(&pool)
            .await
            .expect("status row should insert");
    }

    pool
}

/// Registers a server with the given type and status names.
///
/// # Panics
///
/// Panics if the insert fails, e.g. for an unknown type or status name.
pub async fn add_server(
    pool: &AnyPool,
    host_name: &str,
    domain_name: &str,
    server_type: &str,
    status: &str,
) {
    sqlx::query(
        "INSERT INTO server (host_name, domain_name, type, status)
         VALUES (?, ?,
                 (SELECT id FROM type WHERE name = ?),
                 (SELECT id FROM status WHERE name = ?))",
    )
    .bind(host_name)
    .bind(domain_name)
    .bind(server_type)
    .bind(status)
    .execute(pool)
    .await
    .expect("server row should insert");
}

/// Registers an online cluster member.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn add_cluster_node(pool: &AnyPool, host_name: &str, domain_name: &str) {
    add_server(pool, host_name, domain_name, CLUSTER_SERVER_TYPE, ONLINE_STATUS).await;
}

/// Auth options with the test credentials and default TLS.
pub fn test_auth_options() -> ClusterAuthOptions {
    ClusterAuthOptions::builder().user(TEST_USER).password(TEST_PASSWORD).build()
}

/// Configuration carrying [`test_auth_options`].
pub fn test_config() -> ClusterConfig {
    ClusterConfig::builder().auth_options(test_auth_options()).build()
}

/// Builds a session over plain HTTP to the given base URLs.
///
/// Production sessions are HTTPS-only; this exists so tests can point a
/// session at a local mock server.
///
/// # Panics
///
/// Panics if an endpoint is not a valid URL or the client cannot be built.
pub fn plaintext_session(endpoints: &[String], auth: &ClusterAuthOptions) -> ClusterSession {
    let nodes = endpoints
        .iter()
        .map(|endpoint| Url::parse(endpoint).expect("endpoint should be a valid URL"))
        .collect();
    let http = Client::builder().build().expect("plaintext client should build");

    ClusterSession::assemble(http, nodes, auth)
}

/// A [`SessionSource`] handing out [`plaintext_session`]s to fixed endpoints.
///
/// Counts the sessions it has opened.
#[derive(Debug)]
pub struct PlaintextSessions {
    endpoints: Vec<String>,
    auth: ClusterAuthOptions,
    opened: AtomicUsize,
}

impl PlaintextSessions {
    /// Creates a source for the given endpoints and credentials.
    pub fn new(endpoints: Vec<String>, auth: ClusterAuthOptions) -> Self {
        Self { endpoints, auth, opened: AtomicUsize::new(0) }
    }

    /// Number of sessions opened so far.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionSource for PlaintextSessions {
    async fn open_session(&self) -> Result<ClusterSession> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(plaintext_session(&self.endpoints, &self.auth))
    }
}

/// Returns a local port on which nothing is listening.
///
/// # Panics
///
/// Panics if no ephemeral port can be bound.
pub fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("ephemeral port should bind");
    listener.local_addr().expect("bound socket has an address").port()
}

/// Returns a local URL on which nothing is listening.
pub fn unreachable_endpoint() -> String {
    format!("http://127.0.0.1:{}", unused_port())
}
