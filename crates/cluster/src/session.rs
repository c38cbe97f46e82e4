//! Authenticated sessions against the key-value cluster.
//!
//! A [`ClusterSession`] owns a pooled HTTPS client, the resolved node
//! addresses, and the credentials every request is signed with. Buckets are
//! reached through [`ClusterSession::bucket`], which returns a
//! [`StorageBackend`] speaking the cluster's HTTP interface:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | `get` | `GET /types/default/buckets/{bucket}/keys/{key}` |
//! | `set` | `PUT /types/default/buckets/{bucket}/keys/{key}` |
//! | `delete` | `DELETE /types/default/buckets/{bucket}/keys/{key}` |
//! | `health_check` | `GET /ping` |
//!
//! # Node Selection
//!
//! Nodes form an unordered candidate pool. Each request starts at the next
//! node in round-robin order and moves on to the following node only when
//! the connection itself fails, so one request touches every node at most
//! once. There is no backoff.
//!
//! # Release
//!
//! The session is exclusively owned by whoever built it. Dropping it, or
//! calling [`ClusterSession::close`], releases the pooled connections.

use std::{
    fmt,
    sync::atomic::{AtomicUsize, Ordering},
    time::Instant,
};

use async_trait::async_trait;
use bytes::Bytes;
use edgeauth_storage::{HealthMetadata, HealthStatus, StorageBackend, StorageError, StorageResult};
use reqwest::{Certificate, Client, Identity, RequestBuilder, Response, StatusCode, Url, header};
use zeroize::Zeroizing;

use crate::{
    config::{ClusterAuthOptions, ClusterConfig, TlsOptions},
    error::ConfigError,
    node::ClusterNode,
};

/// Bucket type used for every bucket path.
const BUCKET_TYPE: &str = "default";

/// Authenticated, pooled client handle for the cluster.
///
/// `ClusterSession` is `Send + Sync`; share it by reference (or inside an
/// `Arc`) to issue independent requests concurrently.
pub struct ClusterSession {
    http: Client,
    nodes: Vec<Url>,
    user: String,
    password: Zeroizing<String>,
    next: AtomicUsize,
}

impl fmt::Debug for ClusterSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterSession")
            .field("nodes", &self.nodes.iter().map(Url::as_str).collect::<Vec<_>>())
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl ClusterSession {
    /// Assembles an HTTPS-only session for the given nodes.
    ///
    /// No connection is opened here; the first request dials.
    pub(crate) fn connect(
        nodes: &[ClusterNode],
        auth: &ClusterAuthOptions,
        config: &ClusterConfig,
    ) -> Result<Self, ConfigError> {
        let urls = nodes
            .iter()
            .map(|node| node_url(node, config.port()))
            .collect::<Result<Vec<_>, _>>()?;

        let builder = Client::builder()
            .use_rustls_tls()
            .https_only(true)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .pool_max_idle_per_host(config.pool_max_idle_per_host());
        let http = apply_tls(builder, &auth.tls)?.build().map_err(|e| ConfigError::InvalidTls {
            message: "failed to build TLS client".into(),
            source: Some(e),
        })?;

        Ok(Self::assemble(http, urls, auth))
    }

    pub(crate) fn assemble(http: Client, nodes: Vec<Url>, auth: &ClusterAuthOptions) -> Self {
        Self {
            http,
            nodes,
            user: auth.user.clone(),
            password: auth.password.clone(),
            next: AtomicUsize::new(0),
        }
    }

    /// Returns the base URL of every node in the session.
    #[must_use]
    pub fn nodes(&self) -> &[Url] {
        &self.nodes
    }

    /// Returns a storage backend scoped to `bucket`.
    #[must_use]
    pub fn bucket(&self, bucket: impl Into<String>) -> ClusterBucket<'_> {
        ClusterBucket { session: self, bucket: bucket.into() }
    }

    /// Pings a node and returns the base URL of the node that answered.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if no node answers with success.
    #[tracing::instrument(skip(self))]
    pub async fn ping(&self) -> StorageResult<Url> {
        let (node, response) = self
            .send(|node| {
                let url = node
                    .join("ping")
                    .map_err(|e| StorageError::internal_with_source("invalid ping URL", e))?;
                Ok(self.http.get(url))
            })
            .await?;
        if response.status().is_success() {
            Ok(node)
        } else {
            Err(status_error(&node, response).await)
        }
    }

    /// Releases the session and its pooled connections.
    pub fn close(self) {
        tracing::debug!(nodes = self.nodes.len(), "closing cluster session");
        drop(self);
    }

    /// Sends a request, trying each node at most once on connection failure.
    async fn send<F>(&self, build: F) -> StorageResult<(Url, Response)>
    where
        F: Fn(&Url) -> StorageResult<RequestBuilder>,
    {
        if self.nodes.is_empty() {
            return Err(StorageError::connection("cluster session has no nodes"));
        }

        let start = self.next.fetch_add(1, Ordering::Relaxed);
        let mut last_error = None;

        for offset in 0..self.nodes.len() {
            let node = &self.nodes[(start + offset) % self.nodes.len()];
            let request = build(node)?.basic_auth(&self.user, Some(self.password.as_str()));

            match request.send().await {
                Ok(response) => return Ok((node.clone(), response)),
                Err(e) if e.is_timeout() => {
                    tracing::warn!(node = %node, "cluster request timed out");
                    return Err(StorageError::timeout());
                },
                Err(e) if e.is_connect() => {
                    tracing::warn!(node = %node, error = %e, "cluster node unreachable");
                    last_error = Some(e);
                },
                Err(e) => {
                    return Err(StorageError::connection_with_source(
                        format!("request to {node} failed"),
                        e,
                    ));
                },
            }
        }

        let message = format!("all {} cluster nodes unreachable", self.nodes.len());
        Err(match last_error {
            Some(e) => StorageError::connection_with_source(message, e),
            None => StorageError::connection(message),
        })
    }
}

impl Drop for ClusterSession {
    fn drop(&mut self) {
        tracing::trace!("cluster session released");
    }
}

/// A [`StorageBackend`] over one bucket of a [`ClusterSession`].
#[derive(Debug)]
pub struct ClusterBucket<'a> {
    session: &'a ClusterSession,
    bucket: String,
}

impl ClusterBucket<'_> {
    /// Returns the bucket name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.bucket
    }

    fn object_url(&self, node: &Url, key: &str) -> StorageResult<Url> {
        let mut url = node.clone();
        url.path_segments_mut()
            .map_err(|()| StorageError::internal(format!("{node} cannot carry a path")))?
            .pop_if_empty()
            .extend(["types", BUCKET_TYPE, "buckets", self.bucket.as_str(), "keys", key]);
        Ok(url)
    }
}

#[async_trait]
impl StorageBackend for ClusterBucket<'_> {
    #[tracing::instrument(skip(self), fields(bucket = %self.bucket))]
    async fn get(&self, key: &str) -> StorageResult<Option<Bytes>> {
        let http = &self.session.http;
        let (node, response) =
            self.session.send(|node| Ok(http.get(self.object_url(node, key)?))).await?;

        match response.status() {
            StatusCode::OK => response.bytes().await.map(Some).map_err(|e| {
                StorageError::connection_with_source(format!("reading {key} from {node}"), e)
            }),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(status_error(&node, response).await),
        }
    }

    #[tracing::instrument(
        skip(self, value),
        fields(bucket = %self.bucket, value_len = value.len())
    )]
    async fn set(&self, key: String, value: Vec<u8>) -> StorageResult<()> {
        let http = &self.session.http;
        let body = Bytes::from(value);
        let (node, response) = self
            .session
            .send(|node| {
                Ok(http
                    .put(self.object_url(node, &key)?)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(body.clone()))
            })
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(status_error(&node, response).await)
        }
    }

    #[tracing::instrument(skip(self), fields(bucket = %self.bucket))]
    async fn delete(&self, key: &str) -> StorageResult<()> {
        let http = &self.session.http;
        let (node, response) =
            self.session.send(|node| Ok(http.delete(self.object_url(node, key)?))).await?;

        if response.status().is_success() || response.status() == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(status_error(&node, response).await)
        }
    }

    #[tracing::instrument(skip(self), fields(bucket = %self.bucket))]
    async fn health_check(&self) -> StorageResult<HealthStatus> {
        let start = Instant::now();
        let result = self.session.ping().await;
        let metadata = HealthMetadata::new(start.elapsed(), "cluster")
            .with_detail("bucket", self.bucket.clone())
            .with_detail("nodes", self.session.nodes.len().to_string());

        Ok(match result {
            Ok(node) => HealthStatus::healthy(metadata.with_detail("node", node.to_string())),
            Err(e) => HealthStatus::unhealthy(metadata, e.to_string()),
        })
    }
}

/// Builds the HTTPS base URL of a node.
fn node_url(node: &ClusterNode, port: u16) -> Result<Url, ConfigError> {
    let address = format!("https://{}:{}/", node.fqdn(), port);
    Url::parse(&address)
        .map_err(|e| ConfigError::InvalidNodeAddress { address, message: e.to_string() })
}

/// Applies trust roots, client identity and verification policy.
fn apply_tls(
    mut builder: reqwest::ClientBuilder,
    tls: &TlsOptions,
) -> Result<reqwest::ClientBuilder, ConfigError> {
    if let Some(pem) = &tls.ca_certificate_pem {
        let certificates =
            Certificate::from_pem_bundle(pem.as_bytes()).map_err(|e| ConfigError::InvalidTls {
                message: "unreadable CA certificate bundle".into(),
                source: Some(e),
            })?;
        if certificates.is_empty() {
            return Err(ConfigError::InvalidTls {
                message: "CA certificate bundle contains no certificates".into(),
                source: None,
            });
        }
        for certificate in certificates {
            builder = builder.add_root_certificate(certificate);
        }
    }

    if let Some(pem) = &tls.client_identity_pem {
        let identity = Identity::from_pem(pem.as_bytes()).map_err(|e| ConfigError::InvalidTls {
            message: "unreadable client identity".into(),
            source: Some(e),
        })?;
        builder = builder.identity(identity);
    }

    if tls.accept_invalid_certs {
        tracing::warn!("cluster TLS certificate verification is disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }

    Ok(builder)
}

/// Maps a non-success response to a [`StorageError`].
async fn status_error(node: &Url, response: Response) -> StorageError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(node = %node, status = status.as_u16(), "cluster request rejected");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            StorageError::internal(format!("authentication rejected by {node} ({status})"))
        },
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
            StorageError::connection(format!("{node} unavailable ({status}): {}", body.trim()))
        },
        StatusCode::GATEWAY_TIMEOUT => StorageError::timeout(),
        _ => StorageError::internal(format!("{node} returned {status}: {}", body.trim())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn auth() -> ClusterAuthOptions {
        ClusterAuthOptions::builder().user("riakuser").password("password").build()
    }

    #[test]
    fn test_node_url_uses_https_and_port() {
        let url = node_url(&ClusterNode::new("www", "devnull.com"), 8098).unwrap();
        assert_eq!(url.as_str(), "https://www.devnull.com:8098/");
    }

    #[test]
    fn test_node_url_rejects_invalid_host() {
        let err = node_url(&ClusterNode::new("bad host", "devnull.com"), 8098).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNodeAddress { .. }));
    }

    #[test]
    fn test_connect_builds_one_url_per_node() {
        let nodes =
            [ClusterNode::new("riak-1", "cdn.test"), ClusterNode::new("riak-2", "cdn.test")];
        let session = ClusterSession::connect(&nodes, &auth(), &ClusterConfig::default()).unwrap();

        let urls: Vec<_> = session.nodes().iter().map(Url::as_str).collect();
        assert_eq!(urls, ["https://riak-1.cdn.test:8098/", "https://riak-2.cdn.test:8098/"]);
    }

    #[test]
    fn test_connect_rejects_garbage_ca_bundle() {
        let mut options = auth();
        options.tls = TlsOptions::builder().ca_certificate_pem("not a certificate").build();

        let err = ClusterSession::connect(
            &[ClusterNode::new("riak-1", "cdn.test")],
            &options,
            &ClusterConfig::default(),
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidTls { .. }));
    }

    #[test]
    fn test_object_url_escapes_key() {
        let session = ClusterSession::connect(
            &[ClusterNode::new("riak-1", "cdn.test")],
            &auth(),
            &ClusterConfig::default(),
        )
        .unwrap();
        let bucket = session.bucket("cdn_uri_sig_keys");

        let url = bucket.object_url(&session.nodes()[0], "demo ds/1").unwrap();
        assert_eq!(
            url.as_str(),
            "https://riak-1.cdn.test:8098/types/default/buckets/cdn_uri_sig_keys/keys/demo%20ds%2F1"
        );
    }

    #[test]
    fn test_debug_omits_password() {
        let session = ClusterSession::connect(
            &[ClusterNode::new("riak-1", "cdn.test")],
            &auth(),
            &ClusterConfig::default(),
        )
        .unwrap();

        let debug = format!("{session:?}");
        assert!(debug.contains("riak-1.cdn.test"));
        assert!(!debug.contains("password"));
    }
}
