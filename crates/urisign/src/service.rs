//! URI-signing key flows against the cluster.
//!
//! Every call opens its own [`ClusterSession`] from a [`SessionSource`]
//! (in production, [`get_cluster`](edgeauth_cluster::get_cluster) over live
//! discovery), runs one [`KeysetStore`] operation on the
//! [`URI_SIGNING_BUCKET`] bucket, and releases the session before returning,
//! whether the operation succeeded or not.
//!
//! ```text
//! save_keys(xml_id, body)
//!   ├─ parse      ── malformed ──▶ KeysetError::Parse      (no cluster access)
//!   ├─ validate   ── invalid ────▶ KeysetError::Validation (no cluster access)
//!   ├─ session    ── fails ──────▶ KeysetError::Cluster
//!   └─ store.save ─ fails ───────▶ KeysetError::Storage
//! ```

use edgeauth_cluster::{
    ClusterConfig, ClusterSession, DiscoveredSessions, NodeDiscovery, SessionSource,
};

use crate::{
    error::KeysetError,
    keyset::Keyset,
    store::{KeysetStore, URI_SIGNING_BUCKET},
    validation::parse_and_validate,
};

/// Reads, writes, and deletes delivery-service keysets on the cluster.
///
/// `S` opens one session per operation. [`UriSigningKeys::new`] wires it to
/// node discovery, normally the relational store's `AnyPool`, and a
/// read-only configuration.
#[derive(Debug, Clone)]
pub struct UriSigningKeys<S> {
    sessions: S,
}

impl<D: NodeDiscovery> UriSigningKeys<DiscoveredSessions<D>> {
    /// Creates the service over live discovery.
    pub fn new(discovery: D, config: ClusterConfig) -> Self {
        Self::with_sessions(DiscoveredSessions::new(discovery, config))
    }
}

impl<S: SessionSource> UriSigningKeys<S> {
    /// Creates the service over any session source.
    pub fn with_sessions(sessions: S) -> Self {
        Self { sessions }
    }

    /// Returns the session source.
    pub fn sessions(&self) -> &S {
        &self.sessions
    }

    /// Returns the keyset of a delivery service.
    ///
    /// A delivery service without keys yields an empty keyset.
    ///
    /// # Errors
    ///
    /// - [`KeysetError::Cluster`] if no session can be built.
    /// - [`KeysetError::Storage`] if the cluster request fails.
    /// - [`KeysetError::Parse`] or [`KeysetError::Validation`] if the stored document is rejected.
    #[tracing::instrument(skip(self))]
    pub async fn get_keys(&self, xml_id: &str) -> Result<Keyset, KeysetError> {
        let session = self.session().await?;
        let result = KeysetStore::new(session.bucket(URI_SIGNING_BUCKET)).get(xml_id).await;
        session.close();
        Ok(result?.unwrap_or_default())
    }

    /// Parses, validates, and stores a keyset document.
    ///
    /// Returns the stored keyset. The document is checked before the
    /// cluster is contacted.
    ///
    /// # Errors
    ///
    /// - [`KeysetError::Parse`] or [`KeysetError::Validation`] if `body` is rejected.
    /// - [`KeysetError::Cluster`] if no session can be built.
    /// - [`KeysetError::Storage`] if the cluster request fails.
    #[tracing::instrument(skip(self, body), fields(body_len = body.len()))]
    pub async fn save_keys(&self, xml_id: &str, body: &[u8]) -> Result<Keyset, KeysetError> {
        let keyset = parse_and_validate(body)?;

        let session = self.session().await?;
        let result =
            KeysetStore::new(session.bucket(URI_SIGNING_BUCKET)).save(xml_id, &keyset).await;
        session.close();
        result?;

        tracing::info!(authorities = keyset.len(), "URI signing keys saved");
        Ok(keyset)
    }

    /// Deletes the keyset of a delivery service.
    ///
    /// # Errors
    ///
    /// - [`KeysetError::NotFound`] if the delivery service has no keys.
    /// - [`KeysetError::Cluster`] if no session can be built.
    /// - [`KeysetError::Storage`] if the cluster request fails.
    #[tracing::instrument(skip(self))]
    pub async fn delete_keys(&self, xml_id: &str) -> Result<(), KeysetError> {
        let session = self.session().await?;
        let result = KeysetStore::new(session.bucket(URI_SIGNING_BUCKET)).delete(xml_id).await;
        session.close();
        result?;

        tracing::info!("URI signing keys deleted");
        Ok(())
    }

    async fn session(&self) -> Result<ClusterSession, KeysetError> {
        self.sessions
            .open_session()
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "cluster session unavailable"))
            .map_err(KeysetError::from)
    }
}
