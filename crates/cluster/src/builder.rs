//! Building a [`ClusterSession`] from configuration and live discovery.

use async_trait::async_trait;

use crate::{
    config::ClusterConfig,
    discovery::NodeDiscovery,
    error::{AvailabilityError, ConfigError, Result},
    session::ClusterSession,
};

/// Builds an authenticated session against every online cluster member.
///
/// Steps, in order:
///
/// 1. Require authentication options. Without them nothing else runs, so the relational store is
///    not queried.
/// 2. Discover nodes through `db`. A failed query surfaces unchanged as
///    [`InfraError`](crate::InfraError).
/// 3. Reject an empty node list with [`AvailabilityError::NoNodesAvailable`].
/// 4. Assemble the session: one HTTPS endpoint per node, every request authenticated with the
///    configured credentials and TLS material.
///
/// Nothing is retried and nothing is cached; each call re-reads the node list. The returned
/// session belongs to the caller, who releases it with [`ClusterSession::close`] or by dropping
/// it.
///
/// # Errors
///
/// - [`ConfigError::AuthMissing`] if `config` carries no authentication options.
/// - [`InfraError`](crate::InfraError) if discovery fails.
/// - [`AvailabilityError::NoNodesAvailable`] if discovery returns no nodes.
/// - [`ConfigError::InvalidTls`] or [`ConfigError::InvalidNodeAddress`] if the session cannot be
///   assembled.
#[tracing::instrument(skip_all)]
pub async fn get_cluster<D>(db: &D, config: &ClusterConfig) -> Result<ClusterSession>
where
    D: NodeDiscovery + ?Sized,
{
    let Some(auth) = config.auth_options() else {
        tracing::warn!("refusing to build cluster session without authentication options");
        return Err(ConfigError::AuthMissing.into());
    };

    let nodes = db.list_cluster_nodes().await?;
    if nodes.is_empty() {
        tracing::warn!("no online cluster nodes registered");
        return Err(AvailabilityError::NoNodesAvailable.into());
    }

    let session = ClusterSession::connect(&nodes, auth, config)?;
    tracing::debug!(nodes = nodes.len(), user = %auth.user, "cluster session built");
    Ok(session)
}

/// Something that hands out a fresh [`ClusterSession`] per call.
///
/// Keyset flows are written against this trait so each operation gets its
/// own session and releases it afterwards.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// Opens a new session.
    ///
    /// # Errors
    ///
    /// Returns a [`ClusterError`](crate::ClusterError) if no session can be built.
    async fn open_session(&self) -> Result<ClusterSession>;
}

/// Sessions built by [`get_cluster`] from live discovery and fixed
/// configuration.
#[derive(Debug, Clone)]
pub struct DiscoveredSessions<D> {
    discovery: D,
    config: ClusterConfig,
}

impl<D: NodeDiscovery> DiscoveredSessions<D> {
    /// Pairs a discovery source with the session configuration.
    pub fn new(discovery: D, config: ClusterConfig) -> Self {
        Self { discovery, config }
    }

    /// Returns the discovery source.
    pub fn discovery(&self) -> &D {
        &self.discovery
    }

    /// Returns the session configuration.
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }
}

#[async_trait]
impl<D: NodeDiscovery> SessionSource for DiscoveredSessions<D> {
    async fn open_session(&self) -> Result<ClusterSession> {
        get_cluster(&self.discovery, &self.config).await
    }
}
